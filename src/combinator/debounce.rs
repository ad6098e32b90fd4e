//! Trailing-edge debouncing for rapidly changing values.
//!
//! A [`Debouncer`] absorbs a burst of updates and delivers only the most
//! recent value once the input has been quiet for a configured period.
//! Each new value restarts the quiet period and replaces the held value.
//!
//! # Semantics
//!
//! - Feeding a value cancels the previously scheduled emission and
//!   schedules a new one at `now + quiet_period`.
//! - If the previously scheduled emission is already due when a new value
//!   arrives, it is delivered first: it logically fired during the silence
//!   that preceded the new value.
//! - [`Debouncer::cancel`] discards the held value; no emission can occur
//!   afterwards until a new value is fed.
//!
//! The debouncer is pump-driven: the owner calls [`Debouncer::poll_emit`]
//! when [`Debouncer::next_deadline`] passes. It holds no timer resources
//! of its own.

use crate::time::TimeSource;
use crate::types::Time;
use core::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The held value and the instant it becomes eligible for emission.
///
/// Replaced wholesale on every feed; at most one window exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceWindow<T> {
    value: T,
    deadline: Time,
}

impl<T> DebounceWindow<T> {
    pub(crate) const fn new(value: T, deadline: Time) -> Self {
        Self { value, deadline }
    }

    /// Returns the value waiting to be emitted.
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Returns the instant the value becomes eligible for emission.
    pub const fn deadline(&self) -> Time {
        self.deadline
    }

    pub(crate) fn into_value(self) -> T {
        self.value
    }
}

/// Push-style debouncer delivering the last value after a quiet period.
///
/// # Type Parameters
///
/// * `T` - The value type being debounced.
/// * `F` - The emission callback, `FnMut(T)`.
/// * `C` - The time source consulted on every feed and poll.
///
/// # Example
///
/// ```
/// use tempo::combinator::debounce;
/// use tempo::time::VirtualClock;
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = Arc::new(VirtualClock::new());
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
///
/// let mut debouncer = debounce(Arc::clone(&clock), Duration::from_millis(100), move |v| {
///     sink.borrow_mut().push(v);
/// });
///
/// // A burst within the quiet period keeps only the last value.
/// debouncer.feed(1);
/// clock.advance(10_000_000);
/// debouncer.feed(2);
/// clock.advance(10_000_000);
/// debouncer.feed(3);
///
/// // Silence long enough for the quiet period to pass.
/// clock.advance(100_000_000);
/// assert!(debouncer.poll_emit());
/// assert_eq!(*seen.borrow(), vec![3]);
/// ```
pub struct Debouncer<T, F, C>
where
    F: FnMut(T),
    C: TimeSource,
{
    clock: Arc<C>,
    quiet_period: Duration,
    on_emit: F,
    window: Option<DebounceWindow<T>>,
    /// Values accepted via `feed`.
    fed: u64,
    /// Emissions delivered to `on_emit`.
    emitted: u64,
}

impl<T, F, C> Debouncer<T, F, C>
where
    F: FnMut(T),
    C: TimeSource,
{
    /// Creates a debouncer over the given clock.
    ///
    /// A zero quiet period makes every held value due immediately; it is
    /// still delivered through `poll_emit` or the next `feed`, never
    /// synchronously from the feed that recorded it.
    pub fn new(clock: Arc<C>, quiet_period: Duration, on_emit: F) -> Self {
        Self {
            clock,
            quiet_period,
            on_emit,
            window: None,
            fed: 0,
            emitted: 0,
        }
    }

    /// Accepts a new value, restarting the quiet period.
    ///
    /// If the previously held value is already due it is emitted first;
    /// the new value then replaces it and waits out a fresh quiet period.
    pub fn feed(&mut self, value: T) {
        let now = self.clock.now();
        self.flush_due(now);
        let deadline = now.saturating_add_duration(self.quiet_period);
        self.window = Some(DebounceWindow::new(value, deadline));
        self.fed += 1;
    }

    /// Emits the held value if its quiet period has elapsed.
    ///
    /// Returns true if an emission was delivered.
    pub fn poll_emit(&mut self) -> bool {
        let now = self.clock.now();
        self.flush_due(now)
    }

    /// Returns the instant the held value becomes due, if any.
    ///
    /// The owner should call [`Debouncer::poll_emit`] at or after this
    /// instant.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Time> {
        self.window.as_ref().map(DebounceWindow::deadline)
    }

    /// Discards the held value, returning it.
    ///
    /// After cancellation no emission occurs until a new value is fed.
    pub fn cancel(&mut self) -> Option<T> {
        self.window.take().map(DebounceWindow::into_value)
    }

    /// Returns true if a value is waiting for its quiet period.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.window.is_some()
    }

    /// Returns the value waiting for its quiet period, if any.
    #[must_use]
    pub fn pending_value(&self) -> Option<&T> {
        self.window.as_ref().map(DebounceWindow::value)
    }

    /// Returns the configured quiet period.
    #[must_use]
    pub const fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Returns the number of values accepted.
    #[must_use]
    pub const fn fed(&self) -> u64 {
        self.fed
    }

    /// Returns the number of emissions delivered.
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        self.emitted
    }

    fn flush_due(&mut self, now: Time) -> bool {
        let due = self
            .window
            .as_ref()
            .is_some_and(|window| now >= window.deadline);
        if !due {
            return false;
        }
        let Some(window) = self.window.take() else {
            return false;
        };
        (self.on_emit)(window.into_value());
        self.emitted += 1;
        true
    }
}

impl<T, F, C> fmt::Debug for Debouncer<T, F, C>
where
    T: fmt::Debug,
    F: FnMut(T),
    C: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("quiet_period", &self.quiet_period)
            .field("window", &self.window)
            .field("fed", &self.fed)
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}

/// Creates a [`Debouncer`] over the given clock.
pub fn debounce<T, F, C>(clock: Arc<C>, quiet_period: Duration, on_emit: F) -> Debouncer<T, F, C>
where
    F: FnMut(T),
    C: TimeSource,
{
    Debouncer::new(clock, quiet_period, on_emit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::VirtualClock;
    use std::cell::RefCell;
    use std::rc::Rc;

    const MS: u64 = 1_000_000;

    fn collecting_debouncer(
        quiet_period: Duration,
    ) -> (
        Debouncer<i32, impl FnMut(i32), VirtualClock>,
        Arc<VirtualClock>,
        Rc<RefCell<Vec<i32>>>,
    ) {
        let clock = Arc::new(VirtualClock::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let debouncer = debounce(Arc::clone(&clock), quiet_period, move |v| {
            sink.borrow_mut().push(v);
        });
        (debouncer, clock, seen)
    }

    #[test]
    fn burst_coalesces_to_last_value() {
        let (mut debouncer, clock, seen) = collecting_debouncer(Duration::from_millis(100));

        debouncer.feed(1);
        clock.advance(10 * MS);
        debouncer.feed(2);
        clock.advance(10 * MS);
        debouncer.feed(3);

        // Still inside the quiet period: nothing due yet.
        clock.advance(50 * MS);
        assert!(!debouncer.poll_emit());
        assert!(seen.borrow().is_empty());

        clock.advance(50 * MS);
        assert!(debouncer.poll_emit());
        assert_eq!(*seen.borrow(), vec![3]);
        assert_eq!(debouncer.fed(), 3);
        assert_eq!(debouncer.emitted(), 1);
    }

    #[test]
    fn emits_exactly_once() {
        let (mut debouncer, clock, seen) = collecting_debouncer(Duration::from_millis(20));

        debouncer.feed(7);
        clock.advance(20 * MS);
        assert!(debouncer.poll_emit());
        assert!(!debouncer.poll_emit());

        clock.advance(100 * MS);
        assert!(!debouncer.poll_emit());
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn feed_replaces_pending_value() {
        let (mut debouncer, clock, _seen) = collecting_debouncer(Duration::from_millis(100));

        debouncer.feed(1);
        clock.advance(30 * MS);
        debouncer.feed(2);

        assert_eq!(debouncer.pending_value(), Some(&2));
        // The quiet period restarted at the second feed.
        assert_eq!(debouncer.next_deadline(), Some(Time::from_millis(130)));
    }

    #[test]
    fn cancel_prevents_emission() {
        let (mut debouncer, clock, seen) = collecting_debouncer(Duration::from_millis(50));

        debouncer.feed(42);
        assert_eq!(debouncer.cancel(), Some(42));
        assert!(!debouncer.has_pending());

        clock.advance(200 * MS);
        assert!(!debouncer.poll_emit());
        assert!(seen.borrow().is_empty());
        assert_eq!(debouncer.emitted(), 0);
    }

    #[test]
    fn cancel_on_empty_returns_none() {
        let (mut debouncer, _clock, _seen) = collecting_debouncer(Duration::from_millis(50));
        assert_eq!(debouncer.cancel(), None);
    }

    #[test]
    fn feed_flushes_due_window_first() {
        let (mut debouncer, clock, seen) = collecting_debouncer(Duration::from_millis(50));

        debouncer.feed(1);
        // The quiet period passes unnoticed before the next feed arrives.
        clock.advance(80 * MS);
        debouncer.feed(2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(debouncer.pending_value(), Some(&2));

        clock.advance(50 * MS);
        assert!(debouncer.poll_emit());
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn next_deadline_tracks_window() {
        let (mut debouncer, clock, _seen) = collecting_debouncer(Duration::from_millis(100));

        assert_eq!(debouncer.next_deadline(), None);

        clock.advance(5 * MS);
        debouncer.feed(1);
        assert_eq!(debouncer.next_deadline(), Some(Time::from_millis(105)));

        debouncer.cancel();
        assert_eq!(debouncer.next_deadline(), None);
    }

    #[test]
    fn zero_quiet_period_is_due_on_next_pump() {
        let (mut debouncer, _clock, seen) = collecting_debouncer(Duration::ZERO);

        debouncer.feed(9);
        assert!(debouncer.poll_emit());
        assert_eq!(*seen.borrow(), vec![9]);
    }

    #[test]
    fn emission_at_exact_deadline() {
        let (mut debouncer, clock, seen) = collecting_debouncer(Duration::from_millis(100));

        debouncer.feed(5);
        clock.advance(100 * MS);
        assert!(debouncer.poll_emit());
        assert_eq!(*seen.borrow(), vec![5]);
    }
}
