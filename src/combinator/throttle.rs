//! Rate limiting for event callbacks.
//!
//! A [`Throttler`] forwards at most one event per interval. The first event
//! of a burst is forwarded immediately (leading edge); events arriving while
//! the gate is closed replace a single pending slot, and the most recent of
//! them is forwarded once the interval has elapsed (trailing edge). The
//! final event of a burst is therefore never dropped.

use crate::time::TimeSource;
use crate::types::Time;
use core::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Push-style throttler forwarding at most one event per interval.
///
/// # Type Parameters
///
/// * `T` - The event type being throttled.
/// * `F` - The forwarding callback, `FnMut(T)`.
/// * `C` - The time source consulted on every feed and poll.
///
/// # Example
///
/// ```
/// use tempo::combinator::throttle;
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
/// let mut throttler = throttle(Arc::clone(&clock), Duration::from_millis(100), move |v| {
///     sink.borrow_mut().push(v);
/// });
///
/// throttler.feed(1); // leading edge, forwarded at once
/// throttler.feed(2); // gate closed, parked in the trailing slot
/// throttler.feed(3); // replaces 2
/// assert_eq!(*seen.borrow(), vec![1]);
///
/// clock.advance(100_000_000);
/// assert!(throttler.poll_emit()); // trailing edge
/// assert_eq!(*seen.borrow(), vec![1, 3]);
/// ```
pub struct Throttler<T, F, C>
where
    F: FnMut(T),
    C: TimeSource,
{
    clock: Arc<C>,
    interval: Duration,
    on_emit: F,
    /// Instant of the most recent forward. `None` means the gate is open.
    last_forward: Option<Time>,
    /// The trailing slot; replaced by each suppressed event.
    pending: Option<T>,
    /// Events delivered to `on_emit`.
    forwarded: u64,
    /// Events parked in the trailing slot instead of forwarded.
    suppressed: u64,
}

impl<T, F, C> Throttler<T, F, C>
where
    F: FnMut(T),
    C: TimeSource,
{
    /// Creates a throttler over the given clock.
    ///
    /// A zero interval leaves the gate permanently open: every event is
    /// forwarded immediately.
    pub fn new(clock: Arc<C>, interval: Duration, on_emit: F) -> Self {
        Self {
            clock,
            interval,
            on_emit,
            last_forward: None,
            pending: None,
            forwarded: 0,
            suppressed: 0,
        }
    }

    /// Accepts a new event.
    ///
    /// If the gate is open the event is forwarded immediately and the gate
    /// closes for one interval. Otherwise the event replaces the trailing
    /// slot. A trailing event that came due during the preceding silence
    /// is forwarded first.
    pub fn feed(&mut self, value: T) {
        let now = self.clock.now();
        self.flush_due(now);
        if self.gate_open(now) {
            self.forward(value, now);
        } else {
            self.pending = Some(value);
            self.suppressed += 1;
        }
    }

    /// Forwards the trailing event if the interval has elapsed.
    ///
    /// Returns true if an event was forwarded.
    pub fn poll_emit(&mut self) -> bool {
        let now = self.clock.now();
        self.flush_due(now)
    }

    /// Returns the instant the trailing event becomes due, if one is held.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Time> {
        match (&self.pending, self.last_forward) {
            (Some(_), Some(last)) => Some(last.saturating_add_duration(self.interval)),
            (Some(_), None) => Some(Time::ZERO),
            (None, _) => None,
        }
    }

    /// Discards the trailing event and re-opens the gate.
    ///
    /// The next feed behaves like a fresh first event.
    pub fn cancel(&mut self) -> Option<T> {
        self.last_forward = None;
        self.pending.take()
    }

    /// Returns true if an event is parked in the trailing slot.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the event parked in the trailing slot, if any.
    #[must_use]
    pub const fn pending_value(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    /// Returns true if the next feed would forward immediately.
    #[must_use]
    pub fn is_gate_open(&self) -> bool {
        self.gate_open(self.clock.now())
    }

    /// Returns the configured interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the number of events forwarded.
    #[must_use]
    pub const fn forwarded(&self) -> u64 {
        self.forwarded
    }

    /// Returns the number of events parked instead of forwarded.
    #[must_use]
    pub const fn suppressed(&self) -> u64 {
        self.suppressed
    }

    fn gate_open(&self, now: Time) -> bool {
        self.last_forward
            .is_none_or(|last| now >= last.saturating_add_duration(self.interval))
    }

    fn forward(&mut self, value: T, now: Time) {
        (self.on_emit)(value);
        self.last_forward = Some(now);
        self.forwarded += 1;
    }

    fn flush_due(&mut self, now: Time) -> bool {
        if !self.gate_open(now) {
            return false;
        }
        let Some(value) = self.pending.take() else {
            return false;
        };
        self.forward(value, now);
        true
    }
}

impl<T, F, C> fmt::Debug for Throttler<T, F, C>
where
    T: fmt::Debug,
    F: FnMut(T),
    C: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttler")
            .field("interval", &self.interval)
            .field("last_forward", &self.last_forward)
            .field("pending", &self.pending)
            .field("forwarded", &self.forwarded)
            .field("suppressed", &self.suppressed)
            .finish_non_exhaustive()
    }
}

/// Creates a [`Throttler`] over the given clock.
pub fn throttle<T, F, C>(clock: Arc<C>, interval: Duration, on_emit: F) -> Throttler<T, F, C>
where
    F: FnMut(T),
    C: TimeSource,
{
    Throttler::new(clock, interval, on_emit)
}
