//! Timeout wrapper for futures.
//!
//! [`Timeout`] races a wrapped operation against a deadline and settles
//! exactly once, with the winner's result. The loser is discarded: a timed
//! out operation is dropped and can never deliver late, and a deadline that
//! loses never fires.
//!
//! # Tie-break
//!
//! When the operation completes on the same poll that the deadline expires,
//! the operation wins. Work that finished at the buzzer is real work; its
//! result is returned and no timeout is reported.

use crate::time::Sleep;
use crate::types::Time;
use core::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// Error returned when a timeout elapses before the operation completes.
///
/// Carries the deadline that was exceeded, and the originally requested
/// duration when the timeout was built from one.
///
/// # Example
///
/// ```
/// use tempo::combinator::TimeoutError;
/// use tempo::types::Time;
/// use std::time::Duration;
///
/// let err = TimeoutError::after(Duration::from_millis(250), Time::from_secs(1));
/// assert_eq!(err.duration(), Some(Duration::from_millis(250)));
/// assert_eq!(err.deadline(), Time::from_secs(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutError {
    /// The deadline that was exceeded.
    deadline: Time,
    /// The requested duration, when known.
    duration: Option<Duration>,
}

impl TimeoutError {
    /// Creates an error for a timeout requested as a duration.
    #[must_use]
    pub const fn after(duration: Duration, deadline: Time) -> Self {
        Self {
            deadline,
            duration: Some(duration),
        }
    }

    /// Creates an error for a timeout requested as an absolute deadline.
    #[must_use]
    pub const fn at(deadline: Time) -> Self {
        Self {
            deadline,
            duration: None,
        }
    }

    /// Returns the deadline that was exceeded.
    #[must_use]
    pub const fn deadline(&self) -> Time {
        self.deadline
    }

    /// Returns the requested duration, if the timeout was built from one.
    #[must_use]
    pub const fn duration(&self) -> Option<Duration> {
        self.duration
    }
}

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.duration {
            Some(duration) => write!(f, "operation timed out after {duration:?}"),
            None => write!(f, "deadline has elapsed at {:?}", self.deadline),
        }
    }
}

impl std::error::Error for TimeoutError {}

/// Failure of a timed fallible operation: its own error, or the timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimedError<E> {
    /// The operation itself failed before the deadline.
    Error(E),
    /// The deadline elapsed first.
    TimedOut(TimeoutError),
}

impl<E> TimedError<E> {
    /// Returns true if the failure was the timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }
}

impl<E: fmt::Display> fmt::Display for TimedError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(error) => write!(f, "{error}"),
            Self::TimedOut(timeout) => write!(f, "{timeout}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for TimedError<E> {}

/// Flattens the result of timing out a fallible operation.
///
/// `Timeout` over a future returning `Result<T, E>` resolves to a nested
/// `Result<Result<T, E>, TimeoutError>`; this folds both failure paths
/// into [`TimedError`].
pub fn make_timed_result<T, E>(
    result: Result<Result<T, E>, TimeoutError>,
) -> Result<T, TimedError<E>> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(TimedError::Error(error)),
        Err(timeout) => Err(TimedError::TimedOut(timeout)),
    }
}

/// Composes a requested deadline with an inherited one.
///
/// Nested timeouts only tighten: the effective deadline is the earlier of
/// the two, so an outer timeout is never loosened by an inner one.
#[must_use]
pub fn effective_deadline(requested: Time, inherited: Option<Time>) -> Time {
    match inherited {
        Some(existing) => existing.min(requested),
        None => requested,
    }
}

/// A future that races another future against a deadline.
///
/// If the inner future completes first (ties included), `Timeout` resolves
/// to `Ok(output)`. If the deadline passes first, it resolves to
/// `Err(TimeoutError)` and the inner future is dropped on the spot.
///
/// # Type Parameters
///
/// * `F` - The inner future type. Must implement `Unpin`.
///
/// # Cancel Safety
///
/// Dropping a `Timeout` drops the inner future with it; side effects the
/// inner future applied during earlier polls remain applied.
///
/// # Example
///
/// ```
/// use tempo::combinator::timeout;
/// use tempo::types::Time;
/// use std::future::pending;
/// use std::time::Duration;
/// use std::sync::Arc;
/// use std::task::{Context, Wake};
/// # struct NoopWaker;
/// # impl Wake for NoopWaker { fn wake(self: Arc<Self>) {} }
///
/// let mut guarded = timeout(Time::ZERO, Duration::from_secs(5), pending::<u32>());
/// let waker = Arc::new(NoopWaker).into();
/// let mut cx = Context::from_waker(&waker);
///
/// assert!(guarded.poll_with_time(Time::from_secs(4), &mut cx).is_pending());
/// let result = guarded.poll_with_time(Time::from_secs(5), &mut cx);
/// assert!(matches!(result, std::task::Poll::Ready(Err(_))));
/// ```
#[must_use = "futures do nothing unless polled"]
#[derive(Debug)]
pub struct Timeout<F> {
    /// The wrapped operation. Taken when the race settles.
    future: Option<F>,
    /// Deadline tracking; also carries the time getter for the `Future` impl.
    sleep: Sleep,
    /// The requested duration, when built via [`timeout`].
    duration: Option<Duration>,
}

impl<F> Timeout<F> {
    /// Creates a timeout that expires at the given deadline.
    ///
    /// # Example
    ///
    /// ```
    /// use tempo::combinator::Timeout;
    /// use tempo::types::Time;
    /// use std::future::ready;
    ///
    /// let timeout = Timeout::new(ready(42), Time::from_secs(5));
    /// assert_eq!(timeout.deadline(), Time::from_secs(5));
    /// ```
    #[must_use]
    pub const fn new(future: F, deadline: Time) -> Self {
        Self {
            future: Some(future),
            sleep: Sleep::new(deadline),
            duration: None,
        }
    }

    /// Creates a timeout that expires after the given duration from `now`.
    #[must_use]
    pub const fn after(now: Time, duration: Duration, future: F) -> Self {
        Self {
            future: Some(future),
            sleep: Sleep::after(now, duration),
            duration: Some(duration),
        }
    }

    /// Supplies a time getter so the plain `Future` impl can read the clock.
    #[must_use]
    pub fn with_time_getter(mut self, time_getter: fn() -> Time) -> Self {
        self.sleep.time_getter = Some(time_getter);
        self
    }

    /// Returns the timeout deadline.
    #[must_use]
    pub const fn deadline(&self) -> Time {
        self.sleep.deadline()
    }

    /// Returns the remaining time until the deadline.
    ///
    /// Returns `Duration::ZERO` if the deadline has passed.
    #[must_use]
    pub fn remaining(&self, now: Time) -> Duration {
        self.sleep.remaining(now)
    }

    /// Returns true if the deadline has passed.
    #[must_use]
    pub fn is_elapsed(&self, now: Time) -> bool {
        self.sleep.is_elapsed(now)
    }

    /// Returns true once the race has settled (either side won).
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.future.is_none()
    }

    /// Returns a reference to the inner future, if the race has not settled.
    #[must_use]
    pub const fn inner(&self) -> Option<&F> {
        self.future.as_ref()
    }

    /// Returns a mutable reference to the inner future, if the race has not
    /// settled.
    pub fn inner_mut(&mut self) -> Option<&mut F> {
        self.future.as_mut()
    }

    /// Consumes the timeout, returning the inner future if the race has not
    /// settled.
    #[must_use]
    pub fn into_inner(self) -> Option<F> {
        self.future
    }

    /// Resets the deadline.
    ///
    /// A settled timeout stays settled; resetting only moves the deadline
    /// of a race still in flight.
    pub fn reset(&mut self, deadline: Time) {
        self.sleep.reset(deadline);
        self.duration = None;
    }

    /// Resets the deadline to expire after the given duration from `now`.
    pub fn reset_after(&mut self, now: Time, duration: Duration) {
        self.sleep.reset_after(now, duration);
        self.duration = Some(duration);
    }

    fn timeout_error(&self) -> TimeoutError {
        match self.duration {
            Some(duration) => TimeoutError::after(duration, self.sleep.deadline()),
            None => TimeoutError::at(self.sleep.deadline()),
        }
    }
}

impl<F: Future + Unpin> Timeout<F> {
    /// Polls the race with an explicit time value.
    ///
    /// The operation is polled first: if both it and the deadline are ready
    /// on the same call, the operation's result wins and no timeout is
    /// reported. On timeout the inner future is dropped before returning.
    ///
    /// # Panics
    ///
    /// Panics if called again after the race has settled.
    pub fn poll_with_time(
        &mut self,
        now: Time,
        cx: &mut Context<'_>,
    ) -> Poll<Result<F::Output, TimeoutError>> {
        let Some(future) = self.future.as_mut() else {
            panic!("Timeout polled after completion");
        };

        if let Poll::Ready(output) = Pin::new(future).poll(cx) {
            self.future = None;
            return Poll::Ready(Ok(output));
        }

        if self.sleep.poll_with_time(now).is_ready() {
            // The losing operation is dropped; it can never deliver late.
            self.future = None;
            return Poll::Ready(Err(self.timeout_error()));
        }

        Poll::Pending
    }
}

impl<F: Future + Unpin> Future for Timeout<F> {
    type Output = Result<F::Output, TimeoutError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(future) = self.future.as_mut() else {
            panic!("Timeout polled after completion");
        };

        if let Poll::Ready(output) = Pin::new(future).poll(cx) {
            self.future = None;
            return Poll::Ready(Ok(output));
        }

        if Pin::new(&mut self.sleep).poll(cx).is_ready() {
            self.future = None;
            return Poll::Ready(Err(self.timeout_error()));
        }

        Poll::Pending
    }
}

impl<F: Clone> Clone for Timeout<F> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
            sleep: self.sleep.clone(),
            duration: self.duration,
        }
    }
}

/// Wraps `future` with a timeout expiring `duration` after `now`.
///
/// # Example
///
/// ```
/// use tempo::combinator::timeout;
/// use tempo::types::Time;
/// use std::time::Duration;
/// use std::future::ready;
///
/// let guarded = timeout(Time::ZERO, Duration::from_secs(5), ready(42));
/// assert_eq!(guarded.deadline(), Time::from_secs(5));
/// ```
#[must_use]
pub const fn timeout<F>(now: Time, duration: Duration, future: F) -> Timeout<F> {
    Timeout::after(now, duration, future)
}

/// Wraps `future` with a timeout expiring at the absolute `deadline`.
///
/// # Example
///
/// ```
/// use tempo::combinator::timeout_at;
/// use tempo::types::Time;
/// use std::future::ready;
///
/// let guarded = timeout_at(Time::from_secs(10), ready(42));
/// assert_eq!(guarded.deadline(), Time::from_secs(10));
/// ```
#[must_use]
pub const fn timeout_at<F>(deadline: Time, future: F) -> Timeout<F> {
    Timeout::new(future, deadline)
}
