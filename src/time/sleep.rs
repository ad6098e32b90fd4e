//! Sleep future for delaying execution.
//!
//! The [`Sleep`] future completes after a deadline has passed.
//! It works with both wall clock time (production) and virtual time (tests).

use crate::types::Time;
use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// A future that completes after a specified deadline.
///
/// `Sleep` is the core primitive for time-based delays. It can be awaited
/// to pause execution until the deadline has passed.
///
/// # Time Sources
///
/// `Sleep` checks time at each poll. Drive it either through
/// [`poll_with_time`](Self::poll_with_time) with an explicit `now`, or give
/// it a time getter so the plain `Future` impl can read the clock itself.
/// Without a time getter the `Future` impl treats time as frozen at zero,
/// so a sleep with a nonzero deadline stays pending until one is supplied.
///
/// # Cancel Safety
///
/// `Sleep` is cancel-safe. Dropping it simply stops the wait with no
/// side effects. It can be recreated with the same or a different deadline.
///
/// # Example
///
/// ```
/// use tempo::time::Sleep;
/// use tempo::types::Time;
/// use std::time::Duration;
///
/// let sleep = Sleep::after(Time::from_secs(10), Duration::from_millis(100));
/// assert!(sleep.poll_with_time(Time::from_secs(10)).is_pending());
/// assert!(sleep.poll_with_time(Time::from_secs(11)).is_ready());
/// ```
#[derive(Debug)]
pub struct Sleep {
    /// The deadline when this sleep completes.
    deadline: Time,
    /// Optional time getter for standalone use.
    pub(crate) time_getter: Option<fn() -> Time>,
    /// Whether this sleep has been polled at least once.
    /// Used for tracing/debugging.
    polled: Cell<bool>,
}

impl Sleep {
    /// Creates a new `Sleep` that completes at the given deadline.
    ///
    /// # Example
    ///
    /// ```
    /// use tempo::time::Sleep;
    /// use tempo::types::Time;
    ///
    /// let sleep = Sleep::new(Time::from_secs(5));
    /// assert_eq!(sleep.deadline(), Time::from_secs(5));
    /// ```
    #[must_use]
    pub const fn new(deadline: Time) -> Self {
        Self {
            deadline,
            time_getter: None,
            polled: Cell::new(false),
        }
    }

    /// Creates a `Sleep` that completes after the given duration from `now`.
    ///
    /// # Example
    ///
    /// ```
    /// use tempo::time::Sleep;
    /// use tempo::types::Time;
    /// use std::time::Duration;
    ///
    /// let now = Time::from_secs(10);
    /// let sleep = Sleep::after(now, Duration::from_secs(5));
    /// assert_eq!(sleep.deadline(), Time::from_secs(15));
    /// ```
    #[must_use]
    pub const fn after(now: Time, duration: Duration) -> Self {
        Self::new(now.saturating_add_duration(duration))
    }

    /// Creates a `Sleep` with a custom time getter function.
    ///
    /// This is useful for testing or when you need to control the time source.
    #[must_use]
    pub const fn with_time_getter(deadline: Time, time_getter: fn() -> Time) -> Self {
        Self {
            deadline,
            time_getter: Some(time_getter),
            polled: Cell::new(false),
        }
    }

    /// Returns the deadline for this sleep.
    #[must_use]
    pub const fn deadline(&self) -> Time {
        self.deadline
    }

    /// Returns the remaining duration until the deadline.
    ///
    /// Returns `Duration::ZERO` if the deadline has passed.
    #[must_use]
    pub fn remaining(&self, now: Time) -> Duration {
        if now >= self.deadline {
            Duration::ZERO
        } else {
            let nanos = self.deadline.as_nanos().saturating_sub(now.as_nanos());
            Duration::from_nanos(nanos)
        }
    }

    /// Checks if the deadline has elapsed.
    #[must_use]
    pub fn is_elapsed(&self, now: Time) -> bool {
        now >= self.deadline
    }

    /// Resets this sleep to a new deadline.
    ///
    /// This can be used to reuse a `Sleep` instance without allocating a new one.
    pub fn reset(&mut self, deadline: Time) {
        self.deadline = deadline;
        self.polled.set(false);
    }

    /// Resets this sleep to complete after the given duration from `now`.
    pub fn reset_after(&mut self, now: Time, duration: Duration) {
        self.deadline = now.saturating_add_duration(duration);
        self.polled.set(false);
    }

    /// Returns true if this sleep has been polled at least once.
    #[must_use]
    pub fn was_polled(&self) -> bool {
        self.polled.get()
    }

    /// Gets the current time using the configured time getter.
    ///
    /// Without a time getter, time is frozen at zero: the sleep stays
    /// pending until a real time source drives it.
    fn current_time(&self) -> Time {
        self.time_getter.map_or(Time::ZERO, |getter| getter())
    }

    /// Polls this sleep with an explicit time value.
    ///
    /// This is useful when you want to control the time source manually
    /// rather than using the built-in time getter.
    ///
    /// Returns `Poll::Ready(())` if the deadline has passed.
    pub fn poll_with_time(&self, now: Time) -> Poll<()> {
        self.polled.set(true);
        if now >= self.deadline {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        let now = self.current_time();
        self.poll_with_time(now)
    }
}

impl Clone for Sleep {
    fn clone(&self) -> Self {
        Self {
            deadline: self.deadline,
            time_getter: self.time_getter,
            polled: Cell::new(false), // Fresh clone hasn't been polled
        }
    }
}

/// Creates a `Sleep` future that completes after the given duration.
///
/// This function requires a current time to compute the deadline.
/// For use without explicit time, see [`sleep_until`].
///
/// # Example
///
/// ```
/// use tempo::time::sleep;
/// use tempo::types::Time;
/// use std::time::Duration;
///
/// let now = Time::from_secs(10);
/// let sleep_future = sleep(now, Duration::from_millis(100));
/// assert_eq!(sleep_future.deadline(), Time::from_nanos(10_100_000_000));
/// ```
#[must_use]
pub const fn sleep(now: Time, duration: Duration) -> Sleep {
    Sleep::after(now, duration)
}

/// Creates a `Sleep` future that completes at the given deadline.
///
/// # Example
///
/// ```
/// use tempo::time::sleep_until;
/// use tempo::types::Time;
///
/// let sleep_future = sleep_until(Time::from_secs(5));
/// assert_eq!(sleep_future.deadline(), Time::from_secs(5));
/// ```
#[must_use]
pub const fn sleep_until(deadline: Time) -> Sleep {
    Sleep::new(deadline)
}
