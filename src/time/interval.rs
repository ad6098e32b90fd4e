//! Periodic tick source.
//!
//! [`Interval`] yields a tick every `period`, driven by explicit-time polls
//! like the rest of the time module. What happens when the caller falls
//! behind schedule is governed by [`MissedTickBehavior`].

use crate::types::Time;
use std::task::Poll;
use std::time::Duration;

/// Policy for how an [`Interval`] catches up after missed ticks.
///
/// A tick is "missed" when `poll_tick` is called late enough that more than
/// one whole period has elapsed since the previous scheduled tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissedTickBehavior {
    /// Fire all missed ticks back-to-back until caught up.
    ///
    /// Tick times stay aligned to the original schedule.
    #[default]
    Burst,
    /// Forget the schedule; the next tick fires one full period after the
    /// late poll.
    Delay,
    /// Skip missed ticks; the next tick fires at the next scheduled point
    /// in the future, keeping alignment.
    Skip,
}

/// A tick source that fires every `period`.
///
/// Polling is explicit-time: the caller supplies `now` and receives the
/// scheduled time of the tick that fired. The first tick is due at the
/// start time passed to [`interval`] or [`interval_at`].
///
/// # Example
///
/// ```
/// use tempo::time::{interval, MissedTickBehavior};
/// use tempo::types::Time;
/// use std::time::Duration;
///
/// let mut ticker = interval(Time::ZERO, Duration::from_secs(1));
/// assert!(ticker.poll_tick(Time::ZERO).is_ready());
/// assert!(ticker.poll_tick(Time::from_millis(500)).is_pending());
/// assert!(ticker.poll_tick(Time::from_secs(1)).is_ready());
/// ```
#[derive(Debug, Clone)]
pub struct Interval {
    /// Tick spacing.
    period: Duration,
    /// When the next tick is due.
    next_deadline: Time,
    /// Catch-up policy for late polls.
    missed_tick_behavior: MissedTickBehavior,
}

impl Interval {
    /// Returns the tick spacing.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Returns the time at which the next tick is due.
    #[must_use]
    pub const fn next_deadline(&self) -> Time {
        self.next_deadline
    }

    /// Returns the configured missed-tick policy.
    #[must_use]
    pub const fn missed_tick_behavior(&self) -> MissedTickBehavior {
        self.missed_tick_behavior
    }

    /// Sets the missed-tick policy.
    pub fn set_missed_tick_behavior(&mut self, behavior: MissedTickBehavior) {
        self.missed_tick_behavior = behavior;
    }

    /// Polls for a tick.
    ///
    /// If the next tick is due at or before `now`, returns the scheduled
    /// time of that tick and advances the schedule according to the
    /// missed-tick policy. Otherwise returns `Poll::Pending`.
    pub fn poll_tick(&mut self, now: Time) -> Poll<Time> {
        let scheduled = self.next_deadline;
        if now < scheduled {
            return Poll::Pending;
        }

        self.next_deadline = match self.missed_tick_behavior {
            MissedTickBehavior::Burst => scheduled.saturating_add_duration(self.period),
            MissedTickBehavior::Delay => now.saturating_add_duration(self.period),
            MissedTickBehavior::Skip => {
                let period_nanos = duration_to_nanos(self.period);
                let elapsed = now.as_nanos().saturating_sub(scheduled.as_nanos());
                let periods = (elapsed / period_nanos).saturating_add(1);
                scheduled.saturating_add_nanos(periods.saturating_mul(period_nanos))
            }
        };

        Poll::Ready(scheduled)
    }

    /// Resets the schedule so the next tick is due one period from `now`.
    pub fn reset(&mut self, now: Time) {
        self.next_deadline = now.saturating_add_duration(self.period);
    }

    /// Resets the schedule so the next tick is due at `deadline`.
    pub fn reset_at(&mut self, deadline: Time) {
        self.next_deadline = deadline;
    }
}

/// Clamps a duration into u64 nanoseconds.
#[allow(clippy::cast_possible_truncation)]
const fn duration_to_nanos(duration: Duration) -> u64 {
    if duration.as_nanos() > u64::MAX as u128 {
        u64::MAX
    } else {
        duration.as_nanos() as u64
    }
}

/// Creates an [`Interval`] whose first tick is due immediately at `now`.
///
/// # Panics
///
/// Panics if `period` is zero.
#[must_use]
pub fn interval(now: Time, period: Duration) -> Interval {
    interval_at(now, period)
}

/// Creates an [`Interval`] whose first tick is due at `start`.
///
/// # Panics
///
/// Panics if `period` is zero.
#[must_use]
pub fn interval_at(start: Time, period: Duration) -> Interval {
    assert!(!period.is_zero(), "interval period must be non-zero");
    Interval {
        period,
        next_deadline: start,
        missed_tick_behavior: MissedTickBehavior::default(),
    }
}
