//! Time primitives: clocks, timers, sleep, and periodic ticks.
//!
//! This module provides the time substrate the combinators are built on:
//! - [`TimeSource`]: where "now" comes from ([`WallClock`] or [`VirtualClock`])
//! - [`TimerDriver`]: deadline-ordered waker registrations with O(1) cancel
//! - [`Sleep`]: a future that completes after a deadline
//! - [`Interval`]: periodic ticks with configurable catch-up behavior
//!
//! # Virtual vs Wall Time
//!
//! Every primitive here is driven either by an injected [`TimeSource`] or by
//! explicit-time polls (`poll_with_time`, `poll_tick`). Production code uses
//! [`WallClock`]; tests use [`VirtualClock`] and advance it by hand, which
//! makes every timing behavior in this crate reproducible.
//!
//! # Cancel Safety
//!
//! `Sleep` can be dropped and recreated without side effects. Timers
//! registered with the [`TimerDriver`] are cancellable up to the moment they
//! fire; after `cancel` returns true the waker is never called.
//!
//! # Example
//!
//! ```
//! use tempo::time::{Sleep, TimeSource, VirtualClock};
//! use tempo::types::Time;
//! use std::time::Duration;
//!
//! let clock = VirtualClock::new();
//! let sleep = Sleep::after(clock.now(), Duration::from_secs(1));
//!
//! assert!(sleep.poll_with_time(clock.now()).is_pending());
//! clock.advance(1_000_000_000);
//! assert!(sleep.poll_with_time(clock.now()).is_ready());
//! ```

mod clock;
mod driver;
mod interval;
mod sleep;

pub use clock::{TimeSource, VirtualClock, WallClock};
pub use driver::{TimerAtCapacity, TimerDriver, TimerHandle};
pub use interval::{interval, interval_at, Interval, MissedTickBehavior};
pub use sleep::{sleep, sleep_until, Sleep};
