//! Tempo: deterministic async control-flow utilities over injectable time.
//!
//! # Overview
//!
//! Tempo wraps fallible or slow async operations in timing policies without
//! owning an event loop. Time is a capability handed in from outside, so
//! every behavior is reproducible under test: a retry schedule, a timeout
//! race, or a debounce window runs identically against a virtual clock and
//! a wall clock.
//!
//! # Core Guarantees
//!
//! - **Exact attempt accounting**: a retry budget of n means exactly n
//!   invocations against a persistently failing operation, the first one
//!   immediate
//! - **Settle-once timeouts**: a timed-out operation is dropped and can
//!   never deliver late; an operation that finishes on the deadline wins
//!   the tie
//! - **No lost edges**: a debounced burst always yields its final value,
//!   and a throttled burst never drops its last event
//! - **Cancellation is total**: cancelling any scheduled timer guarantees
//!   its callback will not fire
//! - **No hidden effects**: the utilities never log and hold no resources
//!   beyond their own timer state
//!
//! # Module Structure
//!
//! - [`types`]: Core value types (the nanosecond [`Time`](types::Time) stamp)
//! - [`time`]: Clocks, the timer driver, sleeps, and intervals
//! - [`combinator`]: Retry, timeout, debounce, and throttle
//! - [`stream`]: Lazy-sequence adapters over the same behaviors
//! - [`util`]: Internal utilities (deterministic RNG)
//! - [`test_utils`]: Shared logging and fixtures for the test suites

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_inception)]
#![allow(clippy::doc_markdown)]

pub mod combinator;
pub mod stream;
pub mod test_utils;
pub mod time;
pub mod types;
pub mod util;

// Re-exports for convenient access to core types
pub use combinator::{
    debounce, retry, retry_with_policy, throttle, timeout, timeout_at, Debouncer, Retry,
    RetryError, RetryPolicy, Throttler, TimedError, Timeout, TimeoutError,
};
pub use time::{TimeSource, TimerDriver, VirtualClock, WallClock};
pub use types::Time;
