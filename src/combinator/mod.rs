//! Control-flow combinators for timed operations.
//!
//! This module provides the core combinators:
//!
//! - [`retry`]: Re-invoke a fallible operation on a backoff schedule
//! - [`timeout`]: Race an operation against a deadline, operation wins ties
//! - [`debounce`]: Deliver the last of a burst after a quiet period
//! - [`throttle`]: Forward at most one event per interval, trailing edge kept

pub mod debounce;
pub mod retry;
pub mod throttle;
pub mod timeout;

pub use debounce::{debounce, DebounceWindow, Debouncer};
pub use retry::{
    calculate_deadline as retry_deadline, calculate_delay, retry, retry_with_policy,
    total_delay_budget, AlwaysRetry, NeverRetry, Retry, RetryError, RetryIf, RetryPolicy,
    RetryPredicate, RetryState,
};
pub use throttle::{throttle, Throttler};
pub use timeout::{
    effective_deadline, make_timed_result, timeout, timeout_at, TimedError, Timeout, TimeoutError,
};
