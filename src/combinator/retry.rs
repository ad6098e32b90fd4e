//! Retry combinator with configurable backoff.
//!
//! The retry combinator wraps a fallible operation with retry logic:
//! fixed intervals by default, exponential backoff and deterministic
//! jitter when configured through [`RetryPolicy`].
//!
//! # Semantics
//!
//! - The first attempt starts immediately; only the waits between attempts
//!   are spaced by the policy's delays.
//! - `max_attempts` counts every invocation of the operation, including the
//!   first one. A policy asking for zero attempts is clamped to one.
//! - The operation runs to completion once started; retries happen only
//!   after a failed attempt resolves.
//! - On exhaustion the error from the final attempt is returned, wrapped in
//!   [`RetryError`] together with the attempt count and accumulated delay.
//!
//! # Determinism
//!
//! Jitter is drawn from a seedable [`DetRng`]: the same seed produces the
//! same delay schedule on every run.

use crate::time::Sleep;
use crate::types::Time;
use crate::util::det_rng::DetRng;
use core::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// Policy for retry behavior.
///
/// Configures how retries are performed, including backoff strategy,
/// jitter, and limits.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first attempt).
    /// Must be at least 1.
    pub max_attempts: u32,
    /// Initial delay before the first retry (after first failure).
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth).
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (typically 2.0).
    pub multiplier: f64,
    /// Jitter factor [0.0, 1.0] - random factor added to delay.
    /// A value of 0.1 means up to 10% jitter is added.
    pub jitter: f64,
}

impl RetryPolicy {
    /// Creates a new retry policy with default settings.
    ///
    /// Defaults:
    /// - 3 attempts
    /// - 100ms initial delay
    /// - 30s max delay
    /// - 2.0 multiplier
    /// - 0.1 jitter (10%)
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }

    /// Creates a policy with the specified number of attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the initial delay for the first retry.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay cap.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    /// Sets the jitter factor (0.0 to 1.0).
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Creates a policy with no jitter (fully deterministic delays).
    #[must_use]
    pub fn no_jitter(mut self) -> Self {
        self.jitter = 0.0;
        self
    }

    /// Creates a policy with fixed delays (no exponential backoff).
    #[must_use]
    pub fn fixed_delay(delay: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: delay,
            max_delay: delay,
            multiplier: 1.0,
            jitter: 0.0,
        }
    }

    /// Creates a policy for immediate retries (no delay).
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
            jitter: 0.0,
        }
    }

    /// Validates the policy, returning Ok if valid or an error message.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1");
        }
        if self.multiplier < 1.0 {
            return Err("multiplier must be at least 1.0");
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err("jitter must be between 0.0 and 1.0");
        }
        Ok(())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculates the delay for a given attempt number.
///
/// The delay follows exponential backoff with optional jitter:
/// ```text
/// base_delay = initial_delay * multiplier^(attempt - 1)
/// capped_delay = min(base_delay, max_delay)
/// final_delay = capped_delay * (1 + jitter_factor)
/// ```
///
/// # Arguments
/// * `policy` - The retry policy
/// * `attempt` - The attempt number (1-indexed, so attempt 1 = first retry)
/// * `rng` - Deterministic RNG for jitter (optional)
///
/// # Returns
/// The delay duration for this attempt.
#[must_use]
#[allow(
    clippy::cast_possible_wrap,  // exponent is bounded by practical max_attempts values
    clippy::cast_precision_loss, // acceptable for duration calculations in millisecond-second range
    clippy::cast_sign_loss,      // final_nanos is always positive after min() capping
)]
pub fn calculate_delay(policy: &RetryPolicy, attempt: u32, rng: Option<&mut DetRng>) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    // Calculate base delay with exponential backoff
    let exponent = attempt.saturating_sub(1);
    let multiplier_factor = policy.multiplier.powi(exponent as i32);
    let base_nanos = policy.initial_delay.as_nanos() as f64 * multiplier_factor;

    // Cap at max_delay
    let max_nanos = policy.max_delay.as_nanos() as f64;
    let capped_nanos = base_nanos.min(max_nanos);

    // Apply jitter if enabled and RNG provided
    let final_nanos = if policy.jitter > 0.0 {
        rng.map_or(capped_nanos, |rng| {
            // Deterministic jitter factor in [0, jitter)
            let jitter_factor = rng.next_f64() * policy.jitter;
            capped_nanos * (1.0 + jitter_factor)
        })
    } else {
        capped_nanos
    };

    Duration::from_nanos(final_nanos as u64)
}

/// Calculates the delay and returns the deadline.
///
/// Convenience function that adds the delay to the current time.
#[must_use]
pub fn calculate_deadline(
    policy: &RetryPolicy,
    attempt: u32,
    now: Time,
    rng: Option<&mut DetRng>,
) -> Time {
    let delay = calculate_delay(policy, attempt, rng);
    now.saturating_add_duration(delay)
}

/// Calculates the total worst-case delay across all retries.
///
/// This is the sum of all delays across `max_attempts - 1` retries.
/// Note: The first attempt has no delay before it.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn total_delay_budget(policy: &RetryPolicy) -> Duration {
    let mut total = Duration::ZERO;
    for attempt in 1..policy.max_attempts {
        // Use None for RNG to get base delays (upper bound without jitter)
        let delay = calculate_delay(policy, attempt, None);
        // With jitter, actual delay could be up to (1 + jitter) * base
        let max_delay_nanos = (delay.as_nanos() as f64 * (1.0 + policy.jitter)) as u64;
        total += Duration::from_nanos(max_delay_nanos);
    }
    total
}

/// Error type for exhausted retry operations.
///
/// Contains the error from the final attempt, plus metadata about the
/// retry history. Earlier errors are discarded; only the last one is kept.
#[derive(Debug, Clone)]
pub struct RetryError<E> {
    /// The error from the final attempt.
    pub final_error: E,
    /// Number of attempts made.
    pub attempts: u32,
    /// Total time spent waiting between attempts (not including operation time).
    pub total_delay: Duration,
}

impl<E> RetryError<E> {
    /// Creates a new retry error.
    #[must_use]
    pub const fn new(final_error: E, attempts: u32, total_delay: Duration) -> Self {
        Self {
            final_error,
            attempts,
            total_delay,
        }
    }

    /// Consumes the error, returning the final attempt's error.
    pub fn into_inner(self) -> E {
        self.final_error
    }

    /// Maps the error type.
    pub fn map<F, G: FnOnce(E) -> F>(self, f: G) -> RetryError<F> {
        RetryError {
            final_error: f(self.final_error),
            attempts: self.attempts,
            total_delay: self.total_delay,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "retry failed after {} attempts ({:?} total delay): {}",
            self.attempts, self.total_delay, self.final_error
        )
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryError<E> {}

/// Tracks the state of a retry operation in progress.
#[derive(Debug, Clone)]
pub struct RetryState {
    /// Current attempt number (1-indexed).
    pub attempt: u32,
    /// Total delay accumulated so far.
    pub total_delay: Duration,
    /// The policy being used.
    policy: RetryPolicy,
}

impl RetryState {
    /// Creates a new retry state with the given policy.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            attempt: 0,
            total_delay: Duration::ZERO,
            policy,
        }
    }

    /// Returns true if more attempts are available.
    #[must_use]
    pub fn has_attempts_remaining(&self) -> bool {
        self.attempt < self.policy.max_attempts
    }

    /// Returns the number of attempts remaining.
    #[must_use]
    pub fn attempts_remaining(&self) -> u32 {
        self.policy.max_attempts.saturating_sub(self.attempt)
    }

    /// Advances to the next attempt and returns the delay to wait.
    ///
    /// Returns `None` if no more attempts are available. The first attempt
    /// always has a zero delay.
    pub fn next_attempt(&mut self, rng: Option<&mut DetRng>) -> Option<Duration> {
        if !self.has_attempts_remaining() {
            return None;
        }

        self.attempt += 1;

        // First attempt has no delay
        if self.attempt == 1 {
            return Some(Duration::ZERO);
        }

        // Calculate delay for retry
        let delay = calculate_delay(&self.policy, self.attempt - 1, rng);
        self.total_delay += delay;
        Some(delay)
    }

    /// Creates a `RetryError` from the current state and final error.
    #[must_use]
    pub fn into_error<E>(self, final_error: E) -> RetryError<E> {
        RetryError::new(final_error, self.attempt, self.total_delay)
    }

    /// Returns the policy being used.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

/// Determines if an error should be retried based on a predicate.
///
/// This allows selective retry based on error type (e.g., only retry
/// transient errors, not permanent failures).
pub trait RetryPredicate<E> {
    /// Returns true if the error should trigger a retry.
    fn should_retry(&self, error: &E, attempt: u32) -> bool;
}

/// Always retry on any error.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E> RetryPredicate<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E, _attempt: u32) -> bool {
        true
    }
}

/// Never retry (effectively max_attempts = 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRetry;

impl<E> RetryPredicate<E> for NeverRetry {
    fn should_retry(&self, _error: &E, _attempt: u32) -> bool {
        false
    }
}

/// Retry based on a closure.
#[derive(Debug, Clone, Copy)]
pub struct RetryIf<F>(pub F);

impl<E, F: Fn(&E, u32) -> bool> RetryPredicate<E> for RetryIf<F> {
    fn should_retry(&self, error: &E, attempt: u32) -> bool {
        (self.0)(error, attempt)
    }
}

#[derive(Debug)]
enum RetryPhase<Fut> {
    /// Next poll starts the first attempt.
    Idle,
    /// An attempt is in flight.
    Running(Fut),
    /// Waiting out the delay before the next attempt.
    Sleeping(Sleep),
    /// Terminal state after a value or error was returned.
    Finished,
}

impl<Fut> RetryPhase<Fut> {
    const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running(_) => "running",
            Self::Sleeping(_) => "sleeping",
            Self::Finished => "finished",
        }
    }
}

/// Future that drives an operation through retries.
///
/// Created by [`retry`] or [`retry_with_policy`]. Each attempt is produced
/// fresh by the operation closure; a failed attempt schedules a [`Sleep`]
/// for the policy's delay before the next one. Dropping the future between
/// polls abandons the retry loop without starting another attempt.
///
/// # Example
///
/// ```
/// use tempo::combinator::retry;
/// use tempo::types::Time;
/// use std::future::ready;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::task::{Context, Poll};
/// # use std::sync::Arc;
/// # use std::task::Wake;
/// # struct NoopWaker;
/// # impl Wake for NoopWaker { fn wake(self: Arc<Self>) {} }
///
/// let calls = AtomicU32::new(0);
/// let mut op = retry(
///     || {
///         let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
///         ready(if n < 3 { Err("transient") } else { Ok(n) })
///     },
///     5,
///     std::time::Duration::from_millis(100),
/// );
///
/// let waker = Arc::new(NoopWaker).into();
/// let mut cx = Context::from_waker(&waker);
///
/// // First attempt fails at t=0; retries run as their delays elapse.
/// assert!(op.poll_with_time(Time::ZERO, &mut cx).is_pending());
/// assert!(op.poll_with_time(Time::from_millis(100), &mut cx).is_pending());
/// let done = op.poll_with_time(Time::from_millis(200), &mut cx);
/// assert!(matches!(done, Poll::Ready(Ok(3))));
/// ```
#[must_use = "futures do nothing unless polled"]
pub struct Retry<F, Fut, P = AlwaysRetry> {
    /// Produces a fresh future per attempt.
    operation: F,
    /// Attempt bookkeeping.
    state: RetryState,
    /// Jitter source; None means base delays.
    rng: Option<DetRng>,
    /// Decides whether an error is worth retrying.
    predicate: P,
    /// Time source for the plain `Future` impl.
    time_getter: Option<fn() -> Time>,
    phase: RetryPhase<Fut>,
}

impl<F, Fut> Retry<F, Fut, AlwaysRetry> {
    /// Creates a retry future over `operation` with the given policy.
    ///
    /// A policy with `max_attempts` of zero is clamped to one: a zero
    /// attempt budget still invokes the operation once.
    #[must_use]
    pub fn new(operation: F, mut policy: RetryPolicy) -> Self {
        policy.max_attempts = policy.max_attempts.max(1);
        Self {
            operation,
            state: RetryState::new(policy),
            rng: None,
            predicate: AlwaysRetry,
            time_getter: None,
            phase: RetryPhase::Idle,
        }
    }
}

impl<F, Fut, P> Retry<F, Fut, P> {
    /// Replaces the retry predicate.
    #[must_use]
    pub fn with_predicate<Q>(self, predicate: Q) -> Retry<F, Fut, Q> {
        Retry {
            operation: self.operation,
            state: self.state,
            rng: self.rng,
            predicate,
            time_getter: self.time_getter,
            phase: RetryPhase::Idle,
        }
    }

    /// Supplies a deterministic RNG for jitter.
    #[must_use]
    pub fn with_rng(mut self, rng: DetRng) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Supplies a time getter so the plain `Future` impl can read the clock.
    #[must_use]
    pub fn with_time_getter(mut self, time_getter: fn() -> Time) -> Self {
        self.time_getter = Some(time_getter);
        self
    }

    /// Returns the number of attempts started so far.
    #[must_use]
    pub const fn attempts_made(&self) -> u32 {
        self.state.attempt
    }

    /// Returns the retry bookkeeping state.
    #[must_use]
    pub const fn state(&self) -> &RetryState {
        &self.state
    }

    /// Polls the retry loop with an explicit time value.
    ///
    /// Runs attempts and waits as far as `now` allows: a zero-delay policy
    /// can run every attempt within a single call.
    ///
    /// # Panics
    ///
    /// Panics if called again after it has returned `Poll::Ready`.
    pub fn poll_with_time<T, E>(
        &mut self,
        now: Time,
        cx: &mut Context<'_>,
    ) -> Poll<Result<T, RetryError<E>>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>> + Unpin,
        P: RetryPredicate<E>,
    {
        loop {
            match &mut self.phase {
                RetryPhase::Idle => {
                    // max_attempts is clamped to 1 at construction, so the
                    // first attempt always starts.
                    let _ = self.state.next_attempt(self.rng.as_mut());
                    self.phase = RetryPhase::Running((self.operation)());
                }
                RetryPhase::Running(future) => match Pin::new(future).poll(cx) {
                    Poll::Ready(Ok(value)) => {
                        self.phase = RetryPhase::Finished;
                        return Poll::Ready(Ok(value));
                    }
                    Poll::Ready(Err(error)) => {
                        let retryable = self.predicate.should_retry(&error, self.state.attempt);
                        if !retryable || !self.state.has_attempts_remaining() {
                            let attempts = self.state.attempt;
                            let total_delay = self.state.total_delay;
                            self.phase = RetryPhase::Finished;
                            return Poll::Ready(Err(RetryError::new(
                                error,
                                attempts,
                                total_delay,
                            )));
                        }
                        // has_attempts_remaining held, so this is Some
                        let delay = self
                            .state
                            .next_attempt(self.rng.as_mut())
                            .unwrap_or(Duration::ZERO);
                        let deadline = now.saturating_add_duration(delay);
                        let sleep = match self.time_getter {
                            Some(getter) => Sleep::with_time_getter(deadline, getter),
                            None => Sleep::new(deadline),
                        };
                        self.phase = RetryPhase::Sleeping(sleep);
                    }
                    Poll::Pending => return Poll::Pending,
                },
                RetryPhase::Sleeping(sleep) => {
                    if sleep.poll_with_time(now).is_pending() {
                        return Poll::Pending;
                    }
                    self.phase = RetryPhase::Running((self.operation)());
                }
                RetryPhase::Finished => panic!("Retry polled after completion"),
            }
        }
    }
}

impl<F, Fut, P> fmt::Debug for Retry<F, Fut, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("attempt", &self.state.attempt)
            .field("phase", &self.phase.name())
            .finish_non_exhaustive()
    }
}

impl<F, Fut, T, E, P> Future for Retry<F, Fut, P>
where
    F: FnMut() -> Fut + Unpin,
    Fut: Future<Output = Result<T, E>> + Unpin,
    P: RetryPredicate<E> + Unpin,
{
    type Output = Result<T, RetryError<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // Without a time getter, time is frozen at zero: only zero-delay
        // retries make progress.
        let now = self.time_getter.map_or(Time::ZERO, |getter| getter());
        self.poll_with_time(now, cx)
    }
}

/// Retries `operation` up to `max_attempts` times, waiting `interval`
/// between attempts.
///
/// The first attempt runs immediately; `max_attempts` counts it. A
/// `max_attempts` of zero is clamped to one. The interval is constant;
/// use [`retry_with_policy`] for exponential backoff.
pub fn retry<F, Fut>(
    operation: F,
    max_attempts: u32,
    interval: Duration,
) -> Retry<F, Fut, AlwaysRetry>
where
    F: FnMut() -> Fut,
{
    Retry::new(operation, RetryPolicy::fixed_delay(interval, max_attempts))
}

/// Retries `operation` according to `policy`.
pub fn retry_with_policy<F, Fut>(operation: F, policy: RetryPolicy) -> Retry<F, Fut, AlwaysRetry>
where
    F: FnMut() -> Fut,
{
    Retry::new(operation, policy)
}
