//! Lazy-sequence surface over the timed combinators.
//!
//! This module provides the [`Stream`] trait and the adapters that apply
//! the crate's timing behaviors to asynchronous sequences.
//!
//! # Core Traits
//!
//! - [`Stream`]: The async equivalent of [`Iterator`], producing values over time
//! - [`StreamExt`]: Extension trait providing adapter methods
//!
//! # Adapters
//!
//! - [`Fuse`]: Guarantees `None` is final
//! - [`Debounce`]: Yields the last item of a burst after a quiet period
//! - [`Throttle`]: Spaces items at least one interval apart
//!
//! # Sources and Futures
//!
//! - [`iter`]: Iterator-backed source
//! - [`Next`]: Future for pulling a single item
//!
//! Both timed adapters can be driven two ways: through the plain [`Stream`]
//! impl, which reads the shared clock on every poll, or explicitly through
//! `poll_next_with_time` for tests and hand-written pumps.

mod debounce;
mod fuse;
mod iter;
mod next;
mod stream;
mod throttle;

pub use debounce::Debounce;
pub use fuse::Fuse;
pub use iter::{iter, Iter};
pub use next::Next;
pub use stream::Stream;
pub use throttle::Throttle;

use crate::time::TimeSource;
use std::sync::Arc;
use std::time::Duration;

/// Extension trait providing adapter methods for streams.
///
/// This trait is automatically implemented for all types that implement
/// [`Stream`].
pub trait StreamExt: Stream {
    /// Returns the next item from the stream.
    fn next(&mut self) -> Next<'_, Self>
    where
        Self: Unpin,
    {
        Next::new(self)
    }

    /// Fuses the stream so that `None` is final.
    fn fuse(self) -> Fuse<Self>
    where
        Self: Sized,
    {
        Fuse::new(self)
    }

    /// Debounces the stream: yields the last item of each burst once the
    /// source has been quiet for `quiet_period`.
    fn debounce<C>(self, clock: Arc<C>, quiet_period: Duration) -> Debounce<Self, C>
    where
        Self: Sized,
        C: TimeSource,
    {
        Debounce::new(self, clock, quiet_period)
    }

    /// Throttles the stream: yields at most one item per `interval`,
    /// keeping the most recent suppressed item for trailing delivery.
    fn throttle<C>(self, clock: Arc<C>, interval: Duration) -> Throttle<Self, C>
    where
        Self: Sized,
        C: TimeSource,
    {
        Throttle::new(self, clock, interval)
    }
}

// Blanket implementation for all Stream types
impl<S: Stream + ?Sized> StreamExt for S {}
