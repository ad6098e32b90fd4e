//! Throttle combinator for streams.
//!
//! Spaces items from the underlying stream at least one interval apart.
//! The first item of a burst passes through immediately; items arriving
//! while the gate is closed replace a single trailing slot, and the most
//! recent of them is yielded once the interval has elapsed since the last
//! forwarded item. The final item of a burst is never dropped.

use super::fuse::Fuse;
use super::stream::Stream;
use crate::time::TimeSource;
use crate::types::Time;
use core::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

/// Stream for the [`throttle`](super::StreamExt::throttle) method.
#[must_use = "streams do nothing unless polled"]
pub struct Throttle<S: Stream, C: TimeSource> {
    source: Fuse<S>,
    clock: Arc<C>,
    interval: Duration,
    /// Instant of the most recent forward. `None` means the gate is open.
    last_forward: Option<Time>,
    /// The trailing slot; replaced by each suppressed item.
    pending: Option<S::Item>,
}

impl<S: Stream + Unpin, C: TimeSource> Unpin for Throttle<S, C> {}

impl<S: Stream, C: TimeSource> Throttle<S, C> {
    pub(crate) fn new(source: S, clock: Arc<C>, interval: Duration) -> Self {
        Self {
            source: Fuse::new(source),
            clock,
            interval,
            last_forward: None,
            pending: None,
        }
    }

    /// Returns the configured interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the instant the trailing item becomes due, if one is held.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Time> {
        match (&self.pending, self.last_forward) {
            (Some(_), Some(last)) => Some(last.saturating_add_duration(self.interval)),
            (Some(_), None) => Some(Time::ZERO),
            (None, _) => None,
        }
    }

    /// Returns the item parked in the trailing slot, if any.
    #[must_use]
    pub const fn pending_value(&self) -> Option<&S::Item> {
        self.pending.as_ref()
    }

    fn gate_open(&self, now: Time) -> bool {
        self.last_forward
            .is_none_or(|last| now >= last.saturating_add_duration(self.interval))
    }
}

impl<S: Stream + Unpin, C: TimeSource> Throttle<S, C> {
    /// Polls the adapter with an explicit time value.
    ///
    /// Spacing is preserved even at the end of the source: a trailing item
    /// waits out the gate before the stream reports its end.
    pub fn poll_next_with_time(
        &mut self,
        now: Time,
        cx: &mut Context<'_>,
    ) -> Poll<Option<S::Item>> {
        loop {
            match Pin::new(&mut self.source).poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    if self.gate_open(now) {
                        // A trailing item that came due is older; it goes
                        // out first and the new item takes its slot.
                        let out = match self.pending.take() {
                            Some(due) => {
                                self.pending = Some(item);
                                due
                            }
                            None => item,
                        };
                        self.last_forward = Some(now);
                        return Poll::Ready(Some(out));
                    }
                    self.pending = Some(item);
                }
                Poll::Ready(None) | Poll::Pending => break,
            }
        }

        if self.pending.is_some() && self.gate_open(now) {
            let item = self.pending.take();
            self.last_forward = Some(now);
            return Poll::Ready(item);
        }

        if self.source.is_done() && self.pending.is_none() {
            return Poll::Ready(None);
        }

        Poll::Pending
    }
}

impl<S: Stream + Unpin, C: TimeSource> Stream for Throttle<S, C> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let now = self.clock.now();
        self.poll_next_with_time(now, cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let held = usize::from(self.pending.is_some());
        let (lower, upper) = self.source.size_hint();
        // Suppression may collapse any number of source items into one.
        let lower = usize::from(held > 0 || lower > 0);
        (lower, upper.and_then(|u| u.checked_add(held)))
    }
}

impl<S, C> fmt::Debug for Throttle<S, C>
where
    S: Stream + fmt::Debug,
    S::Item: fmt::Debug,
    C: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttle")
            .field("source", &self.source)
            .field("interval", &self.interval)
            .field("last_forward", &self.last_forward)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
