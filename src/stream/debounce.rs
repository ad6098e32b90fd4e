//! Debounce combinator for streams.
//!
//! Coalesces bursts from the underlying stream: each new item replaces the
//! held one and restarts the quiet period, and the held item is yielded
//! once the source has been silent for the full period. When the source
//! ends, the held item is flushed immediately: nothing can supersede it,
//! so waiting out the quiet period would only add latency.

use super::fuse::Fuse;
use super::stream::Stream;
use crate::combinator::debounce::DebounceWindow;
use crate::time::TimeSource;
use crate::types::Time;
use core::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

/// Stream for the [`debounce`](super::StreamExt::debounce) method.
#[must_use = "streams do nothing unless polled"]
pub struct Debounce<S: Stream, C: TimeSource> {
    source: Fuse<S>,
    clock: Arc<C>,
    quiet_period: Duration,
    window: Option<DebounceWindow<S::Item>>,
}

impl<S: Stream + Unpin, C: TimeSource> Unpin for Debounce<S, C> {}

impl<S: Stream, C: TimeSource> Debounce<S, C> {
    pub(crate) fn new(source: S, clock: Arc<C>, quiet_period: Duration) -> Self {
        Self {
            source: Fuse::new(source),
            clock,
            quiet_period,
            window: None,
        }
    }

    /// Returns the configured quiet period.
    #[must_use]
    pub const fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Returns the instant the held item becomes due, if one is held.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Time> {
        self.window.as_ref().map(DebounceWindow::deadline)
    }

    /// Returns the item waiting out its quiet period, if any.
    #[must_use]
    pub fn pending_value(&self) -> Option<&S::Item> {
        self.window.as_ref().map(DebounceWindow::value)
    }

    fn take_due(&mut self, now: Time) -> Option<S::Item> {
        let due = self
            .window
            .as_ref()
            .is_some_and(|window| now >= window.deadline());
        if due {
            self.window.take().map(DebounceWindow::into_value)
        } else {
            None
        }
    }
}

impl<S: Stream + Unpin, C: TimeSource> Debounce<S, C> {
    /// Polls the adapter with an explicit time value.
    ///
    /// A window that came due during the preceding silence is yielded
    /// before new items are drained; draining first would overwrite it.
    pub fn poll_next_with_time(
        &mut self,
        now: Time,
        cx: &mut Context<'_>,
    ) -> Poll<Option<S::Item>> {
        if let Some(value) = self.take_due(now) {
            return Poll::Ready(Some(value));
        }

        // Drain everything already ready; the last item wins the window.
        loop {
            match Pin::new(&mut self.source).poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    let deadline = now.saturating_add_duration(self.quiet_period);
                    self.window = Some(DebounceWindow::new(item, deadline));
                }
                Poll::Ready(None) | Poll::Pending => break,
            }
        }

        if self.source.is_done() {
            return Poll::Ready(self.window.take().map(DebounceWindow::into_value));
        }

        match self.take_due(now) {
            Some(value) => Poll::Ready(Some(value)),
            None => Poll::Pending,
        }
    }
}

impl<S: Stream + Unpin, C: TimeSource> Stream for Debounce<S, C> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let now = self.clock.now();
        self.poll_next_with_time(now, cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let held = usize::from(self.window.is_some());
        let (lower, upper) = self.source.size_hint();
        // Coalescing may collapse any number of source items into one.
        let lower = usize::from(held > 0 || lower > 0);
        (lower, upper.and_then(|u| u.checked_add(held)))
    }
}

impl<S, C> fmt::Debug for Debounce<S, C>
where
    S: Stream + fmt::Debug,
    S::Item: fmt::Debug,
    C: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounce")
            .field("source", &self.source)
            .field("quiet_period", &self.quiet_period)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
