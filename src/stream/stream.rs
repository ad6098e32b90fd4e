//! Core stream trait.

use std::pin::Pin;
use std::task::{Context, Poll};

/// An asynchronous sequence of values.
///
/// The async counterpart of [`Iterator`]: each call to
/// [`poll_next`](Stream::poll_next) either yields the next item, reports
/// that the stream is exhausted, or registers the task for wakeup when an
/// item may become available.
pub trait Stream {
    /// The type of items yielded by the stream.
    type Item;

    /// Attempts to pull the next item out of the stream.
    ///
    /// Returns `Poll::Ready(Some(item))` when an item is available,
    /// `Poll::Ready(None)` when the stream is exhausted, and
    /// `Poll::Pending` when no item is ready yet.
    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>>;

    /// Returns bounds on the number of remaining items.
    ///
    /// The default is `(0, None)`, which is correct for any stream.
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }
}

impl<S: Stream + Unpin + ?Sized> Stream for &mut S {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut **self).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (**self).size_hint()
    }
}

impl<S: Stream + Unpin + ?Sized> Stream for Box<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut **self).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (**self).size_hint()
    }
}
