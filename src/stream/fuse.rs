//! Fuse combinator.

use super::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Stream for the [`fuse`](super::StreamExt::fuse) method.
///
/// Once the underlying stream yields `None`, every later poll returns
/// `None` without touching the underlying stream again. [`Fuse::is_done`]
/// reports whether that point has been reached.
#[derive(Debug, Clone)]
#[must_use = "streams do nothing unless polled"]
pub struct Fuse<S> {
    stream: S,
    done: bool,
}

impl<S> Fuse<S> {
    pub(crate) const fn new(stream: S) -> Self {
        Self {
            stream,
            done: false,
        }
    }

    /// Returns true once the underlying stream has ended.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Returns a reference to the underlying stream.
    pub const fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Returns a mutable reference to the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Consumes the combinator, returning the underlying stream.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Stream + Unpin> Stream for Fuse<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        let poll = Pin::new(&mut self.stream).poll_next(cx);
        if matches!(poll, Poll::Ready(None)) {
            self.done = true;
        }
        poll
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            self.stream.size_hint()
        }
    }
}
