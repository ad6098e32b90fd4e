//! Iterator-backed stream source.

use super::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Stream for the [`iter`] function.
#[derive(Debug, Clone)]
#[must_use = "streams do nothing unless polled"]
pub struct Iter<I> {
    iter: I,
}

impl<I> Unpin for Iter<I> {}

impl<I: Iterator> Stream for Iter<I> {
    type Item = I::Item;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.iter.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Converts an iterator into a stream.
///
/// Every item is immediately ready; the stream never returns
/// `Poll::Pending`.
///
/// # Example
///
/// ```
/// use tempo::stream::{iter, Stream};
/// use std::pin::Pin;
/// use std::sync::Arc;
/// use std::task::{Context, Poll, Wake};
/// # struct NoopWaker;
/// # impl Wake for NoopWaker { fn wake(self: Arc<Self>) {} }
///
/// let mut stream = iter(vec![1, 2, 3]);
/// let waker = Arc::new(NoopWaker).into();
/// let mut cx = Context::from_waker(&waker);
///
/// assert_eq!(Pin::new(&mut stream).poll_next(&mut cx), Poll::Ready(Some(1)));
/// assert_eq!(Pin::new(&mut stream).poll_next(&mut cx), Poll::Ready(Some(2)));
/// assert_eq!(Pin::new(&mut stream).poll_next(&mut cx), Poll::Ready(Some(3)));
/// assert_eq!(Pin::new(&mut stream).poll_next(&mut cx), Poll::Ready(None));
/// ```
pub fn iter<I: IntoIterator>(into_iter: I) -> Iter<I::IntoIter> {
    Iter {
        iter: into_iter.into_iter(),
    }
}
