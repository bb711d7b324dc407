use std::iter::FusedIterator;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;

use crate::{StridedView, ViewElement};

/// Decodes the elements of a view in ascending index order.
///
/// Each step takes the buffer's read lock on its own, so the view may be written
/// between steps.
#[derive(Debug, Clone)]
pub struct Iter<'a, T: ViewElement> {
    view: &'a StridedView<T>,
    front: usize,
    back: usize,
}

impl<'a, T: ViewElement> Iter<'a, T> {
    pub(crate) fn new(view: &'a StridedView<T>) -> Self {
        Self {
            view,
            front: 0,
            back: view.len(),
        }
    }
}

impl<T: ViewElement> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let value = self.view.read(self.front);
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: ViewElement> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.view.read(self.back))
    }
}

impl<T: ViewElement> ExactSizeIterator for Iter<'_, T> {}

impl<T: ViewElement> FusedIterator for Iter<'_, T> {}

/// The async counterpart of [`Iter`].
///
/// Hands control back to the executor once before every element. The order is the
/// same as the synchronous iterator.
#[derive(Debug)]
pub struct ElementStream<'a, T: ViewElement> {
    iter: Iter<'a, T>,
    yielded: bool,
}

impl<T: ViewElement> Stream for ElementStream<'_, T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        if !self.yielded {
            self.yielded = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        self.yielded = false;
        Poll::Ready(self.iter.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<T: ViewElement> StridedView<T> {
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    pub fn stream(&self) -> ElementStream<'_, T> {
        ElementStream {
            iter: self.iter(),
            yielded: false,
        }
    }
}

impl<'a, T: ViewElement> IntoIterator for &'a StridedView<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
