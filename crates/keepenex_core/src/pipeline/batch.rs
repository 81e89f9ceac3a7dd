//! Fixed-size windows over an ordered stream.

use std::num::NonZeroUsize;

/// Default maximum number of notes per output document.
pub const DEFAULT_BATCH_SIZE: usize = 250;

/// Iterator adapter yielding consecutive windows of at most `size` items.
///
/// Only the window being filled is held in memory; the inner iterator is
/// pulled lazily. An empty input yields no windows.
pub struct Batches<I> {
    inner: I,
    size: NonZeroUsize,
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.inner.next()?;
        let mut window = Vec::with_capacity(self.size.get().min(DEFAULT_BATCH_SIZE));
        window.push(first);
        window.extend(self.inner.by_ref().take(self.size.get() - 1));
        Some(window)
    }
}

/// Splits `items` into ordered windows of at most `size` elements.
pub fn batched<I: IntoIterator>(items: I, size: NonZeroUsize) -> Batches<I::IntoIter> {
    Batches {
        inner: items.into_iter(),
        size,
    }
}
