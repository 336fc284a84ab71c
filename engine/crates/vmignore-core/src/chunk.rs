//! Order-preserving partition of target lists
//!
//! The upstream ignore/restore endpoint accepts a bounded number of targets
//! per call, so long target lists are sent as consecutive chunks.

use std::iter::FusedIterator;

/// Maximum number of targets accepted by a single ignore or restore call
pub const MAX_TARGETS_PER_REQUEST: usize = 30;

/// Split `items` into consecutive groups of at most `size` elements.
///
/// Chunks are produced lazily, in input order; only the chunk being built is
/// held in memory. An empty input yields no chunks.
///
/// # Panics
///
/// Panics if `size` is 0.
pub fn chunked<I>(items: I, size: usize) -> Chunks<I::IntoIter>
where
    I: IntoIterator,
{
    assert!(size > 0, "chunk size must be non-zero");
    Chunks {
        inner: items.into_iter(),
        size,
    }
}

/// Iterator returned by [`chunked`]
#[derive(Debug, Clone)]
pub struct Chunks<I> {
    inner: I,
    size: usize,
}

impl<I: Iterator> Iterator for Chunks<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.inner.next()?;
        let mut chunk = Vec::with_capacity(self.size);
        chunk.push(first);
        chunk.extend(self.inner.by_ref().take(self.size - 1));
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lo, hi) = self.inner.size_hint();
        let per = |n: usize| n.div_ceil(self.size);
        (per(lo), hi.map(per))
    }
}

impl<I: FusedIterator> FusedIterator for Chunks<I> {}
