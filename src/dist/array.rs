/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::block::BlockDist;
use rayon::prelude::*;
use std::ops::{Index, Range};
use sync_cell_slice::{SyncCell, SyncSlice};

/// A dense one-dimensional array of fixed length partitioned in contiguous
/// blocks, one per locale.
///
/// The length is fixed at construction; block sizes differ by at most one.
/// Each block is a separate allocation so that per-locale slices can be
/// handed out (and mutated) independently.
///
/// Single-element accessors ([`get`](DistVec::get), [`set`](DistVec::set),
/// indexing) locate the owning block arithmetically through the underlying
/// [`BlockDist`]; they are the moral equivalent of a one-sided remote
/// operation and are linearizable per index as long as the caller does not
/// alias mutable access, which the borrow checker forbids. Concurrent
/// disjoint writes from parallel tasks go through [`sync_view`](DistVec::sync_view).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistVec<T> {
    dist: BlockDist,
    blocks: Vec<Box<[T]>>,
}

impl<T> DistVec<T> {
    /// Creates a distributed array by evaluating `f` at each index.
    ///
    /// Blocks are filled in parallel using the current `rayon` context.
    pub fn from_fn(len: usize, num_locales: usize, f: impl Fn(usize) -> T + Sync) -> Self
    where
        T: Send,
    {
        let dist = BlockDist::new(len, num_locales);
        let blocks = (0..num_locales)
            .into_par_iter()
            .map(|n| dist.local_range(n).map(&f).collect())
            .collect();
        Self { dist, blocks }
    }

    /// Creates a distributed array of length `len` filled with `elem`.
    pub fn from_elem(elem: T, len: usize, num_locales: usize) -> Self
    where
        T: Clone + Send + Sync,
    {
        Self::from_fn(len, num_locales, |_| elem.clone())
    }

    /// Distributes the contents of a vector.
    pub fn from_vec(v: Vec<T>, num_locales: usize) -> Self {
        let dist = BlockDist::new(v.len(), num_locales);
        let mut iter = v.into_iter();
        let blocks = (0..num_locales)
            .map(|n| iter.by_ref().take(dist.local_range(n).len()).collect())
            .collect();
        Self { dist, blocks }
    }

    /// Returns the underlying block distribution.
    #[inline(always)]
    pub fn dist(&self) -> BlockDist {
        self.dist
    }

    /// Returns the length of the array.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.dist.len()
    }

    /// Returns true if the array is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.dist.is_empty()
    }

    /// Returns the number of locales the array is partitioned over.
    #[inline(always)]
    pub fn num_locales(&self) -> usize {
        self.dist.num_locales()
    }

    /// Returns the locale owning index `i`.
    #[inline(always)]
    pub fn owner_of(&self, i: usize) -> usize {
        self.dist.owner_of(i)
    }

    /// Returns the index range resident on locale `n`.
    #[inline(always)]
    pub fn local_range(&self, n: usize) -> Range<usize> {
        self.dist.local_range(n)
    }

    /// Returns the block resident on locale `n`.
    #[inline(always)]
    pub fn block(&self, n: usize) -> &[T] {
        &self.blocks[n]
    }

    /// Returns the block resident on locale `n`, mutably.
    #[inline(always)]
    pub fn block_mut(&mut self, n: usize) -> &mut [T] {
        &mut self.blocks[n]
    }

    /// Returns a mutable slice of all blocks, for parallel per-block
    /// mutation.
    #[inline(always)]
    pub fn blocks_mut(&mut self) -> &mut [Box<[T]>] {
        &mut self.blocks
    }

    /// Returns a reference to the element of index `i`.
    #[inline(always)]
    pub fn get(&self, i: usize) -> &T {
        let n = self.dist.owner_of(i);
        &self.blocks[n][i - self.dist.local_range(n).start]
    }

    /// Sets the element of index `i` to `v`.
    #[inline(always)]
    pub fn set(&mut self, i: usize, v: T) {
        let n = self.dist.owner_of(i);
        let lo = self.dist.local_range(n).start;
        self.blocks[n][i - lo] = v;
    }

    /// Fills the array with `v`.
    pub fn fill(&mut self, v: T)
    where
        T: Clone + Send + Sync,
    {
        self.blocks
            .par_iter_mut()
            .for_each(|block| block.fill(v.clone()));
    }

    /// Element-wise assignment from a conformant array.
    ///
    /// # Panics
    ///
    /// If the two arrays do not share the same distribution.
    pub fn copy_from(&mut self, other: &Self)
    where
        T: Clone + Send + Sync,
    {
        assert_eq!(
            self.dist, other.dist,
            "element-wise assignment requires conformant arrays"
        );
        self.blocks
            .par_iter_mut()
            .zip(other.blocks.par_iter())
            .for_each(|(dst, src)| dst.clone_from_slice(src));
    }

    /// Returns an iterator over all elements in index order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.blocks.iter().flat_map(|block| block.iter())
    }

    /// Collects the whole array into a vector.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Returns the index of the partition point of a sorted array according
    /// to the given predicate (the index of the first element for which the
    /// predicate is false), as [`slice::partition_point`] does, but probing
    /// elements through owner arithmetic.
    pub fn partition_point(&self, pred: impl Fn(&T) -> bool) -> usize {
        let mut lo = 0;
        let mut hi = self.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if pred(self.get(mid)) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Returns a view supporting concurrent writes to disjoint indices from
    /// multiple tasks.
    ///
    /// The view hands out per-element [`SyncCell`]s; as with
    /// [`sync_cell_slice`], writes to the *same* index must be externally
    /// linearized (in the visits of this crate, by the atomic test-and-set
    /// on the visited bitmap).
    pub fn sync_view(&mut self) -> SyncDistSlice<'_, T>
    where
        T: Send,
    {
        let dist = self.dist;
        SyncDistSlice {
            dist,
            blocks: self
                .blocks
                .iter_mut()
                .map(|block| block.as_sync_slice())
                .collect(),
        }
    }
}

impl DistVec<usize> {
    /// Returns the inclusive prefix sum of the array.
    pub fn prefix_sum(&self) -> DistVec<usize> {
        let mut out = self.clone();
        let totals: Vec<usize> = out
            .blocks
            .par_iter_mut()
            .map(|block| {
                let mut acc = 0;
                for x in block.iter_mut() {
                    acc += *x;
                    *x = acc;
                }
                acc
            })
            .collect();
        let mut acc = 0;
        let offsets: Vec<usize> = totals
            .iter()
            .map(|&total| {
                let offset = acc;
                acc += total;
                offset
            })
            .collect();
        out.blocks
            .par_iter_mut()
            .zip(offsets)
            .for_each(|(block, offset)| {
                if offset != 0 {
                    for x in block.iter_mut() {
                        *x += offset;
                    }
                }
            });
        out
    }
}

impl<T> Index<usize> for DistVec<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, i: usize) -> &T {
        self.get(i)
    }
}

/// A write view over a [`DistVec`] for concurrent disjoint writes.
///
/// Obtained through [`DistVec::sync_view`]; the underlying array is
/// mutably borrowed for the lifetime of the view.
pub struct SyncDistSlice<'a, T> {
    dist: BlockDist,
    blocks: Vec<&'a [SyncCell<T>]>,
}

impl<T> SyncDistSlice<'_, T> {
    /// Writes `v` at index `i`.
    ///
    /// # Safety
    ///
    /// Data races on the same index are undefined behavior: concurrent
    /// callers must write disjoint indices, or linearize same-index writes
    /// externally.
    #[inline(always)]
    pub unsafe fn set(&self, i: usize, v: T) {
        let n = self.dist.owner_of(i);
        let lo = self.dist.local_range(n).start;
        self.blocks[n][i - lo].set(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for num_locales in [1, 2, 3, 7] {
            let a = DistVec::from_fn(10, num_locales, |i| i * i);
            assert_eq!(a.to_vec(), (0..10).map(|i| i * i).collect::<Vec<_>>());
            assert_eq!(a, DistVec::from_vec((0..10).map(|i| i * i).collect(), num_locales));
            for i in 0..10 {
                assert_eq!(a[i], i * i);
            }
        }
    }

    #[test]
    fn test_set_and_fill() {
        let mut a = DistVec::from_elem(0, 5, 2);
        a.set(3, 7);
        assert_eq!(a.to_vec(), vec![0, 0, 0, 7, 0]);
        a.fill(1);
        assert_eq!(a.to_vec(), vec![1; 5]);
    }

    #[test]
    fn test_copy_from() {
        let src = DistVec::from_fn(9, 4, |i| i as i64 - 4);
        let mut dst = DistVec::from_elem(0, 9, 4);
        dst.copy_from(&src);
        assert_eq!(dst, src);
    }

    #[test]
    fn test_prefix_sum() {
        for num_locales in [1, 2, 3, 8] {
            for len in [0, 1, 5, 17] {
                let a = DistVec::from_fn(len, num_locales, |i| i % 3);
                let mut acc = 0;
                let expected: Vec<usize> = (0..len)
                    .map(|i| {
                        acc += i % 3;
                        acc
                    })
                    .collect();
                assert_eq!(a.prefix_sum().to_vec(), expected);
            }
        }
    }

    #[test]
    fn test_partition_point() {
        let a = DistVec::from_vec(vec![1, 3, 3, 5, 9], 3);
        assert_eq!(a.partition_point(|&x| x < 3), 1);
        assert_eq!(a.partition_point(|&x| x <= 3), 3);
        assert_eq!(a.partition_point(|&x| x < 100), 5);
        let empty = DistVec::<i64>::from_vec(vec![], 2);
        assert_eq!(empty.partition_point(|&x| x < 0), 0);
    }

    #[test]
    fn test_sync_view() {
        let mut a = DistVec::from_elem(0_usize, 100, 4);
        {
            let view = a.sync_view();
            (0..100_usize).into_par_iter().for_each(|i| unsafe {
                view.set(i, i + 1);
            });
        }
        assert_eq!(a.to_vec(), (1..=100).collect::<Vec<_>>());
    }
}
