/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Distributed least-significant-digit radix sort.
//!
//! Keys are sorted over 16-bit digits. Each pass computes per-locale digit
//! histograms, turns them into global scatter offsets with a digit-major,
//! locale-minor exclusive scan, and scatters every block into a fresh
//! distributed array; scatter targets are disjoint by construction, so the
//! writes need no synchronization beyond the final join. Passes whose digit
//! is constant over the whole array move no element and are skipped.
//!
//! Signed keys are mapped to unsigned ones by inverting the sign bit, which
//! becomes the top bit of the most significant digit; negative keys thus
//! sort below non-negative ones.

use crate::dist::DistVec;
use rayon::prelude::*;

/// Number of bits per digit.
const DIGIT_BITS: usize = 16;
/// Number of buckets per pass.
const RADIX: usize = 1 << DIGIT_BITS;

/// A fixed-width key sortable by 16-bit digits.
pub(crate) trait RadixKey: Copy + Default + Eq + Send + Sync {
    /// The number of digits in a key; one sorting pass is run per digit,
    /// least significant first.
    const DIGITS: usize;

    /// Returns the digit of index `pass`.
    fn digit(self, pass: usize) -> usize;
}

impl RadixKey for u64 {
    const DIGITS: usize = 4;

    #[inline(always)]
    fn digit(self, pass: usize) -> usize {
        (self >> (pass * DIGIT_BITS)) as usize & (RADIX - 1)
    }
}

impl RadixKey for u128 {
    const DIGITS: usize = 8;

    #[inline(always)]
    fn digit(self, pass: usize) -> usize {
        (self >> (pass * DIGIT_BITS)) as usize & (RADIX - 1)
    }
}

/// Maps a signed value to an unsigned key with the same order.
#[inline(always)]
pub(crate) fn to_ordered(x: i64) -> u64 {
    (x as u64) ^ (1 << 63)
}

/// Inverse of [`to_ordered`].
#[inline(always)]
pub(crate) fn from_ordered(x: u64) -> i64 {
    (x ^ (1 << 63)) as i64
}

/// Packs an arc into a single key whose unsigned order is the
/// lexicographic order of the signed `(src, dst)` pair.
#[inline(always)]
pub(crate) fn pack_arc(src: i64, dst: i64) -> u128 {
    ((to_ordered(src) as u128) << 64) | to_ordered(dst) as u128
}

/// Inverse of [`pack_arc`].
#[inline(always)]
pub(crate) fn unpack_arc(key: u128) -> (i64, i64) {
    (from_ordered((key >> 64) as u64), from_ordered(key as u64))
}

/// Sorts a distributed array of keys, returning a new array with the same
/// distribution.
pub(crate) fn radix_sort<K: RadixKey>(input: &DistVec<K>) -> DistVec<K> {
    let num_locales = input.num_locales();
    let len = input.len();
    let mut cur = input.clone();
    if len <= 1 {
        return cur;
    }

    for pass in 0..K::DIGITS {
        let histograms: Vec<Vec<usize>> = (0..num_locales)
            .into_par_iter()
            .map(|locale| {
                let mut histogram = vec![0_usize; RADIX];
                for &key in cur.block(locale) {
                    histogram[key.digit(pass)] += 1;
                }
                histogram
            })
            .collect();

        let mut totals = vec![0_usize; RADIX];
        for histogram in &histograms {
            for (total, &count) in totals.iter_mut().zip(histogram) {
                *total += count;
            }
        }
        if totals.iter().any(|&total| total == len) {
            // The digit is constant over the whole array.
            continue;
        }

        // Digit-major, locale-minor exclusive scan: equal digits keep
        // their (locale, block offset) order, which makes the pass stable.
        let mut offsets: Vec<Vec<usize>> = vec![vec![0_usize; RADIX]; num_locales];
        let mut acc = 0;
        for digit in 0..RADIX {
            for (locale, histogram) in histograms.iter().enumerate() {
                offsets[locale][digit] = acc;
                acc += histogram[digit];
            }
        }

        let mut next = DistVec::from_elem(K::default(), len, num_locales);
        {
            let view = next.sync_view();
            let blocks: Vec<&[K]> = (0..num_locales).map(|locale| cur.block(locale)).collect();
            blocks
                .into_par_iter()
                .zip(offsets)
                .for_each(|(block, mut offsets)| {
                    for &key in block {
                        let digit = key.digit(pass);
                        // Targets are globally disjoint by construction.
                        unsafe { view.set(offsets[digit], key) };
                        offsets[digit] += 1;
                    }
                });
        }
        cur = next;
    }
    cur
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_sort_u64() {
        let mut rng = SmallRng::seed_from_u64(0);
        for num_locales in [1, 2, 5] {
            let values: Vec<u64> = (0..1000).map(|_| rng.gen::<u64>() >> rng.gen_range(0..64)).collect();
            let sorted = radix_sort(&DistVec::from_vec(values.clone(), num_locales)).to_vec();
            let mut expected = values;
            expected.sort_unstable();
            assert_eq!(sorted, expected);
        }
    }

    #[test]
    fn test_sort_signed_pairs() {
        let mut rng = SmallRng::seed_from_u64(1);
        let pairs: Vec<(i64, i64)> = (0..1000)
            .map(|_| (rng.gen_range(-50..50), rng.gen_range(-50..50)))
            .collect();
        let keys = DistVec::from_vec(pairs.iter().map(|&(s, d)| pack_arc(s, d)).collect(), 3);
        let sorted: Vec<(i64, i64)> = radix_sort(&keys).iter().map(|&k| unpack_arc(k)).collect();
        let mut expected = pairs;
        expected.sort_unstable();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_sort_trivial() {
        assert_eq!(radix_sort(&DistVec::<u64>::from_vec(vec![], 4)).len(), 0);
        assert_eq!(radix_sort(&DistVec::from_vec(vec![3_u64], 4)).to_vec(), vec![3]);
        // All keys equal: every pass is skipped.
        assert_eq!(
            radix_sort(&DistVec::from_vec(vec![7_u64; 10], 2)).to_vec(),
            vec![7; 10]
        );
    }

    #[test]
    fn test_pack_order() {
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..1000 {
            let a = (rng.gen::<i64>(), rng.gen::<i64>());
            let b = (rng.gen::<i64>(), rng.gen::<i64>());
            assert_eq!(pack_arc(a.0, a.1).cmp(&pack_arc(b.0, b.1)), a.cmp(&b));
            assert_eq!(unpack_arc(pack_arc(a.0, a.1)), a);
        }
    }
}
