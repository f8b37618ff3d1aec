/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Deterministic pipeline turning a raw arc list into a compact CSR
//! representation.
//!
//! The input is a pair of equal-length distributed arrays of arbitrary
//! signed external vertex labels, one arc per index. The pipeline
//! symmetrizes the arc set, sorts it lexicographically with a
//! [distributed radix sort](radix_sort), removes self-loops, removes
//! duplicates, renumbers the surviving labels to dense internal ids, and
//! builds the segment-offset array of the CSR layout. Every stage is a
//! functional transformation over distributed arrays.

pub(crate) mod radix_sort;

use crate::dist::DistVec;
use crate::graphs::edge_centric::LocaleEdgeRange;
use anyhow::{ensure, Result};
use dsi_progress_logger::prelude::*;
use radix_sort::{from_ordered, pack_arc, radix_sort, to_ordered, unpack_arc};
use rayon::prelude::*;

/// The arrays produced by the pipeline, handed over to
/// [`EdgeCentricGraph`](crate::graphs::EdgeCentricGraph).
pub(crate) struct CsrParts {
    /// Source internal ids, one per arc, non-decreasing.
    pub(crate) src: DistVec<usize>,
    /// Destination internal ids, parallel to `src`; strictly increasing
    /// within the arcs of one source.
    pub(crate) dst: DistVec<usize>,
    /// Segment offsets: the neighbors of `u` are `dst[seg[u]..seg[u + 1]]`.
    pub(crate) seg: DistVec<usize>,
    /// The sorted distinct external labels; index = internal id.
    pub(crate) vertex_mapper: DistVec<i64>,
    /// For each locale, the span of sources present in its edge block.
    pub(crate) edge_ranges: Vec<LocaleEdgeRange>,
}

/// Runs the construction pipeline on a raw arc list.
pub(crate) fn build_csr(src: &DistVec<i64>, dst: &DistVec<i64>) -> Result<CsrParts> {
    ensure!(
        src.len() == dst.len(),
        "arc arrays differ in length: {} sources but {} destinations",
        src.len(),
        dst.len()
    );
    ensure!(
        src.num_locales() == dst.num_locales(),
        "arc arrays are distributed over different locale counts: {} vs. {}",
        src.num_locales(),
        dst.num_locales()
    );
    let num_locales = src.num_locales();
    let num_input_arcs = src.len();

    let mut pl = ProgressLogger::default();
    pl.item_name("arc");

    // Symmetrize: src' = src ++ dst, dst' = dst ++ src, packed into
    // order-preserving keys.
    pl.start("Symmetrizing arcs...");
    let arcs = DistVec::from_fn(2 * num_input_arcs, num_locales, |i| {
        if i < num_input_arcs {
            pack_arc(src[i], dst[i])
        } else {
            pack_arc(dst[i - num_input_arcs], src[i - num_input_arcs])
        }
    });
    pl.done_with_count(arcs.len());

    pl.start("Sorting arcs...");
    let arcs = radix_sort(&arcs);
    pl.done_with_count(arcs.len());

    pl.start("Removing self-loops...");
    let keep = DistVec::from_fn(arcs.len(), num_locales, |i| {
        let (s, d) = unpack_arc(arcs[i]);
        s != d
    });
    let arcs = compact(&arcs, &keep);
    pl.done_with_count(arcs.len());

    pl.start("Removing duplicate arcs...");
    let keep = DistVec::from_fn(arcs.len(), num_locales, |i| i == 0 || arcs[i] != arcs[i - 1]);
    let arcs = compact(&arcs, &keep);
    let num_arcs = arcs.len();
    pl.done_with_count(num_arcs);

    // The vertex mapper is the sorted distinct set of the labels surviving
    // in the arc set.
    pl.start("Renumbering vertices...");
    let labels = DistVec::from_fn(2 * num_arcs, num_locales, |i| {
        let (s, d) = unpack_arc(arcs[if i < num_arcs { i } else { i - num_arcs }]);
        to_ordered(if i < num_arcs { s } else { d })
    });
    let labels = radix_sort(&labels);
    let keep = DistVec::from_fn(labels.len(), num_locales, |i| {
        i == 0 || labels[i] != labels[i - 1]
    });
    let labels = compact(&labels, &keep);
    let vertex_mapper = DistVec::from_fn(labels.len(), num_locales, |i| from_ordered(labels[i]));
    let num_vertices = vertex_mapper.len();

    let src_int = DistVec::from_fn(num_arcs, num_locales, |i| {
        lookup(&vertex_mapper, unpack_arc(arcs[i]).0)
    });
    let dst_int = DistVec::from_fn(num_arcs, num_locales, |i| {
        lookup(&vertex_mapper, unpack_arc(arcs[i]).1)
    });
    pl.done_with_count(num_vertices);

    // seg[0] = 0 and seg[u + 1] - seg[u] = outdegree of u; since src_int
    // is sorted, the degree is the width of u's run.
    pl.start("Building segment offsets...");
    let degrees = DistVec::from_fn(num_vertices, num_locales, |u| {
        src_int.partition_point(|&x| x <= u) - src_int.partition_point(|&x| x < u)
    });
    let offsets = degrees.prefix_sum();
    let seg = DistVec::from_fn(num_vertices + 1, num_locales, |i| {
        if i == 0 {
            0
        } else {
            offsets[i - 1]
        }
    });
    pl.done_with_count(seg.len());

    let edge_ranges = (0..num_locales)
        .map(|locale| {
            let block = src_int.block(locale);
            match (block.first(), block.last()) {
                (Some(&first), Some(&last)) => LocaleEdgeRange {
                    locale,
                    first_src: first as i64,
                    last_src: last as i64,
                },
                _ => LocaleEdgeRange {
                    locale,
                    first_src: -1,
                    last_src: -1,
                },
            }
        })
        .collect();

    let parts = CsrParts {
        src: src_int,
        dst: dst_int,
        seg,
        vertex_mapper,
        edge_ranges,
    };
    check_invariants(&parts)?;
    Ok(parts)
}

/// Returns the internal id of `label`, which must be present in the
/// mapper.
#[inline]
fn lookup(vertex_mapper: &DistVec<i64>, label: i64) -> usize {
    vertex_mapper.partition_point(|&x| x < label)
}

/// Keeps the elements of `input` whose mask entry is true, compacting them
/// to the front: with `iv` the inclusive prefix sum of the mask, element
/// `i` lands at `iv[i] - 1`.
fn compact<T: Copy + Default + Send + Sync>(
    input: &DistVec<T>,
    keep: &DistVec<bool>,
) -> DistVec<T> {
    let num_locales = input.num_locales();
    let iv = DistVec::from_fn(keep.len(), num_locales, |i| keep[i] as usize).prefix_sum();
    let kept = if iv.is_empty() { 0 } else { iv[iv.len() - 1] };
    let mut out = DistVec::from_elem(T::default(), kept, num_locales);
    {
        let view = out.sync_view();
        (0..num_locales).into_par_iter().for_each(|locale| {
            for i in input.local_range(locale) {
                if keep[i] {
                    // Distinct kept indices get distinct prefix sums.
                    unsafe { view.set(iv[i] - 1, input[i]) };
                }
            }
        });
    }
    out
}

/// Verifies the result invariants of the pipeline; a violation is a bug in
/// the builder, not in the input.
fn check_invariants(parts: &CsrParts) -> Result<()> {
    let num_arcs = parts.src.len();
    let num_vertices = parts.vertex_mapper.len();
    ensure!(
        parts.dst.len() == num_arcs,
        "src and dst must have the same length"
    );
    ensure!(
        parts.seg.len() == num_vertices + 1,
        "seg must have one entry per vertex plus one"
    );
    ensure!(
        parts.seg[num_vertices] == num_arcs,
        "the last segment offset must be the number of arcs ({} != {})",
        parts.seg[num_vertices],
        num_arcs
    );
    for i in 0..num_arcs {
        let (s, d) = (parts.src[i], parts.dst[i]);
        ensure!(s != d, "self-loop ({}, {}) survived the pipeline", s, d);
        ensure!(
            parts.seg[s] <= i && i < parts.seg[s + 1],
            "arc {} lies outside the segment of its source {}",
            i,
            s
        );
        if i > 0 && parts.src[i - 1] == s {
            ensure!(
                parts.dst[i - 1] < d,
                "the neighbors of {} are not strictly increasing",
                s
            );
        } else if i > 0 {
            ensure!(parts.src[i - 1] < s, "src is not sorted at arc {}", i);
        }
    }
    for i in 1..num_vertices {
        ensure!(
            parts.vertex_mapper[i - 1] < parts.vertex_mapper[i],
            "the vertex mapper is not strictly increasing at {}",
            i
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(src: Vec<i64>, dst: Vec<i64>, num_locales: usize) -> CsrParts {
        build_csr(
            &DistVec::from_vec(src, num_locales),
            &DistVec::from_vec(dst, num_locales),
        )
        .unwrap()
    }

    #[test]
    fn test_compact() {
        let input = DistVec::from_vec((0..10).collect::<Vec<u64>>(), 3);
        let keep = DistVec::from_fn(10, 3, |i| i % 3 != 0);
        assert_eq!(compact(&input, &keep).to_vec(), vec![1, 2, 4, 5, 7, 8]);
    }

    #[test]
    fn test_triangle() {
        for num_locales in [1, 2, 4] {
            let parts = build(vec![0, 1, 2], vec![1, 2, 0], num_locales);
            assert_eq!(parts.vertex_mapper.to_vec(), vec![0, 1, 2]);
            assert_eq!(parts.src.to_vec(), vec![0, 0, 1, 1, 2, 2]);
            assert_eq!(parts.dst.to_vec(), vec![1, 2, 0, 2, 0, 1]);
            assert_eq!(parts.seg.to_vec(), vec![0, 2, 4, 6]);
        }
    }

    #[test]
    fn test_negative_labels() {
        let parts = build(vec![-5, 3], vec![3, 10], 2);
        assert_eq!(parts.vertex_mapper.to_vec(), vec![-5, 3, 10]);
        assert_eq!(parts.src.to_vec(), vec![0, 1, 1, 2]);
        assert_eq!(parts.dst.to_vec(), vec![1, 0, 2, 1]);
    }

    #[test]
    fn test_duplicates_and_loops() {
        // Duplicates in both orientations and a self-loop.
        let parts = build(vec![1, 2, 2, 7], vec![2, 1, 2, 1], 2);
        assert_eq!(parts.vertex_mapper.to_vec(), vec![1, 2, 7]);
        assert_eq!(parts.src.to_vec(), vec![0, 0, 1, 2]);
        assert_eq!(parts.dst.to_vec(), vec![1, 2, 0, 0]);
        assert_eq!(parts.seg.to_vec(), vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_empty_inputs() {
        let parts = build(vec![], vec![], 3);
        assert_eq!(parts.vertex_mapper.len(), 0);
        assert_eq!(parts.src.len(), 0);
        assert_eq!(parts.seg.to_vec(), vec![0]);
        assert!(parts.edge_ranges.iter().all(|r| r.first_src == -1));

        // Only self-loops: the arc set and the vertex set are empty.
        let parts = build(vec![4, 4], vec![4, 4], 2);
        assert_eq!(parts.vertex_mapper.len(), 0);
        assert_eq!(parts.src.len(), 0);
    }

    #[test]
    fn test_length_mismatch() {
        let src = DistVec::from_vec(vec![0_i64], 1);
        let dst = DistVec::from_vec(vec![0_i64, 1], 1);
        assert!(build_csr(&src, &dst).is_err());
    }
}
