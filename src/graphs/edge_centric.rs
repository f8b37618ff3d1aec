/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::build::build_csr;
use crate::dist::DistVec;
use anyhow::Result;
use std::ops::Range;

/// The span of source ids present in the edge block of one locale.
///
/// One triple per locale is replicated everywhere, so that any locale can
/// determine, by scanning the replicated table, which locales hold a
/// portion of a given vertex's neighbor list. Empty blocks carry `-1` in
/// both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleEdgeRange {
    /// The locale this range describes.
    pub locale: usize,
    /// Internal id of the first arc source in the block, or `-1`.
    pub first_src: i64,
    /// Internal id of the last arc source in the block, or `-1`.
    pub last_src: i64,
}

/// The edge-centric view of a graph: a CSR layout whose arrays are all
/// block-distributed by index into the edge space.
///
/// Arcs are symmetrized, loop-free and duplicate-free, sorted by source and
/// then by destination; a vertex's neighbor list may thus span several
/// consecutive locales. The `src` array is retained alongside `dst` so that
/// the source owning an arc can be located without a binary search in the
/// segment array.
///
/// Vertices carry dense *internal* ids `0..V`; the original *external*
/// labels of the input are recovered through the vertex mapper, a sorted
/// sequence of the distinct external labels.
#[derive(Debug, Clone)]
pub struct EdgeCentricGraph {
    src: DistVec<usize>,
    dst: DistVec<usize>,
    seg: DistVec<usize>,
    vertex_mapper: DistVec<i64>,
    edge_ranges: Vec<LocaleEdgeRange>,
}

impl EdgeCentricGraph {
    /// Builds the graph from a raw arc list of external labels.
    ///
    /// The arrays must have the same length and be distributed over the
    /// same number of locales; the arc set is symmetrized, cleaned of
    /// self-loops and duplicates, and renumbered.
    pub fn from_arc_arrays(src: &DistVec<i64>, dst: &DistVec<i64>) -> Result<Self> {
        let parts = build_csr(src, dst)?;
        Ok(Self {
            src: parts.src,
            dst: parts.dst,
            seg: parts.seg,
            vertex_mapper: parts.vertex_mapper,
            edge_ranges: parts.edge_ranges,
        })
    }

    /// Returns the number of vertices.
    #[inline(always)]
    pub fn num_vertices(&self) -> usize {
        self.vertex_mapper.len()
    }

    /// Returns the number of arcs (twice the number of undirected edges).
    #[inline(always)]
    pub fn num_arcs(&self) -> usize {
        self.dst.len()
    }

    /// Returns the number of locales the graph is distributed over.
    #[inline(always)]
    pub fn num_locales(&self) -> usize {
        self.dst.num_locales()
    }

    /// Returns the sorted external labels; the label of internal id `u` is
    /// entry `u`.
    #[inline(always)]
    pub fn vertex_mapper(&self) -> &DistVec<i64> {
        &self.vertex_mapper
    }

    /// Returns the per-locale source spans of the edge blocks.
    #[inline(always)]
    pub fn edge_ranges(&self) -> &[LocaleEdgeRange] {
        &self.edge_ranges
    }

    /// Returns the source array of the CSR layout.
    #[inline(always)]
    pub fn src(&self) -> &DistVec<usize> {
        &self.src
    }

    /// Returns the destination array of the CSR layout.
    #[inline(always)]
    pub fn dst(&self) -> &DistVec<usize> {
        &self.dst
    }

    /// Returns the segment-offset array of the CSR layout.
    #[inline(always)]
    pub fn seg(&self) -> &DistVec<usize> {
        &self.seg
    }

    /// Returns the external label of internal id `u`.
    #[inline(always)]
    pub fn internal_to_external(&self, u: usize) -> i64 {
        self.vertex_mapper[u]
    }

    /// Returns the internal id of external label `label`, if present, by
    /// binary search on the vertex mapper.
    pub fn external_to_internal(&self, label: i64) -> Option<usize> {
        let u = self.vertex_mapper.partition_point(|&x| x < label);
        (u < self.vertex_mapper.len() && self.vertex_mapper[u] == label).then_some(u)
    }

    /// Returns the range of edge-space indices holding the neighbor list of
    /// `u`.
    #[inline(always)]
    pub fn neighbor_range(&self, u: usize) -> Range<usize> {
        self.seg[u]..self.seg[u + 1]
    }

    /// Returns the neighbors of `u`, in increasing order.
    pub fn neighbors(&self, u: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbor_range(u).map(|i| self.dst[i])
    }

    /// Returns the portion of the neighbor list of `u` resident on
    /// `locale`, as a local slice; empty if the locale holds no arc of `u`.
    ///
    /// Useful when iterating a partitioned edge list and processing only
    /// the arcs whose edge block lives on one locale.
    pub fn neighbors_in_block(&self, u: usize, locale: usize) -> &[usize] {
        let local = self.dst.local_range(locale);
        let wanted = self.neighbor_range(u);
        let lo = wanted.start.max(local.start);
        let hi = wanted.end.min(local.end);
        if lo >= hi {
            return &[];
        }
        &self.dst.block(locale)[lo - local.start..hi - local.start]
    }

    /// Returns the locales whose edge block holds a portion of the
    /// neighbor list of `u`; there may be several, and they are
    /// consecutive.
    pub fn find_locs(&self, u: usize) -> Vec<usize> {
        let u = u as i64;
        self.edge_ranges
            .iter()
            .filter(|range| range.first_src <= u && u <= range.last_src)
            .map(|range| range.locale)
            .collect()
    }
}
