/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::EdgeCentricGraph;
use crate::dist::DistVec;

/// The vertex-centric view of a graph: one sorted neighbor list per
/// vertex, block-distributed by vertex.
///
/// Because the partition is by vertex, the entire neighbor list of a vertex
/// is local to a single locale, its *owner*; the owner query is pure
/// arithmetic. A breadth-first visit on this view pushes one update per arc
/// to a single destination (the owner of the discovered vertex), whereas
/// the [edge-centric view](EdgeCentricGraph) would have to reach every
/// locale holding a portion of the discovered vertex's list.
///
/// The view is derived from an [`EdgeCentricGraph`] but does not reference
/// it afterwards: in particular, it owns an independent copy of the vertex
/// mapper, so the edge-centric view can be dropped once this one is built.
#[derive(Debug, Clone)]
pub struct VertexCentricGraph {
    adjacencies: DistVec<Box<[usize]>>,
    vertex_mapper: DistVec<i64>,
    num_arcs: usize,
}

impl VertexCentricGraph {
    /// Derives the vertex-centric view from an edge-centric one.
    pub fn from_edge_centric(graph: &EdgeCentricGraph) -> Self {
        let adjacencies = DistVec::from_fn(graph.num_vertices(), graph.num_locales(), |u| {
            graph.neighbors(u).collect()
        });
        Self {
            adjacencies,
            vertex_mapper: graph.vertex_mapper().clone(),
            num_arcs: graph.num_arcs(),
        }
    }

    /// Returns the number of vertices.
    #[inline(always)]
    pub fn num_vertices(&self) -> usize {
        self.adjacencies.len()
    }

    /// Returns the number of arcs (twice the number of undirected edges).
    #[inline(always)]
    pub fn num_arcs(&self) -> usize {
        self.num_arcs
    }

    /// Returns the number of locales the graph is distributed over.
    #[inline(always)]
    pub fn num_locales(&self) -> usize {
        self.adjacencies.num_locales()
    }

    /// Returns the locale owning vertex `u`.
    #[inline(always)]
    pub fn owner_of(&self, u: usize) -> usize {
        self.adjacencies.owner_of(u)
    }

    /// Returns the neighbors of `u`, in increasing order, as a slice local
    /// to the owner of `u`.
    #[inline(always)]
    pub fn neighbors(&self, u: usize) -> &[usize] {
        self.adjacencies.get(u)
    }

    /// Returns the sorted external labels; the label of internal id `u` is
    /// entry `u`.
    #[inline(always)]
    pub fn vertex_mapper(&self) -> &DistVec<i64> {
        &self.vertex_mapper
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
}
