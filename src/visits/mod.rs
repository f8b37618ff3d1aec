/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Breadth-first visits on the vertex-centric view.
//!
//! All kernels take an internal source vertex and return a freshly
//! allocated distributed array with one entry per vertex: a *level* array
//! (distance from the source) or a *parent* array (the predecessor through
//! which the vertex was discovered). Unreached vertices hold `-1`; the
//! parent of the source is the source itself.
//!
//! The aggregated kernels ([`bfs_level_agg`], [`bfs_parent_agg`]) run the
//! distributed algorithm: per-locale double-buffered frontiers, one
//! [`Aggregator`](crate::dist::Aggregator) per task batching the updates
//! directed at each destination locale, and a global barrier between
//! levels. The non-aggregated kernels ([`bfs_level_no_agg`],
//! [`bfs_parent_no_agg`]) run the same algorithm shape on a single locale
//! with direct writes; they are the reference implementations and define
//! ground truth.
//!
//! Level arrays are a graph-theoretic property and therefore identical
//! across kernels and runs. Parent arrays are not: any predecessor on a
//! shortest path is an acceptable parent, and concurrent discovery makes
//! the winner nondeterministic, so no caller may assume a specific one.
//! [`parent_to_level`] bridges the two for correctness checks.

mod level;
mod no_agg;
mod parent;

pub use level::{bfs_level_agg, bfs_level_agg_with_config};
pub use no_agg::{bfs_level_no_agg, bfs_parent_no_agg};
pub use parent::{bfs_parent_agg, bfs_parent_agg_with_config};

use crate::dist::{DistVec, Sink, SyncDistSlice};
use crate::graphs::VertexCentricGraph;
use anyhow::{ensure, Result};
use rayon::ThreadPool;
use std::sync::atomic::Ordering;
use std::sync::Mutex;
use sux::bits::{AtomicBitVec, BitVec};

/// Default number of frontier vertices per task.
pub(crate) const DEFAULT_GRANULARITY: usize = 128;

/// Computes the level of each vertex with respect to `source`.
///
/// Dispatches to the aggregated vertex-centric kernel with the default
/// configuration; see [`bfs_level_agg_with_config`] for the knobs.
pub fn bfs_level(
    graph: &VertexCentricGraph,
    source: usize,
    thread_pool: &ThreadPool,
) -> Result<DistVec<i64>> {
    bfs_level_agg(graph, source, thread_pool)
}

/// Computes a valid parent of each vertex with respect to `source`.
///
/// Dispatches to the aggregated vertex-centric kernel with the default
/// configuration; see [`bfs_parent_agg_with_config`] for the knobs.
pub fn bfs_parent(
    graph: &VertexCentricGraph,
    source: usize,
    thread_pool: &ThreadPool,
) -> Result<DistVec<i64>> {
    bfs_parent_agg(graph, source, thread_pool)
}

/// Re-derives the level array from a parent array by visiting the parent
/// tree in breadth order.
///
/// Used to check parent kernels against the ground-truth level kernel:
/// for a well-formed parent array the result equals the level array of the
/// same source.
pub fn parent_to_level(parent: &DistVec<i64>, source: usize) -> Result<DistVec<i64>> {
    let num_vertices = parent.len();
    let num_locales = parent.num_locales();
    if num_vertices == 0 {
        return Ok(DistVec::from_vec(vec![], num_locales));
    }
    ensure!(
        source < num_vertices,
        "source vertex {} out of range (the graph has {} vertices)",
        source,
        num_vertices
    );
    ensure!(
        parent[source] == source as i64,
        "the source must be its own parent"
    );

    // Invert the parent array into per-vertex child lists; each vertex has
    // one parent, so it appears in exactly one list.
    let mut children = vec![Vec::new(); num_vertices];
    for u in 0..num_vertices {
        let p = parent[u];
        if p >= 0 && u != source {
            ensure!(
                (p as usize) < num_vertices,
                "parent {} of vertex {} out of range",
                p,
                u
            );
            children[p as usize].push(u);
        }
    }

    let mut level = DistVec::from_elem(-1, num_vertices, num_locales);
    let mut visited = BitVec::new(num_vertices);
    visited.set(source, true);
    level.set(source, 0);
    let mut frontier = vec![source];
    let mut distance = 1;
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for &u in &frontier {
            for &child in &children[u] {
                if !visited[child] {
                    visited.set(child, true);
                    level.set(child, distance);
                    next.push(child);
                }
            }
        }
        frontier = next;
        distance += 1;
    }
    Ok(level)
}

/// The per-locale double-buffered frontier queues of a running visit.
///
/// Each locale holds its own pair of lists; one is *current* and consumed
/// by the owner, the other is *next* and filled by sinks running on behalf
/// of any locale, so next lists are behind locks. Frontier elements are
/// internal vertex ids owned by the locale holding them.
pub(crate) struct LocaleFrontiers {
    buffers: [Vec<Mutex<Vec<usize>>>; 2],
    cur: usize,
}

impl LocaleFrontiers {
    pub(crate) fn new(num_locales: usize) -> Self {
        Self {
            buffers: std::array::from_fn(|_| {
                (0..num_locales).map(|_| Mutex::new(Vec::new())).collect()
            }),
            cur: 0,
        }
    }

    /// Pushes a vertex onto the *current* list of its owner; used to seed
    /// the visit.
    pub(crate) fn seed(&self, locale: usize, vertex: usize) {
        self.buffers[self.cur][locale].lock().unwrap().push(vertex);
    }

    /// Appends a batch to the *next* list of `locale`.
    pub(crate) fn extend_next(&self, locale: usize, vertices: &[usize]) {
        self.buffers[1 - self.cur][locale]
            .lock()
            .unwrap()
            .extend_from_slice(vertices);
    }

    /// Takes the whole *current* list of `locale`, leaving it empty.
    pub(crate) fn take_cur(&self, locale: usize) -> Vec<usize> {
        std::mem::take(&mut *self.buffers[self.cur][locale].lock().unwrap())
    }

    /// Returns the total number of vertices in the *current* lists.
    pub(crate) fn cur_len(&self) -> usize {
        self.buffers[self.cur]
            .iter()
            .map(|list| list.lock().unwrap().len())
            .sum()
    }

    /// Swaps the roles of the two buffers; the now-empty former current
    /// lists are reused as next lists.
    pub(crate) fn advance(&mut self) {
        self.cur = 1 - self.cur;
    }
}

/// The mutable state of one running aggregated visit.
///
/// Every call builds a fresh context; two visits never share one.
pub(crate) struct BfsContext {
    /// One bit per vertex; the test-and-set on this bitmap is the
    /// linearization point for both level and parent assignment.
    pub(crate) visited: AtomicBitVec,
    pub(crate) frontiers: LocaleFrontiers,
    /// The level or parent array under construction.
    pub(crate) output: DistVec<i64>,
}

impl BfsContext {
    pub(crate) fn new(num_vertices: usize, num_locales: usize) -> Self {
        Self {
            visited: AtomicBitVec::new(num_vertices),
            frontiers: LocaleFrontiers::new(num_locales),
            output: DistVec::from_elem(-1, num_vertices, num_locales),
        }
    }
}

/// The destination side of a level visit: arriving vertex ids are appended
/// to the next-level frontier of their owner.
///
/// Duplicates are permitted; they are filtered at dequeue time by the
/// visited bitmap.
pub(crate) struct LevelSink<'a> {
    pub(crate) frontiers: &'a LocaleFrontiers,
}

impl Sink for LevelSink<'_> {
    type Item = usize;

    fn absorb(&self, locale: usize, batch: &[usize]) {
        self.frontiers.extend_next(locale, batch);
    }
}

/// The destination side of a parent visit: of all the `(child, parent)`
/// pairs arriving for a child, the test-and-set on the visited bitmap
/// elects exactly one winner, which writes the parent entry and enqueues
/// the child.
pub(crate) struct ParentSink<'a> {
    pub(crate) visited: &'a AtomicBitVec,
    pub(crate) parents: &'a SyncDistSlice<'a, i64>,
    pub(crate) frontiers: &'a LocaleFrontiers,
}

impl Sink for ParentSink<'_> {
    type Item = (usize, usize);

    fn absorb(&self, locale: usize, batch: &[(usize, usize)]) {
        let mut winners = Vec::with_capacity(batch.len());
        for &(child, parent) in batch {
            if !self.visited.swap(child, true, Ordering::Relaxed) {
                // The winner writes the entry exactly once.
                unsafe { self.parents.set(child, parent as i64) };
                winners.push(child);
            }
        }
        self.frontiers.extend_next(locale, &winners);
    }
}

/// Checks the source argument of a visit.
pub(crate) fn check_source(graph: &VertexCentricGraph, source: usize) -> Result<()> {
    ensure!(
        source < graph.num_vertices(),
        "source vertex {} out of range (the graph has {} vertices)",
        source,
        graph.num_vertices()
    );
    Ok(())
}
