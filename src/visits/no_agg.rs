/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{check_source, DEFAULT_GRANULARITY};
use crate::dist::DistVec;
use crate::graphs::VertexCentricGraph;
use anyhow::Result;
use parallel_frontier::Frontier;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::atomic::Ordering;
use sux::bits::AtomicBitVec;

/// Non-aggregated single-locale level visit.
///
/// The reference implementation: the same frontier-by-frontier shape as
/// the aggregated kernel, but with per-task-safe frontier lists and direct
/// writes to the output — no buffering and no locale hops. The visit ends
/// when no task discovered a new vertex in the current iteration.
pub fn bfs_level_no_agg(
    graph: &VertexCentricGraph,
    source: usize,
    thread_pool: &ThreadPool,
) -> Result<DistVec<i64>> {
    bfs_no_agg(graph, source, thread_pool, |_, v| v)
}

/// Non-aggregated single-locale parent visit.
///
/// See [`bfs_level_no_agg`]; the discovering task writes the predecessor
/// instead of the distance.
pub fn bfs_parent_no_agg(
    graph: &VertexCentricGraph,
    source: usize,
    thread_pool: &ThreadPool,
) -> Result<DistVec<i64>> {
    bfs_no_agg(graph, source, thread_pool, |u, _| u as i64)
}

/// The common shape of the non-aggregated visits; `value` maps the
/// predecessor and the distance of a newly discovered vertex to the entry
/// to write (the source gets `value(source, 0)`).
fn bfs_no_agg(
    graph: &VertexCentricGraph,
    source: usize,
    thread_pool: &ThreadPool,
    value: impl Fn(usize, i64) -> i64 + Sync,
) -> Result<DistVec<i64>> {
    let num_vertices = graph.num_vertices();
    if num_vertices == 0 {
        return Ok(DistVec::from_vec(vec![], graph.num_locales()));
    }
    check_source(graph, source)?;

    let mut output = DistVec::from_elem(-1, num_vertices, graph.num_locales());
    let visited = AtomicBitVec::new(num_vertices);
    let output_view = output.sync_view();

    let mut curr_frontier = Frontier::with_threads(thread_pool, None);
    let mut next_frontier = Frontier::with_threads(thread_pool, None);
    curr_frontier.as_mut()[0] = vec![source];
    visited.set(source, true, Ordering::Relaxed);
    unsafe { output_view.set(source, value(source, 0)) };

    let mut distance = 1_i64;
    while !curr_frontier.is_empty() {
        thread_pool.install(|| {
            curr_frontier
                .par_iter()
                .chunks(DEFAULT_GRANULARITY)
                .for_each(|chunk| {
                    chunk.into_iter().for_each(|&node| {
                        for &succ in graph.neighbors(node) {
                            if !visited.swap(succ, true, Ordering::Relaxed) {
                                unsafe { output_view.set(succ, value(node, distance)) };
                                next_frontier.push(succ);
                            }
                        }
                    })
                })
        });
        distance += 1;
        std::mem::swap(&mut curr_frontier, &mut next_frontier);
        next_frontier.clear();
    }

    drop(output_view);
    Ok(output)
}
