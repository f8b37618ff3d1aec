/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{check_source, BfsContext, LevelSink, DEFAULT_GRANULARITY};
use crate::dist::{AggregationConfig, Aggregator, DistVec};
use crate::graphs::VertexCentricGraph;
use anyhow::Result;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::atomic::Ordering;

/// Aggregated distributed level visit with the default configuration.
pub fn bfs_level_agg(
    graph: &VertexCentricGraph,
    source: usize,
    thread_pool: &ThreadPool,
) -> Result<DistVec<i64>> {
    bfs_level_agg_with_config(
        graph,
        source,
        thread_pool,
        &AggregationConfig::default(),
        DEFAULT_GRANULARITY,
    )
}

/// Aggregated distributed level visit.
///
/// Every locale consumes its own current frontier in parallel chunks of
/// `granularity` vertices, one [`Aggregator`] per chunk; a dequeued vertex
/// that wins the test-and-set on the visited bitmap gets its level written
/// and pushes every neighbor to the aggregator, directed at the neighbor's
/// owner. The [`LevelSink`] appends arriving ids to the next frontier of
/// the destination locale, duplicates included: deduplication happens at
/// dequeue, on the owner, through the same test-and-set. Levels are
/// separated by a global barrier, so all flushes of one level complete
/// before the next begins; the visit ends when every frontier is empty at
/// the top of an iteration.
pub fn bfs_level_agg_with_config(
    graph: &VertexCentricGraph,
    source: usize,
    thread_pool: &ThreadPool,
    config: &AggregationConfig,
    granularity: usize,
) -> Result<DistVec<i64>> {
    let num_vertices = graph.num_vertices();
    let num_locales = graph.num_locales();
    if num_vertices == 0 {
        return Ok(DistVec::from_vec(vec![], num_locales));
    }
    check_source(graph, source)?;
    let granularity = granularity.max(1);

    let mut ctx = BfsContext::new(num_vertices, num_locales);
    ctx.frontiers.seed(graph.owner_of(source), source);

    let output = ctx.output.sync_view();
    let visited = &ctx.visited;
    let mut distance = 0_i64;
    while ctx.frontiers.cur_len() != 0 {
        let frontiers = &ctx.frontiers;
        let output = &output;
        thread_pool.install(|| {
            (0..num_locales).into_par_iter().for_each(|locale| {
                let mine = frontiers.take_cur(locale);
                let sink = LevelSink { frontiers };
                mine.par_chunks(granularity).for_each(|chunk| {
                    let mut aggregator = Aggregator::new(&sink, num_locales, config);
                    for &u in chunk {
                        if !visited.swap(u, true, Ordering::Relaxed) {
                            unsafe { output.set(u, distance) };
                            for &v in graph.neighbors(u) {
                                aggregator.put(graph.owner_of(v), v);
                            }
                        }
                    }
                    // Dropping the aggregator flushes its buffers.
                });
            });
        });
        // The join above is the global barrier: every flush of this level
        // has been applied.
        ctx.frontiers.advance();
        distance += 1;
    }
    drop(output);
    Ok(ctx.output)
}
