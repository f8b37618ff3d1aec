/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{check_source, BfsContext, ParentSink, DEFAULT_GRANULARITY};
use crate::dist::{AggregationConfig, Aggregator, DistVec};
use crate::graphs::VertexCentricGraph;
use anyhow::Result;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::atomic::Ordering;

/// Aggregated distributed parent visit with the default configuration.
pub fn bfs_parent_agg(
    graph: &VertexCentricGraph,
    source: usize,
    thread_pool: &ThreadPool,
) -> Result<DistVec<i64>> {
    bfs_parent_agg_with_config(
        graph,
        source,
        thread_pool,
        &AggregationConfig::default(),
        DEFAULT_GRANULARITY,
    )
}

/// Aggregated distributed parent visit.
///
/// Differs from the [level visit](super::bfs_level_agg_with_config) in
/// where deduplication happens: the payload is the `(child, parent)` pair,
/// and the inner loop emits one pair per outgoing arc *unconditionally* —
/// the atomic test-and-set in the [`ParentSink`], running on the child's
/// owner, elects the single winner that writes the parent entry and
/// enqueues the child. Dequeued frontier vertices are therefore already
/// unique and need no local check. The source is marked visited, and made
/// its own parent, before the first iteration.
pub fn bfs_parent_agg_with_config(
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
    ctx.visited.set(source, true, Ordering::Relaxed);
    ctx.output.set(source, source as i64);
    ctx.frontiers.seed(graph.owner_of(source), source);

    let parents = ctx.output.sync_view();
    let visited = &ctx.visited;
    while ctx.frontiers.cur_len() != 0 {
        let frontiers = &ctx.frontiers;
        let parents = &parents;
        thread_pool.install(|| {
            (0..num_locales).into_par_iter().for_each(|locale| {
                let mine = frontiers.take_cur(locale);
                let sink = ParentSink {
                    visited,
                    parents,
                    frontiers,
                };
                mine.par_chunks(granularity).for_each(|chunk| {
                    let mut aggregator = Aggregator::new(&sink, num_locales, config);
                    for &u in chunk {
                        for &v in graph.neighbors(u) {
                            aggregator.put(graph.owner_of(v), (v, u));
                        }
                    }
                });
            });
        });
        ctx.frontiers.advance();
    }
    drop(parents);
    Ok(ctx.output)
}
