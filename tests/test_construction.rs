/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use distgraph::prelude::*;
use itertools::Itertools;

fn edge_centric(src: &[i64], dst: &[i64], num_locales: usize) -> Result<EdgeCentricGraph> {
    EdgeCentricGraph::from_arc_arrays(
        &DistVec::from_vec(src.to_vec(), num_locales),
        &DistVec::from_vec(dst.to_vec(), num_locales),
    )
}

/// The tiny graph scenario: a self-loop on 0, duplicate arcs, and labels
/// with gaps.
const TINY_SRC: [i64; 18] = [0, 1, 2, 2, 3, 4, 4, 5, 6, 6, 7, 8, 9, 9, 10, 10, 10, 9];
const TINY_DST: [i64; 18] = [0, 2, 3, 4, 4, 5, 9, 6, 7, 7, 8, 9, 9, 9, 11, 12, 15, 10];

#[test]
fn test_tiny_graph() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    for num_locales in [1, 2, 3, 8] {
        let graph = edge_centric(&TINY_SRC, &TINY_DST, num_locales)?;
        // The only arc of label 0 is a self-loop, so it does not survive
        // renumbering; labels 13 and 14 never occur.
        assert_eq!(graph.num_vertices(), 13);
        assert_eq!(
            graph.vertex_mapper().to_vec(),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 15]
        );
        // 14 undirected edges: the (2, 4) duplicate is merged, the loops
        // on 0 and 9 are dropped.
        assert_eq!(graph.num_arcs(), 28);
        assert_eq!(graph.external_to_internal(0), None);
        assert_eq!(graph.external_to_internal(15), Some(12));
        assert_eq!(graph.internal_to_external(12), 15);

        // Neighbor lists in external labels.
        let externals = |u: usize| {
            graph
                .neighbors(u)
                .map(|v| graph.internal_to_external(v))
                .collect::<Vec<_>>()
        };
        assert_eq!(externals(graph.external_to_internal(2).unwrap()), vec![1, 3, 4]);
        assert_eq!(externals(graph.external_to_internal(4).unwrap()), vec![2, 3, 5, 9]);
        assert_eq!(externals(graph.external_to_internal(9).unwrap()), vec![4, 8, 10]);
        assert_eq!(
            externals(graph.external_to_internal(10).unwrap()),
            vec![9, 11, 12, 15]
        );
    }
    Ok(())
}

#[test]
fn test_csr_properties() -> Result<()> {
    for num_locales in [1, 3, 8] {
        let graph = edge_centric(&TINY_SRC, &TINY_DST, num_locales)?;
        let num_vertices = graph.num_vertices();

        // Density: seg closes over the arc arrays.
        assert_eq!(graph.src().len(), graph.num_arcs());
        assert_eq!(graph.dst().len(), graph.num_arcs());
        assert_eq!(graph.seg().len(), num_vertices + 1);
        assert_eq!(graph.seg()[num_vertices], graph.num_arcs());
        assert_eq!(graph.vertex_mapper().len(), num_vertices);

        // The mapper is strictly increasing.
        assert!(graph
            .vertex_mapper()
            .to_vec()
            .iter()
            .tuple_windows()
            .all(|(a, b)| a < b));

        for u in 0..num_vertices {
            let neighbors = graph.neighbors(u).collect::<Vec<_>>();
            // Sorted, duplicate-free, loop-free.
            assert!(neighbors.iter().tuple_windows().all(|(a, b)| a < b));
            assert!(!neighbors.contains(&u));
            // Symmetry: every arc has its reverse.
            for &v in &neighbors {
                assert!(graph.neighbors(v).contains(&u), "missing arc ({}, {})", v, u);
            }
        }
    }
    Ok(())
}

#[test]
fn test_vertex_centric_agrees() -> Result<()> {
    for num_locales in [1, 2, 5] {
        let edge = edge_centric(&TINY_SRC, &TINY_DST, num_locales)?;
        let vertex = VertexCentricGraph::from_edge_centric(&edge);
        assert_eq!(vertex.num_vertices(), edge.num_vertices());
        assert_eq!(vertex.num_arcs(), edge.num_arcs());
        assert_eq!(vertex.vertex_mapper().to_vec(), edge.vertex_mapper().to_vec());
        for u in 0..edge.num_vertices() {
            assert_eq!(edge.neighbors(u).collect::<Vec<_>>(), vertex.neighbors(u));
            assert!(vertex.owner_of(u) < num_locales);
        }
    }
    Ok(())
}

#[test]
fn test_edge_ranges_and_find_locs() -> Result<()> {
    // A star: the center's neighbor list spans several edge blocks.
    let graph = edge_centric(&[0, 0, 0, 0, 0], &[1, 2, 3, 4, 5], 4)?;
    let center = graph.external_to_internal(0).unwrap();
    let locs = graph.find_locs(center);
    assert!(locs.len() > 1, "the center must span several locales");

    for num_locales in [1, 3, 8] {
        let graph = edge_centric(&TINY_SRC, &TINY_DST, num_locales)?;
        for u in 0..graph.num_vertices() {
            let locs = graph.find_locs(u);
            // find_locs returns exactly the locales holding a portion of
            // u's list, and the portions are consecutive and complete.
            for locale in 0..num_locales {
                assert_eq!(
                    locs.contains(&locale),
                    !graph.neighbors_in_block(u, locale).is_empty()
                );
            }
            let gathered: Vec<usize> = locs
                .iter()
                .flat_map(|&locale| graph.neighbors_in_block(u, locale).to_vec())
                .collect();
            assert_eq!(gathered, graph.neighbors(u).collect::<Vec<_>>());
        }
    }
    Ok(())
}

#[test]
fn test_empty_graphs() -> Result<()> {
    let graph = edge_centric(&[], &[], 3)?;
    assert_eq!(graph.num_vertices(), 0);
    assert_eq!(graph.num_arcs(), 0);
    assert_eq!(graph.seg().to_vec(), vec![0]);

    // A graph whose arcs are all self-loops is empty as well.
    let graph = edge_centric(&[7, 7], &[7, 7], 2)?;
    assert_eq!(graph.num_vertices(), 0);
    let vertex = VertexCentricGraph::from_edge_centric(&graph);
    assert_eq!(vertex.num_vertices(), 0);
    Ok(())
}

#[test]
fn test_mismatched_inputs() {
    let src = DistVec::from_vec(vec![0_i64, 1], 2);
    let dst = DistVec::from_vec(vec![1_i64], 2);
    assert!(EdgeCentricGraph::from_arc_arrays(&src, &dst).is_err());
}

#[test]
fn test_matrix_market_end_to_end() -> Result<()> {
    let input = "%%MatrixMarket matrix coordinate real general\n\
                 % a 4-cycle with weights\n\
                 4 4 4\n\
                 1 2 0.5\n\
                 2 3 0.25\n\
                 3 4 1.0\n\
                 4 1 1.0\n";
    let (src, dst) = parse_matrix_market(input.as_bytes(), 2)?;
    let graph = EdgeCentricGraph::from_arc_arrays(&src, &dst)?;
    assert_eq!(graph.num_vertices(), 4);
    assert_eq!(graph.num_arcs(), 8);
    assert_eq!(
        graph.neighbors(graph.external_to_internal(1).unwrap()).collect::<Vec<_>>(),
        vec![
            graph.external_to_internal(2).unwrap(),
            graph.external_to_internal(4).unwrap()
        ]
    );
    Ok(())
}
