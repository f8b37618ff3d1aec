/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Distributed graph representations.
//!
//! Graphs are built once and then only read. The two views of the same
//! graph differ in how arcs are partitioned, and hence in the cost model of
//! a breadth-first visit: the [edge-centric view](EdgeCentricGraph)
//! partitions the CSR arrays by edge, the [vertex-centric
//! view](VertexCentricGraph) partitions whole neighbor lists by vertex.

pub mod edge_centric;
pub mod random;
pub mod vertex_centric;

pub use edge_centric::{EdgeCentricGraph, LocaleEdgeRange};
pub use random::Rmat;
pub use vertex_centric::VertexCentricGraph;
