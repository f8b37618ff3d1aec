/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::dist::DistVec;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A recursive-matrix (R-MAT) random arc-list generator.
///
/// The generator places each arc by recursively choosing one of the four
/// quadrants of the adjacency matrix with probabilities `(a, b, c, d)`,
/// producing the power-law degree distributions used by the Graph500
/// benchmark. It is parameterized by the *scale* `S` (the graph has `2^S`
/// vertices) and the *edge factor* (the number of generated arcs per
/// vertex), and it is seeded, so the same parameters always produce the
/// same arc list.
///
/// The output is a raw arc list: two equal-length distributed arrays of
/// external labels, to be fed to
/// [`EdgeCentricGraph::from_arc_arrays`](crate::graphs::EdgeCentricGraph::from_arc_arrays).
/// Duplicate arcs and self-loops are not filtered here; the construction
/// pipeline removes them, so the built graph generally has fewer than
/// `edge_factor · 2^S` edges and may have fewer than `2^S` vertices.
#[derive(Debug, Clone)]
pub struct Rmat {
    scale: u32,
    edge_factor: usize,
    a: f64,
    b: f64,
    c: f64,
    seed: u64,
}

impl Rmat {
    /// Creates a generator with the Graph500 quadrant probabilities
    /// `(0.57, 0.19, 0.19, 0.05)`.
    pub fn new(scale: u32, edge_factor: usize, seed: u64) -> Self {
        Self::with_probabilities(scale, edge_factor, seed, 0.57, 0.19, 0.19)
    }

    /// Creates a generator with quadrant probabilities `(a, b, c)`; the
    /// fourth probability is `1 - a - b - c`.
    ///
    /// # Panics
    ///
    /// If the probabilities are negative or sum beyond one.
    pub fn with_probabilities(
        scale: u32,
        edge_factor: usize,
        seed: u64,
        a: f64,
        b: f64,
        c: f64,
    ) -> Self {
        assert!(
            a >= 0. && b >= 0. && c >= 0. && a + b + c <= 1.,
            "quadrant probabilities must be a sub-distribution"
        );
        Self {
            scale,
            edge_factor,
            a,
            b,
            c,
            seed,
        }
    }

    /// Returns the number of vertices of the adjacency matrix, `2^S`.
    pub fn num_vertices(&self) -> usize {
        1 << self.scale
    }

    /// Returns the number of generated arcs, `edge_factor · 2^S`.
    pub fn num_arcs(&self) -> usize {
        self.edge_factor << self.scale
    }

    /// Generates the arc list over the given number of locales.
    pub fn arc_arrays(&self, num_locales: usize) -> (DistVec<i64>, DistVec<i64>) {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let num_arcs = self.num_arcs();
        let mut src = Vec::with_capacity(num_arcs);
        let mut dst = Vec::with_capacity(num_arcs);
        for _ in 0..num_arcs {
            let mut u = 0_i64;
            let mut v = 0_i64;
            for _ in 0..self.scale {
                let r = rng.gen::<f64>();
                let (row, col) = if r < self.a {
                    (0, 0)
                } else if r < self.a + self.b {
                    (0, 1)
                } else if r < self.a + self.b + self.c {
                    (1, 0)
                } else {
                    (1, 1)
                };
                u = u << 1 | row;
                v = v << 1 | col;
            }
            src.push(u);
            dst.push(v);
        }
        (
            DistVec::from_vec(src, num_locales),
            DistVec::from_vec(dst, num_locales),
        )
    }
}
