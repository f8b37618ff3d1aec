/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Block-distributed arrays and the aggregation machinery built on them.
//!
//! A *locale* is one participant in a distributed run, that is, an
//! address-space boundary. This crate realizes locales as logical partition
//! indices inside one address space: every distributed structure keeps one
//! slot per locale, remote transfers become bulk hand-offs into the
//! destination slot, and the per-locale tasking runtime is a
//! [`rayon::ThreadPool`]. The partitioning, communication and
//! synchronization structure of the algorithms is exactly that of a
//! multi-node run.

pub mod aggregation;
pub mod array;
pub mod block;

pub use aggregation::{AggregationConfig, Aggregator, Sink};
pub use array::{DistVec, SyncDistSlice};
pub use block::BlockDist;
