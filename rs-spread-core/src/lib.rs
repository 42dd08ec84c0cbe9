//! Uniform score-space sampling of random symbol sequences.
//!
//! Random sequences (amino acids, codons...) naturally pile up around the
//! mean of any additive score. This crate draws a large pool, bins it on
//! a grid over the score space, then keeps replacing members of the
//! fullest bins with fresh draws until every bin is populated:
//! - Additive multi-table scoring
//! - Multi-dimensional binning with clipping
//! - Seeded, reproducible rebalancing
//! - Round-robin output ordering and an optional diversity filter

/// Sampling model: scoring, binning, generation, rebalancing.
pub mod model;

/// Error type and `Result` alias.
pub mod error;

/// Table and symbol-list loading, output writing, path helpers.
///
/// Not exposed; the loaders and writers the binary needs are re-exported.
pub(crate) mod io;

pub use error::{Result, SpreadError};
pub use io::{build_output_path, read_mapping, read_symbols, read_table, with_suffix, write_lines};
