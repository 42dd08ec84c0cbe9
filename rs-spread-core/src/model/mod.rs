//! Score-space sampling model.
//!
//! Components, leaf first:
//! - Alphabet and sequences (`Alphabet`, `Sequence`)
//! - Per-symbol scoring (`Scorer`)
//! - Score-space discretization (`BinIndex`)
//! - Random sequence generation (`SequenceGenerator`)
//! - Bucket bookkeeping and rebalancing (`Bucket`, `Rebalancer`)
//! - Output ordering and post-filters (`round_robin`, `DiversityFilter`)
//! - End-to-end runs and their snapshots (`Sampler`, `SampleSet`)

/// Symbol alphabet and fixed-length sequences over it.
pub mod alphabet;

/// Regular grid over the score space, mapping score vectors to bin ids.
pub mod bin_index;

/// Set of sequences assigned to one bin, and the bucket size table.
pub mod bucket;

/// Run parameters and bin-count configuration.
pub mod config;

/// Round-robin interleaving of buckets.
pub mod emitter;

/// Greedy diversity post-filter.
pub mod filter;

/// Random sequence source with optional admissibility predicate.
pub mod generator;

/// Iterative eviction/insertion loop balancing bucket sizes.
pub mod rebalancer;

/// Serializable result of a run.
pub mod sample_set;

/// High-level sampling job.
pub mod sampler;

/// Sum-of-table-values scoring of sequences.
pub mod scorer;

/// Display form of symbols, used only for output.
pub mod symbol_map;
