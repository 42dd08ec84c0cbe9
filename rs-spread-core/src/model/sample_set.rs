use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpreadError};
use super::alphabet::{Alphabet, Sequence};
use super::bin_index::BinIndex;
use super::bucket::Bucket;
use super::config::SamplerConfig;
use super::emitter::round_robin;
use super::rebalancer::RebalanceOutcome;

/// Result of a sampling run: the final buckets plus everything needed to
/// interpret or reproduce them.
///
/// Serialized with `postcard` so a run can be inspected later without
/// sampling again.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SampleSet {
	alphabet: Alphabet,
	dimensions: Vec<String>,
	index: BinIndex,
	buckets: Vec<Bucket>,
	config: SamplerConfig,
	seed: u64,
	outcome: RebalanceOutcome,
}

/// Summary of bucket occupancy.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketStats {
	pub bins: usize,
	pub sequences: usize,
	pub min: usize,
	pub max: usize,
	pub mean: f64,
	pub empty: usize,
}

impl SampleSet {
	pub(crate) fn new(
		alphabet: Alphabet,
		dimensions: Vec<String>,
		index: BinIndex,
		buckets: Vec<Bucket>,
		config: SamplerConfig,
		seed: u64,
		outcome: RebalanceOutcome,
	) -> Self {
		Self { alphabet, dimensions, index, buckets, config, seed, outcome }
	}

	/// Loads a snapshot written by `save`.
	///
	/// # Errors
	/// Returns an I/O or snapshot error, or a parse error if the bucket
	/// count does not match the stored grid.
	pub fn load<P: AsRef<Path>>(filepath: P) -> Result<Self> {
		let bytes = std::fs::read(filepath)?;
		let set: SampleSet = postcard::from_bytes(&bytes)?;
		if set.buckets.len() != set.index.total_bins() {
			return Err(SpreadError::Parse(format!(
				"snapshot holds {} buckets for a grid of {} bins",
				set.buckets.len(),
				set.index.total_bins()
			)));
		}
		Ok(set)
	}

	/// Writes the snapshot to `filepath`.
	pub fn save<P: AsRef<Path>>(&self, filepath: P) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(filepath, bytes)?;
		Ok(())
	}

	/// All sequences in round-robin order across buckets.
	pub fn sequences(&self) -> Vec<Sequence> {
		round_robin(self.buckets.iter().map(|b| b.iter().cloned()))
	}

	pub fn stats(&self) -> BucketStats {
		let counts: Vec<usize> = self.buckets.iter().map(Bucket::len).collect();
		let sequences: usize = counts.iter().sum();
		BucketStats {
			bins: counts.len(),
			sequences,
			min: counts.iter().copied().min().unwrap_or(0),
			max: counts.iter().copied().max().unwrap_or(0),
			mean: if counts.is_empty() { 0.0 } else { sequences as f64 / counts.len() as f64 },
			empty: counts.iter().filter(|&&c| c == 0).count(),
		}
	}

	pub fn alphabet(&self) -> &Alphabet {
		&self.alphabet
	}

	pub fn dimensions(&self) -> &[String] {
		&self.dimensions
	}

	pub fn bin_index(&self) -> &BinIndex {
		&self.index
	}

	pub fn buckets(&self) -> &[Bucket] {
		&self.buckets
	}

	pub fn config(&self) -> &SamplerConfig {
		&self.config
	}

	/// Seed actually used for the run (drawn at start if none was configured).
	pub fn seed(&self) -> u64 {
		self.seed
	}

	pub fn outcome(&self) -> &RebalanceOutcome {
		&self.outcome
	}
}

impl fmt::Display for BucketStats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} sequences in {} bins: min {}, max {}, mean {:.2}, {} empty",
			self.sequences, self.bins, self.min, self.max, self.mean, self.empty
		)
	}
}
