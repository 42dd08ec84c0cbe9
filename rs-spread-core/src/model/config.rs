use serde::{Deserialize, Serialize};

use crate::error::{Result, SpreadError};

/// Number of bins per score dimension.
///
/// # Variants
/// - `Uniform(k)`: `k` bins in every dimension.
/// - `PerDimension(v)`: `v[d]` bins in dimension `d`; `v` must have one
///   entry per scoring table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum BinCounts {
	Uniform(usize),
	PerDimension(Vec<usize>),
}

impl BinCounts {
	/// Expands the configuration to one bin count per dimension.
	///
	/// # Errors
	/// Returns a configuration error on a zero count or when a per-dimension
	/// list does not have exactly `dimensions` entries.
	pub fn resolve(&self, dimensions: usize) -> Result<Vec<usize>> {
		let bins = match self {
			BinCounts::Uniform(k) => vec![*k; dimensions],
			BinCounts::PerDimension(v) => {
				if v.len() != dimensions {
					return Err(SpreadError::Config(format!(
						"{} bin counts given for {} score dimensions",
						v.len(),
						dimensions
					)));
				}
				v.clone()
			}
		};
		if bins.iter().any(|&k| k == 0) {
			return Err(SpreadError::Config("bin counts must be positive".to_owned()));
		}
		Ok(bins)
	}
}

/// Run parameters of a sampling job.
///
/// # Invariants (checked by `validate`)
/// - `length`, `target_count`, `pool_size`, `max_iterations` and
///   `check_interval` are strictly positive
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SamplerConfig {
	/// Number of symbols per sequence (L).
	pub length: usize,

	/// Number of output sequences wanted (n). Only used to derive the
	/// per-bin target `n / total_bins`.
	pub target_count: usize,

	/// Number of random draws for the initial pool (S).
	pub pool_size: usize,

	/// Maximum number of rebalancing iterations (M).
	pub max_iterations: usize,

	/// Bin grid configuration.
	pub bins: BinCounts,

	/// Seed of the random source. `None` draws one at start.
	pub seed: Option<u64>,

	/// Convergence is checked every `check_interval` iterations.
	pub check_interval: usize,
}

impl Default for SamplerConfig {
	fn default() -> Self {
		Self {
			length: 10,
			target_count: 1000,
			pool_size: 100_000,
			max_iterations: 1_000_000,
			bins: BinCounts::Uniform(10),
			seed: None,
			check_interval: 1000,
		}
	}
}

impl SamplerConfig {
	/// Checks every scalar parameter.
	///
	/// # Errors
	/// Returns a configuration error naming the first invalid parameter.
	pub fn validate(&self) -> Result<()> {
		let checks = [
			("length", self.length),
			("target_count", self.target_count),
			("pool_size", self.pool_size),
			("max_iterations", self.max_iterations),
			("check_interval", self.check_interval),
		];
		for (name, value) in checks {
			if value == 0 {
				return Err(SpreadError::Config(format!("{} must be positive", name)));
			}
		}
		if let BinCounts::Uniform(0) = self.bins {
			return Err(SpreadError::Config("bin counts must be positive".to_owned()));
		}
		Ok(())
	}

	/// Minimum count every bucket should reach: `target_count / total_bins`
	/// (integer division).
	pub fn target_per_bin(&self, total_bins: usize) -> usize {
		if total_bins == 0 { 0 } else { self.target_count / total_bins }
	}
}
