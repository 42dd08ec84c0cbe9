use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use super::alphabet::{Alphabet, Sequence};
use super::bin_index::BinIndex;
use super::rebalancer::Rebalancer;
use super::sample_set::SampleSet;
use super::config::SamplerConfig;
use super::scorer::{Scorer, ScoringTable};

/// Output of `Sampler::run`.
#[derive(Debug)]
pub struct SampleRun {
	/// Final, rebalanced sample.
	pub set: SampleSet,
	/// Initial pool in round-robin order, when requested.
	pub initial: Option<Vec<Sequence>>,
}

/// End-to-end sampling job: build the pool, rebalance it, package the
/// result.
///
/// # Behavior
/// - Every configuration error is raised by `new`, before any sampling.
/// - All randomness comes from one `StdRng` seeded from `config.seed`,
///   or from a seed drawn at start (and logged) when none is set.
#[derive(Debug)]
pub struct Sampler {
	scorer: Scorer,
	config: SamplerConfig,
	keep_initial: bool,
}

impl Sampler {
	/// Validates the configuration and resolves the scoring tables.
	///
	/// # Errors
	/// Returns a configuration error on invalid parameters, tables missing
	/// a symbol, mismatched bin counts, or degenerate score-space bounds.
	pub fn new(alphabet: &Alphabet, tables: &[ScoringTable], config: SamplerConfig) -> Result<Self> {
		config.validate()?;
		let scorer = Scorer::new(alphabet, tables)?;
		// Surfaces grid errors (bin count mismatch, degenerate bounds) now
		let (min, max) = scorer.bounds(config.length);
		BinIndex::new(min, max, &config.bins)?;
		Ok(Self { scorer, config, keep_initial: false })
	}

	/// Also return the initial pool, before rebalancing.
	pub fn keep_initial_pool(mut self, keep: bool) -> Self {
		self.keep_initial = keep;
		self
	}

	pub fn scorer(&self) -> &Scorer {
		&self.scorer
	}

	/// Runs the job.
	pub fn run(&self) -> Result<SampleRun> {
		let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
		info!("Sampling with seed {}", seed);

		let rng = StdRng::seed_from_u64(seed);
		let mut rebalancer = Rebalancer::new(self.scorer.clone(), &self.config, rng)?;
		rebalancer.fill(self.config.pool_size)?;
		let initial = self.keep_initial.then(|| rebalancer.emit());

		let outcome = rebalancer.run(self.config.max_iterations)?;
		if !outcome.converged {
			warn!(
				"Iteration budget exhausted: emptiest bucket holds {} of {} wanted",
				outcome.min_count,
				rebalancer.target_per_bin()
			);
		}

		let (scorer, index, buckets) = rebalancer.into_parts();
		let set = SampleSet::new(
			scorer.alphabet().clone(),
			scorer.dimension_names().to_vec(),
			index,
			buckets,
			self.config.clone(),
			seed,
			outcome,
		);
		Ok(SampleRun { set, initial })
	}
}
