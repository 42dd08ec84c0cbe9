use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use super::alphabet::Sequence;
use super::bin_index::BinIndex;
use super::bucket::{Bucket, BucketCounts};
use super::config::SamplerConfig;
use super::emitter::round_robin;
use super::generator::SequenceGenerator;
use super::scorer::Scorer;

/// How a rebalancing run ended.
///
/// Running out of iterations is a normal end state: `converged` tells the
/// caller whether every bucket reached the per-bin target.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RebalanceOutcome {
	/// Number of evict/insert steps performed.
	pub iterations: usize,
	/// Whether the emptiest bucket reached the target.
	pub converged: bool,
	/// Smallest bucket size at the end of the run.
	pub min_count: usize,
	/// Largest bucket size at the end of the run.
	pub max_count: usize,
}

/// Score-space binning with iterative rebalancing.
///
/// Holds a pool of sequences partitioned into buckets (one per bin of the
/// score-space grid) and repeatedly moves mass from the fullest bucket to
/// wherever a freshly drawn sequence lands, until every bucket reaches
/// `target_per_bin` or the iteration budget runs out.
///
/// # Invariants
/// - `counts.as_slice()[b] == buckets[b].len()` for every bin `b`
/// - a sequence lives in the bucket of the bin its score maps to
pub struct Rebalancer<R: Rng> {
	scorer: Scorer,
	index: BinIndex,
	generator: SequenceGenerator,
	buckets: Vec<Bucket>,
	counts: BucketCounts,
	target_per_bin: usize,
	check_interval: usize,
	rng: R,
}

impl<R: Rng> Rebalancer<R> {
	/// Computes the score-space bounds for `config.length` and builds the
	/// bin grid over them. Buckets start empty.
	///
	/// # Errors
	/// Returns a configuration error for invalid parameters, a bin
	/// configuration that does not match the scorer dimensions, or
	/// degenerate bounds (every symbol scores the same in some table).
	pub fn new(scorer: Scorer, config: &SamplerConfig, rng: R) -> Result<Self> {
		config.validate()?;

		let (min, max) = scorer.bounds(config.length);
		let index = BinIndex::new(min, max, &config.bins)?;
		let generator = SequenceGenerator::new(scorer.alphabet(), config.length)?;
		let total = index.total_bins();
		let target_per_bin = config.target_per_bin(total);

		info!(
			"Score space {:?}: min {:?}, max {:?}, {} bins ({:?}), target {} per bin",
			scorer.dimension_names(),
			index.min(),
			index.max(),
			total,
			index.bins(),
			target_per_bin
		);

		Ok(Self {
			scorer,
			index,
			generator,
			buckets: (0..total).map(|_| Bucket::new()).collect(),
			counts: BucketCounts::new(total),
			target_per_bin,
			check_interval: config.check_interval,
			rng,
		})
	}

	/// Scores and bins a sequence, then adds it to its bucket.
	///
	/// Returns the bin id. A sequence already in the pool is not counted
	/// twice.
	pub fn insert(&mut self, sequence: Sequence) -> Result<usize> {
		let score = self.scorer.score(&sequence)?;
		let bin = self.index.index(&score)?;
		if self.buckets[bin].insert(sequence) {
			self.counts.increment(bin);
		}
		Ok(bin)
	}

	/// Draws `pool_size` random sequences into the buckets.
	///
	/// Returns the effective pool size, which is smaller than `pool_size`
	/// when duplicates were drawn.
	pub fn fill(&mut self, pool_size: usize) -> Result<usize> {
		for _ in 0..pool_size {
			let sequence = self.generator.draw(&mut self.rng)?;
			self.insert(sequence)?;
		}
		let effective = self.pool_size();
		info!("Initial pool: {} distinct sequences out of {} draws", effective, pool_size);
		Ok(effective)
	}

	/// Removes a uniformly drawn member of the fullest bucket (lowest bin
	/// id on ties).
	///
	/// Returns `None` when every bucket is empty.
	pub fn evict_fullest(&mut self) -> Option<(usize, Sequence)> {
		let (count, bin) = self.counts.fullest()?;
		if count == 0 {
			return None;
		}
		let evicted = self.buckets[bin].evict_random(&mut self.rng)?;
		self.counts.decrement(bin);
		Some((bin, evicted))
	}

	/// One rebalancing step: evict from the fullest bucket, then insert a
	/// fresh random sequence wherever it lands.
	pub fn step(&mut self) -> Result<()> {
		self.evict_fullest();
		let fresh = self.generator.draw(&mut self.rng)?;
		self.insert(fresh)?;
		Ok(())
	}

	/// Whether the emptiest bucket holds at least `target_per_bin` sequences.
	pub fn is_converged(&self) -> bool {
		self.counts.emptiest().is_none_or(|(count, _)| count >= self.target_per_bin)
	}

	/// Rebalances for at most `max_iterations` steps.
	///
	/// Convergence is checked before the first step and then every
	/// `check_interval` steps; the run stops early once it holds.
	pub fn run(&mut self, max_iterations: usize) -> Result<RebalanceOutcome> {
		let mut iterations = 0;
		while iterations < max_iterations {
			if iterations % self.check_interval == 0 {
				debug!(
					"Iteration {}: min {} / max {} per bucket",
					iterations,
					self.min_count(),
					self.max_count()
				);
				if self.is_converged() {
					break;
				}
			}
			self.step()?;
			iterations += 1;
		}

		let outcome = RebalanceOutcome {
			iterations,
			converged: self.is_converged(),
			min_count: self.min_count(),
			max_count: self.max_count(),
		};
		info!(
			"Rebalancing stopped after {} iterations (converged: {}, min {}, max {})",
			outcome.iterations, outcome.converged, outcome.min_count, outcome.max_count
		);
		Ok(outcome)
	}

	/// Every pooled sequence, interleaved across buckets in bin order.
	pub fn emit(&self) -> Vec<Sequence> {
		round_robin(self.buckets.iter().map(|b| b.iter().cloned()))
	}

	pub fn buckets(&self) -> &[Bucket] {
		&self.buckets
	}

	/// Bucket sizes, indexed by bin id.
	pub fn counts(&self) -> &[usize] {
		self.counts.as_slice()
	}

	pub fn bin_index(&self) -> &BinIndex {
		&self.index
	}

	pub fn scorer(&self) -> &Scorer {
		&self.scorer
	}

	pub fn target_per_bin(&self) -> usize {
		self.target_per_bin
	}

	/// Number of sequences currently pooled.
	pub fn pool_size(&self) -> usize {
		self.counts.as_slice().iter().sum()
	}

	fn min_count(&self) -> usize {
		self.counts.emptiest().map_or(0, |(count, _)| count)
	}

	fn max_count(&self) -> usize {
		self.counts.fullest().map_or(0, |(count, _)| count)
	}

	/// Releases the buckets and grid.
	pub fn into_parts(self) -> (Scorer, BinIndex, Vec<Bucket>) {
		(self.scorer, self.index, self.buckets)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::alphabet::Alphabet;
	use crate::model::config::BinCounts;
	use crate::model::scorer::ScoringTable;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn two_letter_scorer() -> Scorer {
		let abc = Alphabet::new(vec!["A".into(), "B".into()]).unwrap();
		Scorer::new(&abc, &[ScoringTable::from_pairs("value", [("A", 1.0), ("B", 2.0)])]).unwrap()
	}

	fn config(length: usize, bins: usize) -> SamplerConfig {
		SamplerConfig {
			length,
			target_count: 10,
			pool_size: 100,
			max_iterations: 1000,
			bins: BinCounts::Uniform(bins),
			seed: Some(0),
			check_interval: 10,
		}
	}

	fn parse(scorer: &Scorer, text: &str) -> Sequence {
		let symbols: Vec<String> = text.chars().map(|c| c.to_string()).collect();
		scorer.alphabet().parse(&symbols).unwrap()
	}

	fn check_counts<R: Rng>(rebalancer: &Rebalancer<R>) {
		for (bucket, &count) in rebalancer.buckets().iter().zip(rebalancer.counts()) {
			assert_eq!(bucket.len(), count);
		}
	}

	#[test]
	fn pool_bins_by_score() {
		let scorer = two_letter_scorer();
		let mut rebalancer = Rebalancer::new(scorer.clone(), &config(2, 2), StdRng::seed_from_u64(0)).unwrap();
		for text in ["AA", "AA", "BB", "AB"] {
			rebalancer.insert(parse(&scorer, text)).unwrap();
		}
		assert_eq!(rebalancer.counts(), &[1, 2]);
		assert!(rebalancer.buckets()[0].contains(&parse(&scorer, "AA")));
		assert!(rebalancer.buckets()[1].contains(&parse(&scorer, "BB")));
		assert!(rebalancer.buckets()[1].contains(&parse(&scorer, "AB")));
		assert_eq!(rebalancer.insert(parse(&scorer, "BA")).unwrap(), 1);
	}

	#[test]
	fn evicts_from_fullest_and_inserts_where_fresh_lands() {
		let scorer = two_letter_scorer();
		let mut rebalancer = Rebalancer::new(scorer.clone(), &config(2, 2), StdRng::seed_from_u64(5)).unwrap();
		for text in ["AA", "BB", "AB"] {
			rebalancer.insert(parse(&scorer, text)).unwrap();
		}
		let (bin, evicted) = rebalancer.evict_fullest().unwrap();
		assert_eq!(bin, 1);
		assert!(evicted == parse(&scorer, "BB") || evicted == parse(&scorer, "AB"));
		assert_eq!(rebalancer.counts(), &[1, 1]);
		check_counts(&rebalancer);
	}

	#[test]
	fn never_evicts_from_empty_pool() {
		let mut rebalancer = Rebalancer::new(two_letter_scorer(), &config(2, 2), StdRng::seed_from_u64(1)).unwrap();
		assert!(rebalancer.evict_fullest().is_none());
		rebalancer.step().unwrap();
		assert_eq!(rebalancer.pool_size(), 1);
	}

	#[test]
	fn run_keeps_counts_in_sync_and_pool_bounded() {
		let scorer = two_letter_scorer();
		let mut rebalancer = Rebalancer::new(scorer, &config(12, 6), StdRng::seed_from_u64(9)).unwrap();
		let effective = rebalancer.fill(500).unwrap();
		assert!(effective <= 500);
		rebalancer.run(2000).unwrap();
		check_counts(&rebalancer);
		assert!(rebalancer.pool_size() <= effective);
	}

	#[test]
	fn stops_early_once_converged() {
		let scorer = two_letter_scorer();
		let mut cfg = config(8, 3);
		cfg.target_count = 3;
		let mut rebalancer = Rebalancer::new(scorer, &cfg, StdRng::seed_from_u64(2)).unwrap();
		rebalancer.fill(300).unwrap();
		let outcome = rebalancer.run(100_000).unwrap();
		assert!(outcome.converged);
		assert!(outcome.iterations < 100_000);
		assert_eq!(outcome.iterations % cfg.check_interval, 0);
		assert!(outcome.min_count >= 1);
	}

	#[test]
	fn non_convergence_is_not_an_error() {
		let scorer = two_letter_scorer();
		let mut cfg = config(4, 3);
		cfg.target_count = 1_000_000;
		let mut rebalancer = Rebalancer::new(scorer, &cfg, StdRng::seed_from_u64(3)).unwrap();
		rebalancer.fill(50).unwrap();
		let outcome = rebalancer.run(200).unwrap();
		assert!(!outcome.converged);
		assert_eq!(outcome.iterations, 200);
	}

	#[test]
	fn rebalancing_narrows_the_spread() {
		let abc = Alphabet::new(vec!["A".into(), "B".into(), "C".into(), "D".into()]).unwrap();
		let table = ScoringTable::from_pairs("value", [("A", 0.0), ("B", 1.0), ("C", 2.0), ("D", 3.0)]);
		let scorer = Scorer::new(&abc, &[table]).unwrap();
		let mut cfg = config(10, 5);
		cfg.target_count = 1_000_000;
		let mut rebalancer = Rebalancer::new(scorer, &cfg, StdRng::seed_from_u64(17)).unwrap();
		rebalancer.fill(4000).unwrap();
		let before = rebalancer.max_count() - rebalancer.min_count();
		rebalancer.run(20_000).unwrap();
		let after = rebalancer.max_count() - rebalancer.min_count();
		assert!(after < before, "spread {} -> {}", before, after);
	}

	#[test]
	fn degenerate_table_is_rejected_before_sampling() {
		let abc = Alphabet::new(vec!["A".into(), "B".into()]).unwrap();
		let flat = ScoringTable::from_pairs("flat", [("A", 1.0), ("B", 1.0)]);
		let scorer = Scorer::new(&abc, &[flat]).unwrap();
		assert!(Rebalancer::new(scorer, &config(3, 2), StdRng::seed_from_u64(0)).is_err());
	}

	#[test]
	fn mismatched_bins_are_rejected() {
		let mut cfg = config(3, 2);
		cfg.bins = BinCounts::PerDimension(vec![2, 2]);
		assert!(Rebalancer::new(two_letter_scorer(), &cfg, StdRng::seed_from_u64(0)).is_err());
	}

	#[test]
	fn emit_returns_every_pooled_sequence_once() {
		let scorer = two_letter_scorer();
		let mut rebalancer = Rebalancer::new(scorer, &config(6, 4), StdRng::seed_from_u64(4)).unwrap();
		rebalancer.fill(100).unwrap();
		let mut emitted = rebalancer.emit();
		assert_eq!(emitted.len(), rebalancer.pool_size());
		emitted.sort();
		emitted.dedup();
		assert_eq!(emitted.len(), rebalancer.pool_size());
	}
}
