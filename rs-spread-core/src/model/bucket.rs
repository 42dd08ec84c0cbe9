use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::alphabet::Sequence;

/// Set of sequences currently assigned to one bin.
///
/// Members are kept in a vector (indexable, so an evicted member can be
/// drawn uniformly) plus a position map for O(1) membership and removal.
/// Iteration follows insertion order, perturbed only by swap-removals, so
/// a run is reproducible for a fixed seed.
///
/// ## Invariants
/// - `positions[members[i]] == i` for every member
/// - no duplicate members
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(from = "Vec<Sequence>", into = "Vec<Sequence>")]
pub struct Bucket {
	members: Vec<Sequence>,
	positions: HashMap<Sequence, usize>,
}

impl Bucket {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a sequence. Returns `false` if it was already present.
	pub fn insert(&mut self, sequence: Sequence) -> bool {
		if self.positions.contains_key(&sequence) {
			return false;
		}
		self.positions.insert(sequence.clone(), self.members.len());
		self.members.push(sequence);
		true
	}

	/// Removes and returns a uniformly drawn member.
	///
	/// Returns `None` if the bucket is empty.
	pub fn evict_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Sequence> {
		if self.members.is_empty() {
			return None;
		}
		let i = rng.random_range(0..self.members.len());
		let evicted = self.members.swap_remove(i);
		self.positions.remove(&evicted);
		if let Some(moved) = self.members.get(i) {
			self.positions.insert(moved.clone(), i);
		}
		Some(evicted)
	}

	pub fn contains(&self, sequence: &Sequence) -> bool {
		self.positions.contains_key(sequence)
	}

	pub fn len(&self) -> usize {
		self.members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
		self.members.iter()
	}
}

impl From<Vec<Sequence>> for Bucket {
	fn from(members: Vec<Sequence>) -> Self {
		let mut bucket = Bucket::new();
		for sequence in members {
			bucket.insert(sequence);
		}
		bucket
	}
}

impl From<Bucket> for Vec<Sequence> {
	fn from(bucket: Bucket) -> Self {
		bucket.members
	}
}

/// Bucket sizes kept in step with bucket membership, scanned to find the
/// fullest and emptiest bucket without touching the buckets themselves.
///
/// Ties are broken by table order: the lowest bin id wins.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketCounts {
	counts: Vec<usize>,
}

impl BucketCounts {
	pub fn new(total_bins: usize) -> Self {
		Self { counts: vec![0; total_bins] }
	}

	pub fn increment(&mut self, bin: usize) {
		self.counts[bin] += 1;
	}

	pub fn decrement(&mut self, bin: usize) {
		self.counts[bin] -= 1;
	}

	/// `(count, bin)` of the first bucket holding the maximum count.
	pub fn fullest(&self) -> Option<(usize, usize)> {
		let mut best: Option<(usize, usize)> = None;
		for (bin, &count) in self.counts.iter().enumerate() {
			if best.is_none_or(|(c, _)| count > c) {
				best = Some((count, bin));
			}
		}
		best
	}

	/// `(count, bin)` of the first bucket holding the minimum count.
	pub fn emptiest(&self) -> Option<(usize, usize)> {
		let mut best: Option<(usize, usize)> = None;
		for (bin, &count) in self.counts.iter().enumerate() {
			if best.is_none_or(|(c, _)| count < c) {
				best = Some((count, bin));
			}
		}
		best
	}

	pub fn as_slice(&self) -> &[usize] {
		&self.counts
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn seq(indices: &[u16]) -> Sequence {
		Sequence::from_indices(indices.to_vec())
	}

	#[test]
	fn insert_is_a_set_insert() {
		let mut bucket = Bucket::new();
		assert!(bucket.insert(seq(&[0, 1])));
		assert!(!bucket.insert(seq(&[0, 1])));
		assert!(bucket.insert(seq(&[1, 0])));
		assert_eq!(bucket.len(), 2);
	}

	#[test]
	fn evict_keeps_positions_consistent() {
		let mut rng = StdRng::seed_from_u64(3);
		let mut bucket = Bucket::new();
		for i in 0..50u16 {
			bucket.insert(seq(&[i]));
		}
		let mut evicted = Vec::new();
		while let Some(s) = bucket.evict_random(&mut rng) {
			assert!(!bucket.contains(&s));
			for (i, member) in bucket.iter().enumerate() {
				assert_eq!(bucket.positions[member], i);
			}
			evicted.push(s);
		}
		evicted.sort();
		assert_eq!(evicted, (0..50u16).map(|i| seq(&[i])).collect::<Vec<_>>());
		assert!(bucket.evict_random(&mut rng).is_none());
	}

	#[test]
	fn eviction_is_not_biased_to_first_member() {
		let mut rng = StdRng::seed_from_u64(11);
		let mut hits = [0usize; 4];
		for _ in 0..4000 {
			let mut bucket = Bucket::from((0..4u16).map(|i| seq(&[i])).collect::<Vec<_>>());
			let s = bucket.evict_random(&mut rng).unwrap();
			hits[s.symbols()[0] as usize] += 1;
		}
		assert!(hits.iter().all(|&h| h > 800), "{:?}", hits);
	}

	#[test]
	fn counts_break_ties_by_bin_order() {
		let mut counts = BucketCounts::new(4);
		for bin in [1, 1, 3, 3, 2] {
			counts.increment(bin);
		}
		assert_eq!(counts.fullest(), Some((2, 1)));
		assert_eq!(counts.emptiest(), Some((0, 0)));
		counts.increment(0);
		counts.increment(2);
		assert_eq!(counts.emptiest(), Some((1, 0)));
		counts.decrement(1);
		assert_eq!(counts.fullest(), Some((2, 2)));
		assert_eq!(BucketCounts::new(0).fullest(), None);
	}
}
