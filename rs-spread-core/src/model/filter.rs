use crate::error::{Result, SpreadError};
use super::alphabet::Sequence;
use super::scorer::ScoreVector;

/// Greedy diversity selection over scored sequences.
///
/// Visits the pool in order of the first score dimension and keeps a
/// sequence only if `too_close` is false against every sequence kept so
/// far. Kept sequences are returned in their input order, so an
/// interleaved (round-robin) pool stays interleaved. The result is a
/// greedy approximation, not an optimal subset.
pub fn greedy_diverse<F>(pool: Vec<(Sequence, ScoreVector)>, too_close: F) -> Vec<(Sequence, ScoreVector)>
where
	F: Fn(&[f64], &[f64]) -> bool,
{
	let mut visit: Vec<usize> = (0..pool.len()).collect();
	visit.sort_by(|&a, &b| {
		let left = pool[a].1.first().copied().unwrap_or(0.0);
		let right = pool[b].1.first().copied().unwrap_or(0.0);
		left.total_cmp(&right)
	});

	let mut kept = vec![false; pool.len()];
	let mut accepted: Vec<usize> = Vec::new();
	for i in visit {
		if accepted.iter().all(|&j| !too_close(&pool[j].1, &pool[i].1)) {
			accepted.push(i);
			kept[i] = true;
		}
	}

	pool.into_iter()
		.zip(kept)
		.filter_map(|(item, keep)| keep.then_some(item))
		.collect()
}

/// Distance-threshold filter: two sequences are too close when the
/// Euclidean distance between their (optionally rescaled) score vectors
/// is below `min_distance`.
#[derive(Clone, Debug, PartialEq)]
pub struct DiversityFilter {
	min_distance: f64,
	scale: Option<Vec<f64>>,
}

impl DiversityFilter {
	/// # Errors
	/// Returns a configuration error if `min_distance` is negative or not
	/// finite.
	pub fn new(min_distance: f64) -> Result<Self> {
		if !min_distance.is_finite() || min_distance < 0.0 {
			return Err(SpreadError::Config(format!(
				"minimum distance must be a finite, non-negative number, got {}",
				min_distance
			)));
		}
		Ok(Self { min_distance, scale: None })
	}

	/// Divides dimension `d` by `scale[d]` before measuring distances, so
	/// dimensions with very different ranges weigh the same.
	pub fn with_scale(mut self, scale: Vec<f64>) -> Self {
		self.scale = Some(scale);
		self
	}

	pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
		a.iter()
			.zip(b)
			.enumerate()
			.map(|(d, (x, y))| {
				let s = self.scale.as_ref().and_then(|s| s.get(d)).copied().unwrap_or(1.0);
				let delta = (x - y) / s;
				delta * delta
			})
			.sum::<f64>()
			.sqrt()
	}

	pub fn apply(&self, pool: Vec<(Sequence, ScoreVector)>) -> Vec<(Sequence, ScoreVector)> {
		greedy_diverse(pool, |a, b| self.distance(a, b) < self.min_distance)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scored(id: u16, score: &[f64]) -> (Sequence, ScoreVector) {
		(Sequence::from_indices(vec![id]), score.to_vec())
	}

	#[test]
	fn keeps_points_far_enough_apart() {
		let pool = vec![
			scored(0, &[3.0, 0.0]),
			scored(1, &[0.0, 0.0]),
			scored(2, &[0.5, 0.0]),
			scored(3, &[1.2, 0.0]),
		];
		let kept = DiversityFilter::new(1.0).unwrap().apply(pool);
		let ids: Vec<u16> = kept.iter().map(|(s, _)| s.symbols()[0]).collect();
		assert_eq!(ids, vec![0, 1, 3]);
	}

	#[test]
	fn kept_set_is_pairwise_separated() {
		let pool: Vec<_> = (0..200u16)
			.map(|i| scored(i, &[(i as f64 * 0.37) % 10.0, (i as f64 * 0.91) % 7.0]))
			.collect();
		let filter = DiversityFilter::new(1.5).unwrap();
		let kept = filter.apply(pool);
		for (i, a) in kept.iter().enumerate() {
			for b in &kept[i + 1..] {
				assert!(filter.distance(&a.1, &b.1) >= 1.5);
			}
		}
	}

	#[test]
	fn scale_normalizes_dimensions() {
		let filter = DiversityFilter::new(1.0).unwrap().with_scale(vec![1.0, 100.0]);
		assert!((filter.distance(&[0.0, 0.0], &[0.0, 50.0]) - 0.5).abs() < 1e-12);
	}

	#[test]
	fn custom_predicate() {
		let pool = vec![scored(0, &[1.0]), scored(1, &[1.0]), scored(2, &[2.0])];
		let kept = greedy_diverse(pool, |a, b| a == b);
		assert_eq!(kept.len(), 2);
	}

	#[test]
	fn kept_items_keep_input_order() {
		let pool = vec![
			scored(0, &[9.0]),
			scored(1, &[1.0]),
			scored(2, &[5.0]),
			scored(3, &[1.1]),
			scored(4, &[0.0]),
		];
		let kept = DiversityFilter::new(0.5).unwrap().apply(pool.clone());
		let ids: Vec<u16> = kept.iter().map(|(s, _)| s.symbols()[0]).collect();
		assert_eq!(ids, vec![0, 1, 2, 4]);

		let everything = DiversityFilter::new(0.0).unwrap().apply(pool.clone());
		assert_eq!(everything, pool);
	}

	#[test]
	fn rejects_invalid_distances() {
		assert!(matches!(DiversityFilter::new(f64::NAN), Err(SpreadError::Config(_))));
		assert!(DiversityFilter::new(-0.1).is_err());
		assert!(DiversityFilter::new(f64::INFINITY).is_err());
		assert!(DiversityFilter::new(0.0).is_ok());
	}
}
