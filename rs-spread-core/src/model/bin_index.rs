use serde::{Deserialize, Serialize};

use crate::error::{Result, SpreadError};
use super::config::BinCounts;

/// Regular grid over a bounded score space.
///
/// Maps a score vector to a flat bin id in `[0, total_bins)`. Coordinates
/// outside `[min, max]` are clipped to the nearest border bin. Flattening
/// is row-major: the last dimension varies fastest.
///
/// # Invariants
/// - `min`, `max`, `bins` have the same, non-zero length
/// - `min[d] < max[d]` and both are finite
/// - `bins[d] > 0`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "GridSpec", into = "GridSpec")]
pub struct BinIndex {
	min: Vec<f64>,
	max: Vec<f64>,
	bins: Vec<usize>,
	strides: Vec<usize>,
	total: usize,
}

impl BinIndex {
	/// Builds the grid.
	///
	/// # Errors
	/// Returns a configuration error if the bounds and bin counts disagree
	/// on dimensionality, if a bound is not finite, if `min[d] >= max[d]`
	/// in some dimension, or if the total bin count overflows.
	pub fn new(min: Vec<f64>, max: Vec<f64>, bins: &BinCounts) -> Result<Self> {
		if min.is_empty() {
			return Err(SpreadError::Config("score space has no dimension".to_owned()));
		}
		if min.len() != max.len() {
			return Err(SpreadError::Config(format!(
				"minimum has {} dimensions but maximum has {}",
				min.len(),
				max.len()
			)));
		}
		let bins = bins.resolve(min.len())?;

		for (d, (lo, hi)) in min.iter().zip(&max).enumerate() {
			if !lo.is_finite() || !hi.is_finite() {
				return Err(SpreadError::Config(format!("non-finite bounds in dimension {}", d)));
			}
			if lo >= hi {
				return Err(SpreadError::Config(format!(
					"degenerate bounds in dimension {}: min {} is not below max {}",
					d, lo, hi
				)));
			}
		}

		let mut strides = vec![1usize; bins.len()];
		let mut total = 1usize;
		for d in (0..bins.len()).rev() {
			strides[d] = total;
			total = total
				.checked_mul(bins[d])
				.ok_or_else(|| SpreadError::Config("total bin count overflows".to_owned()))?;
		}

		Ok(Self { min, max, bins, strides, total })
	}

	/// Total number of bins (product of per-dimension counts).
	pub fn total_bins(&self) -> usize {
		self.total
	}

	/// Per-dimension bin counts.
	pub fn bins(&self) -> &[usize] {
		&self.bins
	}

	pub fn min(&self) -> &[f64] {
		&self.min
	}

	pub fn max(&self) -> &[f64] {
		&self.max
	}

	/// Maps a score vector to its flat bin id.
	///
	/// Per dimension: `floor(bins * (x - min) / (max - min))`, clipped to
	/// `[0, bins - 1]`.
	///
	/// # Errors
	/// Returns a configuration error if `x` has the wrong dimensionality or
	/// holds a NaN.
	pub fn index(&self, x: &[f64]) -> Result<usize> {
		if x.len() != self.bins.len() {
			return Err(SpreadError::Config(format!(
				"score vector has {} dimensions, grid has {}",
				x.len(),
				self.bins.len()
			)));
		}

		let mut id = 0;
		for d in 0..self.bins.len() {
			let value = x[d];
			if value.is_nan() {
				return Err(SpreadError::Config(format!("NaN score in dimension {}", d)));
			}
			let span = self.max[d] - self.min[d];
			let raw = (self.bins[d] as f64 * (value - self.min[d]) / span).floor();
			let coordinate = raw.clamp(0.0, (self.bins[d] - 1) as f64) as usize;
			id += coordinate * self.strides[d];
		}
		Ok(id)
	}

	/// Inverse of the flattening: per-dimension coordinates of a bin id.
	pub fn coordinates(&self, id: usize) -> Vec<usize> {
		self.strides
			.iter()
			.zip(&self.bins)
			.map(|(stride, bins)| (id / stride) % bins)
			.collect()
	}

	/// Lower and upper corners of the score-space cell covered by bin `id`.
	pub fn cell(&self, id: usize) -> (Vec<f64>, Vec<f64>) {
		let coordinates = self.coordinates(id);
		let mut lower = Vec::with_capacity(coordinates.len());
		let mut upper = Vec::with_capacity(coordinates.len());
		for (d, c) in coordinates.into_iter().enumerate() {
			let width = (self.max[d] - self.min[d]) / self.bins[d] as f64;
			lower.push(self.min[d] + width * c as f64);
			upper.push(self.min[d] + width * (c + 1) as f64);
		}
		(lower, upper)
	}
}

/// Stored form of a grid; strides and total are rebuilt on decode.
#[derive(Serialize, Deserialize)]
struct GridSpec {
	min: Vec<f64>,
	max: Vec<f64>,
	bins: Vec<usize>,
}

impl TryFrom<GridSpec> for BinIndex {
	type Error = SpreadError;

	fn try_from(spec: GridSpec) -> Result<Self> {
		BinIndex::new(spec.min, spec.max, &BinCounts::PerDimension(spec.bins))
	}
}

impl From<BinIndex> for GridSpec {
	fn from(index: BinIndex) -> Self {
		Self { min: index.min, max: index.max, bins: index.bins }
	}
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	fn grid() -> impl Strategy<Value = (Vec<f64>, Vec<f64>, Vec<usize>)> {
		(1usize..=4).prop_flat_map(|dims| {
			(
				proptest::collection::vec(-1000.0f64..1000.0, dims),
				proptest::collection::vec(0.5f64..500.0, dims),
				proptest::collection::vec(1usize..=12, dims),
			)
				.prop_map(|(min, width, bins)| {
					let max = min.iter().zip(&width).map(|(m, w)| m + w).collect();
					(min, max, bins)
				})
		})
	}

	proptest! {
		#[test]
		fn in_range_vectors_map_inside_grid(
			(min, max, bins) in grid(),
			t in proptest::collection::vec(0.0f64..=1.0, 4),
		) {
			let index = BinIndex::new(min.clone(), max.clone(), &BinCounts::PerDimension(bins)).unwrap();
			let x: Vec<f64> = (0..min.len()).map(|d| min[d] + t[d] * (max[d] - min[d])).collect();
			let id = index.index(&x).unwrap();
			prop_assert!(id < index.total_bins());
			prop_assert_eq!(id, index.index(&x).unwrap());
		}

		#[test]
		fn out_of_range_clips_to_border(
			(min, max, bins) in grid(),
			overshoot in 0.0f64..1e6,
			d in 0usize..4,
		) {
			let index = BinIndex::new(min.clone(), max.clone(), &BinCounts::PerDimension(bins)).unwrap();
			let d = d % min.len();

			let mut at_max = min.clone();
			at_max[d] = max[d];
			let mut above = at_max.clone();
			above[d] = max[d] + overshoot;
			prop_assert_eq!(index.index(&above).unwrap(), index.index(&at_max).unwrap());

			let mut below = min.clone();
			below[d] = min[d] - overshoot;
			prop_assert_eq!(index.index(&below).unwrap(), index.index(&min).unwrap());
		}
	}
}
