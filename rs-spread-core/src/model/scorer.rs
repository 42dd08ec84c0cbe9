use std::collections::HashMap;

use crate::error::{Result, SpreadError};
use super::alphabet::{Alphabet, Sequence};

/// Position of a sequence in score space, one component per scoring table.
pub type ScoreVector = Vec<f64>;

/// Named mapping from symbol to a per-symbol score (hydrophobicity, weight...).
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringTable {
	name: String,
	values: HashMap<String, f64>,
}

impl ScoringTable {
	pub fn new(name: &str, values: HashMap<String, f64>) -> Self {
		Self { name: name.to_owned(), values }
	}

	/// Builds a table from `(symbol, score)` pairs. Later pairs win.
	pub fn from_pairs<I, S>(name: &str, pairs: I) -> Self
	where
		I: IntoIterator<Item = (S, f64)>,
		S: Into<String>,
	{
		Self::new(name, pairs.into_iter().map(|(s, v)| (s.into(), v)).collect())
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn get(&self, symbol: &str) -> Option<f64> {
		self.values.get(symbol).copied()
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

/// Maps a sequence to its score vector by summing per-symbol table values.
///
/// Tables are resolved against the alphabet once at construction, so a
/// missing or non-finite entry is reported before any sampling happens.
///
/// # Invariants
/// - `matrix[symbol][dimension]` exists for every alphabet symbol and table
/// - every entry is finite
#[derive(Clone, Debug)]
pub struct Scorer {
	alphabet: Alphabet,
	dimensions: Vec<String>,
	matrix: Vec<Vec<f64>>,
}

impl Scorer {
	/// Resolves `tables` against `alphabet`.
	///
	/// # Errors
	/// Returns a configuration error if no table is given, or if a table
	/// lacks a symbol of the alphabet or holds a non-finite value for it.
	pub fn new(alphabet: &Alphabet, tables: &[ScoringTable]) -> Result<Self> {
		if tables.is_empty() {
			return Err(SpreadError::Config("at least one scoring table is required".to_owned()));
		}

		let mut matrix = Vec::with_capacity(alphabet.len());
		for symbol in alphabet.symbols() {
			let mut row = Vec::with_capacity(tables.len());
			for table in tables {
				let value = table.get(symbol).ok_or_else(|| {
					SpreadError::Config(format!("table '{}' has no score for symbol '{}'", table.name(), symbol))
				})?;
				if !value.is_finite() {
					return Err(SpreadError::Config(format!(
						"table '{}' has a non-finite score for symbol '{}'",
						table.name(),
						symbol
					)));
				}
				row.push(value);
			}
			matrix.push(row);
		}

		Ok(Self {
			alphabet: alphabet.clone(),
			dimensions: tables.iter().map(|t| t.name().to_owned()).collect(),
			matrix,
		})
	}

	/// Table names, in dimension order.
	pub fn dimension_names(&self) -> &[String] {
		&self.dimensions
	}

	pub fn alphabet(&self) -> &Alphabet {
		&self.alphabet
	}

	/// Scores a sequence. O(length * dimensions).
	///
	/// # Errors
	/// Returns `UnknownSymbol` if the sequence holds an index outside the
	/// alphabet it was scored against.
	pub fn score(&self, sequence: &Sequence) -> Result<ScoreVector> {
		let mut total = vec![0.0; self.dimensions.len()];
		for &symbol in sequence.symbols() {
			let row = self
				.matrix
				.get(symbol as usize)
				.ok_or_else(|| SpreadError::UnknownSymbol(format!("#{}", symbol)))?;
			for (acc, value) in total.iter_mut().zip(row) {
				*acc += value;
			}
		}
		Ok(total)
	}

	/// Scores a sequence given as symbol strings.
	pub fn score_symbols<S: AsRef<str>>(&self, symbols: &[S]) -> Result<ScoreVector> {
		self.score(&self.alphabet.parse(symbols)?)
	}

	/// Theoretical extremes of the score space for sequences of `length`
	/// symbols: per dimension, the smallest and largest symbol score times
	/// `length`.
	pub fn bounds(&self, length: usize) -> (ScoreVector, ScoreVector) {
		let mut min = vec![f64::INFINITY; self.dimensions.len()];
		let mut max = vec![f64::NEG_INFINITY; self.dimensions.len()];
		for row in &self.matrix {
			for (d, &value) in row.iter().enumerate() {
				min[d] = min[d].min(value);
				max[d] = max[d].max(value);
			}
		}
		let length = length as f64;
		(
			min.into_iter().map(|v| v * length).collect(),
			max.into_iter().map(|v| v * length).collect(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn amino() -> Alphabet {
		Alphabet::new(vec!["A".into(), "I".into(), "R".into()]).unwrap()
	}

	fn hydro() -> ScoringTable {
		ScoringTable::from_pairs("hydro", [("A", 1.8), ("I", 4.5), ("R", -4.5)])
	}

	fn weight() -> ScoringTable {
		ScoringTable::from_pairs("weight", [("A", 89.1), ("I", 131.2), ("R", 174.2)])
	}

	#[test]
	fn homopolymer_scores_length_times_symbol_value() {
		let abc = amino();
		let tables = [hydro(), weight()];
		let scorer = Scorer::new(&abc, &tables).unwrap();
		for symbol in abc.symbols() {
			let seq = vec![symbol.as_str(); 7];
			let score = scorer.score_symbols(&seq).unwrap();
			for (d, table) in tables.iter().enumerate() {
				let expected = 7.0 * table.get(symbol).unwrap();
				assert!((score[d] - expected).abs() < 1e-9);
			}
		}
	}

	#[test]
	fn sums_across_symbols() {
		let scorer = Scorer::new(&amino(), &[hydro()]).unwrap();
		let score = scorer.score_symbols(&["A", "I", "R", "R"]).unwrap();
		assert!((score[0] - (1.8 + 4.5 - 9.0)).abs() < 1e-9);
	}

	#[test]
	fn missing_symbol_is_a_config_error() {
		let partial = ScoringTable::from_pairs("hydro", [("A", 1.8), ("I", 4.5)]);
		let err = Scorer::new(&amino(), &[partial]).unwrap_err();
		assert!(matches!(err, SpreadError::Config(msg) if msg.contains("'R'")));
	}

	#[test]
	fn rejects_empty_table_list_and_nan() {
		assert!(Scorer::new(&amino(), &[]).is_err());
		let nan = ScoringTable::from_pairs("bad", [("A", f64::NAN), ("I", 0.0), ("R", 0.0)]);
		assert!(Scorer::new(&amino(), &[nan]).is_err());
	}

	#[test]
	fn unknown_symbols_propagate() {
		let scorer = Scorer::new(&amino(), &[hydro()]).unwrap();
		assert!(matches!(scorer.score_symbols(&["A", "Z"]), Err(SpreadError::UnknownSymbol(_))));
		let foreign = Sequence::from_indices(vec![0, 9]);
		assert!(scorer.score(&foreign).is_err());
	}

	#[test]
	fn bounds_scale_extremes_by_length() {
		let scorer = Scorer::new(&amino(), &[hydro(), weight()]).unwrap();
		let (min, max) = scorer.bounds(10);
		assert!((min[0] + 45.0).abs() < 1e-9);
		assert!((max[0] - 45.0).abs() < 1e-9);
		assert!((min[1] - 891.0).abs() < 1e-9);
		assert!((max[1] - 1742.0).abs() < 1e-9);
	}
}
