use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpreadError};

/// Ordered set of distinct symbols (amino acids, codons...).
///
/// Symbols are addressed by their position, so a `Sequence` only stores
/// small indices and is cheap to hash and compare.
///
/// ## Invariants
/// - At least one symbol
/// - No duplicate symbols
/// - Fixed for the whole run
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Alphabet {
	symbols: Vec<String>,
	index: HashMap<String, u16>,
}

impl Alphabet {
	/// Builds an alphabet from an ordered list of symbols.
	///
	/// # Errors
	/// Returns a configuration error if the list is empty, contains an
	/// empty or duplicated symbol, or is too large to be indexed.
	pub fn new(symbols: Vec<String>) -> Result<Self> {
		if symbols.is_empty() {
			return Err(SpreadError::Config("alphabet is empty".to_owned()));
		}
		if symbols.len() > u16::MAX as usize {
			return Err(SpreadError::Config(format!(
				"alphabet has {} symbols, at most {} are supported",
				symbols.len(),
				u16::MAX
			)));
		}

		let mut index = HashMap::with_capacity(symbols.len());
		for (i, symbol) in symbols.iter().enumerate() {
			if symbol.is_empty() {
				return Err(SpreadError::Config("alphabet contains an empty symbol".to_owned()));
			}
			if index.insert(symbol.clone(), i as u16).is_some() {
				return Err(SpreadError::Config(format!("duplicate symbol '{}' in alphabet", symbol)));
			}
		}

		Ok(Self { symbols, index })
	}

	/// Number of symbols.
	pub fn len(&self) -> usize {
		self.symbols.len()
	}

	/// Always false once constructed.
	pub fn is_empty(&self) -> bool {
		self.symbols.is_empty()
	}

	/// Symbols in alphabet order.
	pub fn symbols(&self) -> &[String] {
		&self.symbols
	}

	/// Returns the symbol at `index`, if any.
	pub fn symbol(&self, index: u16) -> Option<&str> {
		self.symbols.get(index as usize).map(String::as_str)
	}

	/// Returns the position of `symbol` in the alphabet.
	pub fn index_of(&self, symbol: &str) -> Option<u16> {
		self.index.get(symbol).copied()
	}

	/// Draws a sequence of `length` symbols, each one picked independently
	/// and uniformly with replacement.
	pub fn random_sequence<R: Rng + ?Sized>(&self, length: usize, rng: &mut R) -> Sequence {
		let size = self.symbols.len() as u16;
		Sequence((0..length).map(|_| rng.random_range(0..size)).collect())
	}

	/// Converts symbol strings into a sequence.
	///
	/// # Errors
	/// Returns `UnknownSymbol` for the first symbol missing from the alphabet.
	pub fn parse<S: AsRef<str>>(&self, symbols: &[S]) -> Result<Sequence> {
		symbols
			.iter()
			.map(|s| {
				let s = s.as_ref();
				self.index_of(s).ok_or_else(|| SpreadError::UnknownSymbol(s.to_owned()))
			})
			.collect::<Result<Vec<_>>>()
			.map(Sequence)
	}

	/// Renders a sequence with its raw symbols joined by `separator`.
	/// Indices outside the alphabet render as `?`.
	pub fn render(&self, sequence: &Sequence, separator: &str) -> String {
		sequence
			.symbols()
			.iter()
			.map(|&i| self.symbol(i).unwrap_or("?"))
			.collect::<Vec<_>>()
			.join(separator)
	}
}

impl TryFrom<Vec<String>> for Alphabet {
	type Error = SpreadError;

	fn try_from(symbols: Vec<String>) -> Result<Self> {
		Alphabet::new(symbols)
	}
}

impl From<Alphabet> for Vec<String> {
	fn from(alphabet: Alphabet) -> Self {
		alphabet.symbols
	}
}

/// Fixed-length ordered tuple of alphabet symbols, stored as indices.
///
/// Two sequences with the same symbols in the same order are equal and
/// hash identically.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sequence(Vec<u16>);

impl Sequence {
	/// Wraps raw symbol indices. Indices are not checked against an alphabet.
	pub fn from_indices(indices: Vec<u16>) -> Self {
		Self(indices)
	}

	/// Symbol indices in order.
	pub fn symbols(&self) -> &[u16] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
