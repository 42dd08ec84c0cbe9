use std::collections::HashMap;

use crate::error::{Result, SpreadError};
use super::alphabet::{Alphabet, Sequence};

/// Display form of each alphabet symbol (codon → amino acid, ...).
///
/// Only used when writing results; scoring and binning always work on
/// the raw symbols.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolMap {
	display: Vec<String>,
}

impl SymbolMap {
	/// Resolves `mapping` against `alphabet`.
	///
	/// # Errors
	/// Returns a configuration error if a symbol of the alphabet has no
	/// display form.
	pub fn new(alphabet: &Alphabet, mapping: &HashMap<String, String>) -> Result<Self> {
		let display = alphabet
			.symbols()
			.iter()
			.map(|symbol| {
				mapping
					.get(symbol)
					.cloned()
					.ok_or_else(|| SpreadError::Config(format!("no display form for symbol '{}'", symbol)))
			})
			.collect::<Result<Vec<_>>>()?;
		Ok(Self { display })
	}

	/// Renders a sequence with display symbols joined by `separator`.
	///
	/// # Errors
	/// Returns `UnknownSymbol` for an index outside the resolved alphabet.
	pub fn render(&self, sequence: &Sequence, separator: &str) -> Result<String> {
		let parts = sequence
			.symbols()
			.iter()
			.map(|&i| {
				self.display
					.get(i as usize)
					.map(String::as_str)
					.ok_or_else(|| SpreadError::UnknownSymbol(format!("#{}", i)))
			})
			.collect::<Result<Vec<_>>>()?;
		Ok(parts.join(separator))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn codons() -> Alphabet {
		Alphabet::new(vec!["GCU".into(), "UGG".into(), "AAA".into()]).unwrap()
	}

	#[test]
	fn renders_display_form() {
		let mapping: HashMap<String, String> =
			[("GCU", "A"), ("UGG", "W"), ("AAA", "K")].into_iter().map(|(a, b)| (a.into(), b.into())).collect();
		let map = SymbolMap::new(&codons(), &mapping).unwrap();
		let seq = codons().parse(&["AAA", "GCU", "UGG"]).unwrap();
		assert_eq!(map.render(&seq, "").unwrap(), "KAW");
	}

	#[test]
	fn incomplete_mapping_is_rejected() {
		let mapping: HashMap<String, String> = [("GCU".to_string(), "A".to_string())].into_iter().collect();
		assert!(matches!(SymbolMap::new(&codons(), &mapping), Err(SpreadError::Config(_))));
	}
}
