//! Error type shared by every component of the sampler.

use thiserror::Error;

/// Errors raised while configuring or running a sampling job.
///
/// Configuration problems are always reported before the sampling loop
/// starts. Non-convergence is not an error: see `RebalanceOutcome`.
#[derive(Debug, Error)]
pub enum SpreadError {
	/// I/O error while reading tables or writing results.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Malformed input file (bad CSV row, non-numeric score...).
	#[error("parse error: {0}")]
	Parse(String),

	/// Invalid run configuration (missing scores, mismatched dimensions,
	/// degenerate bounds, zero parameters...).
	#[error("configuration error: {0}")]
	Config(String),

	/// A symbol string that is not part of the alphabet.
	#[error("unknown symbol '{0}'")]
	UnknownSymbol(String),

	/// The admissibility predicate rejected every draw within the retry cap.
	#[error("no admissible sequence found after {0} attempts")]
	Exhausted(usize),

	/// Snapshot encoding or decoding failure.
	#[error("snapshot error: {0}")]
	Snapshot(#[from] postcard::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpreadError>;
