use std::fmt;

use rand::Rng;

use crate::error::{Result, SpreadError};
use super::alphabet::{Alphabet, Sequence};

/// Admissibility test applied to every drawn sequence.
pub type Predicate = Box<dyn Fn(&Sequence) -> bool>;

/// Random sequence source.
///
/// Every symbol is drawn independently and uniformly from the alphabet,
/// with replacement. An optional predicate rejects draws, which are then
/// redrawn before anything is yielded.
///
/// # Liveness
/// Without a retry cap, a predicate that never accepts makes `draw` loop
/// forever: callers must supply a satisfiable predicate, or bound the
/// retries with `with_max_attempts`.
///
/// The random source is passed to each call so the same generator can
/// share one seeded RNG with other consumers.
pub struct SequenceGenerator {
	alphabet: Alphabet,
	length: usize,
	predicate: Option<Predicate>,
	max_attempts: Option<usize>,
}

impl SequenceGenerator {
	/// Creates a generator of sequences of `length` symbols.
	///
	/// # Errors
	/// Returns a configuration error if `length` is zero.
	pub fn new(alphabet: &Alphabet, length: usize) -> Result<Self> {
		if length == 0 {
			return Err(SpreadError::Config("sequence length must be positive".to_owned()));
		}
		Ok(Self { alphabet: alphabet.clone(), length, predicate: None, max_attempts: None })
	}

	/// Only sequences accepted by `predicate` are yielded.
	pub fn with_predicate<F>(mut self, predicate: F) -> Self
	where
		F: Fn(&Sequence) -> bool + 'static,
	{
		self.predicate = Some(Box::new(predicate));
		self
	}

	/// Gives up on a slot after `attempts` consecutive rejections.
	pub fn with_max_attempts(mut self, attempts: usize) -> Self {
		self.max_attempts = Some(attempts.max(1));
		self
	}

	/// Draws one admissible sequence.
	///
	/// # Errors
	/// Returns `Exhausted` when a retry cap is set and reached.
	pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Sequence> {
		let Some(predicate) = &self.predicate else {
			return Ok(self.alphabet.random_sequence(self.length, rng));
		};

		let mut attempts = 0usize;
		loop {
			let candidate = self.alphabet.random_sequence(self.length, rng);
			if predicate(&candidate) {
				return Ok(candidate);
			}
			attempts += 1;
			if let Some(max) = self.max_attempts {
				if attempts >= max {
					return Err(SpreadError::Exhausted(attempts));
				}
			}
		}
	}

	/// Lazy stream of draws.
	///
	/// - `Some(count)`: exactly `count` sequences, then the stream ends.
	/// - `None`: unbounded; the consumer decides when to stop pulling.
	///
	/// After an `Exhausted` error the stream ends.
	pub fn samples<'a, R: Rng + ?Sized>(&'a self, rng: &'a mut R, count: Option<usize>) -> Samples<'a, R> {
		Samples { generator: self, rng, remaining: count, failed: false }
	}
}

impl fmt::Debug for SequenceGenerator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SequenceGenerator")
			.field("alphabet", &self.alphabet.symbols())
			.field("length", &self.length)
			.field("predicate", &self.predicate.is_some())
			.field("max_attempts", &self.max_attempts)
			.finish()
	}
}

/// Iterator returned by `SequenceGenerator::samples`.
pub struct Samples<'a, R: Rng + ?Sized> {
	generator: &'a SequenceGenerator,
	rng: &'a mut R,
	remaining: Option<usize>,
	failed: bool,
}

impl<R: Rng + ?Sized> Iterator for Samples<'_, R> {
	type Item = Result<Sequence>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failed {
			return None;
		}
		if let Some(remaining) = self.remaining.as_mut() {
			if *remaining == 0 {
				return None;
			}
			*remaining -= 1;
		}

		let drawn = self.generator.draw(&mut *self.rng);
		if drawn.is_err() {
			self.failed = true;
		}
		Some(drawn)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		match self.remaining {
			Some(n) if !self.failed => (0, Some(n)),
			Some(_) => (0, Some(0)),
			None => (usize::MAX, None),
		}
	}
}
