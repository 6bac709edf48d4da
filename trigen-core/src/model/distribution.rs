use std::collections::HashMap;

use rand::Rng;

/// Represents a successor distribution in the trigram model.
///
/// A `Distribution` stores every continuation observed after some fixed
/// context together with its occurrence count.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during fitting
/// - Draw the next token using weighted random sampling
///
/// ## Invariants
/// - All occurrence counts are non-negative
/// - Zero-weight entries are legal (reserved placeholders) but are
///   never drawn
#[derive(Clone, Debug, Default)]
pub struct Distribution {
	/// Outgoing transitions indexed by the next token.
	/// The value represents how many times this transition was observed.
	/// Example: { "the" => 42, "a" => 3 }
	weights: HashMap<String, usize>,
}

impl Distribution {
	/// Creates a new empty distribution.
	pub fn new() -> Self {
		Self {
			weights: HashMap::new(),
		}
	}

	/// Records an occurrence of a transition toward `token`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is created with an initial count of 1.
	pub fn observe(&mut self, token: &str) {
		*self.weights.entry(token.to_owned()).or_insert(0) += 1;
	}

	/// Ensures `token` has an entry, inserting it with a zero count if
	/// it was never observed.
	pub fn ensure(&mut self, token: &str) {
		self.weights.entry(token.to_owned()).or_insert(0);
	}

	/// Number of distinct tokens in the distribution.
	pub fn len(&self) -> usize {
		self.weights.len()
	}

	/// True when no token was ever recorded.
	pub fn is_empty(&self) -> bool {
		self.weights.is_empty()
	}

	/// Occurrence count recorded for `token` (zero if absent).
	pub fn count(&self, token: &str) -> usize {
		self.weights.get(token).copied().unwrap_or(0)
	}

	/// Total weight across all entries.
	pub fn total(&self) -> usize {
		self.weights.values().sum()
	}

	/// Iterates over the distinct tokens in the distribution.
	pub fn tokens(&self) -> impl Iterator<Item = &str> {
		self.weights.keys().map(String::as_str)
	}

	/// Draws a token using weighted random sampling.
	///
	/// The probability of selecting a token is proportional to its
	/// occurrence count. Zero-weight entries are never selected.
	///
	/// This method performs:
	/// - an O(n) scan over the transitions
	/// - a cumulative subtraction to select a bucket
	///
	/// Returns `None` if the distribution is empty or carries no weight.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		if self.weights.is_empty() {
			return None;
		}

		// Compute the total number of occurrences
		let total = self.total();
		if total == 0 {
			// Only zero-weight placeholders remain
			return None;
		}

		// Randomly select a token
		let mut r = rng.random_range(0..total);

		let mut fallback: Option<&str> = None;
		for (token, occurrence) in &self.weights {
			if *occurrence == 0 {
				continue;
			}
			if r < *occurrence {
				return Some(token);
			}
			r -= occurrence;
			fallback = Some(token);
		}

		// Fallback: should not happen, but kept for safety.
		fallback
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn empty_distribution_yields_nothing() {
		let distribution = Distribution::new();
		let mut rng = StdRng::seed_from_u64(0);
		assert_eq!(distribution.sample(&mut rng), None);
	}

	#[test]
	fn zero_weight_entries_are_never_drawn() {
		let mut distribution = Distribution::new();
		distribution.ensure("ghost");
		distribution.observe("real");

		let mut rng = StdRng::seed_from_u64(1);
		for _ in 0..100 {
			assert_eq!(distribution.sample(&mut rng), Some("real"));
		}
	}

	#[test]
	fn all_zero_weights_yield_nothing() {
		let mut distribution = Distribution::new();
		distribution.ensure("ghost");

		let mut rng = StdRng::seed_from_u64(2);
		assert_eq!(distribution.sample(&mut rng), None);
		assert_eq!(distribution.total(), 0);
		assert_eq!(distribution.len(), 1);
	}

	#[test]
	fn sampling_is_proportional_to_weights() {
		let mut distribution = Distribution::new();
		for _ in 0..3 {
			distribution.observe("a");
		}
		distribution.observe("b");

		let mut rng = StdRng::seed_from_u64(42);
		let draws = 10_000;
		let mut a_draws = 0usize;
		for _ in 0..draws {
			match distribution.sample(&mut rng) {
				Some("a") => a_draws += 1,
				Some("b") => (),
				other => panic!("unexpected draw: {other:?}"),
			}
		}

		// {a: 3, b: 1} should converge on a 3:1 ratio
		let ratio = a_draws as f64 / draws as f64;
		assert!(
			(ratio - 0.75).abs() < 0.02,
			"empirical P(a) = {ratio}, expected ~0.75"
		);
	}

	#[test]
	fn counts_accumulate() {
		let mut distribution = Distribution::new();
		distribution.observe("the");
		distribution.observe("the");
		distribution.observe("a");

		assert_eq!(distribution.count("the"), 2);
		assert_eq!(distribution.count("a"), 1);
		assert_eq!(distribution.count("missing"), 0);
		assert_eq!(distribution.total(), 3);
	}
}
