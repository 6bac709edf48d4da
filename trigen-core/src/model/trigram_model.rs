use std::collections::{HashMap, HashSet};

use log::debug;
use rand::Rng;

use super::distribution::Distribution;
use crate::text;

/// Marker prepended (twice) to every sentence before counting.
pub const START_TOKEN: &str = "<s>";
/// Marker appended to every sentence before counting.
pub const END_TOKEN: &str = "<eos>";
/// Replacement for words at or below the rarity threshold.
pub const UNKNOWN_TOKEN: &str = "<UNK>";

/// Default rarity threshold: words seen once in the corpus are collapsed.
pub const DEFAULT_UNK_THRESHOLD: usize = 1;

/// Unigram draws attempted when a generation walk produced no output.
const FALLBACK_ATTEMPTS: usize = 10;

/// Word-level trigram language model with rare-word collapsing.
///
/// The model stores successor distributions for contexts of one and two
/// preceding tokens and allows probabilistic prediction of the next word
/// based on a fitted corpus.
///
/// # Responsibilities
/// - Build all frequency tables from a raw corpus (`fit`)
/// - Collapse rare words into the unknown marker before counting
/// - Predict the next word for a two-token context with backoff
/// - Generate whole sequences starting from the start markers
///
/// # Invariants
/// - All table weights are non-negative; zero-weight entries are never drawn
/// - After any fit that tokenized at least one sentence, the vocabulary
///   contains the three reserved markers and the unigram table carries an
///   unknown-marker entry (possibly with weight zero)
/// - Every `fit` discards all prior state first and sets `fitted` last
pub struct TrigramModel {
	/// Words with a raw corpus count at or below this are unknown.
	unk_threshold: usize,

	/// (w1, w2) -> distribution over the following word.
	trigram_counts: HashMap<(String, String), Distribution>,

	/// w1 -> distribution over the following word; the strict order-2
	/// fallback consulted when a trigram context was never observed.
	context_bigram_counts: HashMap<String, Distribution>,

	/// (w1, w2) -> distribution over the following word, accumulated in
	/// the same pass as the trigram table; the softened order-3 fallback.
	/// A distinct distribution from `context_bigram_counts`; the two
	/// keyings must never be merged.
	prefix_bigram_counts: HashMap<(String, String), Distribution>,

	/// Overall token occurrences after rare-word replacement.
	unigram_counts: Distribution,

	/// Distinct tokens after replacement, plus the reserved markers.
	vocab: HashSet<String>,

	/// False until a `fit` call completes; reset at the start of every fit.
	fitted: bool,
}

impl TrigramModel {
	/// Creates a model with the default rarity threshold.
	pub fn new() -> Self {
		Self::with_unk_threshold(DEFAULT_UNK_THRESHOLD)
	}

	/// Creates a model that collapses words with a raw corpus count at
	/// or below `unk_threshold` into the unknown marker.
	pub fn with_unk_threshold(unk_threshold: usize) -> Self {
		Self {
			unk_threshold,
			trigram_counts: HashMap::new(),
			context_bigram_counts: HashMap::new(),
			prefix_bigram_counts: HashMap::new(),
			unigram_counts: Distribution::new(),
			vocab: HashSet::new(),
			fitted: false,
		}
	}

	/// Returns the configured rarity threshold.
	pub fn unk_threshold(&self) -> usize {
		self.unk_threshold
	}

	/// True once a `fit` call has completed, even on a degenerate corpus.
	pub fn is_fitted(&self) -> bool {
		self.fitted
	}

	/// The vocabulary observed by the last fit, including the markers.
	///
	/// Empty before the first fit and after fitting a corpus that
	/// yielded no tokenized sentence.
	pub fn vocab(&self) -> &HashSet<String> {
		&self.vocab
	}

	/// Total unigram weight; zero for a degenerate corpus.
	pub fn unigram_total(&self) -> usize {
		self.unigram_counts.total()
	}

	/// Occurrence count of `token` in the unigram table (zero if absent).
	pub fn unigram_count(&self, token: &str) -> usize {
		self.unigram_counts.count(token)
	}

	/// Trains the model on `text`, discarding any prior state.
	///
	/// The corpus is segmented, cleaned and tokenized once, and the
	/// resulting sentence list is immutable from there on: rarity is
	/// determined over it first (pass 1) and only then are the tables
	/// populated (pass 2). Sentences that tokenize to nothing are
	/// dropped entirely. A corpus that yields no tokens at all still
	/// marks the model fitted, with every table left empty.
	pub fn fit(&mut self, text: &str) {
		self.reset();

		let sentences = text::split_into_sentences(text);

		let tokenized: Vec<Vec<String>> = sentences
			.iter()
			.map(|sentence| text::tokenize(&text::clean_sentence(sentence)))
			.filter(|tokens| !tokens.is_empty())
			.collect();

		if tokenized.is_empty() {
			self.fitted = true;
			return;
		}

		// Pass 1: raw occurrence counts, before any replacement
		let raw_counts = Self::raw_counts(&tokenized);
		let rare_words = Self::rare_words(&raw_counts, self.unk_threshold);

		// Pass 2: the only stage that mutates the tables
		for tokens in &tokenized {
			self.count_sentence(tokens, &rare_words);
		}

		self.vocab = self.unigram_counts.tokens().map(str::to_owned).collect();
		self.vocab.insert(UNKNOWN_TOKEN.to_owned());
		self.vocab.insert(START_TOKEN.to_owned());
		self.vocab.insert(END_TOKEN.to_owned());

		// The unknown marker stays addressable even when nothing was rare
		self.unigram_counts.ensure(UNKNOWN_TOKEN);

		debug!(
			"fitted on {} sentences: {} distinct tokens, {} rare words collapsed",
			tokenized.len(),
			self.unigram_counts.len(),
			rare_words.len()
		);

		self.fitted = true;
	}

	/// Raw occurrence counts across all tokenized sentences.
	fn raw_counts(tokenized: &[Vec<String>]) -> HashMap<&str, usize> {
		let mut counts: HashMap<&str, usize> = HashMap::new();
		for tokens in tokenized {
			for token in tokens {
				*counts.entry(token).or_insert(0) += 1;
			}
		}
		counts
	}

	/// Every word whose raw count is at or below the threshold.
	fn rare_words<'a>(
		raw_counts: &HashMap<&'a str, usize>,
		threshold: usize,
	) -> HashSet<&'a str> {
		raw_counts
			.iter()
			.filter(|(_, count)| **count <= threshold)
			.map(|(word, _)| *word)
			.collect()
	}

	/// Replaces rare words, then counts one padded sentence into every
	/// table: trigram and prefix-bigram for the two-token context of
	/// each window, context-bigram for its single-token context.
	fn count_sentence(&mut self, tokens: &[String], rare_words: &HashSet<&str>) {
		let replaced: Vec<&str> = tokens
			.iter()
			.map(|token| {
				if rare_words.contains(token.as_str()) {
					UNKNOWN_TOKEN
				} else {
					token.as_str()
				}
			})
			.collect();

		for token in &replaced {
			self.unigram_counts.observe(token);
		}

		let mut padded: Vec<&str> = Vec::with_capacity(replaced.len() + 3);
		padded.push(START_TOKEN);
		padded.push(START_TOKEN);
		padded.extend(replaced.iter().copied());
		padded.push(END_TOKEN);

		for window in padded.windows(3) {
			let (w1, w2, w3) = (window[0], window[1], window[2]);

			self.trigram_counts
				.entry((w1.to_owned(), w2.to_owned()))
				.or_default()
				.observe(w3);
			self.context_bigram_counts
				.entry(w1.to_owned())
				.or_default()
				.observe(w2);
			self.prefix_bigram_counts
				.entry((w1.to_owned(), w2.to_owned()))
				.or_default()
				.observe(w3);
		}
	}

	fn reset(&mut self) {
		self.trigram_counts.clear();
		self.context_bigram_counts.clear();
		self.prefix_bigram_counts.clear();
		self.unigram_counts = Distribution::new();
		self.vocab.clear();
		self.fitted = false;
	}

	/// Samples the next word for the context `(w1, w2)` using the
	/// process-wide random source.
	pub fn next_word(&self, w1: &str, w2: &str) -> Option<String> {
		self.next_word_with(&mut rand::rng(), w1, w2)
	}

	/// Samples the next word for the context `(w1, w2)`.
	///
	/// Backoff strategy:
	/// - the trigram distribution for `(w1, w2)` when it is non-empty
	/// - otherwise the order-2 distribution for `w2` alone
	/// - otherwise the context-free unigram distribution
	/// - `None` once every table is exhausted (empty model)
	pub fn next_word_with<R: Rng + ?Sized>(
		&self,
		rng: &mut R,
		w1: &str,
		w2: &str,
	) -> Option<String> {
		if let Some(distribution) = self.trigram_counts.get(&(w1.to_owned(), w2.to_owned())) {
			if !distribution.is_empty() {
				return distribution.sample(rng).map(str::to_owned);
			}
		}

		if let Some(distribution) = self.context_bigram_counts.get(w2) {
			if !distribution.is_empty() {
				return distribution.sample(rng).map(str::to_owned);
			}
		}

		if !self.unigram_counts.is_empty() {
			return self.unigram_counts.sample(rng).map(str::to_owned);
		}

		None
	}

	/// Generates text using the process-wide random source.
	pub fn generate(&self, max_length: usize) -> String {
		self.generate_with(&mut rand::rng(), max_length)
	}

	/// Generates up to `max_length` words starting from the start markers.
	///
	/// Returns an empty string for an unfitted model or one whose corpus
	/// produced no tokens. The walk stops early on the end marker or when
	/// every table is exhausted. If it terminates before emitting
	/// anything, up to ten unigram draws are attempted and the first
	/// non-marker token is returned on its own; past that, the result is
	/// an empty string.
	///
	/// Purely read-only: one fit supports any number of generations.
	pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R, max_length: usize) -> String {
		if !self.fitted {
			return String::new();
		}
		if self.unigram_counts.total() == 0 {
			return String::new();
		}

		let mut w1 = START_TOKEN.to_owned();
		let mut w2 = START_TOKEN.to_owned();
		let mut output: Vec<String> = Vec::new();

		for _ in 0..max_length {
			let Some(next) = self.next_word_with(rng, &w1, &w2) else {
				break;
			};
			if next == END_TOKEN {
				break;
			}
			if next != START_TOKEN {
				output.push(next.clone());
			}
			// The context advances even when the draw was not emitted
			w1 = w2;
			w2 = next;
		}

		if output.is_empty() {
			// The walk collapsed immediately; salvage a single word
			for _ in 0..FALLBACK_ATTEMPTS {
				match self.unigram_counts.sample(rng) {
					Some(token) if token != START_TOKEN && token != END_TOKEN => {
						return token.to_owned();
					}
					_ => (),
				}
			}
			return String::new();
		}

		output.join(" ")
	}
}

impl Default for TrigramModel {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn unfitted_model_generates_nothing() {
		let model = TrigramModel::new();
		assert!(!model.is_fitted());
		assert_eq!(model.generate(50), "");
	}

	#[test]
	fn empty_corpus_fits_but_generates_nothing() {
		let mut model = TrigramModel::new();
		model.fit("");
		assert!(model.is_fitted());
		assert_eq!(model.unigram_total(), 0);
		assert_eq!(model.generate(50), "");
	}

	#[test]
	fn punctuation_only_corpus_is_degenerate() {
		let mut model = TrigramModel::new();
		model.fit("?! ... !!!");
		assert!(model.is_fitted());
		assert!(model.vocab().is_empty());
		assert_eq!(model.generate(50), "");

		let mut rng = StdRng::seed_from_u64(0);
		assert_eq!(model.next_word_with(&mut rng, START_TOKEN, START_TOKEN), None);
	}

	#[test]
	fn vocabulary_contains_reserved_markers_after_fit() {
		let mut model = TrigramModel::new();
		model.fit("The cat sat on the mat.");

		for marker in [START_TOKEN, END_TOKEN, UNKNOWN_TOKEN] {
			assert!(model.vocab().contains(marker), "missing {marker}");
		}
	}

	#[test]
	fn unknown_marker_has_zero_count_without_replacement() {
		let mut model = TrigramModel::with_unk_threshold(0);
		model.fit("the cat sat. the cat ran.");

		// Threshold 0 means no raw count can qualify as rare
		assert_eq!(model.unigram_count(UNKNOWN_TOKEN), 0);
		assert!(model.vocab().contains(UNKNOWN_TOKEN));
	}

	#[test]
	fn rare_words_collapse_into_unknown() {
		let mut model = TrigramModel::new();
		model.fit("the cat sat. the dog sat. the cat ran.");

		// "dog" and "ran" appear once each, at the default threshold
		assert_eq!(model.unigram_count(UNKNOWN_TOKEN), 2);
		assert!(!model.vocab().contains("dog"));
		assert!(!model.vocab().contains("ran"));
		assert!(model.vocab().contains("cat"));
		assert!(model.vocab().contains("sat"));
	}

	#[test]
	fn start_context_has_single_successor() {
		let mut model = TrigramModel::with_unk_threshold(0);
		model.fit("the cat sat. the cat ran.");

		let start_context = model
			.trigram_counts
			.get(&(START_TOKEN.to_owned(), START_TOKEN.to_owned()))
			.expect("start context must exist");
		assert_eq!(start_context.len(), 1);
		assert_eq!(start_context.count("the"), 2);
	}

	#[test]
	fn generation_always_begins_with_the_only_successor() {
		let mut model = TrigramModel::with_unk_threshold(0);
		model.fit("the cat sat. the cat ran.");

		let mut rng = StdRng::seed_from_u64(7);
		for _ in 0..20 {
			let generated = model.generate_with(&mut rng, 50);
			assert_eq!(generated.split_whitespace().next(), Some("the"));
		}
	}

	#[test]
	fn both_bigram_keyings_are_populated_separately() {
		let mut model = TrigramModel::with_unk_threshold(0);
		model.fit("the cat sat.");

		// Single-token keying: "the" -> "cat"
		let by_context = model
			.context_bigram_counts
			.get("the")
			.expect("context keying must exist");
		assert_eq!(by_context.count("cat"), 1);

		// Two-token keying: ("the", "cat") -> "sat"
		let by_prefix = model
			.prefix_bigram_counts
			.get(&("the".to_owned(), "cat".to_owned()))
			.expect("prefix keying must exist");
		assert_eq!(by_prefix.count("sat"), 1);

		// The pair key never leaks into the single-token keying
		assert!(!model.context_bigram_counts.contains_key("the cat"));
	}

	#[test]
	fn unseen_trigram_context_backs_off_to_bigram() {
		let mut model = TrigramModel::with_unk_threshold(0);
		model.fit("the cat sat. the cat ran.");

		// ("sat", "the") was never observed, but "the" alone was:
		// the strict order-2 table must answer with "cat"
		let mut rng = StdRng::seed_from_u64(11);
		for _ in 0..10 {
			let next = model.next_word_with(&mut rng, "sat", "the");
			assert_eq!(next.as_deref(), Some("cat"));
		}
	}

	#[test]
	fn fully_unseen_context_backs_off_to_unigram() {
		let mut model = TrigramModel::with_unk_threshold(0);
		model.fit("the cat sat. the cat ran.");

		let mut rng = StdRng::seed_from_u64(13);
		for _ in 0..10 {
			let next = model
				.next_word_with(&mut rng, "zzz", "qqq")
				.expect("unigram fallback must answer");
			assert!(model.vocab().contains(&next));
			assert_ne!(next, START_TOKEN);
			assert_ne!(next, END_TOKEN);
		}
	}

	#[test]
	fn zero_max_length_yields_at_most_one_word() {
		let mut model = TrigramModel::with_unk_threshold(0);
		model.fit("the cat sat. the cat ran.");

		let mut rng = StdRng::seed_from_u64(3);
		let generated = model.generate_with(&mut rng, 0);
		// The walk runs zero steps, so only the single-word fallback fires
		assert_eq!(generated.split_whitespace().count(), 1);
		assert!(model.vocab().contains(&generated));
	}

	#[test]
	fn refitting_discards_previous_tables() {
		let mut model = TrigramModel::with_unk_threshold(0);
		model.fit("the cat sat.");
		assert!(
			model
				.trigram_counts
				.contains_key(&("the".to_owned(), "cat".to_owned()))
		);

		model.fit("dogs bark loudly.");
		assert!(
			!model
				.trigram_counts
				.contains_key(&("the".to_owned(), "cat".to_owned()))
		);
		assert!(!model.vocab().contains("cat"));
		assert!(model.vocab().contains("dogs"));
	}

	#[test]
	fn same_seed_reproduces_the_same_text() {
		let mut model = TrigramModel::with_unk_threshold(0);
		model.fit("the cat sat on the mat. the dog sat on the rug. a bird flew over the mat.");

		let first = model.generate_with(&mut StdRng::seed_from_u64(9), 50);
		let second = model.generate_with(&mut StdRng::seed_from_u64(9), 50);
		assert_eq!(first, second);
		assert!(!first.is_empty());
	}

	#[test]
	fn generation_does_not_mutate_the_model() {
		let mut model = TrigramModel::with_unk_threshold(0);
		model.fit("the cat sat. the cat ran.");

		let total_before = model.unigram_total();
		let vocab_before = model.vocab().len();
		let mut rng = StdRng::seed_from_u64(17);
		for _ in 0..50 {
			model.generate_with(&mut rng, 25);
		}
		assert_eq!(model.unigram_total(), total_before);
		assert_eq!(model.vocab().len(), vocab_before);
	}
}
