//! Text pipeline: sentence segmentation, cleaning and tokenization.
//!
//! The pipeline is deliberately lossy: everything is case-folded,
//! punctuation other than apostrophes is stripped, and whitespace runs
//! collapse to single spaces.

/// Characters that terminate a sentence.
const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Splits raw text into sentence fragments.
///
/// Newlines are treated as spaces, then the text is split on runs of
/// `.`, `!` and `?` (trailing whitespace is consumed by the trim).
/// Fragments that are empty after trimming are discarded.
///
/// Returns an empty vector for empty or whitespace-only input.
pub fn split_into_sentences(text: &str) -> Vec<String> {
	text.replace('\n', " ")
		.split(SENTENCE_TERMINATORS)
		.map(str::trim)
		.filter(|sentence| !sentence.is_empty())
		.map(str::to_owned)
		.collect()
}

/// Normalizes a sentence for tokenization.
///
/// Lowercases, removes every character that is not an ASCII lowercase
/// letter, digit or apostrophe, collapses whitespace runs to single
/// spaces and trims. Cleaning an already-clean sentence is a no-op.
pub fn clean_sentence(sentence: &str) -> String {
	let mut kept = String::with_capacity(sentence.len());
	for c in sentence.to_lowercase().chars() {
		if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '\'' {
			kept.push(c);
		} else if c.is_whitespace() {
			kept.push(' ');
		}
	}
	kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a cleaned sentence into tokens on whitespace.
///
/// Empty input yields an empty sequence.
pub fn tokenize(sentence: &str) -> Vec<String> {
	sentence.split_whitespace().map(str::to_owned).collect()
}
