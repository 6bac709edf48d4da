//! Trigram-based text generation library.
//!
//! This crate provides a word-level trigram language model including:
//! - Sentence segmentation, cleaning and tokenization
//! - Rare-word collapsing into a reserved unknown marker
//! - Multi-order frequency accumulation (unigram/bigram/trigram)
//! - Stochastic generation with three-level backoff
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core trigram model and generation logic.
///
/// This module exposes the high-level model interface while keeping
/// internal distribution representations private.
pub mod model;

/// Text pipeline: sentence splitting, cleaning and tokenization.
///
/// Exposed so callers can preview exactly what the model will count.
pub mod text;

/// I/O utilities (corpus loading).
///
/// The model itself never touches the filesystem; binaries use this
/// to hand it an already-decoded text string.
pub mod io;
