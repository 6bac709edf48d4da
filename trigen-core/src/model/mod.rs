//! Top-level module for the trigram generation system.
//!
//! This crate provides a word-level trigram language model, including:
//! - The model itself (`TrigramModel`)
//! - Internal successor distributions (`Distribution`)

/// Word-level trigram model (`TrigramModel`).
///
/// Handles corpus fitting, rare-word collapsing, transition counting
/// over padded sentences, and probabilistic next-word prediction with
/// three-level backoff.
pub mod trigram_model;

/// Internal representation of a single successor distribution.
///
/// Tracks outgoing transition counts and supports weighted random sampling.
/// This module is not exposed publicly.
mod distribution;
