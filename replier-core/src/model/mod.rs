//! Top-level module for the trigram generation system.
//!
//! This module provides the bidirectional sentence generator, including:
//! - Tokens, bigram keys and sentences (`Token`, `Bigram`, `Sentence`)
//! - The forward and backward corpus indexes (`CorpusIndex`)
//! - Forward and backward growth of sentences
//! - A high-level generation interface (`Engine`)
//! - Per-conversation reply decisions (`Replier`)

/// Backward walk over the corpus index, prepending words.
pub mod backward;

/// Forward and backward trigram indexes, seeds and word lines.
///
/// Supports sequential and chunked parallel construction.
pub mod corpus_index;

/// Consecutive-answer counter and the dialog continuation decision.
pub mod dialog;

/// Forward walk over the corpus index, appending words until an end.
pub mod forward;

/// High-level interface for generating messages from a corpus.
///
/// Exposes corpus loading, seed resolution and relevant generation.
pub mod generator;

/// Choice of seeds and word pairs from the nouns and verbs of a message.
pub mod relevance;

/// Token sequence to text.
pub mod render;

/// Reply dispatch for one conversation.
pub mod replier;

/// Tokens, bigram keys, sentences and seeds.
pub mod token;

/// Candidate list stored behind every index key.
///
/// Keeps duplicates so that uniform sampling follows corpus frequency.
pub mod transitions;
