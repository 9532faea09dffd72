//! Trigram-based reply generation library.
//!
//! This crate provides a corpus-driven chat replier including:
//! - Forward and backward trigram indexes over a corpus of messages
//! - Bidirectional sentence growth from random or relevant seeds
//! - Per-conversation reply decisions with dialog decay
//! - Image search answers
//!
//! The language collaborators (stemmer, part-of-speech tagger) and the
//! image search sit behind traits so that callers can swap them.

/// Configuration sections, JSON loading and validation.
pub mod config;

/// Error type of the crate.
pub mod error;

/// Image search client and query shrinking.
pub mod image_search;

/// I/O utilities (corpus and configuration files).
pub mod io;

/// Tokenizer, stemmer and part-of-speech tagger.
pub mod lang;

/// Core trigram models and generation logic.
pub mod model;

pub use config::ReplierConfig;
pub use error::ReplierError;
pub use model::generator::Engine;
pub use model::replier::Replier;
pub use model::token::{Bigram, Seed, Token};
