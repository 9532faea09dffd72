//! Language collaborators of the engine.
//!
//! - `Tokenizer`: word / punctuation splitting shared by corpus and messages
//! - `WordStemmer`: stems used to match inflected forms
//! - `Tagger`: coarse part-of-speech tags used to pick relevant words
//!
//! Stemmer and tagger are traits so the engine receives them at
//! construction time instead of reaching for process-wide instances.

pub mod stemmer;

pub mod tagger;

pub mod tokenizer;
