use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::config::GenerationConfig;
use crate::error::ReplierError;
use crate::io;
use crate::lang::stemmer::{SnowballStemmer, WordStemmer};
use crate::lang::tagger::{RuleTagger, Tagger};
use crate::lang::tokenizer::Tokenizer;
use crate::model::backward::BackwardExtender;
use crate::model::corpus_index::{CorpusIndex, IndexStats};
use crate::model::forward::ForwardExtender;
use crate::model::relevance::RelevanceSelector;
use crate::model::render::render;
use crate::model::token::{Seed, Sentence};

/// Sentence generator over one corpus.
///
/// # Responsibilities
/// - Build the corpus indexes once, at construction
/// - Resolve seeds (random, relevant, raw text, tokens) into sentences
/// - Grow sentences forward, then optionally backward, and render them
///
/// The engine holds no per-request state: it is `Send + Sync` and meant to
/// be shared behind an `Arc` by any number of concurrent callers.
pub struct Engine {
	index: CorpusIndex,
	tokenizer: Tokenizer,
	relevance: RelevanceSelector,
	forward: ForwardExtender,
	backward: BackwardExtender,
	config: GenerationConfig,
}

impl Engine {
	/// Builds an engine with the Snowball Russian stemmer and the rule tagger.
	///
	/// # Errors
	/// Returns an error if `config` is invalid or the tokenizer fails to build.
	pub fn new<S>(lines: &[S], config: GenerationConfig) -> Result<Self, ReplierError>
	where
		S: AsRef<str> + Sync,
	{
		Self::with_collaborators(
			lines,
			config,
			Arc::new(SnowballStemmer::russian()),
			Arc::new(RuleTagger::new()),
		)
	}

	/// Builds an engine with explicit language collaborators.
	///
	/// The stemmer is used both for the corpus seeds and for incoming
	/// messages.
	///
	/// # Errors
	/// Returns an error if `config` is invalid or the tokenizer fails to build.
	pub fn with_collaborators<S>(
		lines: &[S],
		config: GenerationConfig,
		stemmer: Arc<dyn WordStemmer>,
		tagger: Arc<dyn Tagger>,
	) -> Result<Self, ReplierError>
	where
		S: AsRef<str> + Sync,
	{
		config.validate()?;
		let tokenizer = Tokenizer::new()?;
		let index = CorpusIndex::build(lines, &tokenizer, stemmer.as_ref(), &config.index);

		Ok(Self {
			index,
			tokenizer,
			relevance: RelevanceSelector::new(tagger, stemmer),
			forward: ForwardExtender::new(config.sentence_length_limit),
			backward: BackwardExtender::new(config.prefix_length_limit),
			config,
		})
	}

	/// Builds an engine from a corpus file, one message per line.
	///
	/// An unreadable file is logged and yields an engine over an empty
	/// corpus, whose generators all return `None`.
	///
	/// # Errors
	/// Returns an error if `config` is invalid or the tokenizer fails to build.
	pub fn from_corpus_file<P: AsRef<Path>>(path: P, config: GenerationConfig) -> Result<Self, ReplierError> {
		let lines = match io::read_file(&path) {
			Ok(lines) => lines,
			Err(e) => {
				warn!("Could not read corpus {}: {}", path.as_ref().display(), e);
				Vec::new()
			}
		};
		Self::new(&lines, config)
	}

	pub fn index(&self) -> &CorpusIndex {
		&self.index
	}

	pub fn tokenizer(&self) -> &Tokenizer {
		&self.tokenizer
	}

	pub fn config(&self) -> &GenerationConfig {
		&self.config
	}

	pub fn stats(&self) -> IndexStats {
		self.index.stats()
	}

	/// Generates a message from `seed`, or from a random line start.
	///
	/// # Behavior
	/// - `Seed::RawText` is tokenized like the corpus, `Seed::TokenSequence`
	///   is used as is, `None` picks a seed uniformly from the seed map.
	/// - Grows the sentence forward, then backward with probability
	///   `prepend_probability`.
	///
	/// Returns `None` on an empty corpus or when nothing renders.
	pub fn generate_message<R: Rng + ?Sized>(&self, seed: Option<Seed>, rng: &mut R) -> Option<String> {
		if self.index.is_empty() {
			debug!("Empty corpus, nothing to generate");
			return None;
		}

		let sentence = match seed {
			Some(seed) => self.resolve_seed(seed),
			None => Sentence::from(self.index.random_seed(rng)?.clone()),
		};
		let prepend = rng.random_bool(self.config.prepend_probability());
		self.grow(sentence, prepend, rng)
	}

	/// Generates a message opened by a noun or verb of `message`.
	///
	/// Returns `None` when no such word opens a corpus line.
	pub fn generate_message_with_pos_tagging<R: Rng + ?Sized>(&self, message: &str, rng: &mut R) -> Option<String> {
		info!("Using generate_message_with_pos_tagging to respond to {:?}", message);
		let words = self.tokenizer.words(message);
		let seed = self.relevance.select_seed(&self.index, &words, rng)?;
		self.generate_message(Some(Seed::from(seed)), rng)
	}

	/// Generates a message continuing a pair of words taken from `message`.
	///
	/// The pair must itself be a bigram of the corpus. The result is always
	/// grown in both directions.
	pub fn generate_kind_of_relevant_message<R: Rng + ?Sized>(&self, message: &str, rng: &mut R) -> Option<String> {
		info!("Using generate_kind_of_relevant_message to respond to {:?}", message);
		let words = self.tokenizer.words(message);
		let pair = self.relevance.select_pair(&self.index, &words, rng)?;
		self.grow(Sentence::from(pair), true, rng)
	}

	/// A raw corpus line containing one of the words of `message`.
	///
	/// Words are tried in random order; among the lines of the first known
	/// word, one is picked at random.
	pub fn message_containing_any_word<R: Rng + ?Sized>(&self, message: &str, rng: &mut R) -> Option<String> {
		let mut words: Vec<&str> = message.split_whitespace().collect();
		words.shuffle(rng);

		let lines = words.iter().find_map(|word| self.index.lines_with_word(word))?;
		lines.choose(rng).map(|line| line.trim().to_owned())
	}

	/// Nouns and verbs of `message`, in message order.
	pub fn nouns_and_verbs(&self, message: &str) -> Vec<String> {
		self.relevance.nouns_and_verbs(&self.tokenizer.words(message))
	}

	fn resolve_seed(&self, seed: Seed) -> Sentence {
		match seed {
			Seed::RawText(text) => Sentence::from(self.tokenizer.tokens(&text)),
			Seed::TokenSequence(tokens) => Sentence::from(tokens),
		}
	}

	fn grow<R: Rng + ?Sized>(&self, mut sentence: Sentence, prepend: bool, rng: &mut R) -> Option<String> {
		if let Some(key) = sentence.first_bigram() {
			debug!("Growing sentence from {}", key);
		}
		let appended = self.forward.extend(&self.index, &mut sentence, rng);
		let prepended = if prepend {
			self.backward.extend(&self.index, &mut sentence, rng)
		} else {
			0
		};
		debug!("Appended {} and prepended {} token(s)", appended, prepended);

		let text = render(sentence.iter());
		if text.is_empty() { None } else { Some(text) }
	}
}
