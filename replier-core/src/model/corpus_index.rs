use std::collections::HashMap;
use std::sync::{Arc, mpsc};
use std::thread;

use log::{debug, info};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use super::token::{Bigram, Token};
use super::transitions::Transitions;
use crate::config::{IndexOptions, Tokenization};
use crate::lang::stemmer::WordStemmer;
use crate::lang::tokenizer::{Tokenizer, clean_word};

/// Chunks per CPU when the build thread count is left to the machine.
const CHUNKS_PER_CPU: usize = 8;

/// Key counts of a built index.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
	pub trigrams: usize,
	pub forward_keys: usize,
	pub backward_keys: usize,
	pub words: usize,
	pub seeds: usize,
}

/// Index under construction, possibly covering only a chunk of the corpus.
#[derive(Debug, Default)]
struct PartialIndex {
	forward: HashMap<Bigram, Transitions>,
	backward: HashMap<Bigram, Transitions>,
	word_lines: HashMap<String, Vec<Arc<str>>>,
	/// Forward keys opening a line, in the order they were first inserted.
	line_initials: Vec<Bigram>,
	trigrams: usize,
}

impl PartialIndex {
	/// Line-respecting build of a run of lines.
	fn from_lines<S: AsRef<str>>(lines: &[S], tokenizer: &Tokenizer) -> Self {
		let mut partial = Self::default();
		for line in lines {
			let line = line.as_ref();
			partial.add_line_words(line);
			partial.add_tokens(&tokenizer.line_tokens(line));
		}
		partial
	}

	/// Flattening build: one token stream for the whole corpus.
	fn from_stream<S: AsRef<str>>(lines: &[S], tokenizer: &Tokenizer) -> Self {
		let mut partial = Self::default();
		let mut stream = Vec::new();
		for line in lines {
			let line = line.as_ref();
			partial.add_line_words(line);
			stream.extend(tokenizer.line_tokens(line));
		}
		partial.add_tokens(&stream);
		partial
	}

	/// Records `line` under each of its whitespace-separated words.
	fn add_line_words(&mut self, line: &str) {
		let shared: Arc<str> = Arc::from(line);
		for word in line.split_whitespace() {
			let key = clean_word(word);
			if key.is_empty() {
				continue;
			}
			self.word_lines.entry(key).or_default().push(Arc::clone(&shared));
		}
	}

	fn add_tokens(&mut self, tokens: &[Token]) {
		for window in tokens.windows(3) {
			if let [one, two, three] = window {
				self.add_trigram(one, two, three);
			}
		}
	}

	fn add_trigram(&mut self, one: &Token, two: &Token, three: &Token) {
		let key = Bigram(one.clone(), two.clone());
		match self.forward.get_mut(&key) {
			Some(transitions) => transitions.add(three.clone()),
			None => {
				if key.is_line_initial() {
					self.line_initials.push(key.clone());
				}
				let mut transitions = Transitions::new();
				transitions.add(three.clone());
				self.forward.insert(key, transitions);
			}
		}

		self.backward
			.entry(Bigram(two.clone(), three.clone()))
			.or_default()
			.add(one.clone());
		self.trigrams += 1;
	}

	/// Appends a partial index covering the lines that follow this one.
	///
	/// Line initials unknown to `self` keep their relative order, so merging
	/// chunks in corpus order reproduces the sequential insertion order.
	fn merge(&mut self, other: PartialIndex) {
		for key in other.line_initials {
			if !self.forward.contains_key(&key) {
				self.line_initials.push(key);
			}
		}
		for (key, transitions) in other.forward {
			self.forward.entry(key).or_default().merge(transitions);
		}
		for (key, transitions) in other.backward {
			self.backward.entry(key).or_default().merge(transitions);
		}
		for (word, lines) in other.word_lines {
			self.word_lines.entry(word).or_default().extend(lines);
		}
		self.trigrams += other.trigrams;
	}
}

/// Immutable trigram indexes of a corpus.
///
/// Built once, then only read: any number of generations may share one
/// index without locking.
///
/// # Invariants
/// - Forward and backward maps come from the same token stream: a trigram
///   `(a, b, c)` puts `c` under `forward[(a, b)]` and `a` under
///   `backward[(b, c)]`
/// - Transition lists keep duplicates
/// - Every seed is a forward key opening a line
#[derive(Debug, Default)]
pub struct CorpusIndex {
	forward: HashMap<Bigram, Transitions>,
	backward: HashMap<Bigram, Transitions>,
	word_lines: HashMap<String, Vec<Arc<str>>>,
	/// One line-initial bigram per stem.
	seeds: Vec<Bigram>,
	seed_by_stem: HashMap<String, usize>,
	trigrams: usize,
}

impl CorpusIndex {
	/// An index with no entries; every lookup misses.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Builds all indexes from corpus lines.
	///
	/// # Behavior
	/// - Tokenizes according to `options.tokenization`.
	/// - With more than one build thread, the line-respecting build splits
	///   the corpus into chunks, builds them on scoped threads and merges
	///   the partial indexes in corpus order.
	/// - Stems the second word of every line-initial key into the seed map;
	///   a later key with the same stem replaces the earlier one.
	pub fn build<S>(
		lines: &[S],
		tokenizer: &Tokenizer,
		stemmer: &dyn WordStemmer,
		options: &IndexOptions,
	) -> Self
	where
		S: AsRef<str> + Sync,
	{
		let chunks = match options.build_threads {
			0 => num_cpus::get() * CHUNKS_PER_CPU,
			n => n,
		};
		info!(
			"Building corpus index from {} lines ({:?}, {} chunk(s))",
			lines.len(),
			options.tokenization,
			chunks
		);

		let partial = match options.tokenization {
			Tokenization::CorpusFlattening => PartialIndex::from_stream(lines, tokenizer),
			Tokenization::LineRespecting if chunks > 1 => Self::build_chunked(lines, tokenizer, chunks),
			Tokenization::LineRespecting => PartialIndex::from_lines(lines, tokenizer),
		};

		let index = Self::finish(partial, stemmer);
		let stats = index.stats();
		info!(
			"Corpus index ready: {} trigrams, {} forward keys, {} backward keys, {} words, {} seeds",
			stats.trigrams, stats.forward_keys, stats.backward_keys, stats.words, stats.seeds
		);
		index
	}

	/// Builds line chunks concurrently and merges them in corpus order.
	fn build_chunked<S>(lines: &[S], tokenizer: &Tokenizer, chunks: usize) -> PartialIndex
	where
		S: AsRef<str> + Sync,
	{
		let chunk_size = lines.len().div_ceil(chunks).max(1);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for (chunk_id, chunk) in lines.chunks(chunk_size).enumerate() {
				let tx = tx.clone();
				scope.spawn(move || {
					let partial = PartialIndex::from_lines(chunk, tokenizer);
					// The receiver lives until every worker is joined
					let _ = tx.send((chunk_id, partial));
				});
			}
		});
		drop(tx);

		let mut partials: Vec<(usize, PartialIndex)> = rx.iter().collect();
		partials.sort_by_key(|(chunk_id, _)| *chunk_id);
		debug!("Merging {} partial indexes", partials.len());

		let mut merged = PartialIndex::default();
		for (_, partial) in partials {
			merged.merge(partial);
		}
		merged
	}

	fn finish(partial: PartialIndex, stemmer: &dyn WordStemmer) -> Self {
		let mut seeds: Vec<Bigram> = Vec::new();
		let mut seed_by_stem: HashMap<String, usize> = HashMap::new();

		for key in partial.line_initials {
			let Some(word) = key.1.as_word() else {
				continue;
			};
			let stem = stemmer.stem(word);
			match seed_by_stem.get(&stem) {
				// One seed per stem: the later line start wins
				Some(&slot) => seeds[slot] = key,
				None => {
					seed_by_stem.insert(stem, seeds.len());
					seeds.push(key);
				}
			}
		}

		Self {
			forward: partial.forward,
			backward: partial.backward,
			word_lines: partial.word_lines,
			seeds,
			seed_by_stem,
			trigrams: partial.trigrams,
		}
	}

	/// Continuations observed after `key`.
	pub fn forward(&self, key: &Bigram) -> Option<&Transitions> {
		self.forward.get(key)
	}

	/// Tokens observed before `key`.
	pub fn backward(&self, key: &Bigram) -> Option<&Transitions> {
		self.backward.get(key)
	}

	/// True if the forward walk can leave `key`.
	pub fn has_continuation(&self, key: &Bigram) -> bool {
		self.forward.get(key).is_some_and(|t| !t.is_empty())
	}

	/// Seed stored for a stem.
	pub fn seed_for_stem(&self, stem: &str) -> Option<&Bigram> {
		self.seed_by_stem.get(stem).map(|&slot| &self.seeds[slot])
	}

	/// Uniformly chosen seed, `None` when the corpus produced no seed.
	pub fn random_seed<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Bigram> {
		self.seeds.choose(rng)
	}

	/// `(stem, seed)` pairs of the seed map.
	pub fn seeds(&self) -> impl Iterator<Item=(&str, &Bigram)> {
		self.seed_by_stem
			.iter()
			.map(|(stem, &slot)| (stem.as_str(), &self.seeds[slot]))
	}

	/// Raw corpus lines containing the cleaned `word`, one entry per occurrence.
	pub fn lines_with_word(&self, word: &str) -> Option<&[Arc<str>]> {
		self.word_lines.get(&clean_word(word)).map(Vec::as_slice)
	}

	pub fn forward_entries(&self) -> impl Iterator<Item=(&Bigram, &Transitions)> {
		self.forward.iter()
	}

	pub fn backward_entries(&self) -> impl Iterator<Item=(&Bigram, &Transitions)> {
		self.backward.iter()
	}

	pub fn is_empty(&self) -> bool {
		self.forward.is_empty()
	}

	pub fn stats(&self) -> IndexStats {
		IndexStats {
			trigrams: self.trigrams,
			forward_keys: self.forward.len(),
			backward_keys: self.backward.len(),
			words: self.word_lines.len(),
			seeds: self.seeds.len(),
		}
	}
}
