use std::sync::Arc;

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;

use super::corpus_index::CorpusIndex;
use super::token::{Bigram, Token};
use crate::lang::stemmer::WordStemmer;
use crate::lang::tagger::Tagger;

/// Picks generation seeds related to an incoming message.
///
/// Both strategies shuffle their candidates so that the word order of the
/// message does not decide which seed wins, and both treat "nothing found"
/// as an ordinary `None`.
#[derive(Clone)]
pub struct RelevanceSelector {
	tagger: Arc<dyn Tagger>,
	stemmer: Arc<dyn WordStemmer>,
}

impl RelevanceSelector {
	pub fn new(tagger: Arc<dyn Tagger>, stemmer: Arc<dyn WordStemmer>) -> Self {
		Self { tagger, stemmer }
	}

	pub fn stemmer(&self) -> &dyn WordStemmer {
		self.stemmer.as_ref()
	}

	/// Nouns and verbs of the message, as tagged.
	pub fn nouns_and_verbs(&self, words: &[String]) -> Vec<String> {
		self.tagger
			.tag(words)
			.into_iter()
			.filter(|(_, tag)| tag.is_noun_or_verb())
			.map(|(word, _)| word)
			.collect()
	}

	/// Line-initial seed whose stem matches a noun or verb of the message.
	///
	/// # Behavior
	/// - Tags `words` and keeps nouns (`S`) and verbs (`V`).
	/// - Stems them, shuffles the stems and returns the first one present
	///   in the seed map.
	pub fn select_seed<R: Rng + ?Sized>(&self, index: &CorpusIndex, words: &[String], rng: &mut R) -> Option<Bigram> {
		let mut stems: Vec<String> = self
			.nouns_and_verbs(words)
			.iter()
			.map(|word| self.stemmer.stem(&word.to_lowercase()))
			.collect();
		if stems.is_empty() {
			debug!("No nouns or verbs among {:?}", words);
			return None;
		}

		stems.shuffle(rng);
		let seed = stems.iter().find_map(|stem| index.seed_for_stem(stem)).cloned();
		if seed.is_none() {
			debug!("None of the stems {:?} opens a corpus line", stems);
		}
		seed
	}

	/// Pair of message words that is itself a forward key.
	///
	/// # Behavior
	/// - Tags `words` and keeps the meaningful ones (nouns, verbs, singular
	///   adjectives, pronouns).
	/// - Needs at least two of them.
	/// - Tries every ordered pair in random order and returns the first one
	///   the corpus can continue.
	pub fn select_pair<R: Rng + ?Sized>(&self, index: &CorpusIndex, words: &[String], rng: &mut R) -> Option<Bigram> {
		let meaningful: Vec<Token> = self
			.tagger
			.tag(words)
			.into_iter()
			.filter(|(_, tag)| tag.is_meaningful())
			.map(|(word, _)| Token::from_raw(&word))
			.collect();
		if meaningful.len() < 2 {
			debug!("Not enough meaningful words among {:?}", words);
			return None;
		}

		let mut pairs: Vec<(usize, usize)> = (0..meaningful.len())
			.flat_map(|i| (0..meaningful.len()).filter(move |&j| j != i).map(move |j| (i, j)))
			.collect();
		pairs.shuffle(rng);

		let pair = pairs
			.into_iter()
			.map(|(i, j)| Bigram(meaningful[i].clone(), meaningful[j].clone()))
			.find(|pair| index.has_continuation(pair));
		if pair.is_none() {
			debug!("No pair of meaningful words is a known bigram");
		}
		pair
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::IndexOptions;
	use crate::lang::stemmer::SnowballStemmer;
	use crate::lang::tagger::RuleTagger;
	use crate::lang::tokenizer::Tokenizer;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	struct Fixture {
		tokenizer: Tokenizer,
		index: CorpusIndex,
		selector: RelevanceSelector,
	}

	fn fixture(lines: &[&str]) -> Fixture {
		let tokenizer = Tokenizer::new().unwrap();
		let stemmer = Arc::new(SnowballStemmer::russian());
		let index = CorpusIndex::build(lines, &tokenizer, stemmer.as_ref(), &IndexOptions::default());
		let selector = RelevanceSelector::new(Arc::new(RuleTagger::new()), stemmer);
		Fixture { tokenizer, index, selector }
	}

	#[test]
	fn noun_finds_the_line_it_opens() {
		let f = fixture(&["кошка спит на окне", "собака лает"]);
		let words = f.tokenizer.words("Где моя кошка?");

		let seed = f.selector.select_seed(&f.index, &words, &mut StdRng::seed_from_u64(1));
		assert_eq!(seed, Some(Bigram(Token::LineStart, Token::from("кошка"))));
	}

	#[test]
	fn inflected_noun_still_matches() {
		let f = fixture(&["кошка спит на окне"]);
		let words = f.tokenizer.words("нет кошки");

		let seed = f.selector.select_seed(&f.index, &words, &mut StdRng::seed_from_u64(1));
		assert_eq!(seed, Some(Bigram(Token::LineStart, Token::from("кошка"))));
	}

	#[test]
	fn message_without_nouns_or_verbs_selects_nothing() {
		let f = fixture(&["кошка спит на окне"]);
		let words = f.tokenizer.words("ну и где?");
		assert!(f.selector.select_seed(&f.index, &words, &mut StdRng::seed_from_u64(1)).is_none());
	}

	#[test]
	fn unknown_stem_selects_nothing() {
		let f = fixture(&["кошка спит на окне"]);
		let words = f.tokenizer.words("трактор");
		assert!(f.selector.select_seed(&f.index, &words, &mut StdRng::seed_from_u64(1)).is_none());
	}

	#[test]
	fn pair_must_be_a_forward_key() {
		let f = fixture(&["мама мыла раму"]);
		let words = f.tokenizer.words("Мыла ли мама?");

		let pair = f.selector.select_pair(&f.index, &words, &mut StdRng::seed_from_u64(9));
		assert_eq!(pair, Some(Bigram(Token::from("мама"), Token::from("мыла"))));
	}

	#[test]
	fn single_meaningful_word_is_not_enough_for_a_pair() {
		let f = fixture(&["мама мыла раму"]);
		let words = f.tokenizer.words("мама, ну");
		assert!(f.selector.select_pair(&f.index, &words, &mut StdRng::seed_from_u64(9)).is_none());
	}
}
