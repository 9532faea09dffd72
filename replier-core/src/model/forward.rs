use log::debug;
use rand::Rng;

use super::corpus_index::CorpusIndex;
use super::token::{Sentence, Token};

/// Grows a sentence to the right by walking the forward index.
///
/// # Termination
/// - No continuation for the last two tokens, or an empty candidate: stop.
/// - Once more than `sentence_length_limit` tokens were appended:
///   - `!` or `?` is appended and ends the walk,
///   - `,` or a fullstop ends the walk without being appended.
/// - Otherwise the candidate is appended and the walk goes on.
///
/// Length is soft-capped: a walk past the limit still runs until the corpus
/// offers a suitable ending or dead-ends.
#[derive(Clone, Copy, Debug)]
pub struct ForwardExtender {
	sentence_length_limit: usize,
}

impl ForwardExtender {
	pub fn new(sentence_length_limit: usize) -> Self {
		Self { sentence_length_limit }
	}

	/// Extends `sentence` in place and returns the number of appended tokens.
	///
	/// Sentences shorter than two tokens are left untouched.
	pub fn extend<R: Rng + ?Sized>(&self, index: &CorpusIndex, sentence: &mut Sentence, rng: &mut R) -> usize {
		let mut appended = 0;

		while let Some(key) = sentence.last_bigram() {
			let Some(candidates) = index.forward(&key) else {
				debug!("No continuation after {}", key);
				break;
			};
			let Some(next) = candidates.predict(rng) else {
				break;
			};
			if next.is_empty() {
				break;
			}

			if appended > self.sentence_length_limit {
				if is_terminal(next) {
					sentence.push_back(next.clone());
					appended += 1;
					break;
				}
				if is_soft_stop(next) {
					break;
				}
			}

			sentence.push_back(next.clone());
			appended += 1;
		}

		appended
	}
}

/// `!` and `?`: fine to end a long sentence on.
fn is_terminal(token: &Token) -> bool {
	matches!(token.as_word().map(str::trim), Some("!" | "?"))
}

/// `,` and fullstops (stored as `LineStart`): never left dangling at the end.
fn is_soft_stop(token: &Token) -> bool {
	match token {
		Token::LineStart => true,
		Token::Word(word) => matches!(word.trim(), "." | ","),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::IndexOptions;
	use crate::lang::stemmer::SnowballStemmer;
	use crate::lang::tokenizer::Tokenizer;
	use crate::model::token::Bigram;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn build(lines: &[&str]) -> CorpusIndex {
		let tokenizer = Tokenizer::new().unwrap();
		CorpusIndex::build(lines, &tokenizer, &SnowballStemmer::russian(), &IndexOptions::default())
	}

	fn counting_line(words: usize, tail: &str) -> String {
		let mut line: Vec<String> = (0..words).map(|i| format!("слово{}", i)).collect();
		line.push(tail.to_owned());
		line.push("хвост".to_owned());
		line.join(" ")
	}

	#[test]
	fn walks_until_dead_end() {
		let index = build(&["привет как дела"]);
		let mut sentence = Sentence::from(Bigram(Token::LineStart, Token::from("привет")));

		let appended = ForwardExtender::new(10).extend(&index, &mut sentence, &mut StdRng::seed_from_u64(3));
		assert_eq!(appended, 2);
		assert_eq!(sentence.last_bigram(), Some(Bigram(Token::from("как"), Token::from("дела"))));
	}

	#[test]
	fn long_sentence_ends_on_question_mark() {
		let line = counting_line(14, "?");
		let index = build(&[line.as_str()]);
		let mut sentence = Sentence::from(Bigram(Token::LineStart, Token::from("слово0")));

		let appended = ForwardExtender::new(10).extend(&index, &mut sentence, &mut StdRng::seed_from_u64(5));
		// слово1..слово13 then "?" and nothing after it
		assert_eq!(appended, 14);
		assert_eq!(sentence.iter().last(), Some(&Token::from("?")));
	}

	#[test]
	fn long_sentence_drops_trailing_comma() {
		let line = counting_line(14, ",");
		let index = build(&[line.as_str()]);
		let mut sentence = Sentence::from(Bigram(Token::LineStart, Token::from("слово0")));

		let appended = ForwardExtender::new(10).extend(&index, &mut sentence, &mut StdRng::seed_from_u64(5));
		assert_eq!(appended, 13);
		assert_eq!(sentence.iter().last(), Some(&Token::from("слово13")));
	}

	#[test]
	fn short_sentence_keeps_its_comma() {
		let index = build(&["раз , два"]);
		let mut sentence = Sentence::from(Bigram(Token::LineStart, Token::from("раз")));

		ForwardExtender::new(10).extend(&index, &mut sentence, &mut StdRng::seed_from_u64(5));
		let rendered: Vec<String> = sentence.iter().map(Token::to_string).collect();
		assert_eq!(rendered, vec!["~", "раз", ",", "два"]);
	}

	#[test]
	fn single_token_is_left_alone() {
		let index = build(&["привет как дела"]);
		let mut sentence = Sentence::from(vec![Token::from("привет")]);
		assert_eq!(ForwardExtender::new(10).extend(&index, &mut sentence, &mut StdRng::seed_from_u64(1)), 0);
		assert_eq!(sentence.len(), 1);
	}
}
