use log::debug;
use rand::Rng;

use super::corpus_index::CorpusIndex;
use super::token::Sentence;

/// Grows a sentence to the left by walking the backward index.
///
/// Every prepended token counts toward the prefix length. Drawing a
/// `LineStart` below the limit crosses into the previous line of the corpus
/// and the walk continues; drawing one past the limit prepends it and ends
/// the walk. A word drawn past the limit ends the walk without being
/// prepended, which caps a walk at `prefix_length_limit + 1` words.
#[derive(Clone, Copy, Debug)]
pub struct BackwardExtender {
	prefix_length_limit: usize,
}

impl BackwardExtender {
	pub fn new(prefix_length_limit: usize) -> Self {
		Self { prefix_length_limit }
	}

	/// Extends `sentence` in place and returns the number of prepended tokens.
	pub fn extend<R: Rng + ?Sized>(&self, index: &CorpusIndex, sentence: &mut Sentence, rng: &mut R) -> usize {
		let mut prefix_length = 0;

		while let Some(key) = sentence.first_bigram() {
			let Some(candidates) = index.backward(&key) else {
				debug!("No prefix before {}", key);
				break;
			};
			let Some(prefix) = candidates.predict(rng) else {
				break;
			};

			let past_limit = prefix_length > self.prefix_length_limit;
			if prefix.is_line_start() {
				sentence.push_front(prefix.clone());
				prefix_length += 1;
				if past_limit {
					break;
				}
			} else if past_limit {
				break;
			} else {
				sentence.push_front(prefix.clone());
				prefix_length += 1;
			}
		}

		debug!("Prepended {} token(s)", prefix_length);
		prefix_length
	}
}
