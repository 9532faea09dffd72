use rust_stemmers::{Algorithm, Stemmer};

/// Maps a lowercase word to its stem.
///
/// Corpus seeds and message words must go through the same implementation
/// or relevance lookups never match.
pub trait WordStemmer: Send + Sync {
	fn stem(&self, word: &str) -> String;
}

/// Snowball Russian stemmer.
pub struct SnowballStemmer {
	inner: Stemmer,
}

impl SnowballStemmer {
	pub fn russian() -> Self {
		Self { inner: Stemmer::create(Algorithm::Russian) }
	}
}

impl Default for SnowballStemmer {
	fn default() -> Self {
		Self::russian()
	}
}

impl WordStemmer for SnowballStemmer {
	fn stem(&self, word: &str) -> String {
		self.inner.stem(&word.to_lowercase()).into_owned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn inflected_forms_share_a_stem() {
		let stemmer = SnowballStemmer::russian();
		assert_eq!(stemmer.stem("кошка"), stemmer.stem("кошки"));
		assert_eq!(stemmer.stem("Кошку"), stemmer.stem("кошкой"));
	}

	#[test]
	fn punctuation_is_left_alone() {
		let stemmer = SnowballStemmer::russian();
		assert_eq!(stemmer.stem(","), ",");
	}
}
