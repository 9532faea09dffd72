use regex::Regex;

use crate::error::ReplierError;
use crate::model::token::Token;

/// Words (inner hyphens and apostrophes kept), an ellipsis, or any single
/// character that is neither a word character nor whitespace.
const TOKEN_PATTERN: &str = r"\w+(?:[-'’]\w+)*|\.\.\.|[^\w\s]";

/// Splits text into lowercased word and punctuation tokens.
///
/// The same tokenizer is used for the corpus, for raw-text seeds and for
/// incoming messages, so that lookups on either side agree.
#[derive(Clone, Debug)]
pub struct Tokenizer {
	pattern: Regex,
}

impl Tokenizer {
	/// Compiles the token pattern.
	///
	/// # Errors
	/// Returns an error if the pattern fails to compile.
	pub fn new() -> Result<Self, ReplierError> {
		Ok(Self { pattern: Regex::new(TOKEN_PATTERN)? })
	}

	/// Lowercased surface tokens, punctuation included.
	///
	/// Example: `"Привет, как дела?"` → `["привет", ",", "как", "дела", "?"]`
	pub fn words(&self, text: &str) -> Vec<String> {
		self.pattern
			.find_iter(text)
			.map(|m| m.as_str().to_lowercase())
			.collect()
	}

	/// Index tokens of `text` (a lone `.` becomes `LineStart`).
	pub fn tokens(&self, text: &str) -> Vec<Token> {
		self.pattern
			.find_iter(text)
			.map(|m| Token::from_raw(m.as_str()))
			.collect()
	}

	/// Index tokens of one corpus line, opened by `LineStart`.
	pub fn line_tokens(&self, line: &str) -> Vec<Token> {
		let mut tokens = Vec::with_capacity(16);
		tokens.push(Token::LineStart);
		tokens.extend(self.tokens(line));
		tokens
	}
}

/// Keeps only alphanumerics and hyphens, lowercased.
///
/// Key normalization for the word-to-lines index.
/// Example: `"«Дела!»"` → `"дела"`
pub fn clean_word(word: &str) -> String {
	word.chars()
		.filter(|c| c.is_alphanumeric() || *c == '-')
		.flat_map(char::to_lowercase)
		.collect()
}
