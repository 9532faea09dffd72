use std::collections::VecDeque;
use std::fmt;

/// Surface form used when a `LineStart` has to be printed for debugging.
pub const LINE_START_MARK: &str = "~";

/// Atomic unit of the trigram indexes.
///
/// `LineStart` marks the beginning of a corpus line. Literal fullstops are
/// folded into it when text is turned into tokens, so a `.` inside a line
/// behaves like a sentence boundary for both extenders.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
	LineStart,
	Word(String),
}

impl Token {
	/// Builds a token from a raw surface string.
	///
	/// - Lowercases the text
	/// - Maps a lone `.` to `LineStart`
	pub fn from_raw(raw: &str) -> Self {
		let trimmed = raw.trim();
		if trimmed == "." {
			Token::LineStart
		} else {
			Token::Word(trimmed.to_lowercase())
		}
	}

	/// Returns the word text, or `None` for `LineStart`.
	pub fn as_word(&self) -> Option<&str> {
		match self {
			Token::Word(word) => Some(word),
			Token::LineStart => None,
		}
	}

	pub fn is_line_start(&self) -> bool {
		matches!(self, Token::LineStart)
	}

	/// True for a word that is empty once trimmed.
	pub fn is_empty(&self) -> bool {
		match self {
			Token::Word(word) => word.trim().is_empty(),
			Token::LineStart => false,
		}
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Token::LineStart => f.write_str(LINE_START_MARK),
			Token::Word(word) => f.write_str(word),
		}
	}
}

impl From<&str> for Token {
	fn from(raw: &str) -> Self {
		Token::from_raw(raw)
	}
}

/// Ordered pair of tokens used as a key by both indexes.
///
/// In the forward index the pair is `(t1, t2)` of a trigram, in the
/// backward index it is `(t2, t3)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bigram(pub Token, pub Token);

impl Bigram {
	pub fn new(first: Token, second: Token) -> Self {
		Self(first, second)
	}

	/// True when the pair opens a corpus line.
	pub fn is_line_initial(&self) -> bool {
		self.0.is_line_start()
	}
}

impl fmt::Display for Bigram {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {})", self.0, self.1)
	}
}

/// Token sequence grown by one generation call.
///
/// Forward extension appends at the back, backward extension prepends at
/// the front. A sentence is never shared between generations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sentence {
	tokens: VecDeque<Token>,
}

impl Sentence {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	pub fn push_back(&mut self, token: Token) {
		self.tokens.push_back(token);
	}

	pub fn push_front(&mut self, token: Token) {
		self.tokens.push_front(token);
	}

	/// The last two tokens, used as the forward lookup key.
	pub fn last_bigram(&self) -> Option<Bigram> {
		let len = self.tokens.len();
		if len < 2 {
			return None;
		}
		Some(Bigram(self.tokens[len - 2].clone(), self.tokens[len - 1].clone()))
	}

	/// The first two tokens, used as the backward lookup key.
	pub fn first_bigram(&self) -> Option<Bigram> {
		if self.tokens.len() < 2 {
			return None;
		}
		Some(Bigram(self.tokens[0].clone(), self.tokens[1].clone()))
	}

	pub fn iter(&self) -> impl Iterator<Item=&Token> {
		self.tokens.iter()
	}

	pub fn into_tokens(self) -> Vec<Token> {
		self.tokens.into()
	}
}

impl From<Bigram> for Sentence {
	fn from(bigram: Bigram) -> Self {
		Self { tokens: VecDeque::from([bigram.0, bigram.1]) }
	}
}

impl From<Vec<Token>> for Sentence {
	fn from(tokens: Vec<Token>) -> Self {
		Self { tokens: tokens.into() }
	}
}

impl FromIterator<Token> for Sentence {
	fn from_iter<I: IntoIterator<Item=Token>>(iter: I) -> Self {
		Self { tokens: iter.into_iter().collect() }
	}
}

/// Starting point of a generation.
///
/// Resolved once into a `Sentence` before any extension runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Seed {
	/// Free text (usually a corpus line), tokenized like the corpus.
	RawText(String),
	/// Tokens used as is.
	TokenSequence(Vec<Token>),
}

impl From<Bigram> for Seed {
	fn from(bigram: Bigram) -> Self {
		Seed::TokenSequence(vec![bigram.0, bigram.1])
	}
}
