use rand::Rng;
use rand::seq::IndexedRandom;

use super::token::Token;

/// Tokens observed next to a bigram key.
///
/// A `Transitions` list belongs to one key of the forward or the backward
/// index. Every observation is kept, duplicates included: drawing uniformly
/// from the list is what weights a continuation by its corpus frequency.
///
/// ## Invariants
/// - Entries are appended in corpus order and never removed
/// - Lists stored in an index are never empty
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transitions {
	/// Observed continuations, one entry per occurrence.
	/// Example: ["как", "как", "где"]
	tokens: Vec<Token>,
}

impl Transitions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one more occurrence of `token`.
	pub fn add(&mut self, token: Token) {
		self.tokens.push(token);
	}

	/// Draws one continuation uniformly over the occurrences.
	///
	/// Returns `None` if nothing was observed.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Token> {
		self.tokens.choose(rng)
	}

	/// Appends the occurrences of another list.
	///
	/// Used when partial indexes built on separate chunks are combined.
	pub fn merge(&mut self, other: Transitions) {
		self.tokens.extend(other.tokens);
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	pub fn contains(&self, token: &Token) -> bool {
		self.tokens.contains(token)
	}

	/// Number of occurrences of `token`.
	pub fn count(&self, token: &Token) -> usize {
		self.tokens.iter().filter(|t| *t == token).count()
	}

	pub fn iter(&self) -> impl Iterator<Item=&Token> {
		self.tokens.iter()
	}
}
