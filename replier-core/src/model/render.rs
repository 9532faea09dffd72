use super::token::Token;

/// Lowercase Cyrillic letters; any other single character is glued to the
/// previous token.
const ALPHABET: &str = "йцукенгшщзхъёфывапролджэячсмитьбю";

/// Joins tokens into a punctuated line of text.
///
/// - `LineStart` prints as `.`, or nothing while the output is still empty
/// - `-` prints as ` - `
/// - one-character tokens outside the alphabet (punctuation, digits) print
///   without a leading space
/// - every other token prints as a space and the lowercased token
///
/// The result is trimmed.
pub fn render<'a, I>(tokens: I) -> String
where
	I: IntoIterator<Item=&'a Token>,
{
	let mut rendered = String::new();

	for token in tokens {
		match token {
			Token::LineStart => {
				if !rendered.is_empty() {
					rendered.push('.');
				}
			}
			Token::Word(word) => {
				let word = word.trim().to_lowercase();
				let mut chars = word.chars();
				match (chars.next(), chars.next()) {
					(Some('-'), None) => rendered.push_str(" - "),
					(Some(c), None) if !ALPHABET.contains(c) => rendered.push(c),
					_ => {
						rendered.push(' ');
						rendered.push_str(&word);
					}
				}
			}
		}
	}

	rendered.trim().to_owned()
}
