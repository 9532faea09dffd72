use std::fmt;
use std::str::FromStr;

/// Grammatical gender carried by adjective-like tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gender {
	Masculine,
	Feminine,
	Neuter,
	Plural,
}

impl Gender {
	fn suffix(self) -> &'static str {
		match self {
			Gender::Masculine => "m",
			Gender::Feminine => "f",
			Gender::Neuter => "n",
			Gender::Plural => "pl",
		}
	}

	fn parse(suffix: &str) -> Option<Self> {
		match suffix {
			"m" => Some(Gender::Masculine),
			"f" => Some(Gender::Feminine),
			"n" => Some(Gender::Neuter),
			"pl" => Some(Gender::Plural),
			_ => None,
		}
	}
}

/// Coarse Russian part-of-speech tag.
///
/// Printed and parsed as the short codes used by Russian corpus taggers
/// (`S`, `V`, `A=m`, `A-PRO=f`, `S-PRO`, ...), so any tagger producing that
/// tag set can be plugged in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PosTag {
	Noun,
	Verb,
	Adjective(Gender),
	PronounAdjective(Gender),
	PronounNoun,
	Adverb,
	Preposition,
	Conjunction,
	Particle,
	Interjection,
	Numeral,
	NonLexical,
}

impl PosTag {
	/// Nouns and verbs, the words a relevant seed is looked up with.
	pub fn is_noun_or_verb(self) -> bool {
		matches!(self, PosTag::Noun | PosTag::Verb)
	}

	/// Words worth pairing up when looking for a bigram in a message:
	/// nouns, verbs, singular adjectives and pronouns.
	pub fn is_meaningful(self) -> bool {
		match self {
			PosTag::Noun | PosTag::Verb | PosTag::PronounNoun => true,
			PosTag::Adjective(gender) | PosTag::PronounAdjective(gender) => gender != Gender::Plural,
			_ => false,
		}
	}
}

impl fmt::Display for PosTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PosTag::Noun => f.write_str("S"),
			PosTag::Verb => f.write_str("V"),
			PosTag::Adjective(gender) => write!(f, "A={}", gender.suffix()),
			PosTag::PronounAdjective(gender) => write!(f, "A-PRO={}", gender.suffix()),
			PosTag::PronounNoun => f.write_str("S-PRO"),
			PosTag::Adverb => f.write_str("ADV"),
			PosTag::Preposition => f.write_str("PR"),
			PosTag::Conjunction => f.write_str("CONJ"),
			PosTag::Particle => f.write_str("PART"),
			PosTag::Interjection => f.write_str("INTJ"),
			PosTag::Numeral => f.write_str("NUM"),
			PosTag::NonLexical => f.write_str("NONLEX"),
		}
	}
}

impl FromStr for PosTag {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let tag = match s {
			"S" => PosTag::Noun,
			"V" => PosTag::Verb,
			"S-PRO" => PosTag::PronounNoun,
			"ADV" => PosTag::Adverb,
			"PR" => PosTag::Preposition,
			"CONJ" => PosTag::Conjunction,
			"PART" => PosTag::Particle,
			"INTJ" => PosTag::Interjection,
			"NUM" => PosTag::Numeral,
			"NONLEX" => PosTag::NonLexical,
			_ => {
				let parsed = if let Some(gender) = s.strip_prefix("A-PRO=") {
					Gender::parse(gender).map(PosTag::PronounAdjective)
				} else if let Some(gender) = s.strip_prefix("A=") {
					Gender::parse(gender).map(PosTag::Adjective)
				} else {
					None
				};
				return parsed.ok_or_else(|| format!("Unknown tag {}", s));
			}
		};
		Ok(tag)
	}
}

/// Tags a tokenized message.
pub trait Tagger: Send + Sync {
	/// Returns one `(word, tag)` pair per input word, in order.
	fn tag(&self, words: &[String]) -> Vec<(String, PosTag)>;
}

const PREPOSITIONS: &[&str] = &[
	"в", "во", "на", "с", "со", "к", "ко", "по", "за", "из", "изо", "от", "до", "для", "о", "об",
	"обо", "у", "без", "под", "над", "при", "про", "через", "между", "перед", "около", "после",
	"вокруг", "среди",
];

const CONJUNCTIONS: &[&str] = &[
	"и", "а", "но", "или", "что", "чтобы", "если", "как", "когда", "потому", "да", "либо",
	"тоже", "также", "зато", "однако", "хотя", "пока", "раз",
];

const PARTICLES: &[&str] = &[
	"не", "ни", "же", "ли", "бы", "б", "вот", "вон", "уже", "даже", "только", "лишь", "ведь",
	"ну", "то", "разве", "неужели", "пусть",
];

const INTERJECTIONS: &[&str] = &["ах", "ох", "эх", "ой", "ага", "угу", "ого", "привет", "пока", "ура", "блин"];

const PERSONAL_PRONOUNS: &[&str] = &[
	"я", "ты", "он", "она", "оно", "мы", "вы", "они", "меня", "тебя", "его", "её", "ее", "нас",
	"вас", "их", "мне", "тебе", "ему", "ей", "нам", "вам", "им", "мной", "тобой", "ним", "ней",
	"нами", "вами", "ими", "себя", "себе", "собой", "кто", "никто", "ничто", "нечто", "кого",
	"кому", "чем", "ничего",
];

const PRONOUN_ADJECTIVES_M: &[&str] = &[
	"мой", "твой", "свой", "наш", "ваш", "этот", "тот", "какой", "такой", "весь", "который",
	"чей", "сам", "никакой", "каждый",
];

const PRONOUN_ADJECTIVES_F: &[&str] = &[
	"моя", "твоя", "своя", "наша", "ваша", "эта", "та", "какая", "такая", "вся", "которая",
	"чья", "сама", "никакая", "каждая",
];

const PRONOUN_ADJECTIVES_N: &[&str] = &[
	"моё", "мое", "твоё", "твое", "своё", "свое", "наше", "ваше", "это", "какое", "такое", "всё",
	"все", "которое", "чьё", "само", "никакое", "каждое",
];

const ADVERBS: &[&str] = &[
	"здесь", "там", "тут", "где", "куда", "когда", "сейчас", "теперь", "потом", "очень", "опять",
	"снова", "всегда", "никогда", "тогда", "так", "почему", "зачем", "ещё", "еще", "уж", "вообще",
];

/// Nouns whose ending reads like an adjective.
const NOUNS: &[&str] = &[
	"герой", "покой", "бой", "слой", "строй", "зной", "прибой", "отбой", "конвой", "рой",
	"водяной", "портной", "рабочий", "учёный", "ученый", "животное", "насекомое",
];

/// Derivational noun suffixes, checked before the adjective endings.
const NOUN_ENDINGS: &[&str] = &[
	"ение", "ание", "тие", "ство", "ость", "ция", "тель", "ник", "арий", "орий", "ерий", "изм",
];

/// Infinitive, reflexive, present and past verb endings.
const VERB_ENDINGS: &[&str] = &[
	"ться", "тись", "ется", "ются", "ится", "ятся", "атся", "ешься", "ишься", "ался", "ился",
	"лась", "лось", "лись", "ешь", "ишь", "ете", "ите", "ет", "ит", "ут", "ют", "ат", "ят", "ть",
	"ти", "ал", "ала", "ало", "али", "ил", "ила", "ило", "или", "ел", "ела", "ело", "ели", "ыл",
	"ыла", "ыло", "ыли",
];

const ADJECTIVE_ENDINGS: &[(&str, Gender)] = &[
	("ого", Gender::Masculine),
	("его", Gender::Masculine),
	("ому", Gender::Masculine),
	("ему", Gender::Masculine),
	("ый", Gender::Masculine),
	("ий", Gender::Masculine),
	("ой", Gender::Masculine),
	("ая", Gender::Feminine),
	("яя", Gender::Feminine),
	("ую", Gender::Feminine),
	("юю", Gender::Feminine),
	("ое", Gender::Neuter),
	("ее", Gender::Neuter),
	("ые", Gender::Plural),
	("ие", Gender::Plural),
	("ых", Gender::Plural),
	("их", Gender::Plural),
];

/// Dictionary-free Russian tagger.
///
/// Closed word classes come from fixed lists, open classes from word
/// endings. Anything alphabetic that matches nothing is a noun. Accuracy is
/// that of a heuristic: good enough to pick candidate words out of a chat
/// message, not to parse it.
#[derive(Clone, Debug, Default)]
pub struct RuleTagger;

impl RuleTagger {
	pub fn new() -> Self {
		Self
	}

	/// Tags a single lowercase word.
	pub fn tag_word(&self, word: &str) -> PosTag {
		let word = word.to_lowercase();
		let char_count = word.chars().count();

		if !word.chars().any(char::is_alphanumeric) {
			return PosTag::NonLexical;
		}
		if word.chars().all(|c| c.is_ascii_digit()) {
			return PosTag::Numeral;
		}
		if !word.chars().any(is_cyrillic) {
			return PosTag::NonLexical;
		}

		let word = word.as_str();
		if PREPOSITIONS.contains(&word) {
			return PosTag::Preposition;
		}
		if PERSONAL_PRONOUNS.contains(&word) {
			return PosTag::PronounNoun;
		}
		if PRONOUN_ADJECTIVES_M.contains(&word) {
			return PosTag::PronounAdjective(Gender::Masculine);
		}
		if PRONOUN_ADJECTIVES_F.contains(&word) {
			return PosTag::PronounAdjective(Gender::Feminine);
		}
		if PRONOUN_ADJECTIVES_N.contains(&word) {
			return PosTag::PronounAdjective(Gender::Neuter);
		}
		if CONJUNCTIONS.contains(&word) {
			return PosTag::Conjunction;
		}
		if PARTICLES.contains(&word) {
			return PosTag::Particle;
		}
		if INTERJECTIONS.contains(&word) {
			return PosTag::Interjection;
		}
		if ADVERBS.contains(&word) {
			return PosTag::Adverb;
		}
		if NOUNS.contains(&word) {
			return PosTag::Noun;
		}

		// Short words carry too little ending to guess from
		if char_count <= 3 {
			return PosTag::Noun;
		}

		if NOUN_ENDINGS.iter().any(|ending| word.ends_with(*ending)) {
			return PosTag::Noun;
		}
		if let Some((_, gender)) = ADJECTIVE_ENDINGS
			.iter()
			.find(|(ending, _)| word.ends_with(*ending))
		{
			return PosTag::Adjective(*gender);
		}
		if VERB_ENDINGS.iter().any(|ending| word.ends_with(*ending)) {
			return PosTag::Verb;
		}

		PosTag::Noun
	}
}

impl Tagger for RuleTagger {
	fn tag(&self, words: &[String]) -> Vec<(String, PosTag)> {
		words
			.iter()
			.map(|word| (word.clone(), self.tag_word(word)))
			.collect()
	}
}

fn is_cyrillic(c: char) -> bool {
	matches!(c, 'а'..='я' | 'ё' | 'А'..='Я' | 'Ё')
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tags_round_trip_through_their_codes() {
		for code in ["S", "V", "A=m", "A=f", "A=n", "A-PRO=m", "A-PRO=f", "A-PRO=n", "S-PRO", "NONLEX"] {
			let tag: PosTag = code.parse().unwrap();
			assert_eq!(tag.to_string(), code);
		}
		assert!("A=x".parse::<PosTag>().is_err());
	}

	#[test]
	fn closed_classes_come_from_the_lists() {
		let tagger = RuleTagger::new();
		assert_eq!(tagger.tag_word("в"), PosTag::Preposition);
		assert_eq!(tagger.tag_word("и"), PosTag::Conjunction);
		assert_eq!(tagger.tag_word("не"), PosTag::Particle);
		assert_eq!(tagger.tag_word("мы"), PosTag::PronounNoun);
		assert_eq!(tagger.tag_word("моя"), PosTag::PronounAdjective(Gender::Feminine));
		assert_eq!(tagger.tag_word(","), PosTag::NonLexical);
		assert_eq!(tagger.tag_word("42"), PosTag::Numeral);
	}

	#[test]
	fn open_classes_come_from_endings() {
		let tagger = RuleTagger::new();
		assert_eq!(tagger.tag_word("читать"), PosTag::Verb);
		assert_eq!(tagger.tag_word("смеялись"), PosTag::Verb);
		assert_eq!(tagger.tag_word("красивая"), PosTag::Adjective(Gender::Feminine));
		assert_eq!(tagger.tag_word("новый"), PosTag::Adjective(Gender::Masculine));
		assert_eq!(tagger.tag_word("кошка"), PosTag::Noun);
		assert_eq!(tagger.tag_word("собака"), PosTag::Noun);
	}

	#[test]
	fn nouns_with_adjective_like_endings() {
		let tagger = RuleTagger::new();
		for word in ["сообщение", "решение", "настроение", "развитие", "комментарий", "сценарий", "герой"] {
			assert_eq!(tagger.tag_word(word), PosTag::Noun, "{word}");
		}
		assert_eq!(tagger.tag_word("синие"), PosTag::Adjective(Gender::Plural));
		assert_eq!(tagger.tag_word("синий"), PosTag::Adjective(Gender::Masculine));
		assert_eq!(tagger.tag_word("большой"), PosTag::Adjective(Gender::Masculine));
	}

	#[test]
	fn third_person_verbs() {
		let tagger = RuleTagger::new();
		assert_eq!(tagger.tag_word("спит"), PosTag::Verb);
		assert_eq!(tagger.tag_word("говорит"), PosTag::Verb);
		assert_eq!(tagger.tag_word("читает"), PosTag::Verb);
	}

	#[test]
	fn meaningful_excludes_function_words() {
		assert!(PosTag::Noun.is_meaningful());
		assert!(PosTag::PronounAdjective(Gender::Neuter).is_meaningful());
		assert!(!PosTag::Adjective(Gender::Plural).is_meaningful());
		assert!(!PosTag::Preposition.is_meaningful());
		assert!(!PosTag::Adverb.is_noun_or_verb());
	}
}
