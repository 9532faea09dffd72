use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use replier_core::config::{DialogConfig, GenerationConfig, IndexOptions};
use replier_core::lang::stemmer::SnowballStemmer;
use replier_core::lang::tokenizer::Tokenizer;
use replier_core::model::backward::BackwardExtender;
use replier_core::model::corpus_index::CorpusIndex;
use replier_core::model::dialog::DialogState;
use replier_core::model::render::render;
use replier_core::model::token::{Sentence, Token};
use replier_core::{Bigram, Engine, Seed};

fn build_index(lines: &[String]) -> (CorpusIndex, Tokenizer) {
	let tokenizer = Tokenizer::new().expect("tokenizer pattern");
	let index = CorpusIndex::build(lines, &tokenizer, &SnowballStemmer::russian(), &IndexOptions::default());
	(index, tokenizer)
}

fn quiet_engine(lines: &[String]) -> Engine {
	let mut config = GenerationConfig::default();
	config.set_prepend_probability(0.0).expect("valid probability");
	Engine::new(lines, config).expect("engine")
}

/// Lines whose words never repeat, anywhere in the corpus.
fn acyclic_corpus() -> impl Strategy<Value = Vec<String>> {
	prop::collection::vec(prop::collection::vec("[а-я]{1,4}", 2..8), 1..6).prop_map(|lines| {
		lines
			.into_iter()
			.enumerate()
			.map(|(i, words)| {
				words
					.into_iter()
					.enumerate()
					.map(|(j, word)| format!("{word}{i}x{j}"))
					.collect::<Vec<_>>()
					.join(" ")
			})
			.collect()
	})
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(48))]

	#[test]
	fn every_trigram_is_indexed_both_ways(lines in prop::collection::vec("[абвг ]{0,16}", 1..8)) {
		let (index, tokenizer) = build_index(&lines);

		for line in &lines {
			for window in tokenizer.line_tokens(line).windows(3) {
				let (a, b, c) = (&window[0], &window[1], &window[2]);
				let forward = index.forward(&Bigram(a.clone(), b.clone()));
				let backward = index.backward(&Bigram(b.clone(), c.clone()));
				prop_assert!(forward.is_some_and(|t| t.contains(c)));
				prop_assert!(backward.is_some_and(|t| t.contains(a)));
			}
		}

		// Duplicates are kept: one list entry per trigram occurrence
		let trigrams = index.stats().trigrams;
		prop_assert_eq!(index.forward_entries().map(|(_, t)| t.len()).sum::<usize>(), trigrams);
		prop_assert_eq!(index.backward_entries().map(|(_, t)| t.len()).sum::<usize>(), trigrams);
	}

	#[test]
	fn seeds_open_lines_and_continue(lines in prop::collection::vec("[абвгд ]{0,20}", 1..10)) {
		let (index, _) = build_index(&lines);
		for (_, seed) in index.seeds() {
			prop_assert!(seed.is_line_initial());
			prop_assert!(index.has_continuation(seed));
		}
	}

	#[test]
	fn forward_walk_ends_on_the_original_line(lines in acyclic_corpus(), seed in any::<u64>()) {
		let engine = quiet_engine(&lines);
		let mut rng = StdRng::seed_from_u64(seed);

		for line in &lines {
			let first = line.split(' ').next().unwrap_or_default();
			let tokens = vec![Token::LineStart, Token::from(first)];
			let message = engine.generate_message(Some(Seed::TokenSequence(tokens)), &mut rng);
			prop_assert_eq!(message.as_deref(), Some(line.as_str()));
		}
	}

	#[test]
	fn backward_walk_is_bounded(
		lines in prop::collection::vec("[аб .]{0,24}", 1..8),
		limit in 0usize..6,
		seed in any::<u64>()
	) {
		let (index, _) = build_index(&lines);
		let extender = BackwardExtender::new(limit);
		let mut rng = StdRng::seed_from_u64(seed);

		for (key, _) in index.backward_entries() {
			let mut sentence = Sentence::from(key.clone());
			let prepended = extender.extend(&index, &mut sentence, &mut rng);

			let tokens = sentence.into_tokens();
			prop_assert_eq!(tokens.len(), prepended + 2);
			let words = tokens[..prepended].iter().filter(|t| !t.is_line_start()).count();
			prop_assert!(words <= limit + 1, "prepended {} words with limit {}", words, limit);
		}
	}
}

#[test]
fn renders_single_words_and_fullstops() {
	assert_eq!(render(&[Token::from("привет")]), "привет");
	assert_eq!(render(&[Token::from("мама"), Token::LineStart, Token::from("мыла")]), "мама. мыла");
}

#[test]
fn relevance_falls_back_to_any_message() {
	let engine = quiet_engine(&["кошка спит на окне".to_owned(), "собака лает".to_owned()]);
	let mut rng = StdRng::seed_from_u64(5);

	assert!(engine.generate_message_with_pos_tagging("и в на", &mut rng).is_none());
	assert!(engine.generate_message(None, &mut rng).is_some_and(|m| !m.is_empty()));
}

#[test]
fn dialog_decays_after_six_responses() {
	let config = DialogConfig::default();
	let mut dialog = DialogState::new();
	for _ in 0..6 {
		dialog.record(&config, true);
	}
	assert_eq!(dialog.consecutive_response_count(), 0);
}

#[test]
fn single_line_corpus_is_reproduced() {
	let engine = Engine::new(&["привет как дела"], GenerationConfig::default()).expect("engine");
	for seed in 0..20 {
		let mut rng = StdRng::seed_from_u64(seed);
		assert_eq!(engine.generate_message(None, &mut rng).as_deref(), Some("привет как дела"));
	}
}
