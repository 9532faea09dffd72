use std::sync::Arc;

use replier_core::{Engine, Replier, ReplierConfig, Seed};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows every walk over the index
    env_logger::init();

    // Start from the default configuration
    // Every field can also be read from a JSON file with `io::load_config`
    let mut config = ReplierConfig::default();

    // No network access in this walkthrough
    config.image_search.enabled = false;

    // Number of appended tokens after which the forward walk looks for an end
    config.generation.sentence_length_limit = 10;

    // Number of prepended tokens after which the backward walk stops at a line start
    config.generation.prefix_length_limit = 5;

    // Chance of also growing a message to the left (must be between 0.0 and 1.0)
    config.generation.set_prepend_probability(0.5)?;

    // Test invalid probabilities
    match config.generation.set_prepend_probability(2.0) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Prepend probability 2.0 is invalid: {}", e),
    }
    match config.dialog.set_continuation_probability(-1.0) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Continuation probability -1.0 is invalid: {}", e),
    }

    // Load the corpus, one message per line
    // A missing file gives an engine that generates nothing
    let engine = Arc::new(Engine::from_corpus_file("./data/messages.txt", config.generation.clone())?);
    println!("Index: {:?}", engine.stats());

    let mut rng = rand::rng();

    // Generate 10 messages from random line starts
    for i in 0..10 {
        match engine.generate_message(None, &mut rng) {
            Some(message) => println!("Generated message {}: {}", i + 1, message),
            None => println!("Generated message {}: <nothing>", i + 1),
        }
    }

    // Continue a custom text
    let custom = engine.generate_message(Some(Seed::RawText("привет как".to_owned())), &mut rng);
    println!("Custom seed: {:?}", custom);

    // Start from a noun or verb of a message
    let relevant = engine.generate_message_with_pos_tagging("где моя кошка?", &mut rng);
    println!("Relevant: {:?}", relevant);

    // Continue a pair of words of a message in both directions
    let pair = engine.generate_kind_of_relevant_message("кошка спит", &mut rng);
    println!("Pair: {:?}", pair);

    // A conversation: the replier only answers when addressed,
    // then keeps answering for a while
    // `from_config` validates the whole configuration first
    let mut replier = Replier::from_config(engine.clone(), &config)?;
    for message in ["всем привет", "данило, ты тут?", "как дела?", "что делаешь?"] {
        println!("> {}", message);
        if let Some(answer) = replier.get_response(message) {
            println!("< {}", answer);
        }
    }

    Ok(())
}
