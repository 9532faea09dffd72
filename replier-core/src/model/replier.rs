use std::sync::Arc;

use log::{debug, info, warn};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::config::{DialogConfig, ReplierConfig, TriggerConfig};
use crate::error::ReplierError;
use crate::image_search::{HttpImageSearch, ImageSearch, find_image};
use crate::model::dialog::DialogState;
use crate::model::generator::Engine;
use crate::model::token::Seed;

/// Decides whether and how to answer the messages of one conversation.
///
/// # Responsibilities
/// - Route a message to an image answer, a relevant answer, an image
///   search or a plain generated answer
/// - Keep the dialog counter of the conversation
///
/// The engine is shared, the dialog state is not: use one `Replier` per
/// conversation.
pub struct Replier {
	engine: Arc<Engine>,
	dialog: DialogState,
	dialog_config: DialogConfig,
	triggers: TriggerConfig,
	images: Option<Arc<dyn ImageSearch>>,
	image_extensions: Vec<String>,
}

impl Replier {
	/// Creates a replier without image search.
	pub fn new(engine: Arc<Engine>, config: &ReplierConfig) -> Self {
		Self {
			engine,
			dialog: DialogState::new(),
			dialog_config: config.dialog.clone(),
			triggers: config.triggers.clone(),
			images: None,
			image_extensions: config.image_search.extensions.clone(),
		}
	}

	/// Validates `config` and creates a replier, with an HTTP image search
	/// when enabled.
	///
	/// The image search holds a blocking HTTP client: call this outside of an
	/// async runtime, or share one search through `with_image_search`.
	///
	/// # Errors
	/// Returns an error on an invalid configuration or if the HTTP client
	/// cannot be built.
	pub fn from_config(engine: Arc<Engine>, config: &ReplierConfig) -> Result<Self, ReplierError> {
		config.validate()?;
		let replier = Self::new(engine, config);
		if !config.image_search.enabled {
			return Ok(replier);
		}
		let search = HttpImageSearch::new(&config.image_search)?;
		Ok(replier.with_image_search(Arc::new(search)))
	}

	pub fn with_image_search(mut self, search: Arc<dyn ImageSearch>) -> Self {
		self.images = Some(search);
		self
	}

	pub fn engine(&self) -> &Arc<Engine> {
		&self.engine
	}

	pub fn dialog(&self) -> DialogState {
		self.dialog
	}

	pub fn reset_dialog(&mut self) {
		self.dialog.reset();
	}

	/// Answers `message`, or returns `None` to stay silent.
	pub fn get_response(&mut self, message: &str) -> Option<String> {
		self.get_response_with(message, &mut rand::rng())
	}

	/// Answers `message` with an explicit random source.
	///
	/// # Behavior
	/// - A message with an image link gets a generated comment on images.
	/// - An ongoing dialog, or a random draw, gets a relevant answer, with
	///   a plain generated one as fallback.
	/// - An ongoing dialog, a random draw, or the bot's name together with
	///   the image request word, gets an image search answer.
	/// - An ongoing dialog, or the bot's name, gets either a plain or a
	///   relevant answer.
	///
	/// Produced answers raise the dialog counter.
	pub fn get_response_with<R: Rng + ?Sized>(&mut self, message: &str, rng: &mut R) -> Option<String> {
		let will_continue_dialog = self.dialog.should_continue(&self.dialog_config, rng);
		debug!(
			"will_continue_dialog = {} (counter = {})",
			will_continue_dialog,
			self.dialog.consecutive_response_count()
		);

		let lowered = message.to_lowercase();
		let name = self.triggers.name.to_lowercase();
		let image_request = self.triggers.image_request.to_lowercase();
		let mentioned = !name.is_empty() && lowered.contains(&name);

		let response = if self.has_image_link(message) {
			self.response_to_an_image(rng)
		} else if will_continue_dialog || rng.random_bool(self.triggers.relevant_reply_probability()) {
			self.relevant_or_any(message, rng)
		} else if will_continue_dialog
			|| rng.random_bool(self.triggers.image_reply_probability())
			|| (mentioned && !image_request.is_empty() && lowered.contains(&image_request))
		{
			let query = lowered.replace(&name, "").replace(&image_request, "");
			match self.image_response(query.trim(), rng) {
				Ok(url) => url,
				Err(e) => {
					warn!("Image search failed: {}", e);
					None
				}
			}
		} else if will_continue_dialog || mentioned {
			if rng.random_bool(0.5) {
				self.engine.generate_message(None, rng)
			} else {
				self.relevant_or_any(message, rng)
			}
		} else {
			None
		};

		self.dialog.record(&self.dialog_config, response.is_some());
		response
	}

	/// True for a message carrying a link to an image file.
	pub fn has_image_link(&self, message: &str) -> bool {
		message.contains("http") && self.image_extensions.iter().any(|ext| message.contains(ext.as_str()))
	}

	/// Image URL matching the nouns and verbs of `query`.
	///
	/// # Errors
	/// Propagates image search failures.
	pub fn image_response<R: Rng + ?Sized>(&self, query: &str, rng: &mut R) -> Result<Option<String>, ReplierError> {
		info!("Using image_response to respond to {:?}", query);
		let Some(search) = &self.images else {
			debug!("No image search configured");
			return Ok(None);
		};
		let terms = self.engine.nouns_and_verbs(query);
		find_image(search.as_ref(), terms, &self.image_extensions, rng)
	}

	fn response_to_an_image<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
		let word = self.triggers.image_reply_words.choose(rng)?;
		info!("Responding to an image with a line about {:?}", word);
		let line = self.engine.message_containing_any_word(word, rng)?;
		self.engine.generate_message(Some(Seed::RawText(line)), rng)
	}

	fn relevant_or_any<R: Rng + ?Sized>(&self, message: &str, rng: &mut R) -> Option<String> {
		self.engine
			.generate_message_with_pos_tagging(message, rng)
			.or_else(|| self.engine.generate_message(None, rng))
	}
}
