use serde::Deserialize;

use crate::error::ReplierError;

/// How corpus lines are cut into trigrams.
///
/// # Variants
/// - `LineRespecting`: every line is tokenized on its own behind a
///   `LineStart`, trigrams never span two lines.
/// - `CorpusFlattening`: all lines (each behind a `LineStart`) form one
///   token stream, trigrams may run from one line into the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tokenization {
	#[default]
	LineRespecting,
	CorpusFlattening,
}

/// Index construction parameters.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
	pub tokenization: Tokenization,

	/// Number of chunks built concurrently.
	/// `1` builds on the calling thread, `0` picks a count from the CPU count.
	pub build_threads: usize,
}

impl Default for IndexOptions {
	fn default() -> Self {
		Self { tokenization: Tokenization::LineRespecting, build_threads: 1 }
	}
}

/// Generation parameters shared by every request served by an engine.
///
/// # Invariants
/// - `prepend_probability` is in `[0.0, 1.0]`
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
	/// Appended-token count after which the forward walk looks for an end.
	pub sentence_length_limit: usize,

	/// Prepend count after which the backward walk stops at the next line start.
	pub prefix_length_limit: usize,

	/// Chance that an unconditioned or seeded message is also grown leftward.
	prepend_probability: f64,

	pub index: IndexOptions,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			sentence_length_limit: 10,
			prefix_length_limit: 5,
			prepend_probability: 0.5,
			index: IndexOptions::default(),
		}
	}
}

impl GenerationConfig {
	/// Settings of the simplified engine: longer sentences before stopping.
	pub fn simplified() -> Self {
		Self { sentence_length_limit: 20, ..Self::default() }
	}

	pub fn prepend_probability(&self) -> f64 {
		self.prepend_probability
	}

	/// Sets the prepend probability (0.0..=1.0).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_prepend_probability(&mut self, probability: f64) -> Result<(), ReplierError> {
		self.prepend_probability = check_probability("prepend_probability", probability)?;
		Ok(())
	}

	pub(crate) fn validate(&self) -> Result<(), ReplierError> {
		check_probability("prepend_probability", self.prepend_probability)?;
		Ok(())
	}
}

/// Parameters of the dialog continuation decision.
///
/// The chance to keep answering is
/// `(draw_range * continuation_probability - counter) / draw_range`,
/// so it shrinks with every consecutive answer.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
	continuation_probability: f64,

	/// Size of the integer range the decision is drawn from, at least 1.
	draw_range: u32,

	/// Counter value above which the dialog is considered over.
	ceiling: u32,
}

impl Default for DialogConfig {
	fn default() -> Self {
		Self { continuation_probability: 0.2, draw_range: 10, ceiling: 5 }
	}
}

impl DialogConfig {
	pub fn continuation_probability(&self) -> f64 {
		self.continuation_probability
	}

	/// Sets the base continuation probability (0.0..=1.0).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_continuation_probability(&mut self, probability: f64) -> Result<(), ReplierError> {
		self.continuation_probability = check_probability("continuation_probability", probability)?;
		Ok(())
	}

	pub fn draw_range(&self) -> u32 {
		self.draw_range
	}

	pub fn ceiling(&self) -> u32 {
		self.ceiling
	}

	/// Sets the size of the draw range (> 0).
	///
	/// # Errors
	/// Returns an error if `draw_range` is zero.
	pub fn set_draw_range(&mut self, draw_range: u32) -> Result<(), ReplierError> {
		self.draw_range = check_draw_range(draw_range)?;
		Ok(())
	}

	pub fn set_ceiling(&mut self, ceiling: u32) {
		self.ceiling = ceiling;
	}

	fn validate(&self) -> Result<(), ReplierError> {
		check_probability("continuation_probability", self.continuation_probability)?;
		check_draw_range(self.draw_range)?;
		Ok(())
	}
}

/// Words and chances that decide which reply branch runs.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
	/// The bot's name; mentioning it always asks for an answer.
	pub name: String,

	/// Together with `name`, asks for an image search.
	pub image_request: String,

	/// Words used to find a corpus line when answering an image link.
	pub image_reply_words: Vec<String>,

	relevant_reply_probability: f64,

	image_reply_probability: f64,
}

impl Default for TriggerConfig {
	fn default() -> Self {
		Self {
			name: "данило".to_owned(),
			image_request: "картинку".to_owned(),
			image_reply_words: vec!["картинка".to_owned(), "пикча".to_owned()],
			relevant_reply_probability: 0.1,
			image_reply_probability: 0.1,
		}
	}
}

impl TriggerConfig {
	pub fn relevant_reply_probability(&self) -> f64 {
		self.relevant_reply_probability
	}

	pub fn image_reply_probability(&self) -> f64 {
		self.image_reply_probability
	}

	/// Sets the chance of an unprompted relevant reply (0.0..=1.0).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_relevant_reply_probability(&mut self, probability: f64) -> Result<(), ReplierError> {
		self.relevant_reply_probability = check_probability("relevant_reply_probability", probability)?;
		Ok(())
	}

	/// Sets the chance of an unprompted image reply (0.0..=1.0).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_image_reply_probability(&mut self, probability: f64) -> Result<(), ReplierError> {
		self.image_reply_probability = check_probability("image_reply_probability", probability)?;
		Ok(())
	}

	fn validate(&self) -> Result<(), ReplierError> {
		check_probability("relevant_reply_probability", self.relevant_reply_probability)?;
		check_probability("image_reply_probability", self.image_reply_probability)?;
		Ok(())
	}
}

/// Image search endpoint settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageSearchConfig {
	pub enabled: bool,
	pub endpoint: String,
	pub count: u32,
	pub offset: u32,
	pub timeout_secs: u64,
	pub user_agent: String,

	/// Accepted media URL extensions, without the dot.
	pub extensions: Vec<String>,
}

impl Default for ImageSearchConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			endpoint: "https://api.qwant.com/api/search/images".to_owned(),
			count: 10,
			offset: 1,
			timeout_secs: 5,
			user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) AppleWebKit/537.36 \
				(KHTML, like Gecko) Chrome/39.0.2171.95 Safari/537.36"
				.to_owned(),
			extensions: ["jpg", "jpeg", "png", "gif"].iter().map(|e| (*e).to_owned()).collect(),
		}
	}
}

impl ImageSearchConfig {
	fn validate(&self) -> Result<(), ReplierError> {
		if self.enabled && self.endpoint.trim().is_empty() {
			return Err(ReplierError::InvalidConfig("image search endpoint is empty".to_owned()));
		}
		if self.extensions.is_empty() {
			return Err(ReplierError::InvalidConfig("no image extensions configured".to_owned()));
		}
		Ok(())
	}
}

/// Full replier configuration.
///
/// Every section and field is optional in the JSON form; missing values
/// take the defaults above.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReplierConfig {
	pub generation: GenerationConfig,
	pub dialog: DialogConfig,
	pub triggers: TriggerConfig,
	pub image_search: ImageSearchConfig,
}

impl ReplierConfig {
	/// Parses and validates a JSON configuration.
	///
	/// # Errors
	/// Returns an error on malformed JSON or out-of-range values.
	pub fn from_json(json: &str) -> Result<Self, ReplierError> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks every range constraint.
	///
	/// # Errors
	/// Returns the first violated constraint.
	pub fn validate(&self) -> Result<(), ReplierError> {
		self.generation.validate()?;
		self.dialog.validate()?;
		self.triggers.validate()?;
		self.image_search.validate()
	}
}

fn check_draw_range(draw_range: u32) -> Result<u32, ReplierError> {
	if draw_range == 0 {
		return Err(ReplierError::InvalidConfig("draw_range must be > 0".to_owned()));
	}
	Ok(draw_range)
}

fn check_probability(name: &str, probability: f64) -> Result<f64, ReplierError> {
	if !(0.0..=1.0).contains(&probability) {
		return Err(ReplierError::InvalidConfig(format!(
			"{} must be between 0.0 and 1.0, got {}",
			name, probability
		)));
	}
	Ok(probability)
}
