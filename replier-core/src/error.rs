use thiserror::Error;

/// Failures that propagate out of the replier.
///
/// Generation itself never fails: a dead-end walk, an empty corpus or an
/// unmatched message all produce `None`. This type only covers setup
/// (configuration, corpus, tokenizer) and the image search boundary.
#[derive(Error, Debug)]
pub enum ReplierError {
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),
	#[error("tokenizer pattern error: {0}")]
	Tokenizer(#[from] regex::Error),
	#[error("http error: {0}")]
	Http(#[from] reqwest::Error),
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),
	#[error("unexpected response: {0}")]
	UnexpectedResponse(String),
}
