use std::time::Duration;

use log::{info, warn};
use rand::Rng;
use rand::seq::SliceRandom;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::ImageSearchConfig;
use crate::error::ReplierError;

/// One page of image search results.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageResults {
	/// Total number of hits reported by the service.
	pub total: u64,
	/// Media URLs of the returned items.
	pub media_urls: Vec<String>,
}

/// Free-text image search.
pub trait ImageSearch: Send + Sync {
	/// Runs one query.
	///
	/// # Errors
	/// Network failures and unreadable responses.
	fn search(&self, query: &str) -> Result<ImageResults, ReplierError>;
}

#[derive(Deserialize)]
struct SearchResponse {
	data: SearchData,
}

#[derive(Deserialize)]
struct SearchData {
	result: SearchResult,
}

#[derive(Deserialize)]
struct SearchResult {
	#[serde(default)]
	total: u64,
	#[serde(default)]
	items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
	media: Option<String>,
}

/// Parses a `{"data": {"result": {"total": .., "items": [{"media": ..}]}}}` body.
fn parse_results(body: &str) -> Result<ImageResults, ReplierError> {
	let response: SearchResponse = serde_json::from_str(body)?;
	let result = response.data.result;
	Ok(ImageResults {
		total: result.total,
		media_urls: result.items.into_iter().filter_map(|item| item.media).collect(),
	})
}

/// Image search over HTTP with a reusable blocking client.
pub struct HttpImageSearch {
	client: Client,
	endpoint: String,
	count: u32,
	offset: u32,
}

impl HttpImageSearch {
	/// Creates the client with the configured timeout and user agent.
	///
	/// # Errors
	/// Returns an error if the HTTP client cannot be built.
	pub fn new(config: &ImageSearchConfig) -> Result<Self, ReplierError> {
		let client = Client::builder()
			.timeout(Duration::from_secs(config.timeout_secs))
			.user_agent(config.user_agent.clone())
			.build()?;
		Ok(Self {
			client,
			endpoint: config.endpoint.clone(),
			count: config.count,
			offset: config.offset,
		})
	}
}

impl ImageSearch for HttpImageSearch {
	fn search(&self, query: &str) -> Result<ImageResults, ReplierError> {
		info!("Calling image search {} with q={:?}", self.endpoint, query);
		let body = self.client
			.get(&self.endpoint)
			.query(&[
				("count", self.count.to_string()),
				("offset", self.offset.to_string()),
				("q", query.to_owned()),
			])
			.send()?
			.error_for_status()?
			.text()?;

		parse_results(&body)
	}
}

/// True if `url` ends with `.` followed by one of `extensions`.
pub fn has_image_extension(url: &str, extensions: &[String]) -> bool {
	let url = url.to_lowercase();
	extensions
		.iter()
		.any(|ext| url.ends_with(&format!(".{}", ext.to_lowercase())))
}

/// Searches images for `terms`, shrinking the query until something fits.
///
/// # Behavior
/// - Shuffles the terms and queries them joined by spaces.
/// - With hits, returns a random media URL with an accepted extension.
/// - With no hit, or no acceptable URL among the hits, drops the last
///   term and tries again.
///
/// Returns `Ok(None)` once the terms are exhausted.
///
/// # Errors
/// Propagates the first failing search.
pub fn find_image<R: Rng + ?Sized>(
	search: &dyn ImageSearch,
	mut terms: Vec<String>,
	extensions: &[String],
	rng: &mut R,
) -> Result<Option<String>, ReplierError> {
	terms.shuffle(rng);

	while !terms.is_empty() {
		let query = terms.join(" ");
		let results = search.search(&query)?;

		if results.total > 0 {
			let mut urls = results.media_urls;
			urls.shuffle(rng);
			if let Some(url) = urls.into_iter().find(|url| has_image_extension(url, extensions)) {
				return Ok(Some(url));
			}
			warn!("None of the URLs in the search results for {:?} is a proper image", query);
		} else {
			info!("No results for {:?}, will retry with a smaller query", query);
		}
		terms.pop();
	}

	info!("Could not find an image");
	Ok(None)
}
