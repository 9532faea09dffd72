use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use log::{debug, info, warn};
use serde::Deserialize;

use replier_core::image_search::{HttpImageSearch, ImageSearch};
use replier_core::io::load_config;
use replier_core::{Engine, Replier, ReplierConfig, Seed};

const DEFAULT_CORPUS: &str = "./data/messages.txt";
const DEFAULT_BIND: &str = "127.0.0.1:5000";
const DEFAULT_CONVERSATION: &str = "default";
const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Query parameters for the `/v1/respond` endpoint
#[derive(Deserialize)]
struct RespondParams {
	message: String,
	conversation: Option<String>
}

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	seed: Option<String> // -> none, custom(text), relevant(text) or pairs(text)
}

#[derive(Deserialize)]
struct ResetParams {
	conversation: Option<String>
}

enum SeedRequest {
	Random,
	Custom(String),
	Relevant(String),
	Pairs(String),
}

struct Session {
	replier: Arc<Mutex<Replier>>,
	last_used: u64,
}

/// Conversation repliers, bounded by evicting the least recently used one.
struct Sessions {
	capacity: usize,
	clock: u64,
	entries: HashMap<String, Session>,
}

struct SharedData {
	engine: Arc<Engine>,
	config: ReplierConfig,
	images: Option<Arc<dyn ImageSearch>>,
	sessions: Mutex<Sessions>
}

impl GenerateParams {
	/// Determines how the generated message is seeded.
	fn seed_request(&self) -> Result<SeedRequest, String> {
		let Some(s) = &self.seed else {
			return Ok(SeedRequest::Random);
		};
		if s.to_lowercase() == "none" {
			return Ok(SeedRequest::Random);
		}

		let (kind, value) = match s.split_once(':') {
			Some((kind, value)) => (kind.to_lowercase(), value),
			None => return Err("Seed must start with 'custom:', 'relevant:' or 'pairs:' or be 'none'".into()),
		};
		if value.trim().is_empty() {
			return Err(format!("{} seed cannot be empty", kind));
		}
		match kind.as_str() {
			"custom" => Ok(SeedRequest::Custom(value.to_owned())),
			"relevant" => Ok(SeedRequest::Relevant(value.to_owned())),
			"pairs" => Ok(SeedRequest::Pairs(value.to_owned())),
			_ => Err("Seed must start with 'custom:', 'relevant:' or 'pairs:' or be 'none'".into()),
		}
	}
}

impl Sessions {
	fn new(capacity: usize) -> Self {
		Self { capacity: capacity.max(1), clock: 0, entries: HashMap::new() }
	}

	/// Replier of `conversation`, built with `make` on first use.
	fn get_or_insert_with<F>(&mut self, conversation: &str, make: F) -> Arc<Mutex<Replier>>
	where
		F: FnOnce() -> Replier,
	{
		self.clock += 1;
		if let Some(session) = self.entries.get_mut(conversation) {
			session.last_used = self.clock;
			return session.replier.clone();
		}

		if self.entries.len() >= self.capacity {
			self.evict_oldest();
		}
		let replier = Arc::new(Mutex::new(make()));
		self.entries.insert(
			conversation.to_owned(),
			Session { replier: replier.clone(), last_used: self.clock },
		);
		replier
	}

	fn evict_oldest(&mut self) {
		let oldest = self
			.entries
			.iter()
			.min_by_key(|(_, session)| session.last_used)
			.map(|(conversation, _)| conversation.clone());
		if let Some(conversation) = oldest {
			debug!("Evicting idle conversation {:?}", conversation);
			self.entries.remove(&conversation);
		}
	}

	fn remove(&mut self, conversation: &str) -> bool {
		self.entries.remove(conversation).is_some()
	}

	fn contains(&self, conversation: &str) -> bool {
		self.entries.contains_key(conversation)
	}

	fn len(&self) -> usize {
		self.entries.len()
	}
}

impl SharedData {
	fn new(engine: Arc<Engine>, config: ReplierConfig, images: Option<Arc<dyn ImageSearch>>, max_sessions: usize) -> Self {
		Self { engine, config, images, sessions: Mutex::new(Sessions::new(max_sessions)) }
	}

	/// Replier of `conversation`, created on first use.
	///
	/// New repliers share the image search built at startup.
	fn session(&self, conversation: &str) -> Result<Arc<Mutex<Replier>>, String> {
		let mut sessions = self.sessions.lock().map_err(|_| "Session lock failed".to_owned())?;
		Ok(sessions.get_or_insert_with(conversation, || {
			let replier = Replier::new(self.engine.clone(), &self.config);
			match &self.images {
				Some(images) => replier.with_image_search(images.clone()),
				None => replier,
			}
		}))
	}
}

fn text_or_no_content(message: Option<String>) -> HttpResponse {
	match message {
		Some(text) => HttpResponse::Ok().content_type("text/plain; charset=utf-8").body(text),
		None => HttpResponse::NoContent().finish(),
	}
}

/// HTTP GET endpoint `/v1/respond`
///
/// Answers a chat message within a conversation, or stays silent with 204.
#[get("/v1/respond")]
async fn get_response(data: web::Data<SharedData>, query: web::Query<RespondParams>) -> impl Responder {
	let conversation = query.conversation.clone().unwrap_or_else(|| DEFAULT_CONVERSATION.to_owned());
	let replier = match data.session(&conversation) {
		Ok(r) => r,
		Err(e) => return HttpResponse::InternalServerError().body(e),
	};
	let message = query.into_inner().message;

	// Image search uses a blocking client
	let response = web::block(move || {
		replier
			.lock()
			.map(|mut replier| replier.get_response(&message))
			.map_err(|_| "Replier lock failed")
	})
	.await;

	match response {
		Ok(Ok(message)) => text_or_no_content(message),
		Ok(Err(e)) => HttpResponse::InternalServerError().body(e),
		Err(e) => HttpResponse::InternalServerError().body(format!("Response failed: {e}")),
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a message from a random, custom, relevant or pair seed.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let seed = match query.seed_request() {
		Ok(s) => s,
		Err(e) => return HttpResponse::BadRequest().body(e)
	};

	let engine = data.engine.clone();
	let generated = web::block(move || {
		let mut rng = rand::rng();
		match seed {
			SeedRequest::Random => engine.generate_message(None, &mut rng),
			SeedRequest::Custom(text) => engine.generate_message(Some(Seed::RawText(text)), &mut rng),
			SeedRequest::Relevant(text) => engine.generate_message_with_pos_tagging(&text, &mut rng),
			SeedRequest::Pairs(text) => engine.generate_kind_of_relevant_message(&text, &mut rng),
		}
	})
	.await;

	match generated {
		Ok(message) => text_or_no_content(message),
		Err(e) => HttpResponse::InternalServerError().body(format!("Generation failed: {e}")),
	}
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().json(data.engine.stats())
}

#[put("/v1/reset")]
async fn put_reset(data: web::Data<SharedData>, query: web::Query<ResetParams>) -> impl Responder {
	let conversation = match &query.conversation {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty conversation"),
	};

	let mut sessions = match data.sessions.lock() {
		Ok(s) => s,
		Err(_) => return HttpResponse::InternalServerError().body("Session lock failed"),
	};
	if sessions.remove(conversation) {
		HttpResponse::Ok().body("Conversation reset")
	} else {
		HttpResponse::Ok().body("Unknown conversation, nothing to reset")
	}
}

fn load_replier_config() -> std::io::Result<ReplierConfig> {
	match env::var("REPLIER_CONFIG") {
		Ok(path) => {
			info!("Loading configuration from {}", path);
			load_config(&path).map_err(std::io::Error::other)
		}
		Err(_) => Ok(ReplierConfig::default()),
	}
}

/// Image search shared by every conversation, `None` when disabled.
///
/// The blocking HTTP client must be built and dropped outside the async runtime.
fn image_search(config: &ReplierConfig) -> Option<Arc<dyn ImageSearch>> {
	if !config.image_search.enabled {
		return None;
	}
	match HttpImageSearch::new(&config.image_search) {
		Ok(search) => Some(Arc::new(search)),
		Err(e) => {
			warn!("Image search disabled: {}", e);
			None
		}
	}
}

fn max_sessions() -> usize {
	match env::var("REPLIER_MAX_SESSIONS") {
		Ok(value) => value.parse().unwrap_or_else(|_| {
			warn!("Invalid REPLIER_MAX_SESSIONS {:?}, using {}", value, DEFAULT_MAX_SESSIONS);
			DEFAULT_MAX_SESSIONS
		}),
		Err(_) => DEFAULT_MAX_SESSIONS,
	}
}

async fn serve(bind: String, shared_data: web::Data<SharedData>) -> std::io::Result<()> {
	info!("Listening on {}", bind);
	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_response)
			.service(get_generated)
			.service(get_stats)
			.service(put_reset)
	})
		.bind(bind.as_str())?
		.run()
		.await
}

/// Main entry point for the server.
///
/// Builds the engine from the corpus and the image search once, shares them
/// across workers and keeps one `Replier` per conversation.
///
/// # Notes
/// - `REPLIER_CORPUS`, `REPLIER_CONFIG`, `REPLIER_BIND` and
///   `REPLIER_MAX_SESSIONS` configure the server.
/// - `RUST_LOG` filters the logs.
fn main() -> std::io::Result<()> {
	env_logger::init();

	let config = load_replier_config()?;
	let corpus = env::var("REPLIER_CORPUS").unwrap_or_else(|_| DEFAULT_CORPUS.to_owned());
	let bind = env::var("REPLIER_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned());

	let engine = Engine::from_corpus_file(&corpus, config.generation.clone()).map_err(std::io::Error::other)?;
	info!("Loaded {} with {:?}", corpus, engine.stats());

	// Held here so that the last handle is dropped after the runtime stops
	let images = image_search(&config);
	let shared_data = web::Data::new(SharedData::new(Arc::new(engine), config, images.clone(), max_sessions()));

	let served = actix_web::rt::System::new().block_on(serve(bind, shared_data));
	drop(images);
	served
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test as actix_test;
	use replier_core::ReplierError;
	use replier_core::image_search::ImageResults;

	struct FixedSearch(&'static str);

	impl ImageSearch for FixedSearch {
		fn search(&self, _query: &str) -> Result<ImageResults, ReplierError> {
			Ok(ImageResults { total: 1, media_urls: vec![self.0.to_owned()] })
		}
	}

	fn shared_data_with(lines: &[&str], config: ReplierConfig, images: Option<Arc<dyn ImageSearch>>) -> web::Data<SharedData> {
		let engine = Engine::new(lines, config.generation.clone()).unwrap();
		web::Data::new(SharedData::new(Arc::new(engine), config, images, 8))
	}

	fn shared_data(lines: &[&str]) -> web::Data<SharedData> {
		let mut config = ReplierConfig::default();
		config.image_search.enabled = false;
		config.generation.set_prepend_probability(0.0).unwrap();
		shared_data_with(lines, config, None)
	}

	fn engine() -> Arc<Engine> {
		Arc::new(Engine::new(&["кошка спит"], ReplierConfig::default().generation).unwrap())
	}

	fn params(seed: &str) -> GenerateParams {
		GenerateParams { seed: Some(seed.to_owned()) }
	}

	#[test]
	fn parses_seed_requests() {
		assert!(matches!(GenerateParams { seed: None }.seed_request(), Ok(SeedRequest::Random)));
		assert!(matches!(params("None").seed_request(), Ok(SeedRequest::Random)));
		assert!(matches!(params("custom:привет как").seed_request(), Ok(SeedRequest::Custom(t)) if t == "привет как"));
		assert!(matches!(params("relevant:кошка").seed_request(), Ok(SeedRequest::Relevant(_))));
		assert!(matches!(params("PAIRS:мама мыла").seed_request(), Ok(SeedRequest::Pairs(_))));
		assert!(params("custom:").seed_request().is_err());
		assert!(params("random:3").seed_request().is_err());
		assert!(params("whatever").seed_request().is_err());
	}

	#[actix_web::test]
	async fn generate_endpoint_answers_text_or_bad_request() {
		let app = actix_test::init_service(
			App::new().app_data(shared_data(&["привет как дела"])).service(get_generated),
		)
		.await;

		let req = actix_test::TestRequest::get().uri("/v1/generate").to_request();
		let body = actix_test::call_and_read_body(&app, req).await;
		assert_eq!(body, "привет как дела");

		let req = actix_test::TestRequest::get().uri("/v1/generate?seed=bogus").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn empty_corpus_generates_no_content() {
		let app = actix_test::init_service(App::new().app_data(shared_data(&[])).service(get_generated)).await;
		let req = actix_test::TestRequest::get().uri("/v1/generate").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::NO_CONTENT);
	}

	#[actix_web::test]
	async fn sessions_are_created_and_reset() {
		let data = shared_data(&["кошка спит"]);
		let app = actix_test::init_service(
			App::new().app_data(data.clone()).service(get_response).service(put_reset).service(get_stats),
		)
		.await;

		let req = actix_test::TestRequest::get()
			.uri("/v1/respond?message=%D0%B4%D0%B0%D0%BD%D0%B8%D0%BB%D0%BE&conversation=room")
			.to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert!(resp.status() == StatusCode::OK || resp.status() == StatusCode::NO_CONTENT);
		assert!(data.sessions.lock().unwrap().contains("room"));

		let req = actix_test::TestRequest::put().uri("/v1/reset?conversation=room").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
		assert!(!data.sessions.lock().unwrap().contains("room"));

		let req = actix_test::TestRequest::get().uri("/v1/stats").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
	}

	#[actix_web::test]
	async fn default_config_sessions_share_the_startup_image_search() {
		let mut config = ReplierConfig::default();
		assert!(config.image_search.enabled);
		config.triggers.set_relevant_reply_probability(0.0).unwrap();
		config.triggers.set_image_reply_probability(0.0).unwrap();
		let images: Arc<dyn ImageSearch> = Arc::new(FixedSearch("http://img.example/cat.png"));
		let data = shared_data_with(&["кошка спит"], config, Some(images));
		let app = actix_test::init_service(App::new().app_data(data.clone()).service(get_response)).await;

		// "данило картинку кошка"
		let uri = "/v1/respond?conversation=room&message=\
			%D0%B4%D0%B0%D0%BD%D0%B8%D0%BB%D0%BE%20\
			%D0%BA%D0%B0%D1%80%D1%82%D0%B8%D0%BD%D0%BA%D1%83%20\
			%D0%BA%D0%BE%D1%88%D0%BA%D0%B0";
		let req = actix_test::TestRequest::get().uri(uri).to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
		let body = actix_test::read_body(resp).await;
		assert_eq!(body, "http://img.example/cat.png");

		let req = actix_test::TestRequest::get().uri("/v1/respond?message=hi&conversation=other").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert!(resp.status() == StatusCode::OK || resp.status() == StatusCode::NO_CONTENT);
		assert_eq!(data.sessions.lock().unwrap().len(), 2);
	}

	#[test]
	fn least_recently_used_session_is_evicted() {
		let engine = engine();
		let config = ReplierConfig::default();
		let mut sessions = Sessions::new(2);
		let make = || Replier::new(engine.clone(), &config);

		let first = sessions.get_or_insert_with("a", make);
		sessions.get_or_insert_with("b", make);
		let again = sessions.get_or_insert_with("a", make);
		assert!(Arc::ptr_eq(&first, &again));

		sessions.get_or_insert_with("c", make);
		assert_eq!(sessions.len(), 2);
		assert!(sessions.contains("a"));
		assert!(!sessions.contains("b"));
		assert!(sessions.contains("c"));

		assert!(sessions.remove("a"));
		assert!(!sessions.remove("a"));
	}

	#[test]
	fn session_count_never_exceeds_the_cap() {
		let engine = engine();
		let config = ReplierConfig::default();
		let mut sessions = Sessions::new(3);
		for i in 0..50 {
			sessions.get_or_insert_with(&format!("conversation-{i}"), || Replier::new(engine.clone(), &config));
			assert!(sessions.len() <= 3);
		}
		assert!(sessions.contains("conversation-49"));
	}
}
