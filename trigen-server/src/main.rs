use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware, put, web};

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use trigen_core::model::trigram_model::TrigramModel;

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	max_length: Option<usize>,
	seed: Option<u64>, // fixed seed makes a draw reproducible
}

/// Response body for the `/v1/stats` endpoint
#[derive(Serialize)]
struct ModelStats {
	fitted: bool,
	vocab_size: usize,
	unigram_total: usize,
	unk_threshold: usize,
}

struct SharedData {
	model: TrigramModel,
}

/// HTTP PUT endpoint `/v1/fit`
///
/// Rebuilds the model from the raw corpus text in the request body.
/// Any prior tables are discarded; an empty body leaves a fitted but
/// degenerate model.
#[put("/v1/fit")]
async fn put_fit(data: web::Data<Mutex<SharedData>>, body: String) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	shared_data.model.fit(&body);
	info!(
		"model fitted: {} vocabulary entries",
		shared_data.model.vocab().len()
	);
	HttpResponse::Ok().body("Model fitted")
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a sequence from the fitted model based on query parameters.
/// Returns the generated text as the response body; an unfitted or
/// degenerate model yields an empty body.
#[get("/v1/generate")]
async fn get_generated(
	data: web::Data<Mutex<SharedData>>,
	query: web::Query<GenerateParams>,
) -> impl Responder {
	let max_length = query.max_length.unwrap_or(50);

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let result = match query.seed {
		Some(seed) => shared_data
			.model
			.generate_with(&mut StdRng::seed_from_u64(seed), max_length),
		None => shared_data.model.generate(max_length),
	};

	HttpResponse::Ok().body(result)
}

/// HTTP GET endpoint `/v1/stats`
///
/// Reports the fitted flag, vocabulary size, total unigram mass and the
/// configured rarity threshold.
#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	HttpResponse::Ok().json(ModelStats {
		fitted: shared_data.model.is_fitted(),
		vocab_size: shared_data.model.vocab().len(),
		unigram_total: shared_data.model.unigram_total(),
		unk_threshold: shared_data.model.unk_threshold(),
	})
}

/// Main entry point for the server.
///
/// Wraps an empty model in a `Mutex` for thread safety and starts an
/// Actix-web HTTP server. Concurrent fit and generate calls on the
/// shared model are serialized through the lock.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - The model starts unfitted; `/v1/generate` returns an empty body
///   until a corpus is pushed through `/v1/fit`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = SharedData {
		model: TrigramModel::new(),
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.wrap(middleware::Logger::default())
			.app_data(shared_model.clone())
			.service(put_fit)
			.service(get_generated)
			.service(get_stats)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
