//! HTTP API layer for sentsim.
//!
//! Routes keep the paths and JSON shapes the single-page frontend in
//! `index.html` calls: `POST /compute_similarity`, `POST /save_sentence`,
//! `POST /search_similar`, `GET /get_all_sentences`, `POST /reset_sentences`.
//! Failures are reported as `{"code": ..., "error": ...}` with a matching
//! status code.

mod health;
mod sentences;
mod similarity;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;

use sentsim_core::embedding::{EmbedError, Embedder};
use sentsim_core::service::{SentenceService, ServiceError};

pub use health::health;
pub use sentences::{get_all_sentences, reset_sentences, save_sentence, search_similar};
pub use similarity::compute_similarity;

// ── Shared types ────────────────────────────────────────────────────────

/// Structured API error response.
#[derive(Serialize)]
pub struct ApiError {
    pub code: String,
    pub error: String,
}

/// Shared application state.
pub struct AppState<E> {
    pub service: SentenceService<E>,
}

/// Build the full router: API routes, the index page and permissive CORS.
pub fn router<E: Embedder + 'static>(state: Arc<AppState<E>>, index_path: &str) -> Router {
    Router::new()
        .route("/compute_similarity", post(compute_similarity::<E>))
        .route("/save_sentence", post(save_sentence::<E>))
        .route("/search_similar", post(search_similar::<E>))
        .route("/get_all_sentences", get(get_all_sentences::<E>))
        .route("/reset_sentences", post(reset_sentences::<E>))
        .route("/health", get(health::<E>))
        .with_state(state)
        .route_service("/", ServeFile::new(index_path))
        .layer(CorsLayer::permissive())
}

// ── Error helpers ───────────────────────────────────────────────────────

pub(crate) type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn api_error(status: StatusCode, code: &str, message: String) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            code: code.into(),
            error: message,
        }),
    )
}

pub(crate) fn bad_request(message: String) -> (StatusCode, Json<ApiError>) {
    api_error(StatusCode::BAD_REQUEST, "bad_request", message)
}

/// Decode a JSON request body, answering 400 when it is malformed.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, (StatusCode, Json<ApiError>)> {
    serde_json::from_slice(body).map_err(|e| bad_request(format!("invalid request body: {e}")))
}

/// Map a service failure to its HTTP status and error code.
pub(crate) fn service_error(e: ServiceError) -> (StatusCode, Json<ApiError>) {
    let (status, code) = match &e {
        ServiceError::Validation(_) | ServiceError::InsufficientInput { .. } => {
            (StatusCode::BAD_REQUEST, "bad_request")
        }
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        ServiceError::Provider(EmbedError::Auth(_)) => (StatusCode::UNAUTHORIZED, "auth_error"),
        ServiceError::Provider(EmbedError::RateLimit(_)) => {
            (StatusCode::TOO_MANY_REQUESTS, "rate_limit")
        }
        ServiceError::Provider(_) => (StatusCode::INTERNAL_SERVER_ERROR, "provider_error"),
        ServiceError::DimensionMismatch { .. } | ServiceError::Storage(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    };
    if status.is_server_error() {
        log::error!("{e}");
    } else {
        log::debug!("rejected request: {e}");
    }
    api_error(status, code, e.to_string())
}
