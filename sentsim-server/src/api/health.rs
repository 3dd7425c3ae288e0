use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use sentsim_core::embedding::Embedder;

use super::AppState;

/// Response body for `GET /health`.
#[derive(Serialize, Debug)]
pub struct HealthResponse {
    /// "ok" or "unhealthy".
    pub status: String,
    pub model: String,
    /// Number of stored sentences, absent when the store cannot be read.
    pub sentences: Option<usize>,
    /// Error message when unhealthy, null when healthy.
    pub message: Option<String>,
}

/// `GET /health` — report the embedding model and whether the store is readable.
///
/// Does not call the embedding provider.
pub async fn health<E: Embedder + 'static>(
    State(state): State<Arc<AppState<E>>>,
) -> Json<HealthResponse> {
    let model = state.service.embedder().model_name().to_string();
    let response = match state.service.sentence_count() {
        Ok(count) => HealthResponse {
            status: "ok".into(),
            model,
            sentences: Some(count),
            message: None,
        },
        Err(e) => {
            log::warn!("health check could not read the sentence store: {e}");
            HealthResponse {
                status: "unhealthy".into(),
                model,
                sentences: None,
                message: Some(e.to_string()),
            }
        }
    };
    Json(response)
}
