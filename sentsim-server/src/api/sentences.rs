//! Sentence store endpoints: save, search, list and reset.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use sentsim_core::embedding::Embedder;
use sentsim_core::similarity::SearchHit;
use sentsim_core::store::SentenceListing;

use super::{ApiResult, AppState, parse_body, service_error};

/// Request body for `POST /save_sentence`.
#[derive(Deserialize)]
pub struct SaveSentenceRequest {
    #[serde(default)]
    pub sentence: String,
}

/// Request body for `POST /search_similar`.
#[derive(Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// Acknowledgement returned by mutating endpoints.
#[derive(Serialize, Debug)]
pub struct Confirmation {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

#[derive(Serialize, Debug)]
pub struct SentencesResponse {
    pub sentences: Vec<SentenceListing>,
}

/// `POST /save_sentence` — embed a sentence and append it to the store.
pub async fn save_sentence<E: Embedder + 'static>(
    State(state): State<Arc<AppState<E>>>,
    body: Bytes,
) -> ApiResult<Confirmation> {
    let request: SaveSentenceRequest = parse_body(&body)?;

    let record = state
        .service
        .save_sentence(&request.sentence)
        .await
        .map_err(service_error)?;

    Ok(Json(Confirmation {
        success: true,
        message: "sentence saved".into(),
        timestamp: Some(record.timestamp),
    }))
}

/// `POST /search_similar` — rank stored sentences by similarity to a query.
pub async fn search_similar<E: Embedder + 'static>(
    State(state): State<Arc<AppState<E>>>,
    body: Bytes,
) -> ApiResult<SearchResponse> {
    let request: SearchRequest = parse_body(&body)?;

    let results = state
        .service
        .search_similar(&request.query)
        .await
        .map_err(service_error)?;

    Ok(Json(SearchResponse { results }))
}

/// `GET /get_all_sentences` — list stored sentences without their embeddings.
pub async fn get_all_sentences<E: Embedder + 'static>(
    State(state): State<Arc<AppState<E>>>,
) -> ApiResult<SentencesResponse> {
    let sentences = state.service.list_sentences().map_err(service_error)?;
    Ok(Json(SentencesResponse { sentences }))
}

/// `POST /reset_sentences` — delete every stored sentence.
pub async fn reset_sentences<E: Embedder + 'static>(
    State(state): State<Arc<AppState<E>>>,
) -> ApiResult<Confirmation> {
    state.service.reset_store().map_err(service_error)?;
    Ok(Json(Confirmation {
        success: true,
        message: "all sentences deleted".into(),
        timestamp: None,
    }))
}
