use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use sentsim_core::embedding::Embedder;
use sentsim_core::similarity::PairSimilarity;

use super::{ApiResult, AppState, parse_body, service_error};

/// Request body for `POST /compute_similarity`.
#[derive(Deserialize)]
pub struct ComputeSimilarityRequest {
    #[serde(default)]
    pub texts: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct SimilaritiesResponse {
    pub similarities: Vec<PairSimilarity>,
}

/// `POST /compute_similarity` — pairwise cosine similarity of two or more sentences.
pub async fn compute_similarity<E: Embedder + 'static>(
    State(state): State<Arc<AppState<E>>>,
    body: Bytes,
) -> ApiResult<SimilaritiesResponse> {
    let request: ComputeSimilarityRequest = parse_body(&body)?;

    let similarities = state
        .service
        .compute_similarities(&request.texts)
        .await
        .map_err(service_error)?;

    Ok(Json(SimilaritiesResponse { similarities }))
}
