use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::{EmbedError, Embedder, Embedding};
use crate::config::ProviderConfig;

/// OpenAI-compatible embedding provider (works with Upstage Solar, OpenAI,
/// and any endpoint that speaks the same `/embeddings` protocol).
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiEmbedder {
    pub fn new(config: &ProviderConfig) -> Result<Self, EmbedError> {
        let api_key = config.resolve_api_key().map_err(EmbedError::Auth)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbedError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
        })
    }
}

// --- Request / response ---

fn build_request_body(text: &str, model: &str) -> serde_json::Value {
    serde_json::json!({
        "input": text,
        "model": model,
    })
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Embedding,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Extract the first embedding from a successful response body.
fn parse_embedding_response(body: &str) -> Result<Embedding, EmbedError> {
    let response: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| EmbedError::MalformedResponse(format!("invalid embeddings JSON: {e}")))?;
    response
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| EmbedError::MalformedResponse("response contained no embeddings".into()))
}

/// Map an HTTP error status code and body to an `EmbedError`.
fn map_error_status(status: u16, body: &str) -> EmbedError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|r| r.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        401 => EmbedError::Auth(message),
        429 => EmbedError::RateLimit(message),
        _ => EmbedError::Other(format!("HTTP {status}: {message}")),
    }
}

// --- Embedder implementation ---

impl Embedder for OpenAiEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Embedding, EmbedError> {
        let url = format!("{}/embeddings", self.endpoint.trim_end_matches('/'));
        log::debug!("requesting embedding from {url} ({} chars)", text.chars().count());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&build_request_body(text, &self.model))
            .send()
            .await
            .map_err(|e| EmbedError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EmbedError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(map_error_status(status.as_u16(), &body));
        }

        parse_embedding_response(&body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
