pub mod openai;

use std::fmt;
use std::future::Future;

/// A dense vector produced by the embedding provider.
pub type Embedding = Vec<f32>;

/// Errors that can occur when calling an embedding provider.
#[derive(Debug)]
pub enum EmbedError {
    /// Network-level failure (DNS, timeout, connection reset, etc.)
    Network(String),
    /// Authentication failure (missing, invalid or expired API key)
    Auth(String),
    /// Rate limit exceeded
    RateLimit(String),
    /// Response could not be parsed
    MalformedResponse(String),
    /// Any other error
    Other(String),
}

impl fmt::Display for EmbedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Auth(msg) => write!(f, "auth error: {msg}"),
            Self::RateLimit(msg) => write!(f, "rate limited: {msg}"),
            Self::MalformedResponse(msg) => write!(f, "malformed response: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EmbedError {}

/// Trait abstracting text-to-vector embedding.
pub trait Embedder: Send + Sync {
    /// Embed a single text with one provider call.
    fn embed_one(&self, text: &str) -> impl Future<Output = Result<Embedding, EmbedError>> + Send;

    /// Embed several texts, one provider call per text, preserving order.
    ///
    /// The first failing call aborts the batch; there is no partial result.
    fn embed_many(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Embedding>, EmbedError>> + Send {
        async move {
            let mut embeddings = Vec::with_capacity(texts.len());
            for text in texts {
                embeddings.push(self.embed_one(text).await?);
            }
            Ok(embeddings)
        }
    }

    /// Model identifier string.
    fn model_name(&self) -> &str;
}
