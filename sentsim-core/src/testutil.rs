//! Mock embedders shared by sentsim-core and sentsim-server tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::embedding::{EmbedError, Embedder, Embedding};

/// Embedder that answers from a fixed text-to-vector table.
#[derive(Default)]
pub struct MockEmbedder {
    vectors: HashMap<String, Embedding>,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, text: &str, vector: Embedding) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Number of `embed_one` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for MockEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Embedding, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| EmbedError::Other(format!("no mock embedding for '{text}'")))
    }

    fn model_name(&self) -> &str {
        "mock-embedding"
    }
}

/// Embedder that succeeds a fixed number of times, then always fails.
pub struct FailingEmbedder {
    successes: usize,
    calls: AtomicUsize,
    make_error: fn(String) -> EmbedError,
}

impl FailingEmbedder {
    pub fn after(successes: usize) -> Self {
        Self {
            successes,
            calls: AtomicUsize::new(0),
            make_error: EmbedError::Other,
        }
    }

    /// Choose the error variant, e.g. `EmbedError::Auth`.
    pub fn with_error(mut self, make_error: fn(String) -> EmbedError) -> Self {
        self.make_error = make_error;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for FailingEmbedder {
    async fn embed_one(&self, _text: &str) -> Result<Embedding, EmbedError> {
        let previous = self.calls.fetch_add(1, Ordering::SeqCst);
        if previous < self.successes {
            Ok(vec![1.0, 0.0])
        } else {
            Err((self.make_error)("mock provider failure".into()))
        }
    }

    fn model_name(&self) -> &str {
        "failing-embedding"
    }
}
