//! The operations the HTTP layer exposes, independent of transport.

use std::fmt;

use crate::embedding::{EmbedError, Embedder};
use crate::similarity::{self, PairSimilarity, SearchHit, SimilarityError};
use crate::store::{SentenceListing, SentenceRecord, SentenceStore, StoreError};

/// Display format of record timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors surfaced by [`SentenceService`] operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Missing or blank input.
    Validation(String),
    /// Fewer inputs than the operation requires.
    InsufficientInput { required: usize, got: usize },
    /// Nothing stored to search.
    NotFound(String),
    /// Stored or provider vectors disagree on dimension.
    DimensionMismatch { expected: usize, got: usize },
    /// The embedding provider failed.
    Provider(EmbedError),
    /// The sentence file could not be read or written.
    Storage(StoreError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::InsufficientInput { required, got } => {
                write!(f, "at least {required} sentences are required, got {got}")
            }
            Self::NotFound(msg) => write!(f, "{msg}"),
            Self::DimensionMismatch { expected, got } => {
                write!(f, "dimension mismatch: expected {expected}, got {got}")
            }
            Self::Provider(e) => write!(f, "embedding provider failed: {e}"),
            Self::Storage(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<EmbedError> for ServiceError {
    fn from(e: EmbedError) -> Self {
        Self::Provider(e)
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        Self::Storage(e)
    }
}

impl From<SimilarityError> for ServiceError {
    fn from(e: SimilarityError) -> Self {
        match e {
            SimilarityError::DimensionMismatch { expected, got } => {
                Self::DimensionMismatch { expected, got }
            }
            SimilarityError::InsufficientInput { required, got } => {
                Self::InsufficientInput { required, got }
            }
            SimilarityError::EmptyCorpus => Self::NotFound(e.to_string()),
        }
    }
}

/// Embeds, compares, stores and searches sentences.
pub struct SentenceService<E> {
    embedder: E,
    store: SentenceStore,
}

impl<E: Embedder> SentenceService<E> {
    pub fn new(embedder: E, store: SentenceStore) -> Self {
        Self { embedder, store }
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn store(&self) -> &SentenceStore {
        &self.store
    }

    /// Pairwise similarity of `texts`, labelled `"i vs j"` from 1.
    pub async fn compute_similarities(
        &self,
        texts: &[String],
    ) -> Result<Vec<PairSimilarity>, ServiceError> {
        let non_blank = texts.iter().filter(|t| !t.trim().is_empty()).count();
        if non_blank < 2 {
            return Err(ServiceError::InsufficientInput {
                required: 2,
                got: non_blank,
            });
        }
        // Blank entries are rejected, never skipped; pair labels index the caller's list.
        if let Some(pos) = texts.iter().position(|t| t.trim().is_empty()) {
            return Err(ServiceError::Validation(format!(
                "sentence {} is empty",
                pos + 1
            )));
        }

        let vectors = self.embedder.embed_many(texts).await?;
        Ok(similarity::pairwise_similarities(&vectors)?)
    }

    /// Embed `text`, stamp it with the current local time and append it.
    pub async fn save_sentence(&self, text: &str) -> Result<SentenceRecord, ServiceError> {
        require_text(text, "sentence")?;

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let embedding = self.embedder.embed_one(text).await?;
        let record = SentenceRecord {
            text: text.to_string(),
            embedding,
            timestamp,
        };
        self.store.append(record.clone())?;
        Ok(record)
    }

    /// Rank every stored sentence by similarity to `query`.
    ///
    /// An empty store is reported before the provider is called.
    pub async fn search_similar(&self, query: &str) -> Result<Vec<SearchHit>, ServiceError> {
        require_text(query, "query")?;

        let records = self.store.load()?;
        if records.is_empty() {
            return Err(ServiceError::NotFound("no sentences have been saved".into()));
        }

        let query_embedding = self.embedder.embed_one(query).await?;
        Ok(similarity::rank_by_similarity(&query_embedding, &records)?)
    }

    pub fn list_sentences(&self) -> Result<Vec<SentenceListing>, ServiceError> {
        Ok(self.store.list_all()?)
    }

    pub fn reset_store(&self) -> Result<(), ServiceError> {
        Ok(self.store.reset_all()?)
    }

    pub fn sentence_count(&self) -> Result<usize, ServiceError> {
        Ok(self.store.count()?)
    }
}

fn require_text(text: &str, what: &str) -> Result<(), ServiceError> {
    if text.trim().is_empty() {
        return Err(ServiceError::Validation(format!("a {what} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::testutil::{FailingEmbedder, MockEmbedder};

    fn temp_path(name: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("sentsim-service-test-{name}"));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sentences_db.json");
        (dir, path)
    }

    fn animals_embedder() -> MockEmbedder {
        MockEmbedder::new()
            .with("I like cats", vec![0.9, 0.1, 0.0])
            .with("I like dogs", vec![0.8, 0.3, 0.0])
            .with("The stock market fell", vec![0.0, 0.2, 0.9])
    }

    #[tokio::test]
    async fn compute_similarities_labels_pairs_in_order() {
        let (dir, path) = temp_path("pairs");
        let service = SentenceService::new(animals_embedder(), SentenceStore::new(path));
        let texts: Vec<String> = ["I like cats", "I like dogs", "The stock market fell"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let pairs = service.compute_similarities(&texts).await.unwrap();
        let labels: Vec<&str> = pairs.iter().map(|p| p.pair.as_str()).collect();
        assert_eq!(labels, vec!["1 vs 2", "1 vs 3", "2 vs 3"]);
        assert!(pairs[0].similarity > pairs[1].similarity);
        assert_eq!(service.embedder().calls(), 3);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn orthogonal_sentences_score_zero() {
        let (dir, path) = temp_path("orthogonal");
        let embedder = MockEmbedder::new()
            .with("north", vec![1.0, 0.0])
            .with("east", vec![0.0, 1.0]);
        let service = SentenceService::new(embedder, SentenceStore::new(path));

        let pairs = service
            .compute_similarities(&["north".to_string(), "east".to_string()])
            .await
            .unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].pair, "1 vs 2");
        assert_eq!(pairs[0].similarity, 0.0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn compute_similarities_rejects_single_text_without_calling_provider() {
        let (dir, path) = temp_path("single");
        let service = SentenceService::new(animals_embedder(), SentenceStore::new(path));

        let err = service
            .compute_similarities(&["I like cats".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InsufficientInput { required: 2, got: 1 }
        ));
        assert_eq!(service.embedder().calls(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn compute_similarities_rejects_blank_text() {
        let (dir, path) = temp_path("blank");
        let service = SentenceService::new(animals_embedder(), SentenceStore::new(path));

        let err = service
            .compute_similarities(&[
                "I like cats".to_string(),
                "   ".to_string(),
                "I like dogs".to_string(),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "sentence 2 is empty"));
        assert_eq!(service.embedder().calls(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn blank_texts_do_not_count_towards_the_minimum() {
        let (dir, path) = temp_path("one-non-blank");
        let service = SentenceService::new(animals_embedder(), SentenceStore::new(path));

        for texts in [
            vec!["a".to_string(), String::new()],
            vec![String::new(), "  ".to_string(), "a".to_string()],
        ] {
            let err = service.compute_similarities(&texts).await.unwrap_err();
            assert!(
                matches!(err, ServiceError::InsufficientInput { required: 2, got: 1 }),
                "unexpected error for {texts:?}: {err}"
            );
        }
        assert_eq!(service.embedder().calls(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn provider_failure_aborts_similarity_request() {
        let (dir, path) = temp_path("provider-fail");
        let service = SentenceService::new(FailingEmbedder::after(1), SentenceStore::new(path));

        let err = service
            .compute_similarities(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Provider(_)));
        assert_eq!(service.embedder().calls(), 2);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn save_sentence_stamps_and_persists() {
        let (dir, path) = temp_path("save");
        let service = SentenceService::new(animals_embedder(), SentenceStore::new(&path));

        let record = service.save_sentence("I like cats").await.unwrap();
        assert_eq!(record.embedding, vec![0.9, 0.1, 0.0]);
        assert!(
            chrono::NaiveDateTime::parse_from_str(&record.timestamp, TIMESTAMP_FORMAT).is_ok(),
            "unexpected timestamp format: {}",
            record.timestamp
        );

        let reopened = SentenceStore::new(&path);
        assert_eq!(reopened.load().unwrap(), vec![record]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn save_blank_sentence_is_rejected() {
        let (dir, path) = temp_path("save-blank");
        let service = SentenceService::new(animals_embedder(), SentenceStore::new(path));

        assert!(matches!(
            service.save_sentence("").await,
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(service.sentence_count().unwrap(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn failed_embedding_does_not_save() {
        let (dir, path) = temp_path("save-fail");
        let service = SentenceService::new(FailingEmbedder::after(0), SentenceStore::new(path));

        assert!(matches!(
            service.save_sentence("hello").await,
            Err(ServiceError::Provider(_))
        ));
        assert_eq!(service.sentence_count().unwrap(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn search_on_empty_store_is_not_found_without_provider_call() {
        let (dir, path) = temp_path("search-empty");
        let service = SentenceService::new(animals_embedder(), SentenceStore::new(path));

        let err = service.search_similar("I like cats").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(service.embedder().calls(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn search_ranks_saved_sentences() {
        let (dir, path) = temp_path("search");
        let service = SentenceService::new(animals_embedder(), SentenceStore::new(path));
        service.save_sentence("The stock market fell").await.unwrap();
        service.save_sentence("I like dogs").await.unwrap();

        let hits = service.search_similar("I like cats").await.unwrap();
        let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["I like dogs", "The stock market fell"]);
        assert!(hits[0].similarity > hits[1].similarity);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn search_reports_dimension_mismatch_with_stored_data() {
        let (dir, path) = temp_path("search-dims");
        let store = SentenceStore::new(&path);
        store
            .append(SentenceRecord {
                text: "old model".into(),
                embedding: vec![1.0, 0.0],
                timestamp: String::new(),
            })
            .unwrap();
        let service = SentenceService::new(animals_embedder(), store);

        let err = service.search_similar("I like cats").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::DimensionMismatch { expected: 3, got: 2 }
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn list_and_reset() {
        let (dir, path) = temp_path("list-reset");
        let service = SentenceService::new(animals_embedder(), SentenceStore::new(path));
        service.save_sentence("I like cats").await.unwrap();
        service.save_sentence("I like dogs").await.unwrap();

        let listing = service.list_sentences().unwrap();
        let texts: Vec<&str> = listing.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["I like cats", "I like dogs"]);

        service.reset_store().unwrap();
        assert!(service.list_sentences().unwrap().is_empty());
        assert!(service.store().load().unwrap().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_corpus_maps_to_not_found() {
        let err: ServiceError = SimilarityError::EmptyCorpus.into();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
