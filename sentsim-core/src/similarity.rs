//! Cosine similarity, pairwise comparison and ranked search.
//!
//! Scores are compared unrounded; rounding to four decimal places happens
//! only when a result is built for presentation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::SentenceRecord;

/// Number of decimal digits kept in presented similarity scores.
const SIMILARITY_DECIMALS: i32 = 4;

/// Errors raised by the similarity engine.
#[derive(Debug, PartialEq)]
pub enum SimilarityError {
    /// The two vectors have different lengths.
    DimensionMismatch { expected: usize, got: usize },
    /// Fewer vectors than the operation needs.
    InsufficientInput { required: usize, got: usize },
    /// Ranking was requested against an empty candidate set.
    EmptyCorpus,
}

impl fmt::Display for SimilarityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, got } => {
                write!(f, "dimension mismatch: expected {expected}, got {got}")
            }
            Self::InsufficientInput { required, got } => {
                write!(f, "at least {required} inputs are required, got {got}")
            }
            Self::EmptyCorpus => write!(f, "no stored sentences to compare against"),
        }
    }
}

impl std::error::Error for SimilarityError {}

/// Similarity between two inputs, labelled with their 1-based positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSimilarity {
    pub pair: String,
    pub similarity: f32,
}

/// A stored sentence scored against a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub text: String,
    pub similarity: f32,
    pub timestamp: String,
}

/// Compute cosine similarity between two vectors.
///
/// A zero vector has no direction; its similarity to anything is `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

/// Round a similarity score to four decimal places.
pub fn round_similarity(value: f32) -> f32 {
    let factor = 10f64.powi(SIMILARITY_DECIMALS);
    ((value as f64 * factor).round() / factor) as f32
}

/// Similarity of every unordered pair, `i` ascending then `j` ascending.
pub fn pairwise_similarities(vectors: &[Vec<f32>]) -> Result<Vec<PairSimilarity>, SimilarityError> {
    if vectors.len() < 2 {
        return Err(SimilarityError::InsufficientInput {
            required: 2,
            got: vectors.len(),
        });
    }

    let mut pairs = Vec::with_capacity(vectors.len() * (vectors.len() - 1) / 2);
    for i in 0..vectors.len() {
        for j in (i + 1)..vectors.len() {
            let similarity = cosine_similarity(&vectors[i], &vectors[j])?;
            pairs.push(PairSimilarity {
                pair: format!("{} vs {}", i + 1, j + 1),
                similarity: round_similarity(similarity),
            });
        }
    }
    Ok(pairs)
}

/// Score every candidate against `query`, most similar first.
///
/// The sort is stable, so equal scores keep their stored order.
pub fn rank_by_similarity(
    query: &[f32],
    candidates: &[SentenceRecord],
) -> Result<Vec<SearchHit>, SimilarityError> {
    if candidates.is_empty() {
        return Err(SimilarityError::EmptyCorpus);
    }

    let mut scored = candidates
        .iter()
        .map(|record| Ok((cosine_similarity(query, &record.embedding)?, record)))
        .collect::<Result<Vec<_>, SimilarityError>>()?;
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    Ok(scored
        .into_iter()
        .map(|(score, record)| SearchHit {
            text: record.text.clone(),
            similarity: round_similarity(score),
            timestamp: record.timestamp.clone(),
        })
        .collect())
}
