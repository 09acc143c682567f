//! Embedding Models for Text Vectorization
//!
//! This module provides text-to-vector conversion for reference-document
//! retrieval. The models here are local and fully deterministic, so the same
//! corpus and query always produce the same ranking.
//!
//! # Models
//!
//! - **HashedTokenEmbedding**: feature-hashed bag of words
//! - **HashedTrigramEmbedding**: feature-hashed character trigrams, tolerant
//!   of inflection and spelling variants
//!
//! Both produce non-negative, unit-length vectors, so cosine similarity
//! between two embeddings always lies in [0, 1].
//!
//! # Examples
//!
//! ```rust
//! use tropescope_store::embedding::{HashedTokenEmbedding, EmbeddingModel};
//!
//! let model = HashedTokenEmbedding::new(384);
//! let text = "Bankers control the media";
//! let embedding = model.embed(text).unwrap();
//! assert_eq!(embedding.len(), 384);
//!
//! // Same text always produces same embedding
//! let embedding2 = model.embed(text).unwrap();
//! assert_eq!(embedding, embedding2);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Default embedding dimension
pub const DEFAULT_DIMENSION: usize = 384;

/// Function words carrying no topical signal
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in", "is",
    "it", "its", "of", "on", "or", "that", "the", "their", "them", "they", "this", "to", "was",
    "were", "with",
];

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model inference error
    #[error("Model inference failed: {0}")]
    InferenceFailed(String),
}

/// Trait for embedding models
pub trait EmbeddingModel: Send + Sync {
    /// Generate an embedding vector for the given text
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Get the dimension of embeddings produced by this model
    fn dimension(&self) -> usize;
}

/// Selectable embedding backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// Feature-hashed bag of words
    #[default]
    HashedTokens,
    /// Feature-hashed character trigrams
    HashedTrigrams,
}

/// Embedding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Which model to build
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// Vector dimension
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

fn default_dimension() -> usize {
    DEFAULT_DIMENSION
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            dimension: DEFAULT_DIMENSION,
        }
    }
}

impl EmbeddingConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.dimension == 0 {
            return Err("embedding.dimension must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Build the configured model
    pub fn build(&self) -> Box<dyn EmbeddingModel> {
        match self.backend {
            EmbeddingBackend::HashedTokens => Box::new(HashedTokenEmbedding::new(self.dimension)),
            EmbeddingBackend::HashedTrigrams => Box::new(HashedTrigramEmbedding::new(self.dimension)),
        }
    }
}

/// Hash a feature to a bucket in [0, dimension)
fn bucket(feature: &str, dimension: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    feature.hash(&mut hasher);
    (hasher.finish() % dimension as u64) as usize
}

/// Lowercased alphanumeric tokens, stopwords removed
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(&t.as_str()))
}

/// Normalize to unit length for cosine similarity
fn normalize(mut embedding: Vec<f32>) -> Vec<f32> {
    let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude > 0.0 {
        for value in &mut embedding {
            *value /= magnitude;
        }
    }

    embedding
}

fn check_input(text: &str) -> Result<(), EmbeddingError> {
    if text.trim().is_empty() {
        return Err(EmbeddingError::InvalidInput(
            "Empty text cannot be embedded".to_string(),
        ));
    }
    Ok(())
}

fn check_dimension(dimension: usize) -> Result<(), EmbeddingError> {
    if dimension == 0 {
        return Err(EmbeddingError::InvalidInput(
            "Embedding dimension must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Bag-of-words embedding using the hashing trick
///
/// Each token increments one bucket; the vector is then normalized. Texts
/// sharing vocabulary score high, unrelated texts score near zero.
pub struct HashedTokenEmbedding {
    dimension: usize,
}

impl HashedTokenEmbedding {
    /// Create a new model
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl EmbeddingModel for HashedTokenEmbedding {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        check_input(text)?;
        check_dimension(self.dimension)?;

        let mut embedding = vec![0.0f32; self.dimension];
        for token in tokens(text) {
            embedding[bucket(&token, self.dimension)] += 1.0;
        }

        Ok(normalize(embedding))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Character-trigram embedding using the hashing trick
pub struct HashedTrigramEmbedding {
    dimension: usize,
}

impl HashedTrigramEmbedding {
    /// Create a new model
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl EmbeddingModel for HashedTrigramEmbedding {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        check_input(text)?;
        check_dimension(self.dimension)?;

        let mut embedding = vec![0.0f32; self.dimension];
        for token in tokens(text) {
            let padded: Vec<char> = format!(" {} ", token).chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                embedding[bucket(&trigram, self.dimension)] += 1.0;
            }
        }

        Ok(normalize(embedding))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Calculate cosine similarity between two embedding vectors
///
/// Returns 0.0 when either vector is zero or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}
