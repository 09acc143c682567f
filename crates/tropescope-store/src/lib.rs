//! Tropescope Knowledge Store
//!
//! Implements the `KnowledgeStore` trait over an in-memory corpus of
//! reference documents (trope definitions, guidelines).
//!
//! # Architecture
//!
//! - Documents are embedded once, at construction; the corpus is immutable afterwards
//! - Queries are answered by an exact cosine scan, so results are deterministic
//! - Equal scores keep document insertion order
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use tropescope_store::KnowledgeBase;
//! use tropescope_store::embedding::HashedTokenEmbedding;
//!
//! let kb = KnowledgeBase::builtin(Arc::new(HashedTokenEmbedding::new(384))).unwrap();
//! let hits = kb.search("they control the banks", 3).unwrap();
//! assert_eq!(hits.len(), 3);
//! ```

#![warn(missing_docs)]

pub mod builtin;
pub mod embedding;

use async_trait::async_trait;
use embedding::{cosine_similarity, EmbeddingConfig, EmbeddingError, EmbeddingModel};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use tropescope_domain::{KnowledgeStore, RetrievalError, ScoredDocument};

pub use embedding::EmbeddingBackend;

/// File extensions picked up by [`KnowledgeBase::load_dir`]
const DOCUMENT_EXTENSIONS: &[&str] = &["md", "txt"];

/// Errors that can occur while building or querying the store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error while loading documents
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Embedding failure
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Two documents share an identifier
    #[error("Duplicate document id: {0}")]
    DuplicateDocument(String),

    /// A directory held no loadable documents
    #[error("No documents found in {0}")]
    EmptyDirectory(PathBuf),

    /// Invalid embedding configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

struct IndexedDocument {
    doc_id: String,
    text: String,
    embedding: Vec<f32>,
}

/// Immutable, embedded reference corpus
pub struct KnowledgeBase {
    documents: Vec<IndexedDocument>,
    model: Arc<dyn EmbeddingModel>,
}

impl KnowledgeBase {
    /// Embed and index `(doc_id, text)` pairs, preserving their order
    pub fn from_documents<I, K, V>(model: Arc<dyn EmbeddingModel>, documents: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut indexed = Vec::new();

        for (doc_id, text) in documents {
            let doc_id = doc_id.into();
            let text = text.into();

            if !seen.insert(doc_id.clone()) {
                return Err(StoreError::DuplicateDocument(doc_id));
            }

            let embedding = model.embed(&text)?;
            indexed.push(IndexedDocument {
                doc_id,
                text,
                embedding,
            });
        }

        debug!("Indexed {} reference documents", indexed.len());

        Ok(Self {
            documents: indexed,
            model,
        })
    }

    /// Corpus of the built-in trope definitions
    pub fn builtin(model: Arc<dyn EmbeddingModel>) -> Result<Self, StoreError> {
        Self::from_documents(model, builtin::TROPE_DEFINITIONS.iter().copied())
    }

    /// Load every `.md` / `.txt` file in `dir`
    ///
    /// Files are ordered by name, which fixes the tie-breaking order. The
    /// document id is the file stem.
    pub fn load_dir(dir: impl AsRef<Path>, model: Arc<dyn EmbeddingModel>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext))
            })
            .collect();
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in &paths {
            let text = fs::read_to_string(path)?;
            if text.trim().is_empty() {
                debug!("Skipping empty document {}", path.display());
                continue;
            }
            let doc_id = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            documents.push((doc_id, text));
        }

        if documents.is_empty() {
            return Err(StoreError::EmptyDirectory(dir.to_path_buf()));
        }

        info!("Loaded {} reference documents from {}", documents.len(), dir.display());
        Self::from_documents(model, documents)
    }

    /// Build from configuration: a document directory if given, otherwise the built-ins
    pub fn from_config(config: &EmbeddingConfig, dir: Option<&Path>) -> Result<Self, StoreError> {
        config.validate().map_err(StoreError::Config)?;

        let model: Arc<dyn EmbeddingModel> = Arc::from(config.build());
        match dir {
            Some(dir) => Self::load_dir(dir, model),
            None => Self::builtin(model),
        }
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document ids in insertion order
    pub fn doc_ids(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.doc_id.as_str()).collect()
    }

    /// Rank documents by cosine similarity to `query`
    ///
    /// Returns at most `k` documents, highest relevance first; ties keep
    /// insertion order.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, StoreError> {
        if k == 0 || self.documents.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.model.embed(query)?;

        let mut scored: Vec<(usize, f64)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(idx, doc)| {
                let similarity = cosine_similarity(&query_embedding, &doc.embedding) as f64;
                (idx, similarity.clamp(0.0, 1.0))
            })
            .collect();

        // Stable sort over insertion-ordered input keeps ties in insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(idx, relevance)| {
                let doc = &self.documents[idx];
                ScoredDocument {
                    doc_id: doc.doc_id.clone(),
                    text: doc.text.clone(),
                    relevance,
                }
            })
            .collect())
    }
}

#[async_trait]
impl KnowledgeStore for KnowledgeBase {
    async fn nearest(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, RetrievalError> {
        self.search(query, k).map_err(|e| match e {
            StoreError::Embedding(e) => RetrievalError::Embedding(e.to_string()),
            other => RetrievalError::Unavailable(other.to_string()),
        })
    }
}
