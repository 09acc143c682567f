//! Context retrieval stage

use std::sync::Arc;
use tracing::debug;
use tropescope_domain::{ClaimRecord, KnowledgeStore, RetrievalError, RetrievedContext};

/// Queries the knowledge store with the extracted claim
#[derive(Clone)]
pub struct ContextRetriever {
    store: Arc<dyn KnowledgeStore>,
}

impl ContextRetriever {
    /// Create a retriever over `store`
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self { store }
    }

    /// Up to `k` documents ranked by descending relevance
    ///
    /// The query is the extracted claim text, so identical claims rank
    /// identically for a fixed store.
    pub async fn retrieve(&self, claim: &ClaimRecord, k: usize) -> Result<RetrievedContext, RetrievalError> {
        let query = claim.extracted_claim.as_str();
        let documents = self.store.nearest(query, k).await?;
        let context = RetrievedContext::ranked(query, documents, k);

        debug!(documents = context.len(), "Retrieved context");
        Ok(context)
    }
}
