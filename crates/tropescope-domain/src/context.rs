//! Retrieved reference context

use serde::{Deserialize, Serialize};

/// A reference document returned by a knowledge store query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// Stable document identifier
    pub doc_id: String,

    /// Document body
    pub text: String,

    /// Relevance to the query, in [0, 1]
    pub relevance: f64,
}

/// Ranked supporting context for a claim
///
/// Documents are ordered by descending relevance. Equal scores keep the
/// knowledge store's insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RetrievedContext {
    /// Ranked documents
    pub documents: Vec<ScoredDocument>,

    /// The query text used for retrieval
    pub query: String,
}

impl RetrievedContext {
    /// Build a context from raw store output
    ///
    /// Scores are clamped to [0, 1], the list is stably sorted by descending
    /// relevance and truncated to `k` documents.
    pub fn ranked(query: impl Into<String>, mut documents: Vec<ScoredDocument>, k: usize) -> Self {
        for doc in &mut documents {
            doc.relevance = if doc.relevance.is_nan() {
                0.0
            } else {
                doc.relevance.clamp(0.0, 1.0)
            };
        }
        // sort_by is stable, so ties keep insertion order
        documents.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        documents.truncate(k);

        Self {
            documents,
            query: query.into(),
        }
    }

    /// Context with no documents, used when retrieval is unavailable
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            documents: Vec::new(),
            query: query.into(),
        }
    }

    /// Whether any documents were retrieved
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Document bodies in rank order
    pub fn texts(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.text.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, relevance: f64) -> ScoredDocument {
        ScoredDocument {
            doc_id: id.to_string(),
            text: format!("text of {}", id),
            relevance,
        }
    }

    #[test]
    fn test_ranked_orders_descending() {
        let ctx = RetrievedContext::ranked("q", vec![doc("a", 0.2), doc("b", 0.9), doc("c", 0.5)], 5);
        let ids: Vec<_> = ctx.documents.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ranked_ties_keep_insertion_order() {
        let ctx = RetrievedContext::ranked(
            "q",
            vec![doc("first", 0.5), doc("second", 0.5), doc("third", 0.5)],
            5,
        );
        let ids: Vec<_> = ctx.documents.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_ranked_truncates_and_clamps() {
        let ctx = RetrievedContext::ranked("q", vec![doc("a", 1.7), doc("b", -0.3), doc("c", 0.4)], 2);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.documents[0].relevance, 1.0);
        assert_eq!(ctx.documents[1].doc_id, "c");
    }

    #[test]
    fn test_empty_context() {
        let ctx = RetrievedContext::empty("query");
        assert!(ctx.is_empty());
        assert_eq!(ctx.query, "query");
    }
}
