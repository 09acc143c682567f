//! Trait definitions for external interactions
//!
//! These traits define the boundaries between pipeline logic and infrastructure.
//! Implementations live in other crates (`tropescope-llm`, `tropescope-store`)
//! or in tests as deterministic stubs.

use crate::context::ScoredDocument;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Which pipeline stage issued an oracle request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleStage {
    /// Claim extraction
    ClaimExtraction,
    /// Trope mapping
    TropeMapping,
    /// Counterfactual testing
    Counterfactual,
}

impl fmt::Display for OracleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OracleStage::ClaimExtraction => "claim_extraction",
            OracleStage::TropeMapping => "trope_mapping",
            OracleStage::Counterfactual => "counterfactual",
        })
    }
}

/// A structured request to the reasoning oracle
#[derive(Debug, Clone, PartialEq)]
pub struct OracleRequest {
    /// Issuing stage; selects the response schema
    pub stage: OracleStage,

    /// System-level instructions
    pub instructions: String,

    /// Ordered reference material (may be empty)
    pub context: Vec<String>,

    /// The text under analysis
    pub input: String,
}

impl OracleRequest {
    /// Create a request without reference material
    pub fn new(stage: OracleStage, instructions: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            stage,
            instructions: instructions.into(),
            context: Vec::new(),
            input: input.into(),
        }
    }

    /// Attach reference material
    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.context = context;
        self
    }

    /// Render context and input as a single user message
    pub fn user_message(&self) -> String {
        let mut message = String::new();

        if !self.context.is_empty() {
            message.push_str("Reference material:\n");
            for (idx, doc) in self.context.iter().enumerate() {
                message.push_str(&format!("[{}] {}\n\n", idx + 1, doc.trim()));
            }
        }

        message.push_str(&self.input);
        message
    }
}

/// Transport-level oracle failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// Provider rejected the call for exceeding its rate limit
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The call did not complete in time
    #[error("Oracle call timed out")]
    Timeout,

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The provider answered with something other than a completion
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider could not be configured (missing credentials, bad endpoint)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl OracleError {
    /// Whether a bounded retry may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, OracleError::RateLimited | OracleError::Timeout)
    }
}

/// The reasoning oracle: instructions + context + input in, structured text out
///
/// The response is expected to be a JSON object matching the schema of the
/// issuing stage; validation is the caller's responsibility.
#[async_trait]
pub trait ReasoningOracle: Send + Sync {
    /// Answer one request
    async fn invoke(&self, request: &OracleRequest) -> Result<String, OracleError>;
}

/// Failures of the knowledge store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrievalError {
    /// The similarity backend cannot be reached
    #[error("Knowledge store unavailable: {0}")]
    Unavailable(String),

    /// The query could not be embedded
    #[error("Embedding failed: {0}")]
    Embedding(String),
}

/// Nearest-documents oracle over an immutable reference corpus
///
/// Implementations must be deterministic: the same query against the same
/// corpus returns the same ranking.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Return up to `k` documents most relevant to `query`
    async fn nearest(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_pressure_is_retryable() {
        assert!(OracleError::RateLimited.is_retryable());
        assert!(OracleError::Timeout.is_retryable());
        assert!(!OracleError::Communication("reset".into()).is_retryable());
        assert!(!OracleError::InvalidResponse("html".into()).is_retryable());
        assert!(!OracleError::Configuration("no key".into()).is_retryable());
    }

    #[test]
    fn test_user_message_without_context() {
        let request = OracleRequest::new(OracleStage::ClaimExtraction, "instr", "Text: hello");
        assert_eq!(request.user_message(), "Text: hello");
    }

    #[test]
    fn test_user_message_numbers_context() {
        let request = OracleRequest::new(OracleStage::TropeMapping, "instr", "Claim: x")
            .with_context(vec!["first doc".into(), "second doc".into()]);
        let message = request.user_message();

        assert!(message.starts_with("Reference material:"));
        assert!(message.contains("[1] first doc"));
        assert!(message.contains("[2] second doc"));
        assert!(message.ends_with("Claim: x"));
    }
}
