//! Tropescope Domain Layer
//!
//! This crate contains the data model that flows between the stages of the
//! trope classification pipeline, together with the trait interfaces for the
//! two external collaborators the pipeline depends on.
//!
//! ## Key Concepts
//!
//! - **Claim**: The propositional content of an input text, with its inferred target
//! - **Retrieved Context**: Reference documents ranked by relevance to a claim
//! - **Trope Match**: The closed-set trope label a claim most resembles, with a strength
//! - **Counterfactual**: The claim rewritten with a neutral actor, judged for meaning preservation
//! - **Risk Result**: The terminal, immutable artifact returned to callers
//!
//! ## Architecture
//!
//! - Records are created once by their producing stage and never mutated
//! - No I/O happens here; oracles and knowledge stores are injected via [`traits`]
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod claim;
pub mod context;
pub mod counterfactual;
pub mod risk;
pub mod traits;
pub mod trope;

// Re-exports for convenience
pub use claim::{ClaimRecord, Explicitness, Target};
pub use context::{RetrievedContext, ScoredDocument};
pub use counterfactual::CounterfactualResult;
pub use risk::{Confidence, Degradation, DegradedStage, RiskResult, Verdict};
pub use traits::{
    KnowledgeStore, OracleError, OracleRequest, OracleStage, ReasoningOracle, RetrievalError,
};
pub use trope::{TropeKind, TropeMatch, UnknownLabel};
