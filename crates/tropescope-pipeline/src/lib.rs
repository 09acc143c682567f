//! Tropescope Pipeline
//!
//! Classifies text for identity-based rhetorical tropes through a chain of
//! oracle-backed stages, each producing an immutable record for the next.
//!
//! # Architecture
//!
//! ```text
//!                        ┌─→ Context Retriever ─→ Trope Mapper ─┐
//! Text → Claim Extractor ┤                                      ├─→ Risk Aggregator → RiskResult
//!                        └─→ Counterfactual Tester ─────────────┘
//! ```
//!
//! # Key Features
//!
//! - **Single-flight cache**: identical texts share one execution and are served from cache afterwards
//! - **Bounded concurrency**: a semaphore caps pipelines in flight; extra inputs queue
//! - **Soft degradation**: retrieval, mapping and counterfactual failures mark the result instead of failing it
//! - **Ordered batches**: outputs follow input order; duplicate inputs run once
//! - **Retry policy**: rate-limit and timeout failures can be retried with exponential backoff
//!
//! # Example Usage
//!
//! ```no_run
//! use tropescope_pipeline::{Pipeline, PipelineConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::from_config(PipelineConfig::default())?;
//!
//! let results = pipeline
//!     .classify_batch(&["They control the banks.", "The weather is nice today."])
//!     .await;
//!
//! for result in results {
//!     match result {
//!         Ok(risk) => println!("{} ({:.2})", risk.verdict().label(), risk.risk_score()),
//!         Err(e) => eprintln!("failed: {}", e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod aggregator;
pub mod cache;
mod config;
mod counterfactual;
mod error;
mod extractor;
mod mapper;
mod metrics;
mod orchestrator;
pub mod parser;
pub mod prompt;
mod retriever;
mod retry;


pub use aggregator::aggregate;
pub use config::{CacheConfig, PipelineConfig, RetryConfig, MAX_RETRIES_CAP};
pub use counterfactual::CounterfactualTester;
pub use error::{CounterfactualError, ExtractionError, MappingError, PipelineError, SchemaError, SetupError};
pub use extractor::ClaimExtractor;
pub use mapper::TropeMapper;
pub use metrics::{MetricsSnapshot, PipelineMetrics};
pub use orchestrator::{ItemResult, Pipeline};
pub use retriever::ContextRetriever;
pub use retry::OracleCaller;

pub use tokio_util::sync::CancellationToken;
