//! Error types for the pipeline

use thiserror::Error;
use tropescope_domain::OracleError;
use tropescope_store::StoreError;

/// A structured oracle response that does not match its stage's schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The response contains no `{ ... }` span
    #[error("No JSON object found in response")]
    NoJsonObject,

    /// The JSON span does not parse, or a field has the wrong type
    #[error("Malformed JSON: {0}")]
    Json(String),

    /// A required field is absent or null
    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    /// A field holds a label outside its closed set
    #[error("Invalid value for '{field}': {value}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// A numeric field lies outside its allowed range
    #[error("'{field}' out of range: {value}")]
    OutOfRange {
        /// Field name
        field: &'static str,
        /// Offending value
        value: f64,
    },
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::Json(e.to_string())
    }
}

/// Claim extraction failed; fatal for the item
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// The oracle call failed
    #[error("oracle: {0}")]
    Oracle(#[from] OracleError),

    /// The oracle answered outside the claim schema
    #[error("schema: {0}")]
    Schema(#[from] SchemaError),
}

/// Trope mapping failed; the item degrades to no trope
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    /// The oracle call failed
    #[error("oracle: {0}")]
    Oracle(#[from] OracleError),

    /// The oracle answered outside the trope schema
    #[error("schema: {0}")]
    Schema(#[from] SchemaError),
}

/// Counterfactual testing failed; the item degrades to `meaning_preserved = false`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CounterfactualError {
    /// The oracle call failed
    #[error("oracle: {0}")]
    Oracle(#[from] OracleError),

    /// The oracle answered outside the counterfactual schema
    #[error("schema: {0}")]
    Schema(#[from] SchemaError),
}

/// Per-item classification failure
///
/// Cloneable so one failure can be reported at every batch position that
/// shares the same input text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// No claim could be extracted
    #[error("Claim extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// Input exceeds the configured maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// The batch was cancelled before this item finished
    #[error("Classification cancelled")]
    Cancelled,

    /// The task running this item panicked or was aborted
    #[error("Classification task failed: {0}")]
    TaskFailed(String),

    /// A blocking entry point was called from inside an async runtime
    #[error("Blocking classification called from within an async runtime")]
    BlockingInAsyncContext,

    /// The private runtime for blocking calls could not be built
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Failures while assembling a pipeline from configuration
#[derive(Error, Debug)]
pub enum SetupError {
    /// Configuration is invalid or unreadable
    #[error("Configuration error: {0}")]
    Config(String),

    /// The oracle could not be built
    #[error("Oracle setup failed: {0}")]
    Oracle(#[from] OracleError),

    /// The knowledge base could not be loaded
    #[error("Knowledge base setup failed: {0}")]
    Store(#[from] StoreError),
}
