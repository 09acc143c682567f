//! Configuration for the classification pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tropescope_llm::OracleConfig;
use tropescope_store::embedding::EmbeddingConfig;

/// Upper bound on oracle retries, whatever the configuration says
pub const MAX_RETRIES_CAP: u32 = 3;

/// Retry policy wrapped around every oracle call
///
/// Only rate-limit and timeout failures are retried. Backoff doubles per
/// attempt, starting at `initial_backoff_ms` and capped at `max_backoff_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    /// Default: 0 (no automatic retry)
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds)
    pub initial_backoff_ms: u64,

    /// Longest delay between two attempts (milliseconds)
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryConfig {
    /// Retry count after applying [`MAX_RETRIES_CAP`]
    pub fn effective_retries(&self) -> u32 {
        self.max_retries.min(MAX_RETRIES_CAP)
    }

    /// Delay before retry number `retry` (0-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
        let delay = self.initial_backoff_ms.saturating_mul(factor).min(self.max_backoff_ms);
        Duration::from_millis(delay)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries > MAX_RETRIES_CAP {
            return Err(format!("retry.max_retries cannot exceed {}", MAX_RETRIES_CAP));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err("retry.initial_backoff_ms cannot exceed retry.max_backoff_ms".to_string());
        }
        Ok(())
    }
}

/// Result cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache results by exact input text
    pub enabled: bool,

    /// Maximum number of cached results; least recently used are evicted first
    /// Default: unbounded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: None,
        }
    }
}

/// Configuration for the [`Pipeline`](crate::Pipeline)
///
/// # Examples
///
/// ```
/// use tropescope_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::from_toml("concurrency = 2\n[retry]\nmax_retries = 1\n").unwrap();
/// assert_eq!(config.concurrency, 2);
/// assert_eq!(config.retry.max_retries, 1);
/// assert_eq!(config.retrieval_k, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory of reference documents; the built-in trope definitions are used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_base_dir: Option<PathBuf>,

    /// Documents retrieved per claim
    pub retrieval_k: usize,

    /// Pipelines allowed to run at once; further inputs queue
    pub concurrency: usize,

    /// Bound on a single oracle call attempt (seconds)
    pub stage_timeout_secs: u64,

    /// Trimmed inputs shorter than this skip the pipeline entirely
    pub min_text_chars: usize,

    /// Longest accepted input (characters)
    pub max_text_length: usize,

    /// Reasoning oracle
    pub oracle: OracleConfig,

    /// Embedding model for the knowledge base
    pub embedding: EmbeddingConfig,

    /// Result cache
    pub cache: CacheConfig,

    /// Oracle retry policy
    pub retry: RetryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            knowledge_base_dir: None,
            retrieval_k: 4,
            concurrency: 8,
            stage_timeout_secs: 60,
            min_text_chars: 10,
            max_text_length: 20_000,
            oracle: OracleConfig::default(),
            embedding: EmbeddingConfig::default(),
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Per-attempt oracle timeout as a Duration
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.retrieval_k == 0 {
            return Err("retrieval_k must be greater than 0".to_string());
        }
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }
        if self.stage_timeout_secs == 0 {
            return Err("stage_timeout_secs must be greater than 0".to_string());
        }
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.min_text_chars > self.max_text_length {
            return Err("min_text_chars cannot exceed max_text_length".to_string());
        }
        if self.cache.capacity == Some(0) {
            return Err("cache.capacity must be greater than 0 when set".to_string());
        }
        self.oracle.validate().map_err(|e| format!("oracle: {}", e))?;
        self.embedding.validate()?;
        self.retry.validate()?;
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let config = Self::from_toml(&contents)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tropescope_llm::OracleBackend;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retrieval_k, 4);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.min_text_chars, 10);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.capacity, None);
        assert_eq!(config.retry.max_retries, 0);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = PipelineConfig::default();
        config.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.retrieval_k = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.cache.capacity = Some(0);
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.retry.max_retries = 4;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.min_text_chars = config.max_text_length + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let retry = RetryConfig {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 350,
        };
        assert_eq!(retry.backoff(0), Duration::from_millis(100));
        assert_eq!(retry.backoff(1), Duration::from_millis(200));
        assert_eq!(retry.backoff(2), Duration::from_millis(350));
        assert_eq!(retry.backoff(70), Duration::from_millis(350));
    }

    #[test]
    fn test_effective_retries_capped() {
        let retry = RetryConfig {
            max_retries: 10,
            ..RetryConfig::default()
        };
        assert_eq!(retry.effective_retries(), MAX_RETRIES_CAP);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = PipelineConfig::default();
        config.knowledge_base_dir = Some(PathBuf::from("kb"));
        config.cache.capacity = Some(128);
        config.oracle = OracleConfig::ollama("llama3.1");

        let toml_str = config.to_toml().unwrap();
        let parsed = PipelineConfig::from_toml(&toml_str).unwrap();

        assert_eq!(parsed.knowledge_base_dir, Some(PathBuf::from("kb")));
        assert_eq!(parsed.cache, config.cache);
        assert_eq!(parsed.oracle.backend, OracleBackend::Ollama);
        assert_eq!(parsed.oracle.model, "llama3.1");
        assert_eq!(parsed.retrieval_k, config.retrieval_k);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retrieval_k = 3\nmin_text_chars = 5\n\n[cache]\nenabled = false").unwrap();

        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.retrieval_k, 3);
        assert_eq!(config.min_text_chars, 5);
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "concurrency = 0").unwrap();
        assert!(PipelineConfig::load(file.path()).is_err());

        assert!(PipelineConfig::load("/no/such/tropescope.toml").is_err());
    }
}
