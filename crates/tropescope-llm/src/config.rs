//! Configuration for the reasoning oracle

use crate::{ChatCompletionsOracle, OllamaOracle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tropescope_domain::{OracleError, ReasoningOracle};

/// Which provider API to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OracleBackend {
    /// OpenAI-compatible `/chat/completions`
    #[default]
    ChatCompletions,
    /// Local Ollama `/api/generate`
    Ollama,
}

/// Oracle provider settings
///
/// # Examples
///
/// ```
/// use tropescope_llm::{OracleBackend, OracleConfig};
///
/// let config = OracleConfig::default();
/// assert_eq!(config.backend, OracleBackend::ChatCompletions);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Provider API
    pub backend: OracleBackend,

    /// Base URL of the provider
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Environment variable holding the API key
    ///
    /// `None` sends no credentials, which suits local endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Sampling temperature
    /// Default: 0.0, so classifications are as repeatable as the provider allows
    pub temperature: f32,

    /// HTTP timeout for a single request (seconds)
    pub request_timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            backend: OracleBackend::ChatCompletions,
            endpoint: crate::chat::DEFAULT_ENDPOINT.to_string(),
            model: crate::chat::DEFAULT_MODEL.to_string(),
            api_key_env: Some("OPENROUTER_API_KEY".to_string()),
            temperature: 0.0,
            request_timeout_secs: crate::chat::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OracleConfig {
    /// Local Ollama preset
    pub fn ollama(model: impl Into<String>) -> Self {
        Self {
            backend: OracleBackend::Ollama,
            endpoint: crate::ollama::DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            api_key_env: None,
            temperature: 0.0,
            request_timeout_secs: crate::ollama::DEFAULT_TIMEOUT_SECS,
        }
    }

    /// HTTP timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be in [0.0, 2.0]".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Read the API key from the configured environment variable
    fn api_key(&self) -> Result<Option<String>, OracleError> {
        match &self.api_key_env {
            None => Ok(None),
            Some(var) => std::env::var(var)
                .map(Some)
                .map_err(|_| OracleError::Configuration(format!("environment variable {} is not set", var))),
        }
    }

    /// Construct the configured provider
    pub fn build(&self) -> Result<Arc<dyn ReasoningOracle>, OracleError> {
        self.validate().map_err(OracleError::Configuration)?;

        info!(backend = ?self.backend, model = %self.model, "Building reasoning oracle");

        let oracle: Arc<dyn ReasoningOracle> = match self.backend {
            OracleBackend::ChatCompletions => Arc::new(
                ChatCompletionsOracle::with_timeout(
                    self.endpoint.clone(),
                    self.model.clone(),
                    self.api_key()?,
                    self.request_timeout(),
                )?
                .with_temperature(self.temperature),
            ),
            OracleBackend::Ollama => Arc::new(
                OllamaOracle::with_timeout(self.endpoint.clone(), self.model.clone(), self.request_timeout())?
                    .with_temperature(self.temperature),
            ),
        };

        Ok(oracle)
    }
}
