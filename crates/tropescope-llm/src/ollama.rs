//! Ollama Provider Implementation
//!
//! Runs the reasoning stages against a local Ollama instance, for privacy
//! and cost savings.
//!
//! # Examples
//!
//! ```no_run
//! use tropescope_llm::OllamaOracle;
//!
//! let oracle = OllamaOracle::new("http://localhost:11434", "llama3.1").unwrap();
//! ```

use crate::chat::{status_error, transport_error};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use tropescope_domain::{OracleError, OracleRequest, ReasoningOracle};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for a single request (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Ollama API provider for local inference
pub struct OllamaOracle {
    endpoint: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    format: &'static str,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaOracle {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, OracleError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new Ollama provider with a custom HTTP timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: 0.0,
            client,
        })
    }

    /// Create a provider against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, OracleError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl ReasoningOracle for OllamaOracle {
    async fn invoke(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let url = format!("{}/api/generate", self.endpoint);
        let prompt = request.user_message();

        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt: &prompt,
            system: &request.instructions,
            stream: false,
            format: "json",
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        debug!(stage = %request.stage, model = %self.model, "Sending Ollama generate request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, error_text, &self.model));
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| OracleError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(parsed.response)
    }
}
