//! OpenAI-compatible Chat Completions Provider
//!
//! Talks to any endpoint implementing the `/chat/completions` API, such as
//! OpenAI or OpenRouter. Instructions go in the system message, reference
//! material and input in the user message, and JSON output is requested
//! through `response_format`.
//!
//! # Examples
//!
//! ```no_run
//! use tropescope_llm::ChatCompletionsOracle;
//!
//! let oracle = ChatCompletionsOracle::new(
//!     "https://openrouter.ai/api/v1",
//!     "openai/gpt-4o",
//!     Some("sk-...".to_string()),
//! )
//! .unwrap();
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use tropescope_domain::{OracleError, OracleRequest, ReasoningOracle};

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "openai/gpt-4o";

/// Default HTTP timeout for a single request (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Chat completions provider
pub struct ChatCompletionsOracle {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl ChatCompletionsOracle {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL, without the `/chat/completions` suffix
    /// - `model`: Model identifier (e.g., "openai/gpt-4o")
    /// - `api_key`: Bearer token, if the endpoint requires one
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, OracleError> {
        Self::with_timeout(endpoint, model, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new provider with a custom HTTP timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            temperature: 0.0,
            client,
        })
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Map a reqwest transport error to an oracle error
pub(crate) fn transport_error(e: reqwest::Error) -> OracleError {
    if e.is_timeout() {
        OracleError::Timeout
    } else {
        OracleError::Communication(format!("Request failed: {}", e))
    }
}

/// Map a non-success HTTP status to an oracle error
pub(crate) fn status_error(status: reqwest::StatusCode, body: String, model: &str) -> OracleError {
    match status {
        reqwest::StatusCode::TOO_MANY_REQUESTS => OracleError::RateLimited,
        reqwest::StatusCode::NOT_FOUND => OracleError::ModelNotAvailable(model.to_string()),
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            OracleError::Configuration(format!("HTTP {}: check credentials", status))
        }
        reqwest::StatusCode::REQUEST_TIMEOUT | reqwest::StatusCode::GATEWAY_TIMEOUT => OracleError::Timeout,
        _ => OracleError::Communication(format!("HTTP {}: {}", status, body)),
    }
}

#[async_trait]
impl ReasoningOracle for ChatCompletionsOracle {
    async fn invoke(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let user_message = request.user_message();

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.instructions,
                },
                ChatMessage {
                    role: "user",
                    content: &user_message,
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat { kind: "json_object" },
        };

        debug!(stage = %request.stage, model = %self.model, "Sending chat completion request");

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, error_text, &self.model));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| OracleError::InvalidResponse("Response contained no message content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tropescope_domain::OracleStage;

    #[test]
    fn test_provider_creation() {
        let oracle = ChatCompletionsOracle::new("https://example.test/v1/", "gpt-4o", None).unwrap();
        assert_eq!(oracle.endpoint, "https://example.test/v1");
        assert_eq!(oracle.model, "gpt-4o");
        assert_eq!(oracle.temperature, 0.0);
    }

    #[test]
    fn test_with_temperature() {
        let oracle = ChatCompletionsOracle::new(DEFAULT_ENDPOINT, DEFAULT_MODEL, None)
            .unwrap()
            .with_temperature(0.4);
        assert_eq!(oracle.temperature, 0.4);
    }

    #[test]
    fn test_status_mapping() {
        use reqwest::StatusCode;

        assert_eq!(status_error(StatusCode::TOO_MANY_REQUESTS, String::new(), "m"), OracleError::RateLimited);
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, String::new(), "m"),
            OracleError::ModelNotAvailable("m".to_string())
        );
        assert_eq!(status_error(StatusCode::GATEWAY_TIMEOUT, String::new(), "m"), OracleError::Timeout);
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new(), "m"),
            OracleError::Configuration(_)
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom".into(), "m"),
            OracleError::Communication(msg) if msg.contains("boom")
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let request = OracleRequest::new(OracleStage::ClaimExtraction, "be precise", "Text: hi");
        let user_message = request.user_message();
        let body = ChatRequest {
            model: "m",
            messages: vec![
                ChatMessage { role: "system", content: &request.instructions },
                ChatMessage { role: "user", content: &user_message },
            ],
            temperature: 0.0,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], "be precise");
        assert_eq!(value["messages"][1]["content"], "Text: hi");
        assert_eq!(value["response_format"]["type"], "json_object");
    }

    // Integration test (requires network access and a valid key)
    #[tokio::test]
    #[ignore]
    async fn test_chat_invoke_integration() {
        let key = std::env::var("OPENROUTER_API_KEY").ok();
        let oracle = ChatCompletionsOracle::new(DEFAULT_ENDPOINT, DEFAULT_MODEL, key).unwrap();
        let request = OracleRequest::new(
            OracleStage::Counterfactual,
            "Reply with the JSON object {\"ok\": true} and nothing else.",
            "ping",
        );

        if let Ok(response) = oracle.invoke(&request).await {
            assert!(response.contains("ok"));
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_communication_error() {
        let oracle = ChatCompletionsOracle::new("http://localhost:9", "m", None).unwrap();
        let request = OracleRequest::new(OracleStage::ClaimExtraction, "i", "x");

        let result = oracle.invoke(&request).await;
        assert!(matches!(result, Err(OracleError::Communication(_)) | Err(OracleError::Timeout)));
    }
}
