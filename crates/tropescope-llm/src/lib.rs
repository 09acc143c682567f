//! Tropescope Oracle Layer
//!
//! Implementations of the `ReasoningOracle` trait from `tropescope-domain`.
//!
//! # Providers
//!
//! - `MockOracle`: Deterministic, scriptable oracle for testing
//! - `ChatCompletionsOracle`: OpenAI-compatible chat completions API (OpenAI, OpenRouter, ...)
//! - `OllamaOracle`: Local Ollama API integration
//!
//! Providers make exactly one HTTP call per `invoke`. Retries, backoff and
//! per-stage timeouts are applied by the pipeline, not here.
//!
//! # Examples
//!
//! ```
//! use tropescope_llm::MockOracle;
//! use tropescope_domain::{OracleRequest, OracleStage, ReasoningOracle};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let oracle = MockOracle::new();
//! oracle.add_response(OracleStage::Counterfactual, r#"{"meaning_preserved": true}"#);
//!
//! let request = OracleRequest::new(OracleStage::Counterfactual, "instructions", "claim");
//! let response = oracle.invoke(&request).await.unwrap();
//! assert!(response.contains("meaning_preserved"));
//! assert_eq!(oracle.call_count(), 1);
//! # }
//! ```

#![warn(missing_docs)]

pub mod chat;
pub mod config;
pub mod ollama;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tropescope_domain::{OracleError, OracleRequest, OracleStage, ReasoningOracle};

pub use chat::ChatCompletionsOracle;
pub use config::{OracleBackend, OracleConfig};
pub use ollama::OllamaOracle;

#[derive(Debug, Clone)]
enum Scripted {
    Respond(String),
    Fail(OracleError),
}

#[derive(Debug, Default)]
struct MockState {
    stage_defaults: HashMap<OracleStage, Scripted>,
    by_input: Vec<(OracleStage, String, Scripted)>,
    transient: HashMap<OracleStage, (usize, OracleError)>,
    delays: Vec<(String, Duration)>,
    requests: Vec<OracleRequest>,
}

/// Mock oracle for deterministic testing
///
/// Responses are scripted per stage, optionally overridden for requests whose
/// input contains a given pattern. Clones share state, so a test can hand one
/// clone to the pipeline and inspect call counts through another.
///
/// # Examples
///
/// ```
/// use tropescope_llm::MockOracle;
/// use tropescope_domain::{OracleError, OracleStage};
///
/// let oracle = MockOracle::new();
/// oracle.add_response(OracleStage::ClaimExtraction, "{}");
/// oracle.add_input_error(OracleStage::ClaimExtraction, "poison", OracleError::Timeout);
/// oracle.add_transient_errors(OracleStage::TropeMapping, 2, OracleError::RateLimited);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    state: Arc<Mutex<MockState>>,
}

impl MockOracle {
    /// Create a mock with nothing scripted
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Default response for every request from `stage`
    pub fn add_response(&self, stage: OracleStage, response: impl Into<String>) {
        self.state()
            .stage_defaults
            .insert(stage, Scripted::Respond(response.into()));
    }

    /// Default failure for every request from `stage`
    pub fn add_error(&self, stage: OracleStage, error: OracleError) {
        self.state().stage_defaults.insert(stage, Scripted::Fail(error));
    }

    /// Response for requests from `stage` whose input contains `pattern`
    ///
    /// Input-specific scripts take precedence over stage defaults; the first
    /// matching pattern wins.
    pub fn add_input_response(&self, stage: OracleStage, pattern: impl Into<String>, response: impl Into<String>) {
        self.state()
            .by_input
            .push((stage, pattern.into(), Scripted::Respond(response.into())));
    }

    /// Failure for requests from `stage` whose input contains `pattern`
    pub fn add_input_error(&self, stage: OracleStage, pattern: impl Into<String>, error: OracleError) {
        self.state()
            .by_input
            .push((stage, pattern.into(), Scripted::Fail(error)));
    }

    /// Fail the next `times` requests from `stage`, then fall back to the script
    pub fn add_transient_errors(&self, stage: OracleStage, times: usize, error: OracleError) {
        self.state().transient.insert(stage, (times, error));
    }

    /// Delay requests whose input contains `pattern`
    pub fn add_delay(&self, pattern: impl Into<String>, delay: Duration) {
        self.state().delays.push((pattern.into(), delay));
    }

    /// Total number of `invoke` calls
    pub fn call_count(&self) -> usize {
        self.state().requests.len()
    }

    /// Number of `invoke` calls issued by `stage`
    pub fn calls_for(&self, stage: OracleStage) -> usize {
        self.state().requests.iter().filter(|r| r.stage == stage).count()
    }

    /// Every request received, in arrival order
    pub fn requests(&self) -> Vec<OracleRequest> {
        self.state().requests.clone()
    }

    /// Forget recorded requests
    pub fn reset_call_count(&self) {
        self.state().requests.clear();
    }

    fn script_for(&self, request: &OracleRequest) -> (Option<Duration>, Scripted) {
        let mut state = self.state();
        state.requests.push(request.clone());

        let delay = state
            .delays
            .iter()
            .find(|(pattern, _)| request.input.contains(pattern.as_str()))
            .map(|(_, delay)| *delay);

        if let Some((remaining, error)) = state.transient.get_mut(&request.stage) {
            if *remaining > 0 {
                *remaining -= 1;
                return (delay, Scripted::Fail(error.clone()));
            }
        }

        let scripted = state
            .by_input
            .iter()
            .find(|(stage, pattern, _)| *stage == request.stage && request.input.contains(pattern.as_str()))
            .map(|(_, _, scripted)| scripted.clone())
            .or_else(|| state.stage_defaults.get(&request.stage).cloned())
            .unwrap_or_else(|| {
                Scripted::Fail(OracleError::InvalidResponse(format!(
                    "no scripted response for stage {}",
                    request.stage
                )))
            });

        (delay, scripted)
    }
}

#[async_trait]
impl ReasoningOracle for MockOracle {
    async fn invoke(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let (delay, scripted) = self.script_for(request);

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match scripted {
            Scripted::Respond(response) => Ok(response),
            Scripted::Fail(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(stage: OracleStage, input: &str) -> OracleRequest {
        OracleRequest::new(stage, "instructions", input)
    }

    #[tokio::test]
    async fn test_mock_stage_default() {
        let oracle = MockOracle::new();
        oracle.add_response(OracleStage::ClaimExtraction, "extracted");

        let result = oracle.invoke(&request(OracleStage::ClaimExtraction, "anything")).await;
        assert_eq!(result.unwrap(), "extracted");
    }

    #[tokio::test]
    async fn test_mock_input_override() {
        let oracle = MockOracle::new();
        oracle.add_response(OracleStage::TropeMapping, "default");
        oracle.add_input_response(OracleStage::TropeMapping, "banks", "special");

        let special = oracle.invoke(&request(OracleStage::TropeMapping, "they own the banks")).await;
        let default = oracle.invoke(&request(OracleStage::TropeMapping, "nice weather")).await;

        assert_eq!(special.unwrap(), "special");
        assert_eq!(default.unwrap(), "default");
    }

    #[tokio::test]
    async fn test_mock_unscripted_stage_fails() {
        let oracle = MockOracle::new();
        let result = oracle.invoke(&request(OracleStage::Counterfactual, "x")).await;
        assert!(matches!(result, Err(OracleError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_mock_call_counts() {
        let oracle = MockOracle::new();
        oracle.add_response(OracleStage::ClaimExtraction, "a");
        oracle.add_response(OracleStage::Counterfactual, "b");

        assert_eq!(oracle.call_count(), 0);

        oracle.invoke(&request(OracleStage::ClaimExtraction, "1")).await.unwrap();
        oracle.invoke(&request(OracleStage::Counterfactual, "2")).await.unwrap();
        oracle.invoke(&request(OracleStage::Counterfactual, "3")).await.unwrap();

        assert_eq!(oracle.call_count(), 3);
        assert_eq!(oracle.calls_for(OracleStage::Counterfactual), 2);
        assert_eq!(oracle.requests()[0].input, "1");

        oracle.reset_call_count();
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_transient_errors_then_recover() {
        let oracle = MockOracle::new();
        oracle.add_response(OracleStage::TropeMapping, "ok");
        oracle.add_transient_errors(OracleStage::TropeMapping, 2, OracleError::RateLimited);

        let req = request(OracleStage::TropeMapping, "claim");
        assert_eq!(oracle.invoke(&req).await, Err(OracleError::RateLimited));
        assert_eq!(oracle.invoke(&req).await, Err(OracleError::RateLimited));
        assert_eq!(oracle.invoke(&req).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_mock_clone_shares_state() {
        let oracle1 = MockOracle::new();
        oracle1.add_response(OracleStage::ClaimExtraction, "x");
        let oracle2 = oracle1.clone();

        oracle2.invoke(&request(OracleStage::ClaimExtraction, "in")).await.unwrap();

        assert_eq!(oracle1.call_count(), 1);
        assert_eq!(oracle2.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_delay_applies_to_matching_input() {
        let oracle = MockOracle::new();
        oracle.add_response(OracleStage::ClaimExtraction, "x");
        oracle.add_delay("slow", Duration::from_secs(5));

        let start = tokio::time::Instant::now();
        oracle.invoke(&request(OracleStage::ClaimExtraction, "fast one")).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));

        oracle.invoke(&request(OracleStage::ClaimExtraction, "slow one")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
