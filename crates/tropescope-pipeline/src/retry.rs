//! Bounded retry with exponential backoff around oracle calls

use crate::config::RetryConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use tropescope_domain::{OracleError, OracleRequest, ReasoningOracle};

/// Calls the oracle under a per-attempt timeout and the retry policy
///
/// Shared by every stage that talks to the oracle.
#[derive(Clone)]
pub struct OracleCaller {
    oracle: Arc<dyn ReasoningOracle>,
    retry: RetryConfig,
    attempt_timeout: Duration,
}

impl OracleCaller {
    /// Create a caller
    pub fn new(oracle: Arc<dyn ReasoningOracle>, retry: RetryConfig, attempt_timeout: Duration) -> Self {
        Self {
            oracle,
            retry,
            attempt_timeout,
        }
    }

    /// Send `request`, retrying rate-limit and timeout failures
    ///
    /// An attempt that exceeds the timeout counts as `OracleError::Timeout`.
    pub async fn call(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let max_retries = self.retry.effective_retries();
        let mut retry = 0;

        loop {
            let outcome = tokio::time::timeout(self.attempt_timeout, self.oracle.invoke(request))
                .await
                .unwrap_or(Err(OracleError::Timeout));

            match outcome {
                Ok(response) => {
                    debug!(stage = %request.stage, attempts = retry + 1, "Oracle call succeeded");
                    return Ok(response);
                }
                Err(e) if e.is_retryable() && retry < max_retries => {
                    let delay = self.retry.backoff(retry);
                    warn!(
                        stage = %request.stage,
                        error = %e,
                        retry = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Oracle call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
