//! Claim extraction stage

use crate::error::ExtractionError;
use crate::parser::parse_claim;
use crate::prompt::extraction_request;
use crate::retry::OracleCaller;
use tracing::debug;
use tropescope_domain::ClaimRecord;

/// Turns raw text into a normalized [`ClaimRecord`] with one oracle call
#[derive(Clone)]
pub struct ClaimExtractor {
    caller: OracleCaller,
}

impl ClaimExtractor {
    /// Create an extractor
    pub fn new(caller: OracleCaller) -> Self {
        Self { caller }
    }

    /// Extract the main claim, its target and its explicitness
    pub async fn extract(&self, raw_text: &str) -> Result<ClaimRecord, ExtractionError> {
        let response = self.caller.call(&extraction_request(raw_text)).await?;
        let claim = parse_claim(raw_text, &response)?;

        debug!(
            target_group = %claim.target,
            explicitness = %claim.explicitness,
            "Extracted claim"
        );

        Ok(claim)
    }
}
