//! Trope mapping stage

use crate::error::MappingError;
use crate::parser::parse_trope_match;
use crate::prompt::mapping_request;
use crate::retry::OracleCaller;
use tracing::debug;
use tropescope_domain::{ClaimRecord, RetrievedContext, TropeMatch};

/// Matches a claim against the closed trope set, grounded in retrieved context
#[derive(Clone)]
pub struct TropeMapper {
    caller: OracleCaller,
}

impl TropeMapper {
    /// Create a mapper
    pub fn new(caller: OracleCaller) -> Self {
        Self { caller }
    }

    /// Propose at most one trope, its strength and a rival reading
    pub async fn map_trope(&self, claim: &ClaimRecord, context: &RetrievedContext) -> Result<TropeMatch, MappingError> {
        let response = self.caller.call(&mapping_request(claim, context)).await?;
        let trope_match = parse_trope_match(&response)?;

        debug!(trope = %trope_match.trope(), strength = trope_match.strength(), "Mapped trope");
        Ok(trope_match)
    }
}
