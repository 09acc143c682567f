//! Counterfactual identity-dependence stage

use crate::error::CounterfactualError;
use crate::parser::parse_counterfactual;
use crate::prompt::counterfactual_request;
use crate::retry::OracleCaller;
use tracing::debug;
use tropescope_domain::{ClaimRecord, CounterfactualResult};

/// Rewrites a claim with a neutral actor and judges whether meaning survives
///
/// Depends only on the claim, so it runs alongside retrieval and mapping.
#[derive(Clone)]
pub struct CounterfactualTester {
    caller: OracleCaller,
}

impl CounterfactualTester {
    /// Create a tester
    pub fn new(caller: OracleCaller) -> Self {
        Self { caller }
    }

    /// Test whether the claim's force depends on identity
    pub async fn test_counterfactual(&self, claim: &ClaimRecord) -> Result<CounterfactualResult, CounterfactualError> {
        let response = self.caller.call(&counterfactual_request(claim)).await?;
        let result = parse_counterfactual(&response)?;

        debug!(meaning_preserved = result.meaning_preserved, "Counterfactual tested");
        Ok(result)
    }
}
