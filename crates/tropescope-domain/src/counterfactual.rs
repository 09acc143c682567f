//! Counterfactual identity-dependence result

use serde::{Deserialize, Serialize};

/// Outcome of rewriting a claim with a neutral actor
///
/// `meaning_preserved == true` means the claim keeps its force without the
/// identity reference; `false` means the claim depends on identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualResult {
    /// The claim with its identity-bearing subject replaced
    pub counterfactual_text: String,

    /// Whether the rewritten claim means the same thing
    pub meaning_preserved: bool,

    /// Why meaning is or is not preserved
    pub explanation: String,
}

impl CounterfactualResult {
    /// Create a counterfactual result
    pub fn new(
        counterfactual_text: impl Into<String>,
        meaning_preserved: bool,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            counterfactual_text: counterfactual_text.into(),
            meaning_preserved,
            explanation: explanation.into(),
        }
    }

    /// Result used when the test could not be run
    ///
    /// Fails toward caution: an untested claim is treated as identity-dependent.
    pub fn undetermined(reason: impl Into<String>) -> Self {
        Self {
            counterfactual_text: String::new(),
            meaning_preserved: false,
            explanation: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undetermined_fails_toward_caution() {
        let result = CounterfactualResult::undetermined("oracle unavailable");
        assert!(!result.meaning_preserved);
        assert!(result.counterfactual_text.is_empty());
        assert_eq!(result.explanation, "oracle unavailable");
    }
}
