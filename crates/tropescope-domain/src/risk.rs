//! Risk results - the terminal artifact of the pipeline

use crate::claim::{ClaimRecord, Explicitness, Target};
use crate::counterfactual::CounterfactualResult;
use crate::trope::{TropeKind, TropeMatch};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Lower bound (inclusive) of the ambiguous band
pub const AMBIGUOUS_THRESHOLD: f64 = 0.3;

/// Lower bound (inclusive) of the high-risk band
pub const HIGH_THRESHOLD: f64 = 0.6;

/// Graded verdict derived from a risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Score below 0.3
    Low,
    /// Score in [0.3, 0.6)
    Ambiguous,
    /// Score of 0.6 or more
    High,
}

impl Verdict {
    /// Band a score. Lower bounds are inclusive, upper bounds exclusive.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            Verdict::High
        } else if score >= AMBIGUOUS_THRESHOLD {
            Verdict::Ambiguous
        } else {
            Verdict::Low
        }
    }

    /// Wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Low => "low",
            Verdict::Ambiguous => "ambiguous",
            Verdict::High => "high",
        }
    }

    /// Human-readable description
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Low => "Low-risk / non-identity-based",
            Verdict::Ambiguous => "Ambiguous — requires context",
            Verdict::High => "High-risk trope-based rhetoric",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage that may degrade instead of failing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedStage {
    /// Knowledge store query
    Retrieval,
    /// Trope classification
    TropeMapping,
    /// Counterfactual test
    Counterfactual,
}

impl fmt::Display for DegradedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DegradedStage::Retrieval => "retrieval",
            DegradedStage::TropeMapping => "trope_mapping",
            DegradedStage::Counterfactual => "counterfactual",
        })
    }
}

/// A soft failure absorbed into the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
    /// Stage that failed
    pub stage: DegradedStage,
    /// Cause, as reported by the stage
    pub reason: String,
}

impl Degradation {
    /// Record a soft failure
    pub fn new(stage: DegradedStage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

/// Confidence marker carried by every result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Every stage completed
    Normal,
    /// At least one stage degraded
    Low,
}

/// The classification of one input text
///
/// Immutable once built. Serializes to the public result shape:
/// `verdict`, `risk_score`, `trope`, `trope_strength`, `explanation`,
/// `reasoning` and a nested `details` object, followed by the
/// `confidence` / `degradations` markers.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskResult {
    risk_score: f64,
    verdict: Verdict,
    trope_match: TropeMatch,
    claim_record: ClaimRecord,
    counterfactual_result: CounterfactualResult,
    degradations: Vec<Degradation>,
}

impl RiskResult {
    /// Assemble a result from a score and the records it was derived from
    ///
    /// The verdict is derived from the score so the two can never disagree.
    pub fn new(
        risk_score: f64,
        trope_match: TropeMatch,
        claim_record: ClaimRecord,
        counterfactual_result: CounterfactualResult,
    ) -> Self {
        Self {
            risk_score,
            verdict: Verdict::from_score(risk_score),
            trope_match,
            claim_record,
            counterfactual_result,
            degradations: Vec::new(),
        }
    }

    /// Attach soft-failure markers
    pub fn with_degradations(mut self, degradations: Vec<Degradation>) -> Self {
        self.degradations = degradations;
        self
    }

    /// Final score in [0, 1]
    pub fn risk_score(&self) -> f64 {
        self.risk_score
    }

    /// Banded verdict
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Matched trope label
    pub fn trope(&self) -> TropeKind {
        self.trope_match.trope()
    }

    /// Strength of the trope match
    pub fn trope_strength(&self) -> f64 {
        self.trope_match.strength()
    }

    /// Non-identity-based interpretation offered by the trope mapper
    pub fn explanation(&self) -> &str {
        self.trope_match.alternative_interpretation()
    }

    /// Trope mapper's justification
    pub fn reasoning(&self) -> &str {
        self.trope_match.reasoning()
    }

    /// Full trope match
    pub fn trope_match(&self) -> &TropeMatch {
        &self.trope_match
    }

    /// The claim this result classifies
    pub fn claim_record(&self) -> &ClaimRecord {
        &self.claim_record
    }

    /// The counterfactual test outcome
    pub fn counterfactual_result(&self) -> &CounterfactualResult {
        &self.counterfactual_result
    }

    /// Soft failures absorbed while producing this result
    pub fn degradations(&self) -> &[Degradation] {
        &self.degradations
    }

    /// Whether any stage degraded
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    /// Confidence marker
    pub fn confidence(&self) -> Confidence {
        if self.is_degraded() {
            Confidence::Low
        } else {
            Confidence::Normal
        }
    }
}

#[derive(Serialize)]
struct RiskReport<'a> {
    verdict: Verdict,
    risk_score: f64,
    trope: TropeKind,
    trope_strength: f64,
    explanation: &'a str,
    reasoning: &'a str,
    details: RiskDetails<'a>,
    confidence: Confidence,
    degradations: &'a [Degradation],
}

#[derive(Serialize)]
struct RiskDetails<'a> {
    extracted_claim: &'a str,
    target: Target,
    explicitness: Explicitness,
    counterfactual: &'a str,
    meaning_preserved: bool,
    counterfactual_explanation: &'a str,
}

impl Serialize for RiskResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RiskReport {
            verdict: self.verdict,
            risk_score: self.risk_score,
            trope: self.trope(),
            trope_strength: self.trope_strength(),
            explanation: self.explanation(),
            reasoning: self.reasoning(),
            details: RiskDetails {
                extracted_claim: &self.claim_record.extracted_claim,
                target: self.claim_record.target,
                explicitness: self.claim_record.explicitness,
                counterfactual: &self.counterfactual_result.counterfactual_text,
                meaning_preserved: self.counterfactual_result.meaning_preserved,
                counterfactual_explanation: &self.counterfactual_result.explanation,
            },
            confidence: self.confidence(),
            degradations: &self.degradations,
        }
        .serialize(serializer)
    }
}
