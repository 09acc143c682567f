//! Trope labels and trope matches

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A label outside the closed set was encountered
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown label: {0:?}")]
pub struct UnknownLabel(pub String);

/// The closed set of recognized rhetorical patterns, plus `None`
///
/// The oracle may only choose from these labels. Anything else is rejected
/// rather than coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TropeKind {
    /// Claims of control over media, finance or government
    EliteControl,
    /// Claims of divided allegiance
    DualLoyalty,
    /// Holding a whole people responsible for individuals or a state
    CollectiveGuilt,
    /// Financial manipulation conspiracies
    FinancialConspiracy,
    /// Accusations of ritual harm or violence
    BloodLibel,
    /// Denial, minimization or distortion of the Holocaust
    HolocaustDenial,
    /// Individuals used as stand-ins for a wider conspiracy
    ProxyFigures,
    /// Coded language carrying a hidden meaning
    Dogwhistle,
    /// Framing as evil, satanic or cursed
    ReligiousDemonization,
    /// Collective blame for the death of Jesus
    Deicide,
    /// No trope matched
    None,
}

impl TropeKind {
    /// The ten trope labels, excluding `None`
    pub const TROPES: [TropeKind; 10] = [
        TropeKind::EliteControl,
        TropeKind::DualLoyalty,
        TropeKind::CollectiveGuilt,
        TropeKind::FinancialConspiracy,
        TropeKind::BloodLibel,
        TropeKind::HolocaustDenial,
        TropeKind::ProxyFigures,
        TropeKind::Dogwhistle,
        TropeKind::ReligiousDemonization,
        TropeKind::Deicide,
    ];

    /// Wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            TropeKind::EliteControl => "elite_control",
            TropeKind::DualLoyalty => "dual_loyalty",
            TropeKind::CollectiveGuilt => "collective_guilt",
            TropeKind::FinancialConspiracy => "financial_conspiracy",
            TropeKind::BloodLibel => "blood_libel",
            TropeKind::HolocaustDenial => "holocaust_denial",
            TropeKind::ProxyFigures => "proxy_figures",
            TropeKind::Dogwhistle => "dogwhistle",
            TropeKind::ReligiousDemonization => "religious_demonization",
            TropeKind::Deicide => "deicide",
            TropeKind::None => "none",
        }
    }

    /// Whether this is the `None` label
    pub fn is_none(&self) -> bool {
        matches!(self, TropeKind::None)
    }
}

impl fmt::Display for TropeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TropeKind {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if normalized == "none" {
            return Ok(TropeKind::None);
        }
        TropeKind::TROPES
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// The trope a claim most resembles
///
/// Invariant: `trope == None` implies `strength == 0`. The constructor
/// enforces it, so a `TropeMatch` can never violate it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TropeMatch {
    trope: TropeKind,
    strength: f64,
    alternative_interpretation: String,
    reasoning: String,
}

impl TropeMatch {
    /// Create a trope match
    ///
    /// Strength is clamped to [0, 1] and forced to 0 for `TropeKind::None`.
    pub fn new(
        trope: TropeKind,
        strength: f64,
        alternative_interpretation: impl Into<String>,
        reasoning: impl Into<String>,
    ) -> Self {
        let strength = if trope.is_none() || strength.is_nan() {
            0.0
        } else {
            strength.clamp(0.0, 1.0)
        };

        Self {
            trope,
            strength,
            alternative_interpretation: alternative_interpretation.into(),
            reasoning: reasoning.into(),
        }
    }

    /// A match with no trope
    pub fn none(alternative_interpretation: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self::new(TropeKind::None, 0.0, alternative_interpretation, reasoning)
    }

    /// Matched trope label
    pub fn trope(&self) -> TropeKind {
        self.trope
    }

    /// Strength of resemblance in [0, 1]
    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// A rival reading that does not depend on identity
    pub fn alternative_interpretation(&self) -> &str {
        &self.alternative_interpretation
    }

    /// Justification for the match
    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }
}
