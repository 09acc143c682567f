//! Claim module - the normalized form of an input text

use crate::trope::UnknownLabel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who or what a claim is aimed at
///
/// Vague subjects ("they", "the group") are never left unclassified: the
/// extractor must commit to one of these categories, falling back to
/// [`Target::Unclear`] when the referent genuinely cannot be inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The text names Jews, Jewish people or Jewish identity directly
    ExplicitJews,
    /// The text reaches Jews through coded language or proxies
    ImplicitJews,
    /// The text targets some other group or entity
    Other,
    /// The target cannot be determined
    Unclear,
}

impl Target {
    /// All target categories in declaration order
    pub const ALL: [Target; 4] = [
        Target::ExplicitJews,
        Target::ImplicitJews,
        Target::Other,
        Target::Unclear,
    ];

    /// Wire label for this category
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::ExplicitJews => "explicit_jews",
            Target::ImplicitJews => "implicit_jews",
            Target::Other => "other",
            Target::Unclear => "unclear",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Target::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// How directly identity is referenced in the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Explicitness {
    /// Direct, clear mention of identity or group
    Explicit,
    /// Indirect, coded or implied reference
    Implicit,
}

impl Explicitness {
    /// Wire label for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Explicitness::Explicit => "explicit",
            Explicitness::Implicit => "implicit",
        }
    }
}

impl fmt::Display for Explicitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Explicitness {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explicit" => Ok(Explicitness::Explicit),
            "implicit" => Ok(Explicitness::Implicit),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// A normalized claim extracted from raw input text
///
/// Created once by the claim extractor and consumed read-only by every later stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// The input text exactly as submitted
    pub raw_text: String,

    /// The main claim, restated
    pub extracted_claim: String,

    /// Inferred target category
    pub target: Target,

    /// How directly the target is referenced
    pub explicitness: Explicitness,
}

impl ClaimRecord {
    /// Create a new claim record
    pub fn new(
        raw_text: impl Into<String>,
        extracted_claim: impl Into<String>,
        target: Target,
        explicitness: Explicitness,
    ) -> Self {
        Self {
            raw_text: raw_text.into(),
            extracted_claim: extracted_claim.into(),
            target,
            explicitness,
        }
    }
}
