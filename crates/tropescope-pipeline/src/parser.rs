//! Parse oracle output into validated stage records

use crate::error::SchemaError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tropescope_domain::{ClaimRecord, CounterfactualResult, Explicitness, Target, TropeKind, TropeMatch};

/// Extract the JSON object from a response
///
/// Oracles sometimes wrap JSON in markdown code blocks or surround it with
/// prose. The span from the first `{` to the last `}` is taken as the object.
pub fn extract_json(response: &str) -> Result<&str, SchemaError> {
    let start = response.find('{').ok_or(SchemaError::NoJsonObject)?;
    let end = response.rfind('}').ok_or(SchemaError::NoJsonObject)?;
    if end < start {
        return Err(SchemaError::NoJsonObject);
    }
    Ok(&response[start..=end])
}

fn parse_object<T: DeserializeOwned>(response: &str) -> Result<T, SchemaError> {
    let json = extract_json(response)?;
    Ok(serde_json::from_str(json)?)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Deserialize)]
struct RawClaim {
    claim: Option<String>,
    target: Option<String>,
    explicitness: Option<String>,
}

#[derive(Deserialize)]
struct RawTropeMatch {
    #[serde(alias = "trope")]
    mapped_trope: Option<String>,
    #[serde(alias = "strength")]
    trope_strength: Option<f64>,
    alternative_interpretation: Option<String>,
    reasoning: Option<String>,
}

#[derive(Deserialize)]
struct RawCounterfactual {
    #[serde(alias = "counterfactual_text")]
    counterfactual_claim: Option<String>,
    meaning_preserved: Option<bool>,
    explanation: Option<String>,
}

/// Parse a claim extraction response
///
/// A null or absent target means the oracle could not tell, and becomes
/// `unclear`; any other unknown label is rejected.
pub fn parse_claim(raw_text: &str, response: &str) -> Result<ClaimRecord, SchemaError> {
    let raw: RawClaim = parse_object(response)?;

    let claim = non_blank(raw.claim).ok_or(SchemaError::MissingField("claim"))?;

    let target = match non_blank(raw.target) {
        None => Target::Unclear,
        Some(label) => label.parse().map_err(|_| SchemaError::InvalidValue {
            field: "target",
            value: label,
        })?,
    };

    let explicitness_label = non_blank(raw.explicitness).ok_or(SchemaError::MissingField("explicitness"))?;
    let explicitness: Explicitness = explicitness_label.parse().map_err(|_| SchemaError::InvalidValue {
        field: "explicitness",
        value: explicitness_label,
    })?;

    Ok(ClaimRecord::new(raw_text, claim, target, explicitness))
}

/// Parse a trope mapping response
///
/// The label must belong to the closed set. Strength must lie in [0, 1];
/// a `none` label needs no strength and any strength it carries is dropped.
pub fn parse_trope_match(response: &str) -> Result<TropeMatch, SchemaError> {
    let raw: RawTropeMatch = parse_object(response)?;

    let label = non_blank(raw.mapped_trope).ok_or(SchemaError::MissingField("mapped_trope"))?;
    let trope: TropeKind = label.parse().map_err(|_| SchemaError::InvalidValue {
        field: "mapped_trope",
        value: label,
    })?;

    let strength = match raw.trope_strength {
        Some(strength) if !(0.0..=1.0).contains(&strength) => {
            return Err(SchemaError::OutOfRange {
                field: "trope_strength",
                value: strength,
            })
        }
        Some(strength) => strength,
        None if trope.is_none() => 0.0,
        None => return Err(SchemaError::MissingField("trope_strength")),
    };

    Ok(TropeMatch::new(
        trope,
        strength,
        raw.alternative_interpretation.unwrap_or_default(),
        raw.reasoning.unwrap_or_default(),
    ))
}

/// Parse a counterfactual response; `meaning_preserved` is required
pub fn parse_counterfactual(response: &str) -> Result<CounterfactualResult, SchemaError> {
    let raw: RawCounterfactual = parse_object(response)?;

    let meaning_preserved = raw
        .meaning_preserved
        .ok_or(SchemaError::MissingField("meaning_preserved"))?;

    Ok(CounterfactualResult::new(
        raw.counterfactual_claim.unwrap_or_default(),
        meaning_preserved,
        raw.explanation.unwrap_or_default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json).unwrap(), json);
    }

    #[test]
    fn test_extract_json_from_markdown() {
        let response = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response).unwrap(), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_extract_json_surrounded_by_prose() {
        let response = "Sure! Here is the analysis: {\"a\": {\"b\": 1}} Hope this helps.";
        assert_eq!(extract_json(response).unwrap(), r#"{"a": {"b": 1}}"#);
    }

    #[test]
    fn test_extract_json_without_object() {
        assert_eq!(extract_json("This is not JSON"), Err(SchemaError::NoJsonObject));
        assert_eq!(extract_json("} backwards {"), Err(SchemaError::NoJsonObject));
    }

    #[test]
    fn test_parse_claim_valid() {
        let response = r#"{"claim": "Jews control the media", "target": "explicit_jews", "explicitness": "explicit"}"#;
        let claim = parse_claim("Jews control the media!!", response).unwrap();

        assert_eq!(claim.raw_text, "Jews control the media!!");
        assert_eq!(claim.extracted_claim, "Jews control the media");
        assert_eq!(claim.target, Target::ExplicitJews);
        assert_eq!(claim.explicitness, Explicitness::Explicit);
    }

    #[test]
    fn test_parse_claim_null_target_is_unclear() {
        let response = r#"{"claim": "They run everything", "target": null, "explicitness": "implicit"}"#;
        let claim = parse_claim("They run everything", response).unwrap();
        assert_eq!(claim.target, Target::Unclear);
    }

    #[test]
    fn test_parse_claim_rejects_unknown_target() {
        let response = r#"{"claim": "x", "target": "martians", "explicitness": "implicit"}"#;
        assert!(matches!(
            parse_claim("x", response),
            Err(SchemaError::InvalidValue { field: "target", .. })
        ));
    }

    #[test]
    fn test_parse_claim_missing_fields() {
        assert_eq!(
            parse_claim("x", r#"{"target": "other", "explicitness": "explicit"}"#),
            Err(SchemaError::MissingField("claim"))
        );
        assert_eq!(
            parse_claim("x", r#"{"claim": "  ", "target": "other", "explicitness": "explicit"}"#),
            Err(SchemaError::MissingField("claim"))
        );
        assert_eq!(
            parse_claim("x", r#"{"claim": "c", "target": "other"}"#),
            Err(SchemaError::MissingField("explicitness"))
        );
    }

    #[test]
    fn test_parse_claim_wrong_type_is_json_error() {
        let response = r#"{"claim": 42, "target": "other", "explicitness": "explicit"}"#;
        assert!(matches!(parse_claim("x", response), Err(SchemaError::Json(_))));
    }

    #[test]
    fn test_parse_trope_match_valid() {
        let response = r#"```json
{
    "mapped_trope": "dual_loyalty",
    "trope_strength": 0.8,
    "alternative_interpretation": "Criticism of a lobbying group",
    "reasoning": "Matches the dual loyalty definition"
}
```"#;
        let trope_match = parse_trope_match(response).unwrap();

        assert_eq!(trope_match.trope(), TropeKind::DualLoyalty);
        assert_eq!(trope_match.strength(), 0.8);
        assert_eq!(trope_match.alternative_interpretation(), "Criticism of a lobbying group");
    }

    #[test]
    fn test_parse_trope_match_accepts_short_field_names() {
        let trope_match = parse_trope_match(r#"{"trope": "deicide", "strength": 0.5}"#).unwrap();
        assert_eq!(trope_match.trope(), TropeKind::Deicide);
        assert_eq!(trope_match.reasoning(), "");
    }

    #[test]
    fn test_parse_trope_match_none_normalizes_strength() {
        let trope_match = parse_trope_match(r#"{"mapped_trope": "none", "trope_strength": 0.4}"#).unwrap();
        assert_eq!(trope_match.trope(), TropeKind::None);
        assert_eq!(trope_match.strength(), 0.0);

        let without_strength = parse_trope_match(r#"{"mapped_trope": "none"}"#).unwrap();
        assert_eq!(without_strength.strength(), 0.0);
    }

    #[test]
    fn test_parse_trope_match_rejects_invented_label() {
        let result = parse_trope_match(r#"{"mapped_trope": "space_lasers", "trope_strength": 0.9}"#);
        assert!(matches!(result, Err(SchemaError::InvalidValue { field: "mapped_trope", .. })));
    }

    #[test]
    fn test_parse_trope_match_strength_out_of_range() {
        let result = parse_trope_match(r#"{"mapped_trope": "elite_control", "trope_strength": 1.5}"#);
        assert_eq!(
            result,
            Err(SchemaError::OutOfRange {
                field: "trope_strength",
                value: 1.5
            })
        );
    }

    #[test]
    fn test_parse_trope_match_missing_strength() {
        let result = parse_trope_match(r#"{"mapped_trope": "elite_control"}"#);
        assert_eq!(result, Err(SchemaError::MissingField("trope_strength")));
    }

    #[test]
    fn test_parse_counterfactual_valid() {
        let response = r#"{"counterfactual_claim": "A group controls the media", "meaning_preserved": true, "explanation": "Same force"}"#;
        let result = parse_counterfactual(response).unwrap();

        assert_eq!(result.counterfactual_text, "A group controls the media");
        assert!(result.meaning_preserved);
        assert_eq!(result.explanation, "Same force");
    }

    #[test]
    fn test_parse_counterfactual_requires_verdict() {
        let result = parse_counterfactual(r#"{"counterfactual_claim": "A group did it"}"#);
        assert_eq!(result, Err(SchemaError::MissingField("meaning_preserved")));

        let result = parse_counterfactual(r#"{"meaning_preserved": "yes"}"#);
        assert!(matches!(result, Err(SchemaError::Json(_))));
    }
}
