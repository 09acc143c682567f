//! Oracle instructions and request builders for each stage

use tropescope_domain::{ClaimRecord, OracleRequest, OracleStage, RetrievedContext, TropeKind};

const EXTRACTION_INSTRUCTIONS: &str = r#"You are a linguistic analyst. Extract the main claim of a text and identify who it targets.

Be precise and neutral. Do not judge intent or harm; describe what is stated or implied.

Target categories:
- explicit_jews: the text names Jews, Jewish people or Jewish identity
- implicit_jews: the text uses coded language, proxies or tropes commonly aimed at Jews
- other: the text targets a different group or entity
- unclear: the target cannot be determined

Never leave the target empty. When the subject is a bare pronoun or a vague reference
("they", "the group", "those people"), decide which category the implied subject belongs to.

Explicitness:
- explicit: identity is mentioned directly
- implicit: identity is indirect, coded or implied

Respond with a single JSON object:
{"claim": string, "target": "explicit_jews" | "implicit_jews" | "other" | "unclear", "explicitness": "explicit" | "implicit"}"#;

const MAPPING_PREAMBLE: &str = r#"You are a contextual analyst who identifies antisemitic tropes.

Decide whether a claim resembles one of the known tropes below, grounding your judgement in the
reference material supplied with the claim. Choose at most one label and never invent new ones.
Always give a plausible interpretation that is not identity-based, and justify your choice by
pointing at the reference material.

Strength of resemblance:
- 0.0-0.2: none or very weak
- 0.3-0.5: some resemblance, ambiguous
- 0.6-0.8: strong resemblance with some ambiguity
- 0.9-1.0: clear match

If no trope fits, answer "none" with strength 0.0.

Labels:
"#;

const MAPPING_RESPONSE_FORMAT: &str = r#"
Respond with a single JSON object:
{"mapped_trope": <label>, "trope_strength": number, "alternative_interpretation": string, "reasoning": string}"#;

const COUNTERFACTUAL_INSTRUCTIONS: &str = r#"You test whether a claim depends on identity.

Rewrite the claim, replacing its identity-bearing subject (explicit or implied) with a neutral actor
such as "a group", "certain individuals" or "an institution". Keep every other part of the sentence.
Then compare the rewrite with the original.

- If the rewrite keeps the original meaning and force, the claim does not depend on identity.
- If meaning is lost or fundamentally changes, the claim depends on identity.

Examples:
- "They control the media" -> "A group controls the media": meaning preserved
- "The Rothschilds control banking" -> "A family controls banking": meaning changes when the family is a proxy

Respond with a single JSON object:
{"counterfactual_claim": string, "meaning_preserved": boolean, "explanation": string}"#;

/// One-line gloss of a trope label, shown to the oracle
fn trope_gloss(trope: TropeKind) -> &'static str {
    match trope {
        TropeKind::EliteControl => "Jews controlling institutions such as media, finance or government",
        TropeKind::DualLoyalty => "divided allegiance between a country and Israel or other Jews",
        TropeKind::CollectiveGuilt => "holding all Jews responsible for individuals or for Israel",
        TropeKind::FinancialConspiracy => "secret manipulation of money and markets",
        TropeKind::BloodLibel => "accusations of ritual harm or violence",
        TropeKind::HolocaustDenial => "denial, minimization or distortion of the Holocaust",
        TropeKind::ProxyFigures => "individuals used as stand-ins for a wider conspiracy",
        TropeKind::Dogwhistle => "coded language with an antisemitic meaning",
        TropeKind::ReligiousDemonization => "framing Jews or Judaism as evil or satanic",
        TropeKind::Deicide => "collective, inherited guilt for the death of Jesus",
        TropeKind::None => "no trope matches",
    }
}

/// Trope mapping instructions, listing every label of the closed set
pub fn mapping_instructions() -> String {
    let mut instructions = String::from(MAPPING_PREAMBLE);
    for trope in TropeKind::TROPES.iter().chain(std::iter::once(&TropeKind::None)) {
        instructions.push_str(&format!("- {}: {}\n", trope.as_str(), trope_gloss(*trope)));
    }
    instructions.push_str(MAPPING_RESPONSE_FORMAT);
    instructions
}

/// Request for the claim extraction stage
pub fn extraction_request(text: &str) -> OracleRequest {
    OracleRequest::new(
        OracleStage::ClaimExtraction,
        EXTRACTION_INSTRUCTIONS,
        format!("Text:\n\"{}\"", text),
    )
}

/// Request for the trope mapping stage, carrying the retrieved documents as context
pub fn mapping_request(claim: &ClaimRecord, context: &RetrievedContext) -> OracleRequest {
    let mut input = format!("Claim:\n\"{}\"", claim.extracted_claim);
    if context.is_empty() {
        input.push_str("\n\nNo reference material was retrieved; rely on the label descriptions.");
    }

    OracleRequest::new(OracleStage::TropeMapping, mapping_instructions(), input).with_context(context.texts())
}

/// Request for the counterfactual stage
pub fn counterfactual_request(claim: &ClaimRecord) -> OracleRequest {
    OracleRequest::new(
        OracleStage::Counterfactual,
        COUNTERFACTUAL_INSTRUCTIONS,
        format!("Original claim:\n\"{}\"", claim.extracted_claim),
    )
}
