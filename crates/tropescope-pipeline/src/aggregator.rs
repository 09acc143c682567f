//! Risk aggregation
//!
//! Pure scoring: no oracle call, no failure path.
//!
//! ```text
//! score = min(1, strength × counterfactual × target × explicitness)
//! ```
//!
//! | factor         | value                                              |
//! |----------------|----------------------------------------------------|
//! | counterfactual | 0.3 if meaning preserved, else 1.0                 |
//! | target         | 1.2 explicit_jews, 1.0 implicit_jews, 0.8 otherwise |
//! | explicitness   | 1.1 explicit, 1.0 implicit                         |
//!
//! A trope of `none` scores 0 whatever the factors.

use tropescope_domain::{ClaimRecord, CounterfactualResult, Explicitness, RiskResult, Target, TropeMatch};

/// Multiplier from the counterfactual test
pub fn counterfactual_multiplier(counterfactual: &CounterfactualResult) -> f64 {
    if counterfactual.meaning_preserved {
        0.3
    } else {
        1.0
    }
}

/// Multiplier from the claim's target
pub fn target_multiplier(target: Target) -> f64 {
    match target {
        Target::ExplicitJews => 1.2,
        Target::ImplicitJews => 1.0,
        Target::Other | Target::Unclear => 0.8,
    }
}

/// Multiplier from the claim's explicitness
pub fn explicitness_multiplier(explicitness: Explicitness) -> f64 {
    match explicitness {
        Explicitness::Explicit => 1.1,
        Explicitness::Implicit => 1.0,
    }
}

/// Scalar risk in [0, 1]
pub fn risk_score(claim: &ClaimRecord, trope_match: &TropeMatch, counterfactual: &CounterfactualResult) -> f64 {
    if trope_match.trope().is_none() {
        return 0.0;
    }

    let score = trope_match.strength()
        * counterfactual_multiplier(counterfactual)
        * target_multiplier(claim.target)
        * explicitness_multiplier(claim.explicitness);

    score.min(1.0)
}

/// Combine the stage records into the final result
pub fn aggregate(claim: ClaimRecord, trope_match: TropeMatch, counterfactual: CounterfactualResult) -> RiskResult {
    let score = risk_score(&claim, &trope_match, &counterfactual);
    RiskResult::new(score, trope_match, claim, counterfactual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tropescope_domain::{TropeKind, Verdict};

    fn claim(target: Target, explicitness: Explicitness) -> ClaimRecord {
        ClaimRecord::new("raw", "claim", target, explicitness)
    }

    fn counterfactual(meaning_preserved: bool) -> CounterfactualResult {
        CounterfactualResult::new("rewrite", meaning_preserved, "why")
    }

    #[test]
    fn test_high_risk_scenario() {
        let result = aggregate(
            claim(Target::ExplicitJews, Explicitness::Explicit),
            TropeMatch::new(TropeKind::EliteControl, 0.7, "alt", "reason"),
            counterfactual(false),
        );

        assert!((result.risk_score() - 0.924).abs() < 1e-9);
        assert_eq!(result.verdict(), Verdict::High);
    }

    #[test]
    fn test_low_risk_scenario() {
        let result = aggregate(
            claim(Target::Other, Explicitness::Implicit),
            TropeMatch::new(TropeKind::Dogwhistle, 0.3, "alt", "reason"),
            counterfactual(true),
        );

        assert!((result.risk_score() - 0.072).abs() < 1e-9);
        assert_eq!(result.verdict(), Verdict::Low);
    }

    #[test]
    fn test_none_trope_scores_zero() {
        let result = aggregate(
            claim(Target::ExplicitJews, Explicitness::Explicit),
            TropeMatch::none("alt", "reason"),
            counterfactual(false),
        );

        assert_eq!(result.risk_score(), 0.0);
        assert_eq!(result.verdict(), Verdict::Low);
    }

    #[test]
    fn test_score_capped_at_one() {
        let result = aggregate(
            claim(Target::ExplicitJews, Explicitness::Explicit),
            TropeMatch::new(TropeKind::BloodLibel, 1.0, "", ""),
            counterfactual(false),
        );
        assert_eq!(result.risk_score(), 1.0);
    }

    #[test]
    fn test_verdict_boundaries() {
        let high = aggregate(
            claim(Target::ImplicitJews, Explicitness::Implicit),
            TropeMatch::new(TropeKind::EliteControl, 0.6, "", ""),
            counterfactual(false),
        );
        assert_eq!(high.risk_score(), 0.6);
        assert_eq!(high.verdict(), Verdict::High);

        let ambiguous = aggregate(
            claim(Target::ImplicitJews, Explicitness::Implicit),
            TropeMatch::new(TropeKind::EliteControl, 0.3, "", ""),
            counterfactual(false),
        );
        assert_eq!(ambiguous.risk_score(), 0.3);
        assert_eq!(ambiguous.verdict(), Verdict::Ambiguous);
    }

    fn any_target() -> impl Strategy<Value = Target> {
        prop::sample::select(Target::ALL.to_vec())
    }

    fn any_explicitness() -> impl Strategy<Value = Explicitness> {
        prop_oneof![Just(Explicitness::Explicit), Just(Explicitness::Implicit)]
    }

    proptest! {
        #[test]
        fn prop_score_in_unit_interval(
            strength in 0.0f64..=1.0,
            preserved in any::<bool>(),
            target in any_target(),
            explicitness in any_explicitness(),
        ) {
            let score = risk_score(
                &claim(target, explicitness),
                &TropeMatch::new(TropeKind::FinancialConspiracy, strength, "", ""),
                &counterfactual(preserved),
            );
            prop_assert!((0.0..=1.0).contains(&score));
        }

        #[test]
        fn prop_preserved_meaning_scores_strictly_lower(
            strength in 0.01f64..=1.0,
            target in any_target(),
            explicitness in any_explicitness(),
        ) {
            let c = claim(target, explicitness);
            let m = TropeMatch::new(TropeKind::ProxyFigures, strength, "", "");
            let preserved = risk_score(&c, &m, &counterfactual(true));
            let dependent = risk_score(&c, &m, &counterfactual(false));
            prop_assert!(preserved < dependent);
        }

        #[test]
        fn prop_none_always_zero(
            preserved in any::<bool>(),
            target in any_target(),
            explicitness in any_explicitness(),
        ) {
            let score = risk_score(
                &claim(target, explicitness),
                &TropeMatch::none("", ""),
                &counterfactual(preserved),
            );
            prop_assert_eq!(score, 0.0);
        }

        #[test]
        fn prop_verdict_matches_score(
            strength in 0.0f64..=1.0,
            preserved in any::<bool>(),
            target in any_target(),
            explicitness in any_explicitness(),
        ) {
            let result = aggregate(
                claim(target, explicitness),
                TropeMatch::new(TropeKind::HolocaustDenial, strength, "", ""),
                counterfactual(preserved),
            );
            prop_assert_eq!(result.verdict(), Verdict::from_score(result.risk_score()));
        }
    }
}
