//! Property tests for quantization and the survival calculus

use proptest::prelude::*;

use praxis_engine::core::quantize::{quantize, GridPolicy};
use praxis_engine::formulas::survival::{acquiescence_probability, revolution_probability};
use praxis_engine::formulas::vitality::attrition_rate;

proptest! {
    #[test]
    fn prop_quantize_is_idempotent(x in -1.0e9f64..1.0e9) {
        let once = quantize(x);
        prop_assert_eq!(quantize(once), once);
    }

    #[test]
    fn prop_quantize_idempotent_at_any_precision(x in -1.0e4f64..1.0e4, places in 0u32..=10) {
        let policy = GridPolicy::new(places);
        let once = policy.quantize(x);
        prop_assert_eq!(policy.quantize(once), once);
        prop_assert!((once - x).abs() <= policy.step() / 2.0 + 1e-9 * x.abs().max(1.0));
    }

    #[test]
    fn prop_acquiescence_monotone_in_wealth(
        low in -100.0f64..100.0,
        gap in 0.0f64..100.0,
        threshold in 0.0f64..50.0,
        steepness in 0.01f64..5.0,
    ) {
        let poorer = acquiescence_probability(low, threshold, steepness);
        let richer = acquiescence_probability(low + gap, threshold, steepness);
        prop_assert!(richer >= poorer);
        prop_assert!((0.0..=1.0).contains(&poorer));
    }

    #[test]
    fn prop_revolution_monotone_in_organization(
        organization in 0.0f64..1.0,
        extra in 0.0f64..1.0,
        repression in 0.0f64..1.0,
    ) {
        let more = (organization + extra).min(1.0);
        let base = revolution_probability(organization, repression, 1e-6);
        let organised = revolution_probability(more, repression, 1e-6);
        prop_assert!(organised >= base);
        prop_assert!(organised <= 1.0);
    }

    #[test]
    fn prop_attrition_falls_as_coverage_rises(
        coverage in 0.0f64..5.0,
        gain in 0.0f64..5.0,
        inequality in 0.0f64..1.0,
    ) {
        prop_assert!(attrition_rate(coverage + gain, inequality) <= attrition_rate(coverage, inequality));
    }
}

#[test]
fn test_missing_value_quantizes_to_zero() {
    assert_eq!(GridPolicy::DEFAULT.quantize_opt(None), 0.0);
    assert_eq!(GridPolicy::DEFAULT.quantize_opt(Some(0.123456)), 0.12346);
}
