//! Bourgeoisie decision matrix

use crate::core::config::DecisionDefines;
use crate::core::tagged::tagged_enum;

tagged_enum! {
    pub enum BourgeoisieDecision {
        Bribery => "bribery",
        Crisis => "crisis",
        IronFist => "iron_fist",
        Austerity => "austerity",
        NoChange => "no_change",
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionOutcome {
    pub decision: BourgeoisieDecision,
    pub wage_delta: f64,
    pub repression_delta: f64,
}

/// First matching rule wins; the order below is part of the model.
///
/// 1. rich pool and calm periphery: bribery (raise wages)
/// 2. pool below critical: crisis (cut wages, raise repression)
/// 3. poor pool and unrest: iron fist (raise repression)
/// 4. poor pool: austerity (cut wages)
/// 5. otherwise no change
pub fn bourgeoisie_decision(
    pool_ratio: f64,
    aggregate_tension: f64,
    rules: &DecisionDefines,
) -> DecisionOutcome {
    let outcome = |decision, wage_delta, repression_delta| DecisionOutcome {
        decision,
        wage_delta,
        repression_delta,
    };

    if pool_ratio >= rules.high_pool_threshold && aggregate_tension < rules.calm_tension_threshold {
        outcome(BourgeoisieDecision::Bribery, rules.bribery_wage_delta, 0.0)
    } else if pool_ratio < rules.critical_pool_threshold {
        outcome(
            BourgeoisieDecision::Crisis,
            rules.crisis_wage_delta,
            rules.crisis_repression_delta,
        )
    } else if pool_ratio < rules.low_pool_threshold
        && aggregate_tension > rules.unrest_tension_threshold
    {
        outcome(
            BourgeoisieDecision::IronFist,
            0.0,
            rules.iron_fist_repression_delta,
        )
    } else if pool_ratio < rules.low_pool_threshold {
        outcome(BourgeoisieDecision::Austerity, rules.austerity_wage_delta, 0.0)
    } else {
        outcome(BourgeoisieDecision::NoChange, 0.0, 0.0)
    }
}
