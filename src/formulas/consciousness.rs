//! Consciousness drift and the bifurcation of crisis agitation
//!
//! The same material loss pushes a class toward class consciousness when it
//! already has solidarity ties and toward national identity when it has none.

use crate::core::config::ConsciousnessDefines;
use crate::formulas::survival::LOSS_AVERSION;

/// Base drift `k(1 − Wc/Vc) − λΨc` plus crisis agitation routed by solidarity.
///
/// When `value_produced <= 0` the wage term is undefined and only the decay
/// `−λΨc` remains. A negative `wage_change` releases `|wage_change| × 2.25`
/// of agitation energy: added when `solidarity_pressure > 0`, subtracted
/// otherwise.
pub fn consciousness_drift(
    core_wages: f64,
    value_produced: f64,
    current_consciousness: f64,
    sensitivity_k: f64,
    decay_lambda: f64,
    solidarity_pressure: f64,
    wage_change: f64,
) -> f64 {
    let mut drift = if value_produced <= 0.0 {
        -decay_lambda * current_consciousness
    } else {
        sensitivity_k * (1.0 - core_wages / value_produced) - decay_lambda * current_consciousness
    };

    if wage_change < 0.0 {
        let agitation_energy = wage_change.abs() * LOSS_AVERSION;
        if solidarity_pressure > 0.0 {
            drift += agitation_energy;
        } else {
            drift -= agitation_energy;
        }
    }

    drift
}

/// Ideological coordinates of a class, all in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdeologyState {
    pub class_consciousness: f64,
    pub national_identity: f64,
    pub agitation: f64,
}

/// Material inputs for one tick of ideological drift.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriftInputs {
    pub core_wages: f64,
    pub value_produced: f64,
    /// Relative change of income against the previous tick
    pub wage_change: f64,
    /// Relative change of wealth within this tick
    pub wealth_change: f64,
    pub solidarity_pressure: f64,
}

/// Multi-dimensional drift: updates consciousness, national identity and
/// agitation together.
///
/// Wage and wealth losses combine into one shock. Agitation decays by
/// `agitation_decay` and absorbs the shock's energy. Class consciousness
/// follows [`consciousness_drift`] driven by the combined shock. National
/// identity absorbs the energy when there is no solidarity and relaxes by λ
/// when there is.
pub fn ideological_drift(
    state: IdeologyState,
    inputs: DriftInputs,
    params: &ConsciousnessDefines,
) -> IdeologyState {
    let shock = inputs.wage_change.min(0.0) + inputs.wealth_change.min(0.0);
    let energy = shock.abs() * LOSS_AVERSION;

    let agitation = (state.agitation * (1.0 - params.agitation_decay) + energy).clamp(0.0, 1.0);

    let cc_drift = consciousness_drift(
        inputs.core_wages,
        inputs.value_produced,
        state.class_consciousness,
        params.sensitivity,
        params.decay_lambda,
        inputs.solidarity_pressure,
        shock,
    );

    let ni_drift = if inputs.solidarity_pressure > 0.0 {
        -params.decay_lambda * state.national_identity
    } else {
        energy
    };

    IdeologyState {
        class_consciousness: (state.class_consciousness + cc_drift).clamp(0.0, 1.0),
        national_identity: (state.national_identity + ni_drift).clamp(0.0, 1.0),
        agitation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_drift_toward_consciousness_when_underpaid() {
        // Paid half of what is produced
        let drift = consciousness_drift(50.0, 100.0, 0.0, 0.1, 0.1, 0.0, 0.0);
        assert!((drift - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_labor_aristocracy_drifts_down() {
        let drift = consciousness_drift(150.0, 100.0, 0.5, 0.1, 0.1, 0.0, 0.0);
        assert!(drift < 0.0);
    }

    #[test]
    fn test_zero_value_produced_only_decays() {
        let drift = consciousness_drift(10.0, 0.0, 0.4, 0.1, 0.1, 0.0, 0.0);
        assert!((drift + 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_bifurcation_opposite_signs() {
        let with_solidarity = consciousness_drift(50.0, 100.0, 0.2, 0.1, 0.1, 0.5, -0.1);
        let without = consciousness_drift(50.0, 100.0, 0.2, 0.1, 0.1, 0.0, -0.1);
        // Energy 0.225 on top of base drift 0.03
        assert!((with_solidarity - 0.255).abs() < 1e-12);
        assert!((without + 0.195).abs() < 1e-12);
    }

    #[test]
    fn test_positive_wage_change_has_no_crisis_term() {
        let a = consciousness_drift(50.0, 100.0, 0.2, 0.1, 0.1, 0.5, 0.3);
        let b = consciousness_drift(50.0, 100.0, 0.2, 0.1, 0.1, 0.0, 0.3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ideological_drift_routes_crisis() {
        let params = ConsciousnessDefines::default();
        let state = IdeologyState {
            class_consciousness: 0.3,
            national_identity: 0.3,
            agitation: 0.0,
        };
        let crisis = DriftInputs {
            core_wages: 0.0,
            value_produced: 0.0,
            wage_change: -0.1,
            wealth_change: 0.0,
            solidarity_pressure: 0.0,
        };

        let isolated = ideological_drift(state, crisis, &params);
        let organized = ideological_drift(
            state,
            DriftInputs {
                solidarity_pressure: 0.8,
                ..crisis
            },
            &params,
        );

        assert!(organized.class_consciousness > state.class_consciousness);
        assert!(isolated.class_consciousness < state.class_consciousness);
        assert!(isolated.national_identity > state.national_identity);
        assert!(organized.national_identity < state.national_identity);
        assert_eq!(isolated.agitation, organized.agitation);
    }

    #[test]
    fn test_agitation_decays_without_shock() {
        let params = ConsciousnessDefines::default();
        let state = IdeologyState {
            class_consciousness: 0.0,
            national_identity: 0.0,
            agitation: 0.5,
        };
        let next = ideological_drift(state, DriftInputs::default(), &params);
        assert!((next.agitation - 0.45).abs() < 1e-12);
    }
}
