//! Pure domain formulas
//!
//! Functions here take and return plain `f64`s with documented domains.
//! Range enforcement happens when results are written back into constrained
//! state types.

pub mod consciousness;
pub mod decision;
pub mod ecology;
pub mod economic;
pub mod solidarity;
pub mod survival;
pub mod territory;
pub mod vitality;

pub use consciousness::{consciousness_drift, ideological_drift, DriftInputs, IdeologyState};
pub use decision::{bourgeoisie_decision, BourgeoisieDecision, DecisionOutcome};
pub use ecology::{biocapacity_delta, overshoot_ratio};
pub use economic::{
    efficiency_multiplier, imperial_rent, is_labor_aristocracy, labor_aristocracy_ratio,
};
pub use solidarity::solidarity_transmission;
pub use survival::{
    acquiescence_probability, crossover_threshold, logistic, loss_aversion,
    revolution_probability, rupture_condition, LOSS_AVERSION,
};
pub use territory::{territory_heat, HeatBand};
pub use vitality::{attrition_rate, coverage_ratio, mortality};
