//! Survival calculus
//!
//! A class compares the odds of surviving by acquiescing against the odds of
//! surviving through revolt. Rupture is a pure comparison of the two.

use crate::core::error::FormulaError;

/// Loss-aversion multiplier applied to negative outcomes.
pub const LOSS_AVERSION: f64 = 2.25;

pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// `P(S|A) = logistic(k(W − Wsub))`, exactly 0.5 at the subsistence threshold.
pub fn acquiescence_probability(wealth: f64, subsistence_threshold: f64, steepness: f64) -> f64 {
    logistic(steepness * (wealth - subsistence_threshold))
}

/// `P(S|R) = O/(R + ε)`, capped at 1.
///
/// Non-decreasing in organization for fixed repression.
pub fn revolution_probability(organization: f64, repression: f64, epsilon: f64) -> f64 {
    (organization / (repression + epsilon)).min(1.0)
}

pub fn rupture_condition(p_revolution: f64, p_acquiescence: f64) -> bool {
    p_revolution > p_acquiescence
}

/// Prospect-theory value: gains count once, losses 2.25 times.
pub fn loss_aversion(value: f64) -> f64 {
    if value >= 0.0 {
        value
    } else {
        LOSS_AVERSION * value
    }
}

/// Wealth at which `P(S|A)` equals `p_revolution`.
///
/// Below this wealth revolt is the better bet. Returns `None` when
/// `p_revolution` is 0 or 1, where the logistic never reaches it.
pub fn crossover_threshold(
    p_revolution: f64,
    subsistence_threshold: f64,
    steepness: f64,
) -> Result<Option<f64>, FormulaError> {
    if steepness <= 0.0 {
        return Err(FormulaError::NonPositiveSteepness(steepness));
    }
    if p_revolution <= 0.0 || p_revolution >= 1.0 {
        return Ok(None);
    }
    let logit = (p_revolution / (1.0 - p_revolution)).ln();
    Ok(Some(subsistence_threshold + logit / steepness))
}
