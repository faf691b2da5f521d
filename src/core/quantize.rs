//! Quantization gatekeeper
//!
//! Every constrained value passes through [`GridPolicy::quantize`] before range
//! validation, so all numeric state sits on one fixed decimal grid. Rounding is
//! symmetric: ties go away from zero on the value's shortest decimal form
//! (`0.000015` becomes `0.00002`, `-0.000015` becomes `-0.00002`).
//!
//! The policy is a plain value carried in the run configuration. It is never
//! mutated during a run.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Default number of decimal places (grid of 1e-5).
pub const DEFAULT_DECIMAL_PLACES: u32 = 5;

/// 2^53: above this an f64 has no fractional digits left to round.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Largest grid the policy accepts; beyond this f64 carries no useful digits.
pub const MAX_DECIMAL_PLACES: u32 = 12;

/// Fixed-precision grid applied to all constrained values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridPolicy {
    pub decimal_places: u32,
}

impl Default for GridPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl GridPolicy {
    pub const DEFAULT: GridPolicy = GridPolicy {
        decimal_places: DEFAULT_DECIMAL_PLACES,
    };

    pub fn new(decimal_places: u32) -> Self {
        Self { decimal_places }
    }

    /// Grid spacing, e.g. `1e-5` for five places.
    pub fn step(&self) -> f64 {
        10f64.powi(-(self.decimal_places as i32))
    }

    /// Snap `x` to the grid. Non-finite input is returned unchanged so that the
    /// caller's range check can reject it with a precise message.
    pub fn quantize(&self, x: f64) -> f64 {
        if !x.is_finite() {
            return x;
        }
        let snapped = Decimal::from_f64(x)
            .map(|d| d.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|d| d.to_f64());
        let value = match snapped {
            Some(v) => v,
            // Outside Decimal's range: f64::round is also half-away-from-zero.
            None => {
                let scale = 10f64.powi(self.decimal_places as i32);
                let scaled = x * scale;
                // Past 2^53 every scaled f64 is already an integer
                if !scaled.is_finite() || scaled.abs() >= MAX_EXACT_INTEGER {
                    x
                } else {
                    scaled.round() / scale
                }
            }
        };
        // Normalise negative zero so equality and serialisation stay canonical.
        if value == 0.0 {
            0.0
        } else {
            value
        }
    }

    /// `None` maps to `0.0`.
    pub fn quantize_opt(&self, x: Option<f64>) -> f64 {
        x.map(|v| self.quantize(v)).unwrap_or(0.0)
    }
}

/// Quantize with the default policy.
pub fn quantize(x: f64) -> f64 {
    GridPolicy::DEFAULT.quantize(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_to_five_places() {
        assert_eq!(quantize(0.123456789), 0.12346);
        assert_eq!(quantize(100.0), 100.0);
    }

    #[test]
    fn test_ties_go_away_from_zero() {
        assert_eq!(quantize(0.000015), 0.00002);
        assert_eq!(quantize(-0.000015), -0.00002);
        assert_eq!(quantize(0.000025), 0.00003);
    }

    #[test]
    fn test_none_is_zero() {
        assert_eq!(GridPolicy::DEFAULT.quantize_opt(None), 0.0);
        assert_eq!(GridPolicy::DEFAULT.quantize_opt(Some(0.5)), 0.5);
    }

    #[test]
    fn test_idempotent_on_samples() {
        for x in [0.1, 0.2, 1.0 / 3.0, 2.0 / 3.0, 99.999995, -7.123455, 1e-9] {
            let once = quantize(x);
            assert_eq!(quantize(once), once, "not idempotent for {}", x);
        }
    }

    #[test]
    fn test_non_finite_passes_through() {
        assert!(quantize(f64::NAN).is_nan());
        assert_eq!(quantize(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_huge_finite_values_stay_finite() {
        for x in [1e305, -1e305, f64::MAX, 8e28, 1e40] {
            let q = quantize(x);
            assert!(q.is_finite(), "quantize({}) = {}", x, q);
            assert_eq!(q, x);
        }
        assert_eq!(GridPolicy::new(12).quantize(1e300), 1e300);
    }

    #[test]
    fn test_negative_zero_normalised() {
        let q = quantize(-0.000001);
        assert_eq!(q, 0.0);
        assert!(q.is_sign_positive());
    }

    #[test]
    fn test_custom_policy() {
        let coarse = GridPolicy::new(2);
        assert_eq!(coarse.quantize(1.005), 1.01);
        assert!((coarse.step() - 0.01).abs() < 1e-15);
    }
}
