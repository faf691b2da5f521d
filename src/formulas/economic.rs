//! Value extraction and long-run productivity

use crate::core::error::FormulaError;

/// Imperial rent `Φ = α·Wp·(1−Ψp)`
///
/// `alpha` is the extraction efficiency, `periphery_wealth` the wealth of the
/// exploited class and `periphery_consciousness` its class consciousness.
/// A fully conscious periphery (`Ψp = 1`) yields no rent.
pub fn imperial_rent(alpha: f64, periphery_wealth: f64, periphery_consciousness: f64) -> f64 {
    alpha * periphery_wealth * (1.0 - periphery_consciousness)
}

/// Labor-aristocracy ratio `Wc/Vc`
///
/// Errors when nothing was produced, since the ratio is undefined.
pub fn labor_aristocracy_ratio(core_wages: f64, value_produced: f64) -> Result<f64, FormulaError> {
    if value_produced <= 0.0 {
        return Err(FormulaError::NonPositiveValueProduced(value_produced));
    }
    Ok(core_wages / value_produced)
}

/// A class receiving more in wages than it produces.
pub fn is_labor_aristocracy(core_wages: f64, value_produced: f64) -> Result<bool, FormulaError> {
    labor_aristocracy_ratio(core_wages, value_produced).map(|ratio| ratio > 1.0)
}

/// Productive efficiency after `tick` ticks: `max(floor, 1 − coefficient·tick)`
pub fn efficiency_multiplier(tick: u64, coefficient: f64, floor: f64) -> f64 {
    (1.0 - coefficient * tick as f64).max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imperial_rent_basic() {
        assert!((imperial_rent(0.1, 100.0, 0.0) - 10.0).abs() < 1e-12);
        assert!((imperial_rent(0.1, 100.0, 0.5) - 5.0).abs() < 1e-12);
        assert_eq!(imperial_rent(0.1, 100.0, 1.0), 0.0);
    }

    #[test]
    fn test_labor_aristocracy() {
        assert!(is_labor_aristocracy(120.0, 100.0).unwrap());
        assert!(!is_labor_aristocracy(100.0, 100.0).unwrap());
        assert!(!is_labor_aristocracy(20.0, 100.0).unwrap());
    }

    #[test]
    fn test_labor_aristocracy_zero_value_is_error() {
        assert_eq!(
            labor_aristocracy_ratio(10.0, 0.0),
            Err(FormulaError::NonPositiveValueProduced(0.0))
        );
    }

    #[test]
    fn test_efficiency_decays_to_floor() {
        assert_eq!(efficiency_multiplier(0, 0.01, 0.5), 1.0);
        assert!((efficiency_multiplier(10, 0.01, 0.5) - 0.9).abs() < 1e-12);
        assert_eq!(efficiency_multiplier(1000, 0.01, 0.5), 0.5);
    }
}
