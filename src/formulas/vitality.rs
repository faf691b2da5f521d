//! Coverage-ratio mortality
//!
//! Deaths never reduce wealth, so survivors' per-capita wealth rises and the
//! class settles where coverage meets its inequality-adjusted threshold.

/// Coverage ratio: wealth over what the whole population needs.
pub fn coverage_ratio(wealth: f64, population: u64, subsistence_per_capita: f64) -> f64 {
    if population == 0 || subsistence_per_capita <= 0.0 {
        return f64::INFINITY;
    }
    wealth / (population as f64 * subsistence_per_capita)
}

/// Attrition rate in `[0, 1]`.
///
/// `threshold = 1 + inequality`; zero at or above it, otherwise
/// `(threshold − coverage)·(0.5 + inequality)`.
pub fn attrition_rate(coverage: f64, inequality: f64) -> f64 {
    let threshold = 1.0 + inequality;
    if coverage >= threshold {
        return 0.0;
    }
    ((threshold - coverage) * (0.5 + inequality)).clamp(0.0, 1.0)
}

/// `floor(population · attrition)`
pub fn mortality(population: u64, coverage: f64, inequality: f64) -> u64 {
    let attrition = attrition_rate(coverage, inequality);
    let deaths = (population as f64 * attrition).floor() as u64;
    deaths.min(population)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_deaths_when_covered() {
        assert_eq!(mortality(1000, 1.5, 0.5), 0);
        assert_eq!(mortality(1000, 3.0, 0.5), 0);
    }

    #[test]
    fn test_deaths_below_threshold() {
        // threshold 1.5, coverage 1.0: attrition (0.5)(1.0) = 0.5
        assert_eq!(mortality(1000, 1.0, 0.5), 500);
    }

    #[test]
    fn test_attrition_capped_at_one() {
        assert_eq!(attrition_rate(0.0, 1.0), 1.0);
        assert_eq!(mortality(10, 0.0, 1.0), 10);
    }

    #[test]
    fn test_equilibrium_with_fixed_wealth() {
        let wealth = 1000.0;
        let inequality = 0.5;
        let mut population = 1000u64;
        for _ in 0..50 {
            let coverage = coverage_ratio(wealth, population, 1.0);
            population -= mortality(population, coverage, inequality);
        }
        let coverage = coverage_ratio(wealth, population, 1.0);
        assert_eq!(attrition_rate(coverage, inequality), 0.0);
        assert!(population > 0);
    }

    #[test]
    fn test_empty_population_is_covered() {
        assert_eq!(coverage_ratio(0.0, 0, 1.0), f64::INFINITY);
        assert_eq!(mortality(0, f64::INFINITY, 0.3), 0);
    }
}
