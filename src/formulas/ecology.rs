/// Change in biocapacity: `ΔB = R − E·η`.
pub fn biocapacity_delta(regeneration: f64, extraction: f64, entropy_factor: f64) -> f64 {
    regeneration - extraction * entropy_factor
}

/// Overshoot `O = C/B`; above 1 extraction is unsustainable.
///
/// Exhausted biocapacity with positive consumption reports `cap`.
pub fn overshoot_ratio(consumption: f64, biocapacity: f64, cap: f64) -> f64 {
    if biocapacity <= 0.0 {
        return if consumption > 0.0 { cap } else { 0.0 };
    }
    (consumption / biocapacity).min(cap)
}
