//! Territory heat and its discrete bands

use serde::{Deserialize, Serialize};
use std::fmt;

/// Surveillance/eviction band of a territory's heat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatBand {
    Normal,
    Surveillance,
    Eviction,
}

impl HeatBand {
    /// `< surveillance` normal, `[surveillance, eviction)` surveillance,
    /// `>= eviction` eviction.
    pub fn classify(heat: f64, surveillance_threshold: f64, eviction_threshold: f64) -> Self {
        if heat >= eviction_threshold {
            HeatBand::Eviction
        } else if heat >= surveillance_threshold {
            HeatBand::Surveillance
        } else {
            HeatBand::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeatBand::Normal => "normal",
            HeatBand::Surveillance => "surveillance",
            HeatBand::Eviction => "eviction",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "normal" => Some(HeatBand::Normal),
            "surveillance" => Some(HeatBand::Surveillance),
            "eviction" => Some(HeatBand::Eviction),
            _ => None,
        }
    }
}

impl fmt::Display for HeatBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heat after one tick: additive accumulation minus proportional decay,
/// kept in `[0, 1]`.
pub fn territory_heat(current: f64, accumulation: f64, decay_rate: f64) -> f64 {
    (current + accumulation - current * decay_rate).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(HeatBand::classify(0.39, 0.4, 0.8), HeatBand::Normal);
        assert_eq!(HeatBand::classify(0.4, 0.4, 0.8), HeatBand::Surveillance);
        assert_eq!(HeatBand::classify(0.79, 0.4, 0.8), HeatBand::Surveillance);
        assert_eq!(HeatBand::classify(0.8, 0.4, 0.8), HeatBand::Eviction);
    }

    #[test]
    fn test_heat_accumulates_and_decays() {
        assert!((territory_heat(0.5, 0.1, 0.1) - 0.55).abs() < 1e-12);
        assert!((territory_heat(0.5, 0.0, 0.1) - 0.45).abs() < 1e-12);
        assert_eq!(territory_heat(0.95, 0.2, 0.0), 1.0);
    }

    #[test]
    fn test_band_string_roundtrip() {
        for band in [HeatBand::Normal, HeatBand::Surveillance, HeatBand::Eviction] {
            assert_eq!(HeatBand::parse(band.as_str()), Some(band));
        }
    }
}
