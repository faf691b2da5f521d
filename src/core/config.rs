//! Simulation configuration with documented constants
//!
//! All coefficients are collected here, grouped by the system that reads them.
//! Every group deserialises with `#[serde(default)]`, so a TOML file only needs
//! to name the values it overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{ConfigError, Result};
use crate::core::quantize::{GridPolicy, MAX_DECIMAL_PLACES};

/// Configuration for the whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationConfig {
    /// Quantization grid applied to every constrained value. Fixed for the run.
    pub precision: GridPolicy,
    pub economy: EconomyDefines,
    pub decision: DecisionDefines,
    pub consciousness: ConsciousnessDefines,
    pub solidarity: SolidarityDefines,
    pub survival: SurvivalDefines,
    pub struggle: StruggleDefines,
    pub territory: TerritoryDefines,
    pub vitality: VitalityDefines,
    pub metabolism: MetabolismDefines,
    pub topology: TopologyDefines,
    /// Stamp events with wall-clock millis. Advisory only; never read by formulas.
    pub record_wall_clock: bool,
}

// === ECONOMY ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyDefines {
    /// Imperial rent coefficient α in `Φ = α·Wp·(1−Ψp)`
    ///
    /// At 0.1 a fully unconscious periphery class loses a tenth of its wealth
    /// per tick along each EXPLOITATION edge.
    pub extraction_efficiency: f64,

    /// Fraction of received rent a comprador keeps before paying TRIBUTE
    pub comprador_cut: f64,

    /// Starting share of rent inflow the core bourgeoisie pays out as WAGES
    ///
    /// The bourgeoisie decision moves this each tick; it is kept in `[0, 1]`.
    pub super_wage_rate: f64,

    /// Share of its wealth a patron pays along a CLIENT_STATE edge when triggered
    pub client_state_subsidy_rate: f64,

    /// Client p_revolution above which the patron pays the subsidy
    pub client_state_trigger: f64,

    /// Repression added to a subsidised client
    pub client_state_repression_boost: f64,

    /// Value produced per TENANCY edge per tick at full efficiency and biocapacity
    pub labor_power: f64,

    /// Per-tick loss of productive efficiency
    ///
    /// At 0.0005 efficiency falls by 5% every hundred ticks until the floor.
    pub efficiency_decay_coefficient: f64,

    /// Efficiency never falls below this multiplier
    pub efficiency_floor: f64,
}

impl Default for EconomyDefines {
    fn default() -> Self {
        Self {
            extraction_efficiency: 0.1,
            comprador_cut: 0.15,
            super_wage_rate: 0.2,
            client_state_subsidy_rate: 0.05,
            client_state_trigger: 0.5,
            client_state_repression_boost: 0.05,
            labor_power: 10.0,
            efficiency_decay_coefficient: 0.0005,
            efficiency_floor: 0.5,
        }
    }
}

/// Bourgeoisie decision matrix thresholds and responses
///
/// Rules are evaluated in a fixed order and the first match wins:
/// bribery, crisis, iron fist, austerity, no change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionDefines {
    /// Pool ratio at or above which the bourgeoisie can afford bribery
    pub high_pool_threshold: f64,
    /// Pool ratio below which austerity starts
    pub low_pool_threshold: f64,
    /// Pool ratio below which the system is in crisis
    pub critical_pool_threshold: f64,
    /// Tension below which the periphery counts as calm
    pub calm_tension_threshold: f64,
    /// Tension above which the bourgeoisie reaches for the iron fist
    pub unrest_tension_threshold: f64,

    pub bribery_wage_delta: f64,
    pub austerity_wage_delta: f64,
    pub iron_fist_repression_delta: f64,
    pub crisis_wage_delta: f64,
    pub crisis_repression_delta: f64,
}

impl Default for DecisionDefines {
    fn default() -> Self {
        Self {
            high_pool_threshold: 0.7,
            low_pool_threshold: 0.3,
            critical_pool_threshold: 0.1,
            calm_tension_threshold: 0.3,
            unrest_tension_threshold: 0.5,
            bribery_wage_delta: 0.05,
            austerity_wage_delta: -0.05,
            iron_fist_repression_delta: 0.1,
            crisis_wage_delta: -0.15,
            crisis_repression_delta: 0.2,
        }
    }
}

// === CONSCIOUSNESS ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsciousnessDefines {
    /// k: how strongly the wage/value gap moves class consciousness
    pub sensitivity: f64,
    /// λ: per-tick relaxation of consciousness toward zero
    pub decay_lambda: f64,
    /// Fraction of agitation that dissipates each tick
    pub agitation_decay: f64,
}

impl Default for ConsciousnessDefines {
    fn default() -> Self {
        Self {
            sensitivity: 0.1,
            decay_lambda: 0.1,
            agitation_decay: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidarityDefines {
    /// Source consciousness below which nothing is transmitted
    pub activation_threshold: f64,
    /// Target consciousness crossing this emits a mass awakening
    pub mass_awakening_threshold: f64,
}

impl Default for SolidarityDefines {
    fn default() -> Self {
        Self {
            activation_threshold: 0.3,
            mass_awakening_threshold: 0.6,
        }
    }
}

// === SURVIVAL & STRUGGLE ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivalDefines {
    /// Per-capita wealth at which acquiescence is a coin flip
    pub subsistence_threshold: f64,
    /// Logistic steepness of P(S|A)
    pub steepness: f64,
    /// Keeps P(S|R) finite when repression is zero
    pub epsilon: f64,
}

impl Default for SurvivalDefines {
    fn default() -> Self {
        Self {
            subsistence_threshold: 5.0,
            steepness: 1.0,
            epsilon: 1e-6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StruggleDefines {
    /// Repression at or above which a spark is possible
    pub spark_repression_threshold: f64,
    /// Agitation at or above which a spark is possible
    pub spark_agitation_threshold: f64,
    /// Share of wealth destroyed in an uprising
    pub uprising_wealth_destruction: f64,
    pub uprising_organization_gain: f64,
    /// Share of agitation spent by an uprising
    pub agitation_release: f64,
    /// Added to every SOLIDARITY edge touching an uprising class
    pub solidarity_gain: f64,
    /// Per-tick tension gained per unit of normalised wealth gap
    pub tension_accumulation_rate: f64,
}

impl Default for StruggleDefines {
    fn default() -> Self {
        Self {
            spark_repression_threshold: 0.6,
            spark_agitation_threshold: 0.5,
            uprising_wealth_destruction: 0.05,
            uprising_organization_gain: 0.1,
            agitation_release: 0.5,
            solidarity_gain: 0.1,
            tension_accumulation_rate: 0.05,
        }
    }
}

// === SPACE & ECOLOGY ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerritoryDefines {
    /// Heat added each tick to high-profile territories
    pub heat_gain_rate: f64,
    /// Fraction of heat that dissipates each tick
    pub heat_decay_rate: f64,
    /// Fraction of a territory's heat leaking along each ADJACENCY edge
    pub heat_spillover_rate: f64,
    /// Heat at which surveillance starts
    pub surveillance_threshold: f64,
    /// Heat at which eviction is triggered
    pub eviction_threshold: f64,
    /// Rent multiplier applied when eviction starts
    pub rent_spike_multiplier: f64,
    /// Share of population displaced per tick while under eviction
    pub displacement_rate: f64,
}

impl Default for TerritoryDefines {
    fn default() -> Self {
        Self {
            heat_gain_rate: 0.1,
            heat_decay_rate: 0.05,
            heat_spillover_rate: 0.05,
            surveillance_threshold: 0.4,
            eviction_threshold: 0.8,
            rent_spike_multiplier: 1.5,
            displacement_rate: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalityDefines {
    /// Wealth one member of a class needs per tick to be fully covered
    pub subsistence_per_capita: f64,
}

impl Default for VitalityDefines {
    fn default() -> Self {
        Self {
            subsistence_per_capita: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetabolismDefines {
    /// η: entropy multiplier on extraction
    pub entropy_factor: f64,
    /// Biocapacity consumed per member of any class per tick
    pub consumption_per_capita: f64,
    /// Cap reported when biocapacity is exhausted
    pub max_overshoot_ratio: f64,
}

impl Default for MetabolismDefines {
    fn default() -> Self {
        Self {
            entropy_factor: 1.2,
            consumption_per_capita: 0.01,
            max_overshoot_ratio: 999.0,
        }
    }
}

// === TOPOLOGY ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyDefines {
    /// SOLIDARITY edges weaker than this are left out of the subgraph
    pub min_edge_strength: f64,
    /// Percolation ratio below which the network is gaseous
    pub gaseous_threshold: f64,
    /// Percolation ratio at which a giant component exists
    pub condensation_threshold: f64,
    /// Edge strength counted toward potential liquidity ("sympathizer")
    pub sympathizer_threshold: f64,
    /// Edge strength counted toward actual liquidity ("cadre")
    pub cadre_threshold: f64,
    /// Cadre density separating liquid from solid
    pub cadre_density_threshold: f64,
    /// Run the resilience test every N ticks; 0 disables it
    pub resilience_test_interval: u64,
    /// Fraction of nodes removed by the resilience test
    pub resilience_removal_rate: f64,
    /// Fraction of the giant component that must survive removal
    pub survival_threshold: f64,
    /// Base seed for the resilience test; mixed with the tick
    pub seed: u64,
}

impl Default for TopologyDefines {
    fn default() -> Self {
        Self {
            min_edge_strength: 0.1,
            gaseous_threshold: 0.1,
            condensation_threshold: 0.5,
            sympathizer_threshold: 0.1,
            cadre_threshold: 0.5,
            cadre_density_threshold: 0.5,
            resilience_test_interval: 5,
            resilience_removal_rate: 0.2,
            survival_threshold: 0.4,
            seed: 42,
        }
    }
}

fn unit(name: &str, value: f64) -> std::result::Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError(format!("{} ({}) must lie in [0, 1]", name, value)))
    }
}

fn non_negative(name: &str, value: f64) -> std::result::Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError(format!("{} ({}) must be finite and >= 0", name, value)))
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.precision.decimal_places > MAX_DECIMAL_PLACES {
            return Err(ConfigError(format!(
                "precision.decimal_places ({}) exceeds {}",
                self.precision.decimal_places, MAX_DECIMAL_PLACES
            )));
        }

        let e = &self.economy;
        unit("economy.extraction_efficiency", e.extraction_efficiency)?;
        unit("economy.comprador_cut", e.comprador_cut)?;
        unit("economy.super_wage_rate", e.super_wage_rate)?;
        unit("economy.client_state_subsidy_rate", e.client_state_subsidy_rate)?;
        unit("economy.client_state_trigger", e.client_state_trigger)?;
        unit("economy.efficiency_floor", e.efficiency_floor)?;
        non_negative("economy.labor_power", e.labor_power)?;
        non_negative("economy.efficiency_decay_coefficient", e.efficiency_decay_coefficient)?;

        // Pool thresholds must be ordered for the first-match rules to make sense
        let d = &self.decision;
        if !(d.critical_pool_threshold < d.low_pool_threshold
            && d.low_pool_threshold < d.high_pool_threshold)
        {
            return Err(ConfigError(format!(
                "decision pool thresholds must satisfy critical ({}) < low ({}) < high ({})",
                d.critical_pool_threshold, d.low_pool_threshold, d.high_pool_threshold
            )));
        }
        if d.calm_tension_threshold > d.unrest_tension_threshold {
            return Err(ConfigError(format!(
                "calm_tension_threshold ({}) should be <= unrest_tension_threshold ({})",
                d.calm_tension_threshold, d.unrest_tension_threshold
            )));
        }

        non_negative("consciousness.sensitivity", self.consciousness.sensitivity)?;
        unit("consciousness.decay_lambda", self.consciousness.decay_lambda)?;
        unit("consciousness.agitation_decay", self.consciousness.agitation_decay)?;
        unit("solidarity.activation_threshold", self.solidarity.activation_threshold)?;
        unit(
            "solidarity.mass_awakening_threshold",
            self.solidarity.mass_awakening_threshold,
        )?;

        if self.survival.steepness <= 0.0 {
            return Err(ConfigError("survival.steepness must be positive".into()));
        }
        if self.survival.epsilon <= 0.0 {
            return Err(ConfigError("survival.epsilon must be positive".into()));
        }

        let s = &self.struggle;
        unit("struggle.uprising_wealth_destruction", s.uprising_wealth_destruction)?;
        unit("struggle.agitation_release", s.agitation_release)?;
        non_negative("struggle.tension_accumulation_rate", s.tension_accumulation_rate)?;

        let t = &self.territory;
        if t.surveillance_threshold >= t.eviction_threshold {
            return Err(ConfigError(format!(
                "surveillance_threshold ({}) should be < eviction_threshold ({})",
                t.surveillance_threshold, t.eviction_threshold
            )));
        }
        unit("territory.heat_decay_rate", t.heat_decay_rate)?;
        unit("territory.displacement_rate", t.displacement_rate)?;
        if t.rent_spike_multiplier < 1.0 {
            return Err(ConfigError("territory.rent_spike_multiplier must be >= 1".into()));
        }

        if self.vitality.subsistence_per_capita <= 0.0 {
            return Err(ConfigError("vitality.subsistence_per_capita must be positive".into()));
        }
        non_negative("metabolism.entropy_factor", self.metabolism.entropy_factor)?;

        let topo = &self.topology;
        if topo.gaseous_threshold >= topo.condensation_threshold {
            return Err(ConfigError(format!(
                "gaseous_threshold ({}) should be < condensation_threshold ({})",
                topo.gaseous_threshold, topo.condensation_threshold
            )));
        }
        if topo.sympathizer_threshold > topo.cadre_threshold {
            return Err(ConfigError(
                "topology.sympathizer_threshold should be <= cadre_threshold".into(),
            ));
        }
        unit("topology.resilience_removal_rate", topo.resilience_removal_rate)?;
        unit("topology.survival_threshold", topo.survival_threshold)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [economy]
            extraction_efficiency = 0.2

            [topology]
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.economy.extraction_efficiency, 0.2);
        assert_eq!(config.economy.comprador_cut, 0.15);
        assert_eq!(config.topology.seed, 7);
        assert_eq!(config.precision.decimal_places, 5);
    }

    #[test]
    fn test_unordered_pool_thresholds_rejected() {
        let mut config = SimulationConfig::default();
        config.decision.low_pool_threshold = 0.8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_unit_coefficient_rejected() {
        let mut config = SimulationConfig::default();
        config.economy.extraction_efficiency = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.0.contains("extraction_efficiency"));
    }

    #[test]
    fn test_invalid_toml_surfaces_error() {
        assert!(SimulationConfig::from_toml_str("[economy\nbroken").is_err());
    }
}
