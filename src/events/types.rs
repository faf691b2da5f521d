//! Typed, immutable simulation events

use serde::{Deserialize, Serialize};

use crate::core::bounded::Currency;
use crate::core::tagged::tagged_enum;
use crate::core::types::{EntityId, NodeId, TerritoryId, Tick};
use crate::formulas::decision::BourgeoisieDecision;
use crate::formulas::territory::HeatBand;
use crate::observers::topology::TopologyPhase;

tagged_enum! {
    /// Discriminator carried by every raw event
    pub enum EventType {
        SurplusExtraction => "surplus_extraction",
        WagesPaid => "wages_paid",
        TributePaid => "tribute_paid",
        ClientStateSubsidy => "client_state_subsidy",
        BourgeoisieDecision => "bourgeoisie_decision",
        ConsciousnessTransmission => "consciousness_transmission",
        MassAwakening => "mass_awakening",
        ExcessiveForce => "excessive_force",
        Uprising => "uprising",
        SolidaritySpike => "solidarity_spike",
        Rupture => "rupture",
        PopulationAttrition => "population_attrition",
        EntityDeath => "entity_death",
        ValueProduced => "value_produced",
        HeatBandShift => "heat_band_shift",
        EvictionTriggered => "eviction_triggered",
        EcologicalOvershoot => "ecological_overshoot",
        PhaseTransition => "phase_transition",
        ExternalAction => "external_action",
    }
}

/// Closed-schema payload of a [`SimulationEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EventKind {
    // Economy
    SurplusExtraction {
        source_id: EntityId,
        target_id: EntityId,
        amount: Currency,
    },
    WagesPaid {
        source_id: EntityId,
        target_id: EntityId,
        amount: Currency,
    },
    TributePaid {
        source_id: EntityId,
        target_id: EntityId,
        amount: Currency,
    },
    ClientStateSubsidy {
        source_id: EntityId,
        target_id: EntityId,
        amount: Currency,
    },
    BourgeoisieDecision {
        decision: BourgeoisieDecision,
        pool_ratio: f64,
        aggregate_tension: f64,
        wage_delta: f64,
        repression_delta: f64,
    },
    ValueProduced {
        node_id: EntityId,
        territory_id: TerritoryId,
        amount: Currency,
    },

    // Consciousness
    ConsciousnessTransmission {
        source_id: EntityId,
        target_id: EntityId,
        delta: f64,
    },
    MassAwakening {
        node_id: EntityId,
        old_consciousness: f64,
        new_consciousness: f64,
    },

    // Struggle
    ExcessiveForce {
        node_id: EntityId,
        repression: f64,
        agitation: f64,
    },
    Uprising {
        node_id: EntityId,
        p_revolution: f64,
        p_acquiescence: f64,
        wealth_destroyed: Currency,
    },
    SolidaritySpike {
        node_id: EntityId,
        edges_strengthened: u64,
        solidarity_gain: f64,
    },
    Rupture {
        source_id: EntityId,
        target_id: EntityId,
        tension: f64,
    },

    // Vitality
    PopulationAttrition {
        node_id: EntityId,
        deaths: u64,
        remaining_population: u64,
        coverage_ratio: f64,
    },
    EntityDeath {
        node_id: EntityId,
    },

    // Territory and ecology
    HeatBandShift {
        territory_id: TerritoryId,
        previous_band: HeatBand,
        new_band: HeatBand,
        heat: f64,
    },
    EvictionTriggered {
        territory_id: TerritoryId,
        heat: f64,
        displaced_population: u64,
        destination_id: Option<TerritoryId>,
    },
    EcologicalOvershoot {
        overshoot_ratio: f64,
        total_biocapacity: f64,
        total_consumption: f64,
    },

    // Observers and the outside world
    PhaseTransition {
        previous_state: TopologyPhase,
        new_state: TopologyPhase,
        percolation_ratio: f64,
        largest_component_size: u64,
        num_components: u64,
        cadre_density: f64,
        is_resilient: Option<bool>,
    },
    ExternalAction {
        actor_id: EntityId,
        action: String,
        target_id: Option<NodeId>,
        magnitude: f64,
    },
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::SurplusExtraction { .. } => EventType::SurplusExtraction,
            EventKind::WagesPaid { .. } => EventType::WagesPaid,
            EventKind::TributePaid { .. } => EventType::TributePaid,
            EventKind::ClientStateSubsidy { .. } => EventType::ClientStateSubsidy,
            EventKind::BourgeoisieDecision { .. } => EventType::BourgeoisieDecision,
            EventKind::ValueProduced { .. } => EventType::ValueProduced,
            EventKind::ConsciousnessTransmission { .. } => EventType::ConsciousnessTransmission,
            EventKind::MassAwakening { .. } => EventType::MassAwakening,
            EventKind::ExcessiveForce { .. } => EventType::ExcessiveForce,
            EventKind::Uprising { .. } => EventType::Uprising,
            EventKind::SolidaritySpike { .. } => EventType::SolidaritySpike,
            EventKind::Rupture { .. } => EventType::Rupture,
            EventKind::PopulationAttrition { .. } => EventType::PopulationAttrition,
            EventKind::EntityDeath { .. } => EventType::EntityDeath,
            EventKind::HeatBandShift { .. } => EventType::HeatBandShift,
            EventKind::EvictionTriggered { .. } => EventType::EvictionTriggered,
            EventKind::EcologicalOvershoot { .. } => EventType::EcologicalOvershoot,
            EventKind::PhaseTransition { .. } => EventType::PhaseTransition,
            EventKind::ExternalAction { .. } => EventType::ExternalAction,
        }
    }

    /// Whether a node takes part in this event.
    pub fn involves(&self, id: &str) -> bool {
        let is = |e: &EntityId| e.as_str() == id;
        match self {
            EventKind::SurplusExtraction { source_id, target_id, .. }
            | EventKind::WagesPaid { source_id, target_id, .. }
            | EventKind::TributePaid { source_id, target_id, .. }
            | EventKind::ClientStateSubsidy { source_id, target_id, .. }
            | EventKind::ConsciousnessTransmission { source_id, target_id, .. }
            | EventKind::Rupture { source_id, target_id, .. } => is(source_id) || is(target_id),
            EventKind::MassAwakening { node_id, .. }
            | EventKind::ExcessiveForce { node_id, .. }
            | EventKind::Uprising { node_id, .. }
            | EventKind::SolidaritySpike { node_id, .. }
            | EventKind::PopulationAttrition { node_id, .. }
            | EventKind::EntityDeath { node_id } => is(node_id),
            EventKind::ValueProduced { node_id, territory_id, .. } => {
                is(node_id) || territory_id.as_str() == id
            }
            EventKind::HeatBandShift { territory_id, .. } => territory_id.as_str() == id,
            EventKind::EvictionTriggered {
                territory_id,
                destination_id,
                ..
            } => {
                territory_id.as_str() == id
                    || destination_id.as_ref().map_or(false, |d| d.as_str() == id)
            }
            EventKind::ExternalAction {
                actor_id,
                target_id,
                ..
            } => is(actor_id) || target_id.as_ref().map_or(false, |t| t.as_str() == id),
            EventKind::BourgeoisieDecision { .. }
            | EventKind::EcologicalOvershoot { .. }
            | EventKind::PhaseTransition { .. } => false,
        }
    }
}

/// An immutable record in `WorldState::events`.
///
/// `timestamp` is advisory wall-clock metadata and takes no part in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationEvent {
    pub tick: Tick,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    pub kind: EventKind,
}

impl PartialEq for SimulationEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick && self.kind == other.kind
    }
}

impl SimulationEvent {
    pub fn new(tick: Tick, kind: EventKind) -> Self {
        Self {
            tick,
            timestamp: None,
            kind,
        }
    }

    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extraction() -> EventKind {
        EventKind::SurplusExtraction {
            source_id: EntityId::parse("C001").unwrap(),
            target_id: EntityId::parse("C002").unwrap(),
            amount: Currency::new(10.0).unwrap(),
        }
    }

    #[test]
    fn test_timestamp_ignored_by_equality() {
        let a = SimulationEvent::new(0, extraction());
        let mut b = a.clone();
        b.timestamp = Some(1_700_000_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_event_type_matches_serde_tag() {
        let json = serde_json::to_value(extraction()).unwrap();
        assert_eq!(json["event_type"], "surplus_extraction");
        assert_eq!(extraction().event_type().as_str(), "surplus_extraction");
    }

    #[test]
    fn test_involves() {
        let kind = extraction();
        assert!(kind.involves("C001"));
        assert!(kind.involves("C002"));
        assert!(!kind.involves("C003"));
    }
}
