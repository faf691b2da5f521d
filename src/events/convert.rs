//! Raw → typed event conversion
//!
//! Every discriminator has a closed schema. A missing key, a value of the
//! wrong type, or a key the schema does not list fails conversion; nothing is
//! dropped silently.

use crate::core::bounded::Currency;
use crate::core::error::EventConversionError;
use crate::core::types::{EntityId, NodeId, TerritoryId};
use crate::events::bus::{Payload, PayloadValue, RawEvent};
use crate::events::types::{EventKind, EventType, SimulationEvent};
use crate::formulas::decision::BourgeoisieDecision;
use crate::formulas::territory::HeatBand;
use crate::observers::topology::TopologyPhase;

/// Consumes payload keys one by one; whatever is left at the end is extra.
struct Fields {
    event_type: EventType,
    map: Payload,
}

impl Fields {
    fn missing(&self, key: &str) -> EventConversionError {
        EventConversionError::MissingKey {
            event_type: self.event_type.to_string(),
            key: key.to_string(),
        }
    }

    fn wrong(&self, key: &str, expected: &'static str) -> EventConversionError {
        EventConversionError::WrongType {
            event_type: self.event_type.to_string(),
            key: key.to_string(),
            expected,
        }
    }

    fn take(&mut self, key: &str) -> Result<PayloadValue, EventConversionError> {
        self.map.remove(key).ok_or_else(|| self.missing(key))
    }

    fn float(&mut self, key: &str) -> Result<f64, EventConversionError> {
        match self.take(key)? {
            PayloadValue::Float(v) => Ok(v),
            PayloadValue::Int(v) => Ok(v as f64),
            _ => Err(self.wrong(key, "number")),
        }
    }

    fn int(&mut self, key: &str) -> Result<u64, EventConversionError> {
        match self.take(key)? {
            PayloadValue::Int(v) => Ok(v),
            _ => Err(self.wrong(key, "unsigned integer")),
        }
    }

    fn text(&mut self, key: &str) -> Result<String, EventConversionError> {
        match self.take(key)? {
            PayloadValue::Text(v) => Ok(v),
            _ => Err(self.wrong(key, "text")),
        }
    }

    fn opt_bool(&mut self, key: &str) -> Result<Option<bool>, EventConversionError> {
        match self.map.remove(key) {
            None => Ok(None),
            Some(PayloadValue::Bool(v)) => Ok(Some(v)),
            Some(_) => Err(self.wrong(key, "bool")),
        }
    }

    fn currency(&mut self, key: &str) -> Result<Currency, EventConversionError> {
        let raw = self.float(key)?;
        Currency::named(key, raw).map_err(|source| EventConversionError::InvalidValue {
            event_type: self.event_type.to_string(),
            source,
        })
    }

    fn parsed<T, E>(
        &mut self,
        key: &str,
        expected: &'static str,
        parse: impl Fn(String) -> Result<T, E>,
    ) -> Result<T, EventConversionError> {
        let raw = self.text(key)?;
        parse(raw).map_err(|_| self.wrong(key, expected))
    }

    fn entity(&mut self, key: &str) -> Result<EntityId, EventConversionError> {
        self.parsed(key, "class id", EntityId::parse)
    }

    fn territory(&mut self, key: &str) -> Result<TerritoryId, EventConversionError> {
        self.parsed(key, "territory id", TerritoryId::parse)
    }

    fn opt_territory(&mut self, key: &str) -> Result<Option<TerritoryId>, EventConversionError> {
        if self.map.contains_key(key) {
            self.territory(key).map(Some)
        } else {
            Ok(None)
        }
    }

    fn opt_node(&mut self, key: &str) -> Result<Option<NodeId>, EventConversionError> {
        if self.map.contains_key(key) {
            self.parsed(key, "node id", NodeId::parse).map(Some)
        } else {
            Ok(None)
        }
    }

    fn band(&mut self, key: &str) -> Result<HeatBand, EventConversionError> {
        self.parsed(key, "heat band", |s| HeatBand::parse(&s).ok_or(()))
    }

    fn phase(&mut self, key: &str) -> Result<TopologyPhase, EventConversionError> {
        self.parsed(key, "topology phase", |s| TopologyPhase::parse(&s).ok_or(()))
    }

    fn decision(&mut self, key: &str) -> Result<BourgeoisieDecision, EventConversionError> {
        self.parsed(key, "decision", |s| BourgeoisieDecision::parse(&s).ok_or(()))
    }

    fn finish(self, kind: EventKind) -> Result<EventKind, EventConversionError> {
        match self.map.keys().next() {
            Some(extra) => Err(EventConversionError::UnexpectedKey {
                event_type: self.event_type.to_string(),
                key: extra.clone(),
            }),
            None => Ok(kind),
        }
    }
}

fn transfer(
    f: &mut Fields,
) -> Result<(EntityId, EntityId, Currency), EventConversionError> {
    Ok((f.entity("source_id")?, f.entity("target_id")?, f.currency("amount")?))
}

fn convert_kind(event_type: EventType, payload: Payload) -> Result<EventKind, EventConversionError> {
    let mut f = Fields {
        event_type,
        map: payload,
    };

    let kind = match event_type {
        EventType::SurplusExtraction => {
            let (source_id, target_id, amount) = transfer(&mut f)?;
            EventKind::SurplusExtraction {
                source_id,
                target_id,
                amount,
            }
        }
        EventType::WagesPaid => {
            let (source_id, target_id, amount) = transfer(&mut f)?;
            EventKind::WagesPaid {
                source_id,
                target_id,
                amount,
            }
        }
        EventType::TributePaid => {
            let (source_id, target_id, amount) = transfer(&mut f)?;
            EventKind::TributePaid {
                source_id,
                target_id,
                amount,
            }
        }
        EventType::ClientStateSubsidy => {
            let (source_id, target_id, amount) = transfer(&mut f)?;
            EventKind::ClientStateSubsidy {
                source_id,
                target_id,
                amount,
            }
        }
        EventType::BourgeoisieDecision => EventKind::BourgeoisieDecision {
            decision: f.decision("decision")?,
            pool_ratio: f.float("pool_ratio")?,
            aggregate_tension: f.float("aggregate_tension")?,
            wage_delta: f.float("wage_delta")?,
            repression_delta: f.float("repression_delta")?,
        },
        EventType::ValueProduced => EventKind::ValueProduced {
            node_id: f.entity("node_id")?,
            territory_id: f.territory("territory_id")?,
            amount: f.currency("amount")?,
        },
        EventType::ConsciousnessTransmission => EventKind::ConsciousnessTransmission {
            source_id: f.entity("source_id")?,
            target_id: f.entity("target_id")?,
            delta: f.float("delta")?,
        },
        EventType::MassAwakening => EventKind::MassAwakening {
            node_id: f.entity("node_id")?,
            old_consciousness: f.float("old_consciousness")?,
            new_consciousness: f.float("new_consciousness")?,
        },
        EventType::ExcessiveForce => EventKind::ExcessiveForce {
            node_id: f.entity("node_id")?,
            repression: f.float("repression")?,
            agitation: f.float("agitation")?,
        },
        EventType::Uprising => EventKind::Uprising {
            node_id: f.entity("node_id")?,
            p_revolution: f.float("p_revolution")?,
            p_acquiescence: f.float("p_acquiescence")?,
            wealth_destroyed: f.currency("wealth_destroyed")?,
        },
        EventType::SolidaritySpike => EventKind::SolidaritySpike {
            node_id: f.entity("node_id")?,
            edges_strengthened: f.int("edges_strengthened")?,
            solidarity_gain: f.float("solidarity_gain")?,
        },
        EventType::Rupture => EventKind::Rupture {
            source_id: f.entity("source_id")?,
            target_id: f.entity("target_id")?,
            tension: f.float("tension")?,
        },
        EventType::PopulationAttrition => EventKind::PopulationAttrition {
            node_id: f.entity("node_id")?,
            deaths: f.int("deaths")?,
            remaining_population: f.int("remaining_population")?,
            coverage_ratio: f.float("coverage_ratio")?,
        },
        EventType::EntityDeath => EventKind::EntityDeath {
            node_id: f.entity("node_id")?,
        },
        EventType::HeatBandShift => EventKind::HeatBandShift {
            territory_id: f.territory("territory_id")?,
            previous_band: f.band("previous_band")?,
            new_band: f.band("new_band")?,
            heat: f.float("heat")?,
        },
        EventType::EvictionTriggered => EventKind::EvictionTriggered {
            territory_id: f.territory("territory_id")?,
            heat: f.float("heat")?,
            displaced_population: f.int("displaced_population")?,
            destination_id: f.opt_territory("destination_id")?,
        },
        EventType::EcologicalOvershoot => EventKind::EcologicalOvershoot {
            overshoot_ratio: f.float("overshoot_ratio")?,
            total_biocapacity: f.float("total_biocapacity")?,
            total_consumption: f.float("total_consumption")?,
        },
        EventType::PhaseTransition => EventKind::PhaseTransition {
            previous_state: f.phase("previous_state")?,
            new_state: f.phase("new_state")?,
            percolation_ratio: f.float("percolation_ratio")?,
            largest_component_size: f.int("largest_component_size")?,
            num_components: f.int("num_components")?,
            cadre_density: f.float("cadre_density")?,
            is_resilient: f.opt_bool("is_resilient")?,
        },
        EventType::ExternalAction => EventKind::ExternalAction {
            actor_id: f.entity("actor_id")?,
            action: f.text("action")?,
            target_id: f.opt_node("target_id")?,
            magnitude: f.float("magnitude")?,
        },
    };

    f.finish(kind)
}

impl TryFrom<RawEvent> for SimulationEvent {
    type Error = EventConversionError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let kind = convert_kind(raw.event_type, raw.payload)?;
        Ok(SimulationEvent {
            tick: raw.tick,
            timestamp: raw.timestamp,
            kind,
        })
    }
}

/// Convert a whole tick's log, preserving order; the first failure aborts.
pub fn convert_all(raw: Vec<RawEvent>) -> Result<Vec<SimulationEvent>, EventConversionError> {
    raw.into_iter().map(SimulationEvent::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload;

    fn raw(event_type: EventType, payload: Payload) -> RawEvent {
        RawEvent {
            event_type,
            tick: 4,
            timestamp: None,
            payload,
        }
    }

    #[test]
    fn test_extraction_converts() {
        let event = SimulationEvent::try_from(raw(
            EventType::SurplusExtraction,
            payload! { "source_id" => "C001", "target_id" => "C002", "amount" => 10.0 },
        ))
        .unwrap();
        assert_eq!(event.tick, 4);
        match event.kind {
            EventKind::SurplusExtraction { amount, .. } => assert_eq!(amount.get(), 10.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_key_fails() {
        let err = SimulationEvent::try_from(raw(
            EventType::SurplusExtraction,
            payload! { "source_id" => "C001", "amount" => 10.0 },
        ))
        .unwrap_err();
        assert_eq!(
            err,
            EventConversionError::MissingKey {
                event_type: "surplus_extraction".into(),
                key: "target_id".into()
            }
        );
    }

    #[test]
    fn test_extra_key_fails() {
        let err = SimulationEvent::try_from(raw(
            EventType::EntityDeath,
            payload! { "node_id" => "C001", "cause" => "famine" },
        ))
        .unwrap_err();
        assert!(matches!(err, EventConversionError::UnexpectedKey { ref key, .. } if key == "cause"));
    }

    #[test]
    fn test_wrong_type_fails() {
        let err = SimulationEvent::try_from(raw(
            EventType::PopulationAttrition,
            payload! {
                "node_id" => "C001",
                "deaths" => 2.5,
                "remaining_population" => 10u64,
                "coverage_ratio" => 0.5,
            },
        ))
        .unwrap_err();
        assert!(matches!(err, EventConversionError::WrongType { ref key, .. } if key == "deaths"));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = SimulationEvent::try_from(raw(
            EventType::WagesPaid,
            payload! { "source_id" => "C002", "target_id" => "C003", "amount" => -1.0 },
        ))
        .unwrap_err();
        assert!(matches!(err, EventConversionError::InvalidValue { .. }));
    }

    #[test]
    fn test_optional_flag_may_be_absent() {
        let event = SimulationEvent::try_from(raw(
            EventType::PhaseTransition,
            payload! {
                "previous_state" => "gaseous",
                "new_state" => "transitional",
                "percolation_ratio" => 0.25,
                "largest_component_size" => 2u64,
                "num_components" => 6u64,
                "cadre_density" => 0.0,
            },
        ))
        .unwrap();
        match event.kind {
            EventKind::PhaseTransition { is_resilient, .. } => assert_eq!(is_resilient, None),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_convert_all_keeps_order() {
        let events = convert_all(vec![
            raw(EventType::EntityDeath, payload! { "node_id" => "C002" }),
            raw(EventType::EntityDeath, payload! { "node_id" => "C001" }),
        ])
        .unwrap();
        assert!(events[0].kind.involves("C002"));
        assert!(events[1].kind.involves("C001"));
    }
}
