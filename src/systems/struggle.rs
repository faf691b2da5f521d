//! Sparks and uprisings

use crate::core::error::SystemError;
use crate::events::types::EventType;
use crate::formulas::survival::rupture_condition;
use crate::payload;
use crate::state::fields::keys;
use crate::state::graph::SimGraph;
use crate::state::relationship::EdgeType;
use crate::systems::{active_classes, node_name, role_of, RunContext, Services, System};

/// A heavily repressed, agitated class suffers excessive force. If revolt then
/// looks better than acquiescence it rises: some of its wealth is destroyed,
/// it gains organization, releases agitation and tightens its solidarity
/// ties. The force event always precedes the uprising it triggers.
pub struct StruggleSystem;

impl System for StruggleSystem {
    fn name(&self) -> &'static str {
        "struggle"
    }

    fn step(
        &self,
        graph: &mut SimGraph,
        services: &mut Services<'_>,
        _context: &mut RunContext,
    ) -> Result<(), SystemError> {
        let params = services.config.struggle.clone();

        for idx in active_classes(graph)? {
            if role_of(graph, idx)?.is_exploiter() {
                continue;
            }
            let repression = graph.float(idx, keys::REPRESSION_FACED)?;
            let agitation = graph.float(idx, keys::AGITATION)?;
            if repression < params.spark_repression_threshold
                || agitation < params.spark_agitation_threshold
            {
                continue;
            }

            let id = node_name(graph, idx).to_string();
            tracing::debug!(class = %id, repression, agitation, "excessive force");
            services.publish(
                EventType::ExcessiveForce,
                payload! {
                    "node_id" => id.as_str(),
                    "repression" => repression,
                    "agitation" => agitation,
                },
            );

            let p_rev = graph.float(idx, keys::P_REVOLUTION)?;
            let p_acq = graph.float(idx, keys::P_ACQUIESCENCE)?;
            if !rupture_condition(p_rev, p_acq) {
                continue;
            }

            let wealth = graph.float(idx, keys::WEALTH)?;
            let destroyed = services.quantize(wealth * params.uprising_wealth_destruction);
            graph.set_float(idx, keys::WEALTH, services.quantize(wealth - destroyed));

            let organization = graph.float(idx, keys::ORGANIZATION)?;
            graph.set_float(
                idx,
                keys::ORGANIZATION,
                services.quantize((organization + params.uprising_organization_gain).min(1.0)),
            );
            graph.set_float(
                idx,
                keys::AGITATION,
                services.quantize(agitation * (1.0 - params.agitation_release)),
            );

            tracing::info!(class = %id, p_rev, p_acq, "uprising");
            services.publish(
                EventType::Uprising,
                payload! {
                    "node_id" => id.as_str(),
                    "p_revolution" => p_rev,
                    "p_acquiescence" => p_acq,
                    "wealth_destroyed" => destroyed,
                },
            );

            let ties = graph.incident_edges(idx, EdgeType::Solidarity);
            for &edge in &ties {
                let strength = graph.edge_float(edge, keys::SOLIDARITY_STRENGTH)?;
                graph.set_edge_float(
                    edge,
                    keys::SOLIDARITY_STRENGTH,
                    services.quantize((strength + params.solidarity_gain).min(1.0)),
                );
            }
            if !ties.is_empty() {
                services.publish(
                    EventType::SolidaritySpike,
                    payload! {
                        "node_id" => id,
                        "edges_strengthened" => ties.len() as u64,
                        "solidarity_gain" => params.solidarity_gain,
                    },
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bounded::{Currency, Intensity, Probability};
    use crate::core::config::SimulationConfig;
    use crate::core::types::EntityId;
    use crate::events::bus::RawEvent;
    use crate::state::entity::{SocialClass, SocialRole};
    use crate::state::graph::{EdgeIdx, NodeIdx};
    use crate::state::relationship::Relationship;
    use crate::state::world::WorldState;
    use crate::systems::test_support::run_system;

    fn rebel(p_rev: f64, p_acq: f64) -> WorldState {
        let c1 = EntityId::parse("C001").unwrap();
        let c2 = EntityId::parse("C002").unwrap();
        let mut class = SocialClass::new(c1.clone(), SocialRole::PeripheryProletariat)
            .with_wealth(Currency::new(100.0).unwrap());
        class.repression_faced = Probability::new(0.7).unwrap();
        class.ideology.agitation = Intensity::new(0.8).unwrap();
        class.survival.p_revolution = Probability::new(p_rev).unwrap();
        class.survival.p_acquiescence = Probability::new(p_acq).unwrap();
        WorldState::new()
            .with_entity(class)
            .with_entity(SocialClass::new(c2.clone(), SocialRole::PeripheryProletariat))
            .with_relationship(
                Relationship::new(c1, c2, EdgeType::Solidarity)
                    .with_strength(Probability::new(0.3).unwrap()),
            )
    }

    fn types(events: &[RawEvent]) -> Vec<EventType> {
        events.iter().map(|e| e.event_type).collect()
    }

    #[test]
    fn test_force_precedes_uprising() {
        let config = SimulationConfig::default();
        let mut ctx = RunContext::new();
        let (graph, services) = run_system(&StruggleSystem, &rebel(0.9, 0.2), &config, &mut ctx);
        assert_eq!(
            types(services.bus.history()),
            vec![
                EventType::ExcessiveForce,
                EventType::Uprising,
                EventType::SolidaritySpike
            ]
        );
        assert_eq!(graph.float(NodeIdx(0), keys::WEALTH).unwrap(), 95.0);
        assert_eq!(graph.float(NodeIdx(0), keys::AGITATION).unwrap(), 0.4);
        assert_eq!(graph.edge_float(EdgeIdx(0), keys::SOLIDARITY_STRENGTH).unwrap(), 0.4);
    }

    #[test]
    fn test_force_without_rupture() {
        let config = SimulationConfig::default();
        let mut ctx = RunContext::new();
        let (graph, services) = run_system(&StruggleSystem, &rebel(0.1, 0.9), &config, &mut ctx);
        assert_eq!(types(services.bus.history()), vec![EventType::ExcessiveForce]);
        assert_eq!(graph.float(NodeIdx(0), keys::WEALTH).unwrap(), 100.0);
    }
}
