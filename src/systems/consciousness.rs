//! Ideological drift of the exploited classes

use crate::core::error::SystemError;
use crate::formulas::consciousness::{ideological_drift, DriftInputs, IdeologyState};
use crate::state::fields::keys;
use crate::state::graph::SimGraph;
use crate::systems::{active_classes, node_name, role_of, scratch, RunContext, Services, System};

/// Applies [`ideological_drift`] to every living non-exploiter class using
/// what the economic systems left in scratch this tick.
pub struct ConsciousnessSystem;

impl System for ConsciousnessSystem {
    fn name(&self) -> &'static str {
        "consciousness"
    }

    fn step(
        &self,
        graph: &mut SimGraph,
        services: &mut Services<'_>,
        _context: &mut RunContext,
    ) -> Result<(), SystemError> {
        let params = services.config.consciousness.clone();

        for idx in active_classes(graph)? {
            if role_of(graph, idx)?.is_exploiter() {
                continue;
            }
            let id = node_name(graph, idx).to_string();
            let s = &services.scratch;

            let wealth = graph.float(idx, keys::WEALTH)?;
            let start = s.get_or(scratch::START_WEALTH, &id, wealth);
            let wealth_change = if start > 0.0 {
                (wealth - start) / start
            } else {
                0.0
            };

            let inputs = DriftInputs {
                core_wages: s.get_or(scratch::WAGES, &id, 0.0),
                value_produced: s.get_or(scratch::EXTRACTED, &id, 0.0)
                    + s.get_or(scratch::PRODUCED, &id, 0.0),
                wage_change: s.get_or(scratch::WAGE_CHANGE, &id, 0.0),
                wealth_change,
                solidarity_pressure: s.get_or(scratch::SOLIDARITY_PRESSURE, &id, 0.0),
            };
            let before = IdeologyState {
                class_consciousness: graph.float(idx, keys::CLASS_CONSCIOUSNESS)?,
                national_identity: graph.float(idx, keys::NATIONAL_IDENTITY)?,
                agitation: graph.float(idx, keys::AGITATION)?,
            };

            let after = ideological_drift(before, inputs, &params);

            graph.set_float(
                idx,
                keys::CLASS_CONSCIOUSNESS,
                services.quantize(after.class_consciousness),
            );
            graph.set_float(
                idx,
                keys::NATIONAL_IDENTITY,
                services.quantize(after.national_identity),
            );
            graph.set_float(idx, keys::AGITATION, services.quantize(after.agitation));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bounded::Currency;
    use crate::core::config::SimulationConfig;
    use crate::core::types::EntityId;
    use crate::state::entity::{SocialClass, SocialRole};
    use crate::state::graph::NodeIdx;
    use crate::state::world::WorldState;
    use crate::systems::Services;

    fn run(pressure: f64) -> SimGraph {
        let state = WorldState::new().with_entity(
            SocialClass::new(EntityId::parse("C001").unwrap(), SocialRole::PeripheryProletariat)
                .with_wealth(Currency::new(80.0).unwrap()),
        );
        let config = SimulationConfig::default();
        let mut graph = state.to_graph().unwrap();
        let mut services = Services::new(0, &config);
        services.scratch.set(scratch::START_WEALTH, "C001", 100.0);
        services.scratch.set(scratch::SOLIDARITY_PRESSURE, "C001", pressure);
        ConsciousnessSystem
            .step(&mut graph, &mut services, &mut RunContext::new())
            .unwrap();
        graph
    }

    #[test]
    fn test_same_loss_bifurcates_on_solidarity() {
        let organised = run(0.5);
        let isolated = run(0.0);
        let cc = |g: &SimGraph| g.float(NodeIdx(0), keys::CLASS_CONSCIOUSNESS).unwrap();
        let ni = |g: &SimGraph| g.float(NodeIdx(0), keys::NATIONAL_IDENTITY).unwrap();

        assert!(cc(&organised) > 0.0);
        assert_eq!(cc(&isolated), 0.0);
        assert!(ni(&isolated) > ni(&organised));
    }

    #[test]
    fn test_exploiters_are_not_drifted() {
        let state = WorldState::new().with_entity(SocialClass::new(
            EntityId::parse("C001").unwrap(),
            SocialRole::CoreBourgeoisie,
        ));
        let config = SimulationConfig::default();
        let mut graph = state.to_graph().unwrap();
        let before = graph.clone();
        let mut services = Services::new(0, &config);
        services.scratch.set(scratch::START_WEALTH, "C001", 100.0);
        ConsciousnessSystem
            .step(&mut graph, &mut services, &mut RunContext::new())
            .unwrap();
        assert_eq!(graph, before);
    }
}
