//! Metabolic rift

use crate::core::error::SystemError;
use crate::core::types::NodeKind;
use crate::events::types::EventType;
use crate::formulas::ecology::{biocapacity_delta, overshoot_ratio};
use crate::payload;
use crate::state::fields::keys;
use crate::state::graph::SimGraph;
use crate::systems::{active_classes, node_name, scratch, RunContext, Services, System};

/// Territories regenerate a share of their maximum biocapacity and lose what
/// production drew out of them, amplified by entropy. Global consumption by
/// the living population is compared with the remaining total.
pub struct MetabolismSystem;

impl System for MetabolismSystem {
    fn name(&self) -> &'static str {
        "metabolism"
    }

    fn step(
        &self,
        graph: &mut SimGraph,
        services: &mut Services<'_>,
        _context: &mut RunContext,
    ) -> Result<(), SystemError> {
        let params = services.config.metabolism.clone();
        let territories = graph.nodes_of_kind(NodeKind::Territory);
        if territories.is_empty() {
            return Ok(());
        }

        let mut total_biocapacity = 0.0;
        for idx in territories {
            let id = node_name(graph, idx).to_string();
            let extraction = services
                .scratch
                .get_or(scratch::TERRITORY_EXTRACTION, &id, 0.0);
            let biocapacity = graph.float(idx, keys::BIOCAPACITY)?;
            let max = graph.float(idx, keys::MAX_BIOCAPACITY)?;
            let regeneration = graph.float(idx, keys::REGENERATION_RATE)? * max;

            let delta = biocapacity_delta(regeneration, extraction, params.entropy_factor);
            let updated = services.quantize((biocapacity + delta).clamp(0.0, max));
            let intensity = if max > 0.0 {
                services.quantize((extraction / max).clamp(0.0, 1.0))
            } else {
                0.0
            };
            graph.set_float(idx, keys::BIOCAPACITY, updated);
            graph.set_float(idx, keys::EXTRACTION_INTENSITY, intensity);
            total_biocapacity += updated;
        }

        let mut population = 0u64;
        for idx in active_classes(graph)? {
            population += graph.int(idx, keys::POPULATION)?;
        }
        let consumption = services.quantize(population as f64 * params.consumption_per_capita);
        let total_biocapacity = services.quantize(total_biocapacity);
        let ratio = services.quantize(overshoot_ratio(
            consumption,
            total_biocapacity,
            params.max_overshoot_ratio,
        ));

        if ratio > 1.0 {
            tracing::warn!(ratio, total_biocapacity, consumption, "ecological overshoot");
            services.publish(
                EventType::EcologicalOvershoot,
                payload! {
                    "overshoot_ratio" => ratio,
                    "total_biocapacity" => total_biocapacity,
                    "total_consumption" => consumption,
                },
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bounded::Currency;
    use crate::core::config::SimulationConfig;
    use crate::core::types::{EntityId, TerritoryId};
    use crate::state::entity::{SocialClass, SocialRole};
    use crate::state::graph::NodeIdx;
    use crate::state::territory::{SectorType, Territory};
    use crate::state::world::WorldState;

    fn world(biocapacity: f64, population: u64) -> WorldState {
        let mut t = Territory::new(TerritoryId::parse("T001").unwrap(), SectorType::Industrial);
        t.biocapacity = Currency::new(biocapacity).unwrap();
        WorldState::new()
            .with_territory(t)
            .with_entity(
                SocialClass::new(EntityId::parse("C001").unwrap(), SocialRole::PeripheryProletariat)
                    .with_population(population),
            )
    }

    fn run(state: &WorldState, extraction: f64) -> (SimGraph, usize) {
        let config = SimulationConfig::default();
        let mut graph = state.to_graph().unwrap();
        let mut services = Services::new(0, &config);
        services
            .scratch
            .set(scratch::TERRITORY_EXTRACTION, "T001", extraction);
        MetabolismSystem
            .step(&mut graph, &mut services, &mut RunContext::new())
            .unwrap();
        let overshoots = services.bus.count(EventType::EcologicalOvershoot);
        (graph, overshoots)
    }

    #[test]
    fn test_extraction_outpaces_regeneration() {
        // Territory is the second node: classes are added first
        let (graph, overshoots) = run(&world(50.0, 1), 10.0);
        // 50 + 2 - 10 * 1.2
        assert_eq!(graph.float(NodeIdx(1), keys::BIOCAPACITY).unwrap(), 40.0);
        assert_eq!(graph.float(NodeIdx(1), keys::EXTRACTION_INTENSITY).unwrap(), 0.1);
        assert_eq!(overshoots, 0);
    }

    #[test]
    fn test_regeneration_capped_at_maximum() {
        let (graph, _) = run(&world(99.0, 1), 0.0);
        assert_eq!(graph.float(NodeIdx(1), keys::BIOCAPACITY).unwrap(), 100.0);
    }

    #[test]
    fn test_overshoot_when_consumption_exceeds_capacity() {
        // 10_000 people at 0.01 consume 100 against 52 remaining
        let (_, overshoots) = run(&world(50.0, 10_000), 0.0);
        assert_eq!(overshoots, 1);
    }
}
