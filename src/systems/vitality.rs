//! Coverage-ratio mortality

use crate::core::error::SystemError;
use crate::events::types::EventType;
use crate::formulas::vitality::{coverage_ratio, mortality};
use crate::payload;
use crate::state::fields::keys;
use crate::state::graph::SimGraph;
use crate::systems::{active_classes, node_name, RunContext, Services, System};

/// Kills off the share of a class its wealth cannot cover. Wealth is left
/// alone so survivors end up richer per head.
pub struct VitalitySystem;

impl System for VitalitySystem {
    fn name(&self) -> &'static str {
        "vitality"
    }

    fn step(
        &self,
        graph: &mut SimGraph,
        services: &mut Services<'_>,
        _context: &mut RunContext,
    ) -> Result<(), SystemError> {
        let subsistence = services.config.vitality.subsistence_per_capita;

        for idx in active_classes(graph)? {
            let wealth = graph.float(idx, keys::WEALTH)?;
            let population = graph.int(idx, keys::POPULATION)?;
            let inequality = graph.float(idx, keys::INEQUALITY)?;
            let id = node_name(graph, idx).to_string();

            let coverage = coverage_ratio(wealth, population, subsistence);
            let deaths = mortality(population, coverage, inequality);
            let remaining = population - deaths;

            if deaths > 0 {
                let coverage = services.quantize(coverage);
                graph.set_int(idx, keys::POPULATION, remaining);
                tracing::debug!(class = %id, deaths, remaining, "population attrition");
                services.publish(
                    EventType::PopulationAttrition,
                    payload! {
                        "node_id" => id.as_str(),
                        "deaths" => deaths,
                        "remaining_population" => remaining,
                        "coverage_ratio" => coverage,
                    },
                );
            }

            if remaining == 0 {
                graph.set_bool(idx, keys::ACTIVE, false);
                services.publish(EventType::EntityDeath, payload! { "node_id" => id.as_str() });
            }
        }
        Ok(())
    }
}
