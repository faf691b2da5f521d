//! Value production on territories

use crate::core::error::SystemError;
use crate::events::types::EventType;
use crate::formulas::economic::efficiency_multiplier;
use crate::payload;
use crate::state::fields::keys;
use crate::state::graph::SimGraph;
use crate::state::relationship::EdgeType;
use crate::systems::{is_active, node_name, scratch, RunContext, Services, System};

/// Each TENANCY edge yields `labor_power × efficiency × biocapacity ratio`
/// to the tenant class. What is produced is drawn out of the territory and
/// handed to metabolism through scratch.
pub struct ProductionSystem;

impl System for ProductionSystem {
    fn name(&self) -> &'static str {
        "production"
    }

    fn step(
        &self,
        graph: &mut SimGraph,
        services: &mut Services<'_>,
        _context: &mut RunContext,
    ) -> Result<(), SystemError> {
        let economy = &services.config.economy;
        let efficiency = efficiency_multiplier(
            services.tick,
            economy.efficiency_decay_coefficient,
            economy.efficiency_floor,
        );
        let labor_power = economy.labor_power;

        for edge_idx in graph.edges_of_type(EdgeType::Tenancy) {
            let (class, territory) = {
                let edge = graph.edge(edge_idx);
                (edge.source, edge.target)
            };
            if !is_active(graph, class)? {
                continue;
            }

            let biocapacity = graph.float(territory, keys::BIOCAPACITY)?;
            let max_biocapacity = graph.float(territory, keys::MAX_BIOCAPACITY)?;
            let ratio = if max_biocapacity > 0.0 {
                (biocapacity / max_biocapacity).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let amount = services.quantize(labor_power * efficiency * ratio);
            if amount <= 0.0 {
                continue;
            }

            let wealth = graph.float(class, keys::WEALTH)?;
            graph.set_float(class, keys::WEALTH, services.quantize(wealth + amount));
            graph.set_edge_float(edge_idx, keys::VALUE_FLOW, amount);

            let class_id = node_name(graph, class).to_string();
            let territory_id = node_name(graph, territory).to_string();
            services.scratch.add(scratch::PRODUCED, &class_id, amount);
            services
                .scratch
                .add(scratch::TERRITORY_EXTRACTION, &territory_id, amount);

            tracing::trace!(class = %class_id, territory = %territory_id, amount, "value produced");
            services.publish(
                EventType::ValueProduced,
                payload! {
                    "node_id" => class_id,
                    "territory_id" => territory_id,
                    "amount" => amount,
                },
            );
        }
        Ok(())
    }
}
