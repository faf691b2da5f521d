//! Tension along exploitation edges

use crate::core::error::SystemError;
use crate::events::types::EventType;
use crate::payload;
use crate::state::fields::keys;
use crate::state::graph::SimGraph;
use crate::state::relationship::EdgeType;
use crate::systems::{is_active, node_name, RunContext, Services, System};

pub struct ContradictionSystem;

/// `|Wt − Ws| / (Wt + Ws)`, zero when both sides are broke.
fn wealth_gap(source: f64, target: f64) -> f64 {
    let total = source + target;
    if total <= 0.0 {
        0.0
    } else {
        (target - source).abs() / total
    }
}

impl System for ContradictionSystem {
    fn name(&self) -> &'static str {
        "contradiction"
    }

    fn step(
        &self,
        graph: &mut SimGraph,
        services: &mut Services<'_>,
        _context: &mut RunContext,
    ) -> Result<(), SystemError> {
        let rate = services.config.struggle.tension_accumulation_rate;

        for edge in graph.edges_of_type(EdgeType::Exploitation) {
            let (source, target) = {
                let e = graph.edge(edge);
                (e.source, e.target)
            };
            if !is_active(graph, source)? || !is_active(graph, target)? {
                continue;
            }
            let gap = wealth_gap(
                graph.float(source, keys::WEALTH)?,
                graph.float(target, keys::WEALTH)?,
            );
            let tension = graph.edge_float(edge, keys::TENSION)?;
            let updated = services.quantize((tension + rate * gap).min(1.0));
            graph.set_edge_float(edge, keys::TENSION, updated);

            if tension < 1.0 && updated >= 1.0 {
                let source_id = node_name(graph, source).to_string();
                let target_id = node_name(graph, target).to_string();
                tracing::info!(source = %source_id, target = %target_id, "rupture");
                services.publish(
                    EventType::Rupture,
                    payload! {
                        "source_id" => source_id,
                        "target_id" => target_id,
                        "tension" => updated,
                    },
                );
            }
        }
        Ok(())
    }
}
