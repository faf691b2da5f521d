//! Consciousness transmission along solidarity ties

use crate::core::error::SystemError;
use crate::events::types::EventType;
use crate::formulas::solidarity::solidarity_transmission;
use crate::payload;
use crate::state::fields::keys;
use crate::state::graph::SimGraph;
use crate::state::relationship::EdgeType;
use crate::systems::{active_classes, is_active, node_name, scratch, RunContext, Services, System};

/// Edges are processed in order and each sees the consciousness written by
/// the ones before it. A class crossing the mass-awakening threshold is
/// announced once, on the edge that carried it over.
pub struct SolidaritySystem;

impl System for SolidaritySystem {
    fn name(&self) -> &'static str {
        "solidarity"
    }

    fn step(
        &self,
        graph: &mut SimGraph,
        services: &mut Services<'_>,
        _context: &mut RunContext,
    ) -> Result<(), SystemError> {
        let threshold = services.config.solidarity.activation_threshold;
        let awakening = services.config.solidarity.mass_awakening_threshold;
        let solidarity_edges = graph.edges_of_type(EdgeType::Solidarity);

        // Pressure is the summed strength of every tie a class has, in either direction
        for idx in active_classes(graph)? {
            let mut pressure = 0.0;
            for edge in graph.incident_edges(idx, EdgeType::Solidarity) {
                pressure += graph.edge_float(edge, keys::SOLIDARITY_STRENGTH)?;
            }
            let id = node_name(graph, idx).to_string();
            services
                .scratch
                .set(scratch::SOLIDARITY_PRESSURE, &id, pressure);
        }

        for edge in solidarity_edges {
            let (source, target) = {
                let e = graph.edge(edge);
                (e.source, e.target)
            };
            if !is_active(graph, source)? || !is_active(graph, target)? {
                continue;
            }

            let strength = graph.edge_float(edge, keys::SOLIDARITY_STRENGTH)?;
            let source_cc = graph.float(source, keys::CLASS_CONSCIOUSNESS)?;
            let target_cc = graph.float(target, keys::CLASS_CONSCIOUSNESS)?;

            let delta = solidarity_transmission(source_cc, target_cc, strength, threshold);
            if delta <= 0.0 {
                continue;
            }
            let updated = services.quantize((target_cc + delta).clamp(0.0, 1.0));
            let delta = services.quantize(updated - target_cc);
            if delta <= 0.0 {
                continue;
            }
            graph.set_float(target, keys::CLASS_CONSCIOUSNESS, updated);

            let source_id = node_name(graph, source).to_string();
            let target_id = node_name(graph, target).to_string();
            tracing::trace!(source = %source_id, target = %target_id, delta, "consciousness transmitted");
            services.publish(
                EventType::ConsciousnessTransmission,
                payload! {
                    "source_id" => source_id,
                    "target_id" => target_id.as_str(),
                    "delta" => delta,
                },
            );

            if target_cc < awakening && updated >= awakening {
                tracing::debug!(class = %target_id, consciousness = updated, "mass awakening");
                services.publish(
                    EventType::MassAwakening,
                    payload! {
                        "node_id" => target_id,
                        "old_consciousness" => target_cc,
                        "new_consciousness" => updated,
                    },
                );
            }
        }
        Ok(())
    }
}
