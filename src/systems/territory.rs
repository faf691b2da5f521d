//! Territory heat, bands and evictions

use crate::core::error::SystemError;
use crate::core::types::NodeKind;
use crate::events::types::EventType;
use crate::formulas::territory::{territory_heat, HeatBand};
use crate::payload;
use crate::state::fields::keys;
use crate::state::graph::{NodeIdx, SimGraph};
use crate::state::relationship::EdgeType;
use crate::state::territory::OperationalProfile;
use crate::systems::{node_name, RunContext, Services, System};

/// Heat builds on high-profile territories and leaks to cooler neighbours
/// along ADJACENCY edges. Crossing into the eviction band starts an eviction:
/// rent spikes and part of the population moves to the coolest neighbour.
pub struct TerritorySystem;

/// Coolest territory sharing an ADJACENCY edge with `node`, lowest id on ties.
fn coolest_neighbour(graph: &SimGraph, node: NodeIdx) -> Result<Option<NodeIdx>, SystemError> {
    let mut best: Option<(f64, NodeIdx)> = None;
    for edge in graph.incident_edges(node, EdgeType::Adjacency) {
        let e = graph.edge(edge);
        let other = if e.source == node { e.target } else { e.source };
        if other == node {
            continue;
        }
        let heat = graph.float(other, keys::HEAT)?;
        let better = match best {
            None => true,
            Some((h, idx)) => {
                heat < h || (heat == h && node_name(graph, other) < node_name(graph, idx))
            }
        };
        if better {
            best = Some((heat, other));
        }
    }
    Ok(best.map(|(_, idx)| idx))
}

impl System for TerritorySystem {
    fn name(&self) -> &'static str {
        "territory"
    }

    fn step(
        &self,
        graph: &mut SimGraph,
        services: &mut Services<'_>,
        _context: &mut RunContext,
    ) -> Result<(), SystemError> {
        let params = services.config.territory.clone();
        let territories = graph.nodes_of_kind(NodeKind::Territory);
        if territories.is_empty() {
            return Ok(());
        }

        let mut before = Vec::with_capacity(territories.len());
        for &idx in &territories {
            let heat = graph.float(idx, keys::HEAT)?;
            before.push(HeatBand::classify(
                heat,
                params.surveillance_threshold,
                params.eviction_threshold,
            ));

            let high_profile = graph.text(idx, keys::PROFILE)?
                == OperationalProfile::HighProfile.as_str();
            let gain = if high_profile { params.heat_gain_rate } else { 0.0 };
            let updated = services.quantize(territory_heat(heat, gain, params.heat_decay_rate));
            graph.set_float(idx, keys::HEAT, updated);
        }

        // Spillover reads a snapshot so edge order does not matter
        let mut spill = vec![0.0; graph.node_count()];
        for edge in graph.edges_of_type(EdgeType::Adjacency) {
            let (source, target) = {
                let e = graph.edge(edge);
                (e.source, e.target)
            };
            let gradient = graph.float(source, keys::HEAT)? - graph.float(target, keys::HEAT)?;
            let flow = params.heat_spillover_rate * gradient;
            if flow > 0.0 {
                spill[source.0] -= flow;
                spill[target.0] += flow;
            }
        }
        for &idx in &territories {
            if spill[idx.0] != 0.0 {
                let heat = graph.float(idx, keys::HEAT)?;
                let updated = services.quantize((heat + spill[idx.0]).clamp(0.0, 1.0));
                graph.set_float(idx, keys::HEAT, updated);
            }
        }

        for (&idx, &previous) in territories.iter().zip(&before) {
            let heat = graph.float(idx, keys::HEAT)?;
            let band =
                HeatBand::classify(heat, params.surveillance_threshold, params.eviction_threshold);
            let id = node_name(graph, idx).to_string();

            if band != previous {
                tracing::debug!(territory = %id, from = %previous, to = %band, "heat band shift");
                services.publish(
                    EventType::HeatBandShift,
                    payload! {
                        "territory_id" => id.as_str(),
                        "previous_band" => previous.as_str(),
                        "new_band" => band.as_str(),
                        "heat" => heat,
                    },
                );
            }

            let under_eviction = graph.boolean(idx, keys::UNDER_EVICTION)?;
            if band == HeatBand::Eviction && !under_eviction {
                graph.set_bool(idx, keys::UNDER_EVICTION, true);
                let rent = graph.float(idx, keys::RENT_LEVEL)?;
                graph.set_float(
                    idx,
                    keys::RENT_LEVEL,
                    services.quantize(rent * params.rent_spike_multiplier),
                );

                let population = graph.int(idx, keys::TERRITORY_POPULATION)?;
                let destination = coolest_neighbour(graph, idx)?;
                let displaced = match destination {
                    Some(_) => (population as f64 * params.displacement_rate).floor() as u64,
                    None => 0,
                };
                let mut payload = payload! {
                    "territory_id" => id.as_str(),
                    "heat" => heat,
                    "displaced_population" => displaced,
                };
                if let Some(dest) = destination {
                    let arrivals = graph.int(dest, keys::TERRITORY_POPULATION)?;
                    graph.set_int(idx, keys::TERRITORY_POPULATION, population - displaced);
                    graph.set_int(dest, keys::TERRITORY_POPULATION, arrivals + displaced);
                    payload.insert("destination_id".into(), node_name(graph, dest).into());
                }
                tracing::info!(territory = %id, displaced, "eviction triggered");
                services.publish(EventType::EvictionTriggered, payload);
            } else if under_eviction && band != HeatBand::Eviction {
                graph.set_bool(idx, keys::UNDER_EVICTION, false);
            }
        }
        Ok(())
    }
}
