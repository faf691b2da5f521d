//! Percolation analysis of the solidarity network

use ahash::AHashMap;
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{SimulationConfig, TopologyDefines};
use crate::core::quantize::GridPolicy;
use crate::core::tagged::tagged_enum;
use crate::core::types::Tick;
use crate::events::types::{EventKind, SimulationEvent};
use crate::observers::SimulationObserver;
use crate::state::relationship::EdgeType;
use crate::state::world::WorldState;

tagged_enum! {
    /// Phase of the solidarity network
    pub enum TopologyPhase {
        /// No giant component; isolated cells
        Gaseous => "gaseous",
        Transitional => "transitional",
        /// Giant component held together by weak ties
        Liquid => "liquid",
        /// Giant component with a dense cadre core
        Solid => "solid",
    }
}

/// Metrics for one observed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    pub tick: Tick,
    pub total_nodes: usize,
    pub num_components: usize,
    pub largest_component_size: usize,
    pub percolation_ratio: f64,
    /// SOLIDARITY edges at or above the sympathizer threshold
    pub potential_liquidity: usize,
    /// SOLIDARITY edges at or above the cadre threshold
    pub actual_liquidity: usize,
    pub cadre_density: f64,
    pub phase: TopologyPhase,
    /// Only set on ticks where the resilience test ran
    pub is_resilient: Option<bool>,
}

/// Union-find over node positions.
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
    }
}

/// `(component count, largest component size)` over the kept nodes.
fn components(n: usize, edges: &[(usize, usize)], keep: &[bool]) -> (usize, usize) {
    let mut set = DisjointSet::new(n);
    for &(a, b) in edges {
        if keep[a] && keep[b] {
            set.union(a, b);
        }
    }
    let mut count = 0;
    let mut largest = 0;
    for node in 0..n {
        if keep[node] && set.find(node) == node {
            count += 1;
            largest = largest.max(set.size[node]);
        }
    }
    (count, largest)
}

pub fn classify_phase(
    percolation_ratio: f64,
    cadre_density: f64,
    params: &TopologyDefines,
) -> TopologyPhase {
    if percolation_ratio < params.gaseous_threshold {
        TopologyPhase::Gaseous
    } else if percolation_ratio < params.condensation_threshold {
        TopologyPhase::Transitional
    } else if cadre_density >= params.cadre_density_threshold {
        TopologyPhase::Solid
    } else {
        TopologyPhase::Liquid
    }
}

/// Watches the undirected SOLIDARITY subgraph among living classes and
/// announces phase changes through its outbox.
pub struct TopologyMonitor {
    params: TopologyDefines,
    policy: GridPolicy,
    previous_phase: Option<TopologyPhase>,
    history: Vec<TopologySnapshot>,
    outbox: Vec<SimulationEvent>,
}

impl TopologyMonitor {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            params: config.topology.clone(),
            policy: config.precision,
            previous_phase: None,
            history: Vec::new(),
            outbox: Vec::new(),
        }
    }

    pub fn history(&self) -> &[TopologySnapshot] {
        &self.history
    }

    pub fn current_phase(&self) -> Option<TopologyPhase> {
        self.previous_phase
    }

    /// Computes the metrics of a state without recording them.
    pub fn analyze(&self, state: &WorldState) -> TopologySnapshot {
        let params = &self.params;
        let nodes: Vec<&str> = state.active_entities().map(|c| c.id.as_str()).collect();
        let position: AHashMap<&str, usize> =
            nodes.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut edges = Vec::new();
        let mut potential = 0;
        let mut actual = 0;
        for rel in &state.relationships {
            if rel.edge_type != EdgeType::Solidarity {
                continue;
            }
            let (Some(&a), Some(&b)) = (
                position.get(rel.source.as_str()),
                position.get(rel.target.as_str()),
            ) else {
                continue;
            };
            let strength = rel.solidarity_strength.get();
            if strength >= params.min_edge_strength {
                edges.push((a, b));
            }
            if strength >= params.sympathizer_threshold {
                potential += 1;
            }
            if strength >= params.cadre_threshold {
                actual += 1;
            }
        }

        let n = nodes.len();
        let keep = vec![true; n];
        let (num_components, largest) = components(n, &edges, &keep);
        let percolation_ratio = if n == 0 {
            0.0
        } else {
            self.policy.quantize(largest as f64 / n as f64)
        };
        let cadre_density = if potential == 0 {
            0.0
        } else {
            self.policy.quantize(actual as f64 / potential as f64)
        };

        let is_resilient = self.resilience_due(state.tick, n).then(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(params.seed ^ state.tick);
            let removed = (n as f64 * params.resilience_removal_rate).floor() as usize;
            let mut survivors = vec![true; n];
            for node in index::sample(&mut rng, n, removed).iter() {
                survivors[node] = false;
            }
            let (_, remaining) = components(n, &edges, &survivors);
            largest > 0 && remaining as f64 >= params.survival_threshold * largest as f64
        });

        TopologySnapshot {
            tick: state.tick,
            total_nodes: n,
            num_components,
            largest_component_size: largest,
            percolation_ratio,
            potential_liquidity: potential,
            actual_liquidity: actual,
            cadre_density,
            phase: classify_phase(percolation_ratio, cadre_density, params),
            is_resilient,
        }
    }

    fn resilience_due(&self, tick: Tick, nodes: usize) -> bool {
        let interval = self.params.resilience_test_interval;
        interval > 0 && nodes > 0 && tick % interval == 0
    }

    fn record(&mut self, state: &WorldState) {
        let snapshot = self.analyze(state);
        tracing::debug!(
            tick = snapshot.tick,
            phase = %snapshot.phase,
            percolation = snapshot.percolation_ratio,
            "topology snapshot"
        );

        if let Some(previous) = self.previous_phase {
            if previous != snapshot.phase {
                tracing::info!(
                    tick = snapshot.tick,
                    from = %previous,
                    to = %snapshot.phase,
                    "phase transition"
                );
                self.outbox.push(SimulationEvent::new(
                    snapshot.tick,
                    EventKind::PhaseTransition {
                        previous_state: previous,
                        new_state: snapshot.phase,
                        percolation_ratio: snapshot.percolation_ratio,
                        largest_component_size: snapshot.largest_component_size as u64,
                        num_components: snapshot.num_components as u64,
                        cadre_density: snapshot.cadre_density,
                        is_resilient: snapshot.is_resilient,
                    },
                ));
            }
        }
        self.previous_phase = Some(snapshot.phase);
        self.history.push(snapshot);
    }
}

impl SimulationObserver for TopologyMonitor {
    fn name(&self) -> &str {
        "topology"
    }

    /// The initial state sets the baseline phase without an event.
    fn on_simulation_start(&mut self, initial: &WorldState) {
        self.previous_phase = None;
        self.history.clear();
        self.outbox.clear();
        self.record(initial);
    }

    fn on_tick(&mut self, _previous: &WorldState, new: &WorldState) {
        self.record(new);
    }

    fn drain_outbox(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.outbox)
    }
}
