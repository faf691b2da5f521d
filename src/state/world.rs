//! Immutable world snapshot and its graph projection

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::error::{ReconstructionError, Result};
use crate::core::quantize::GridPolicy;
use crate::core::types::{EntityId, NodeKind, TerritoryId, Tick};
use crate::events::types::SimulationEvent;
use crate::state::entity::SocialClass;
use crate::state::fields::{flatten_class, flatten_relationship, flatten_territory};
use crate::state::graph::SimGraph;
use crate::state::ingest::{normalize_class, normalize_relationship, normalize_territory};
use crate::state::relationship::Relationship;
use crate::state::territory::Territory;

/// The state of the world at one tick. Each tick produces a new value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldState {
    pub tick: Tick,
    pub entities: BTreeMap<EntityId, SocialClass>,
    #[serde(default)]
    pub territories: BTreeMap<TerritoryId, Territory>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// Events published while producing this state
    #[serde(default)]
    pub events: Vec<SimulationEvent>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, class: SocialClass) -> Self {
        self.entities.insert(class.id.clone(), class);
        self
    }

    pub fn with_territory(mut self, territory: Territory) -> Self {
        self.territories.insert(territory.id.clone(), territory);
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn entity(&self, id: &str) -> Option<&SocialClass> {
        EntityId::parse(id).ok().and_then(|key| self.entities.get(&key))
    }

    pub fn territory(&self, id: &str) -> Option<&Territory> {
        TerritoryId::parse(id)
            .ok()
            .and_then(|key| self.territories.get(&key))
    }

    pub fn total_wealth(&self) -> f64 {
        self.entities.values().map(|c| c.wealth.get()).sum()
    }

    pub fn total_population(&self) -> u64 {
        self.entities.values().map(|c| c.population).sum()
    }

    pub fn active_entities(&self) -> impl Iterator<Item = &SocialClass> {
        self.entities.values().filter(|c| c.active)
    }

    /// Map keys agree with ids and every relationship joins existing nodes of
    /// the kinds its type allows.
    pub fn check_references(&self) -> std::result::Result<(), ReconstructionError> {
        for (key, class) in &self.entities {
            if key != &class.id {
                return Err(ReconstructionError::InvalidId(format!(
                    "entity key {} holds {}",
                    key, class.id
                )));
            }
        }
        for (key, territory) in &self.territories {
            if key != &territory.id {
                return Err(ReconstructionError::InvalidId(format!(
                    "territory key {} holds {}",
                    key, territory.id
                )));
            }
        }

        for (index, rel) in self.relationships.iter().enumerate() {
            let edge_error = |detail: &str| ReconstructionError::Edge {
                index,
                source_id: rel.source.to_string(),
                target_id: rel.target.to_string(),
                detail: detail.to_string(),
            };
            let (want_source, want_target) = rel.edge_type.endpoints();
            if rel.source.kind() != want_source || rel.target.kind() != want_target {
                return Err(edge_error("endpoint kinds do not match edge type"));
            }
            for end in [&rel.source, &rel.target] {
                let present = match end.kind() {
                    NodeKind::SocialClass => self.entity(end.as_str()).is_some(),
                    NodeKind::Territory => self.territory(end.as_str()).is_some(),
                };
                if !present {
                    return Err(edge_error(&format!("unknown node {}", end)));
                }
            }
        }
        Ok(())
    }

    /// Project into a fresh mutable graph. Classes come first, then
    /// territories, each in id order; edges keep relationship order.
    pub fn to_graph(&self) -> std::result::Result<SimGraph, ReconstructionError> {
        let mut graph = SimGraph::new();
        for class in self.entities.values() {
            graph
                .add_node(class.id.node_id(), flatten_class(class))
                .map_err(|e| ReconstructionError::InvalidId(e.to_string()))?;
        }
        for territory in self.territories.values() {
            graph
                .add_node(territory.id.node_id(), flatten_territory(territory))
                .map_err(|e| ReconstructionError::InvalidId(e.to_string()))?;
        }
        for (index, rel) in self.relationships.iter().enumerate() {
            graph
                .add_edge(
                    &rel.source,
                    &rel.target,
                    rel.edge_type,
                    flatten_relationship(rel),
                )
                .map_err(|e| ReconstructionError::Edge {
                    index,
                    source_id: rel.source.to_string(),
                    target_id: rel.target.to_string(),
                    detail: e.to_string(),
                })?;
        }
        Ok(graph)
    }

    /// Rebuild a state from a graph, re-validating every node and edge.
    pub fn from_graph(
        graph: &SimGraph,
        tick: Tick,
        events: Vec<SimulationEvent>,
        policy: GridPolicy,
    ) -> std::result::Result<WorldState, ReconstructionError> {
        let mut entities = BTreeMap::new();
        let mut territories = BTreeMap::new();

        for (_, node) in graph.nodes() {
            match node.kind() {
                NodeKind::SocialClass => {
                    let class = normalize_class(&node.id, &node.attrs, policy)?;
                    entities.insert(class.id.clone(), class);
                }
                NodeKind::Territory => {
                    let territory = normalize_territory(&node.id, &node.attrs, policy)?;
                    territories.insert(territory.id.clone(), territory);
                }
            }
        }

        let relationships = graph
            .edges()
            .map(|(idx, edge)| {
                normalize_relationship(
                    idx.0,
                    &graph.node(edge.source).id,
                    &graph.node(edge.target).id,
                    edge.edge_type,
                    &edge.attrs,
                    policy,
                )
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(WorldState {
            tick,
            entities,
            territories,
            relationships,
            events,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let state: WorldState = serde_json::from_str(json)?;
        state.check_references()?;
        Ok(state)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
