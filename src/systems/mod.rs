//! Simulation systems
//!
//! A system is a stateless unit that mutates the tick's graph in place and
//! publishes events. Systems run in one fixed order and each sees the
//! mutations of the ones before it. Anything that must survive to the next
//! tick lives in the [`RunContext`]; anything shared between systems within a
//! tick lives in [`Services::scratch`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::config::SimulationConfig;
use crate::core::error::SystemError;
use crate::core::types::{NodeKind, Tick};
use crate::events::bus::{EventBus, Payload};
use crate::events::types::EventType;
use crate::state::entity::SocialRole;
use crate::state::fields::keys;
use crate::state::graph::{NodeIdx, SimGraph};

mod consciousness;
mod contradiction;
mod imperial_rent;
mod metabolism;
mod production;
mod solidarity;
mod struggle;
mod survival;
mod territory;
mod vitality;

pub use consciousness::ConsciousnessSystem;
pub use contradiction::ContradictionSystem;
pub use imperial_rent::ImperialRentSystem;
pub use metabolism::MetabolismSystem;
pub use production::ProductionSystem;
pub use solidarity::SolidaritySystem;
pub use struggle::StruggleSystem;
pub use survival::SurvivalSystem;
pub use territory::TerritorySystem;
pub use vitality::VitalitySystem;

/// Namespaced numeric store. Keys are `namespace.key`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Blackboard {
    values: BTreeMap<String, f64>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn full_key(namespace: &str, key: &str) -> String {
        format!("{}.{}", namespace, key)
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<f64> {
        self.values.get(&Self::full_key(namespace, key)).copied()
    }

    pub fn get_or(&self, namespace: &str, key: &str, default: f64) -> f64 {
        self.get(namespace, key).unwrap_or(default)
    }

    pub fn set(&mut self, namespace: &str, key: &str, value: f64) {
        self.values.insert(Self::full_key(namespace, key), value);
    }

    /// Adds to the stored value, starting from zero.
    pub fn add(&mut self, namespace: &str, key: &str, amount: f64) {
        *self
            .values
            .entry(Self::full_key(namespace, key))
            .or_insert(0.0) += amount;
    }

    pub fn contains(&self, namespace: &str, key: &str) -> bool {
        self.values.contains_key(&Self::full_key(namespace, key))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Cross-tick bookkeeping owned by the orchestrator.
pub type RunContext = Blackboard;

/// Scratch namespaces shared between systems inside one tick.
pub mod scratch {
    /// Wealth of each class when the tick began
    pub const START_WEALTH: &str = "engine.start_wealth";
    /// Value a class gave up to extraction this tick
    pub const EXTRACTED: &str = "economy.extracted";
    /// Rent a class received through extraction or tribute
    pub const RENT_IN: &str = "economy.rent_in";
    /// Wages and subsidies a class received
    pub const WAGES: &str = "economy.wages";
    pub const WAGE_CHANGE: &str = "economy.wage_change";
    /// Value a class produced on its territories
    pub const PRODUCED: &str = "production.produced";
    /// Value drawn out of a territory
    pub const TERRITORY_EXTRACTION: &str = "production.extraction";
    pub const SOLIDARITY_PRESSURE: &str = "solidarity.pressure";
}

/// What a system may use besides the graph.
pub struct Services<'a> {
    pub tick: Tick,
    pub config: &'a SimulationConfig,
    pub bus: EventBus,
    pub scratch: Blackboard,
}

impl<'a> Services<'a> {
    pub fn new(tick: Tick, config: &'a SimulationConfig) -> Self {
        Self {
            tick,
            config,
            bus: EventBus::new(config.record_wall_clock),
            scratch: Blackboard::new(),
        }
    }

    pub fn publish(&mut self, event_type: EventType, payload: Payload) {
        self.bus.publish(event_type, self.tick, payload);
    }

    /// Snap a value onto the run's precision grid.
    pub fn quantize(&self, x: f64) -> f64 {
        self.config.precision.quantize(x)
    }
}

pub trait System {
    fn name(&self) -> &'static str;

    fn step(
        &self,
        graph: &mut SimGraph,
        services: &mut Services<'_>,
        context: &mut RunContext,
    ) -> Result<(), SystemError>;
}

/// The fixed pipeline order.
pub fn default_systems() -> Vec<Box<dyn System>> {
    vec![
        Box::new(VitalitySystem),
        Box::new(ProductionSystem),
        Box::new(ImperialRentSystem),
        Box::new(SolidaritySystem),
        Box::new(ConsciousnessSystem),
        Box::new(SurvivalSystem),
        Box::new(StruggleSystem),
        Box::new(ContradictionSystem),
        Box::new(TerritorySystem),
        Box::new(MetabolismSystem),
    ]
}

// --- shared graph helpers ---

pub(crate) fn role_of(graph: &SimGraph, node: NodeIdx) -> Result<SocialRole, SystemError> {
    let raw = graph.text(node, keys::ROLE)?;
    SocialRole::parse(raw).ok_or_else(|| SystemError::Attribute {
        owner: graph.node(node).id.to_string(),
        key: keys::ROLE.to_string(),
        detail: format!("unknown role `{}`", raw),
    })
}

pub(crate) fn is_active(graph: &SimGraph, node: NodeIdx) -> Result<bool, SystemError> {
    graph.boolean(node, keys::ACTIVE)
}

/// Active class nodes in id order.
pub(crate) fn active_classes(graph: &SimGraph) -> Result<Vec<NodeIdx>, SystemError> {
    let mut active = Vec::new();
    for idx in graph.nodes_of_kind(NodeKind::SocialClass) {
        if is_active(graph, idx)? {
            active.push(idx);
        }
    }
    Ok(active)
}

pub(crate) fn node_name(graph: &SimGraph, node: NodeIdx) -> &str {
    graph.node(node).id.as_str()
}

/// Moves up to `amount` of wealth from one class to another and returns what
/// actually moved.
pub(crate) fn transfer_wealth(
    graph: &mut SimGraph,
    services: &Services<'_>,
    from: NodeIdx,
    to: NodeIdx,
    amount: f64,
) -> Result<f64, SystemError> {
    let available = graph.float(from, keys::WEALTH)?;
    let moved = services.quantize(amount.min(available).max(0.0));
    if moved <= 0.0 {
        return Ok(0.0);
    }
    let receiver = graph.float(to, keys::WEALTH)?;
    graph.set_float(from, keys::WEALTH, services.quantize(available - moved));
    graph.set_float(to, keys::WEALTH, services.quantize(receiver + moved));
    Ok(moved)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::state::world::WorldState;

    /// Runs one system against a state and returns the graph and services.
    pub fn run_system<'a>(
        system: &dyn System,
        state: &WorldState,
        config: &'a SimulationConfig,
        context: &mut RunContext,
    ) -> (SimGraph, Services<'a>) {
        let mut graph = state.to_graph().unwrap();
        let mut services = Services::new(state.tick, config);
        system.step(&mut graph, &mut services, context).unwrap();
        (graph, services)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blackboard_namespacing() {
        let mut board = Blackboard::new();
        board.set("imperial_rent", "initial_pool", 50.0);
        board.add("economy.wages", "C001", 2.0);
        board.add("economy.wages", "C001", 3.0);
        assert_eq!(board.get("imperial_rent", "initial_pool"), Some(50.0));
        assert_eq!(board.get("economy.wages", "C001"), Some(5.0));
        assert_eq!(board.get_or("economy.wages", "C002", 0.0), 0.0);
        assert!(board.contains("imperial_rent", "initial_pool"));
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_pipeline_order() {
        let names: Vec<_> = default_systems().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "vitality",
                "production",
                "imperial_rent",
                "solidarity",
                "consciousness",
                "survival",
                "struggle",
                "contradiction",
                "territory",
                "metabolism",
            ]
        );
    }
}
