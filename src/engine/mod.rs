//! Tick transition
//!
//! `State_t` is projected onto a fresh graph, the systems run over it in their
//! fixed order, the bus history is converted into typed events and the graph
//! is rebuilt into `State_t+1`. Nothing from the graph survives the call.
//!
//! A failing system aborts the tick. The graph it was working on is dropped
//! and the input state is untouched, so callers can keep the last good state.

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::events::convert::convert_all;
use crate::events::types::SimulationEvent;
use crate::state::world::WorldState;
use crate::systems::{default_systems, scratch, RunContext, Services, System};

pub mod simulation;

pub use simulation::Simulation;

/// An ordered list of systems.
pub struct Engine {
    systems: Vec<Box<dyn System>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// The standard pipeline.
    pub fn new() -> Self {
        Self {
            systems: default_systems(),
        }
    }

    /// A custom pipeline, run in the order given.
    pub fn with_systems(systems: Vec<Box<dyn System>>) -> Self {
        Self { systems }
    }

    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|s| s.name()).collect()
    }
}

/// Advance `state` by one tick.
///
/// `injected` events (observer output and admitted external actions from the
/// previous tick) are placed ahead of the events this tick produces.
pub fn step(
    state: &WorldState,
    engine: &Engine,
    config: &SimulationConfig,
    context: &mut RunContext,
    injected: Vec<SimulationEvent>,
) -> Result<WorldState> {
    let tick = state.tick;
    let mut graph = state.to_graph()?;
    let mut services = Services::new(tick, config);

    for (id, class) in &state.entities {
        services
            .scratch
            .set(scratch::START_WEALTH, id.as_str(), class.wealth.get());
    }

    for system in &engine.systems {
        tracing::debug!(system = system.name(), tick, "running system");
        system
            .step(&mut graph, &mut services, context)
            .map_err(|source| SimError::System {
                system: system.name(),
                tick,
                source,
            })?;
    }

    let produced = convert_all(services.bus.into_history())?;
    let mut events = injected;
    events.extend(produced);

    let next = WorldState::from_graph(&graph, tick + 1, events, config.precision)?;
    tracing::debug!(tick = next.tick, events = next.events.len(), "tick complete");
    Ok(next)
}
