//! Post-tick observers
//!
//! Observers see each settled state after a tick completes and never touch it.
//! Anything they want to say goes into an outbox that the orchestrator drains
//! into the following tick, so their events always lag by one tick.

use crate::events::types::SimulationEvent;
use crate::state::world::WorldState;

pub mod topology;

pub use topology::{TopologyMonitor, TopologyPhase, TopologySnapshot};

pub trait SimulationObserver {
    fn name(&self) -> &str;

    fn on_simulation_start(&mut self, _initial: &WorldState) {}

    /// Called once per completed tick with the state before and after it.
    fn on_tick(&mut self, previous: &WorldState, new: &WorldState);

    fn on_simulation_end(&mut self, _final_state: &WorldState) {}

    /// Events queued since the last drain, in the order they were produced.
    fn drain_outbox(&mut self) -> Vec<SimulationEvent>;
}
