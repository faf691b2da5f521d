//! Praxis Engine - deterministic simulation of class dynamics on a solidarity graph

pub mod core;
pub mod engine;
pub mod events;
pub mod formulas;
pub mod interceptor;
pub mod observers;
pub mod scenario;
pub mod state;
pub mod systems;

pub use crate::core::{Result, SimError, SimulationConfig};
pub use crate::engine::{step, Engine, Simulation};
pub use crate::events::{EventKind, EventType, SimulationEvent};
pub use crate::observers::{SimulationObserver, TopologyMonitor, TopologyPhase};
pub use crate::state::WorldState;
