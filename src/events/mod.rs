//! Event publication and the typed event log

pub mod bus;
pub mod convert;
pub mod types;

pub use bus::{EventBus, Payload, PayloadValue, RawEvent};
pub use convert::convert_all;
pub use types::{EventKind, EventType, SimulationEvent};
