pub mod bounded;
pub mod config;
pub mod error;
pub mod quantize;
pub(crate) mod tagged;
pub mod types;

pub use bounded::{Coefficient, Currency, Ideology, Intensity, Probability, Ratio};
pub use config::SimulationConfig;
pub use error::{Result, SimError};
pub use quantize::{quantize, GridPolicy};
pub use types::{EntityId, NodeId, NodeKind, TerritoryId, Tick};
