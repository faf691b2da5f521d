//! World state, its nodes and edges, and the per-tick graph projection

pub mod entity;
pub mod fields;
pub mod graph;
pub mod ingest;
pub mod relationship;
pub mod territory;
pub mod world;

pub use entity::{IdeologicalProfile, SocialClass, SocialRole, SurvivalOutlook};
pub use graph::{AttrValue, Attributes, EdgeIdx, NodeIdx, SimGraph};
pub use relationship::{EdgeType, Relationship};
pub use territory::{OperationalProfile, SectorType, Territory, TerritoryType};
pub use world::WorldState;
