use serde::{Deserialize, Serialize};

use crate::core::bounded::{Currency, Intensity, Probability};
use crate::core::tagged::tagged_enum;
use crate::core::types::{NodeId, NodeKind};

tagged_enum! {
    /// Kind of a directed relationship
    pub enum EdgeType {
        Exploitation => "EXPLOITATION",
        Solidarity => "SOLIDARITY",
        Wages => "WAGES",
        Tribute => "TRIBUTE",
        Tenancy => "TENANCY",
        Adjacency => "ADJACENCY",
        ClientState => "CLIENT_STATE",
    }
}

impl EdgeType {
    /// Node kinds allowed at (source, target).
    pub fn endpoints(self) -> (NodeKind, NodeKind) {
        match self {
            EdgeType::Tenancy => (NodeKind::SocialClass, NodeKind::Territory),
            EdgeType::Adjacency => (NodeKind::Territory, NodeKind::Territory),
            _ => (NodeKind::SocialClass, NodeKind::SocialClass),
        }
    }

    /// Edges along which value moves between classes.
    pub fn is_economic(self) -> bool {
        matches!(
            self,
            EdgeType::Exploitation | EdgeType::Wages | EdgeType::Tribute | EdgeType::ClientState
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Relationship {
    pub source: NodeId,
    pub target: NodeId,
    pub edge_type: EdgeType,
    /// Value moved along the edge in the last tick
    pub value_flow: Currency,
    pub tension: Intensity,
    pub solidarity_strength: Probability,
}

impl Relationship {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, edge_type: EdgeType) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            edge_type,
            value_flow: Currency::ZERO,
            tension: Intensity::ZERO,
            solidarity_strength: Probability::ZERO,
        }
    }

    pub fn with_strength(mut self, strength: Probability) -> Self {
        self.solidarity_strength = strength;
        self
    }

    pub fn with_tension(mut self, tension: Intensity) -> Self {
        self.tension = tension;
        self
    }
}
