//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::ReconstructionError;

/// Simulation tick counter
pub type Tick = u64;

/// Which arena a graph node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    SocialClass,
    Territory,
}

impl NodeKind {
    fn prefix(self) -> char {
        match self {
            NodeKind::SocialClass => 'C',
            NodeKind::Territory => 'T',
        }
    }
}

/// Ids are a kind prefix followed by at least three ASCII digits (`C001`, `T042`).
fn classify(raw: &str) -> Option<NodeKind> {
    let mut chars = raw.chars();
    let kind = match chars.next()? {
        'C' => NodeKind::SocialClass,
        'T' => NodeKind::Territory,
        _ => return None,
    };
    let digits = chars.as_str();
    if digits.len() >= 3 && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(kind)
    } else {
        None
    }
}

/// Identifier of any graph node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ReconstructionError> {
        let raw = raw.into();
        match classify(&raw) {
            Some(_) => Ok(Self(raw)),
            None => Err(ReconstructionError::InvalidId(raw)),
        }
    }

    pub fn kind(&self) -> NodeKind {
        // Construction guarantees the prefix is valid.
        if self.0.starts_with('T') {
            NodeKind::Territory
        } else {
            NodeKind::SocialClass
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeId {
    type Error = ReconstructionError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! kinded_id {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn parse(raw: impl Into<String>) -> Result<Self, ReconstructionError> {
                let raw = raw.into();
                match classify(&raw) {
                    Some(kind) if kind == $kind => Ok(Self(raw)),
                    _ => Err(ReconstructionError::InvalidId(raw)),
                }
            }

            /// Canonical id for a numeric index, e.g. `C007`.
            pub fn from_index(index: u32) -> Self {
                Self($kind.format_id(index))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn node_id(&self) -> NodeId {
                NodeId(self.0.clone())
            }
        }

        impl TryFrom<String> for $name {
            type Error = ReconstructionError;
            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl TryFrom<NodeId> for $name {
            type Error = ReconstructionError;
            fn try_from(value: NodeId) -> Result<Self, Self::Error> {
                Self::parse(value.0)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<$name> for NodeId {
            fn from(id: $name) -> Self {
                NodeId(id.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

kinded_id!(
    /// Identifier of a social-class node (`C` prefix)
    EntityId,
    NodeKind::SocialClass
);
kinded_id!(
    /// Identifier of a territory node (`T` prefix)
    TerritoryId,
    NodeKind::Territory
);

impl NodeKind {
    /// Formats the canonical id for a numeric index, e.g. `C007`.
    pub fn format_id(self, index: u32) -> String {
        format!("{}{:03}", self.prefix(), index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_pattern() {
        assert!(EntityId::parse("C001").is_ok());
        assert!(EntityId::parse("C12345").is_ok());
        assert!(EntityId::parse("C01").is_err());
        assert!(EntityId::parse("T001").is_err());
        assert!(EntityId::parse("c001").is_err());
        assert!(EntityId::parse("C00a").is_err());
    }

    #[test]
    fn test_node_id_kind() {
        assert_eq!(NodeId::parse("C001").unwrap().kind(), NodeKind::SocialClass);
        assert_eq!(NodeId::parse("T010").unwrap().kind(), NodeKind::Territory);
        assert!(NodeId::parse("X001").is_err());
    }

    #[test]
    fn test_ids_order_lexically() {
        let a = EntityId::parse("C001").unwrap();
        let b = EntityId::parse("C002").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_format_id() {
        assert_eq!(NodeKind::SocialClass.format_id(7), "C007");
        assert_eq!(NodeKind::Territory.format_id(1234), "T1234");
        assert_eq!(EntityId::from_index(7).as_str(), "C007");
        assert!(TerritoryId::parse(TerritoryId::from_index(12).as_str()).is_ok());
    }

    #[test]
    fn test_id_serde_rejects_bad_pattern() {
        let ok: EntityId = serde_json::from_str("\"C003\"").unwrap();
        assert_eq!(ok.as_str(), "C003");
        assert!(serde_json::from_str::<EntityId>("\"Z003\"").is_err());
    }
}
