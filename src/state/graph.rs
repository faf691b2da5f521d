//! Arena graph used for one tick
//!
//! Built fresh from a `WorldState` at the start of each tick, mutated in place
//! by the systems, then consumed by reconstruction. Nodes and edges live in
//! vectors and are addressed by index; nothing outlives the tick.

use ahash::AHashMap;
use std::collections::BTreeMap;

use crate::core::error::SystemError;
use crate::core::types::{NodeId, NodeKind};
use crate::state::relationship::EdgeType;

/// A single flattened attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Float(f64),
    Int(u64),
    Bool(bool),
    Text(String),
}

impl AttrValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Float(_) => "float",
            AttrValue::Int(_) => "int",
            AttrValue::Bool(_) => "bool",
            AttrValue::Text(_) => "text",
        }
    }
}

/// Uniform key → value attribute surface of a node or edge.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes(BTreeMap<String, AttrValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: AttrValue) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(AttrValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn int(&self, key: &str) -> Option<u64> {
        match self.0.get(key) {
            Some(AttrValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(AttrValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(AttrValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn set_float(&mut self, key: &str, value: f64) {
        self.insert(key, AttrValue::Float(value));
    }

    pub fn set_int(&mut self, key: &str, value: u64) {
        self.insert(key, AttrValue::Int(value));
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.insert(key, AttrValue::Bool(value));
    }

    pub fn set_text(&mut self, key: &str, value: impl Into<String>) {
        self.insert(key, AttrValue::Text(value.into()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIdx(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub attrs: Attributes,
}

impl GraphNode {
    pub fn kind(&self) -> NodeKind {
        self.id.kind()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub source: NodeIdx,
    pub target: NodeIdx,
    pub edge_type: EdgeType,
    pub attrs: Attributes,
}

/// Directed multigraph over social-class and territory nodes.
#[derive(Debug, Clone, Default)]
pub struct SimGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    index: AHashMap<NodeId, NodeIdx>,
}

impl PartialEq for SimGraph {
    fn eq(&self, other: &Self) -> bool {
        // The index is derived from `nodes`
        self.nodes == other.nodes && self.edges == other.edges
    }
}

fn attr_error(owner: &NodeId, key: &str, detail: impl Into<String>) -> SystemError {
    SystemError::Attribute {
        owner: owner.to_string(),
        key: key.to_string(),
        detail: detail.into(),
    }
}

impl SimGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; an id already present is reported, not overwritten.
    pub fn add_node(&mut self, id: NodeId, attrs: Attributes) -> Result<NodeIdx, SystemError> {
        if self.index.contains_key(&id) {
            return Err(attr_error(&id, "id", "duplicate node"));
        }
        let idx = NodeIdx(self.nodes.len());
        self.index.insert(id.clone(), idx);
        self.nodes.push(GraphNode { id, attrs });
        Ok(idx)
    }

    pub fn add_edge(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        edge_type: EdgeType,
        attrs: Attributes,
    ) -> Result<EdgeIdx, SystemError> {
        let s = self.require(source)?;
        let t = self.require(target)?;
        let idx = EdgeIdx(self.edges.len());
        self.edges.push(GraphEdge {
            source: s,
            target: t,
            edge_type,
            attrs,
        });
        Ok(idx)
    }

    pub fn find(&self, id: &NodeId) -> Option<NodeIdx> {
        self.index.get(id).copied()
    }

    pub fn require(&self, id: &NodeId) -> Result<NodeIdx, SystemError> {
        self.find(id)
            .ok_or_else(|| SystemError::MissingNode(id.to_string()))
    }

    pub fn node(&self, idx: NodeIdx) -> &GraphNode {
        &self.nodes[idx.0]
    }

    pub fn node_mut(&mut self, idx: NodeIdx) -> &mut GraphNode {
        &mut self.nodes[idx.0]
    }

    pub fn edge(&self, idx: EdgeIdx) -> &GraphEdge {
        &self.edges[idx.0]
    }

    pub fn edge_mut(&mut self, idx: EdgeIdx) -> &mut GraphEdge {
        &mut self.edges[idx.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIdx, &GraphNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIdx(i), n))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeIdx, &GraphEdge)> {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeIdx(i), e))
    }

    /// Node indices of one kind, in insertion order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeIdx> {
        self.nodes()
            .filter(|(_, n)| n.kind() == kind)
            .map(|(i, _)| i)
            .collect()
    }

    /// Edge indices of one type, in insertion order.
    pub fn edges_of_type(&self, edge_type: EdgeType) -> Vec<EdgeIdx> {
        self.edges()
            .filter(|(_, e)| e.edge_type == edge_type)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn out_edges(&self, node: NodeIdx, edge_type: EdgeType) -> Vec<EdgeIdx> {
        self.edges()
            .filter(|(_, e)| e.source == node && e.edge_type == edge_type)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn in_edges(&self, node: NodeIdx, edge_type: EdgeType) -> Vec<EdgeIdx> {
        self.edges()
            .filter(|(_, e)| e.target == node && e.edge_type == edge_type)
            .map(|(i, _)| i)
            .collect()
    }

    /// Edges of a type touching `node` in either direction.
    pub fn incident_edges(&self, node: NodeIdx, edge_type: EdgeType) -> Vec<EdgeIdx> {
        self.edges()
            .filter(|(_, e)| e.edge_type == edge_type && (e.source == node || e.target == node))
            .map(|(i, _)| i)
            .collect()
    }

    // --- typed attribute access reporting SystemError ---

    pub fn float(&self, node: NodeIdx, key: &str) -> Result<f64, SystemError> {
        let n = self.node(node);
        n.attrs
            .float(key)
            .ok_or_else(|| attr_error(&n.id, key, "missing or not a float"))
    }

    pub fn int(&self, node: NodeIdx, key: &str) -> Result<u64, SystemError> {
        let n = self.node(node);
        n.attrs
            .int(key)
            .ok_or_else(|| attr_error(&n.id, key, "missing or not an int"))
    }

    pub fn boolean(&self, node: NodeIdx, key: &str) -> Result<bool, SystemError> {
        let n = self.node(node);
        n.attrs
            .boolean(key)
            .ok_or_else(|| attr_error(&n.id, key, "missing or not a bool"))
    }

    pub fn text(&self, node: NodeIdx, key: &str) -> Result<&str, SystemError> {
        let n = self.node(node);
        n.attrs
            .text(key)
            .ok_or_else(|| attr_error(&n.id, key, "missing or not text"))
    }

    pub fn set_float(&mut self, node: NodeIdx, key: &str, value: f64) {
        self.node_mut(node).attrs.set_float(key, value);
    }

    pub fn set_int(&mut self, node: NodeIdx, key: &str, value: u64) {
        self.node_mut(node).attrs.set_int(key, value);
    }

    pub fn set_bool(&mut self, node: NodeIdx, key: &str, value: bool) {
        self.node_mut(node).attrs.set_bool(key, value);
    }

    pub fn edge_float(&self, edge: EdgeIdx, key: &str) -> Result<f64, SystemError> {
        let e = self.edge(edge);
        e.attrs.float(key).ok_or_else(|| SystemError::Attribute {
            owner: format!(
                "{}->{}",
                self.node(e.source).id,
                self.node(e.target).id
            ),
            key: key.to_string(),
            detail: "missing or not a float".into(),
        })
    }

    pub fn set_edge_float(&mut self, edge: EdgeIdx, key: &str, value: f64) {
        self.edge_mut(edge).attrs.set_float(key, value);
    }
}
