//! Per-tick publish/collect channel

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::types::Tick;
use crate::events::types::EventType;

/// One scalar in a raw event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Bool(bool),
    Int(u64),
    Float(f64),
    Text(String),
}

impl From<f64> for PayloadValue {
    fn from(v: f64) -> Self {
        PayloadValue::Float(v)
    }
}

impl From<u64> for PayloadValue {
    fn from(v: u64) -> Self {
        PayloadValue::Int(v)
    }
}

impl From<bool> for PayloadValue {
    fn from(v: bool) -> Self {
        PayloadValue::Bool(v)
    }
}

impl From<&str> for PayloadValue {
    fn from(v: &str) -> Self {
        PayloadValue::Text(v.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(v: String) -> Self {
        PayloadValue::Text(v)
    }
}

pub type Payload = BTreeMap<String, PayloadValue>;

/// Build a [`Payload`] from `key => value` pairs.
#[macro_export]
macro_rules! payload {
    ($($key:literal => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map = $crate::events::bus::Payload::new();
        $( map.insert($key.to_string(), $crate::events::bus::PayloadValue::from($value)); )*
        map
    }};
}

/// An event as published, before schema checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub event_type: EventType,
    pub tick: Tick,
    pub timestamp: Option<u64>,
    pub payload: Payload,
}

/// Append-only log for one tick.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    history: Vec<RawEvent>,
    record_wall_clock: bool,
}

impl EventBus {
    pub fn new(record_wall_clock: bool) -> Self {
        Self {
            history: Vec::new(),
            record_wall_clock,
        }
    }

    pub fn publish(&mut self, event_type: EventType, tick: Tick, payload: Payload) {
        tracing::trace!(%event_type, tick, "publish");
        let timestamp = if self.record_wall_clock {
            wall_clock_millis()
        } else {
            None
        };
        self.history.push(RawEvent {
            event_type,
            tick,
            timestamp,
            payload,
        });
    }

    /// All events in publication order.
    pub fn history(&self) -> &[RawEvent] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn count(&self, event_type: EventType) -> usize {
        self.history
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    pub fn into_history(self) -> Vec<RawEvent> {
        self.history
    }
}

fn wall_clock_millis() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_keeps_publication_order() {
        let mut bus = EventBus::new(false);
        bus.publish(EventType::ExcessiveForce, 3, payload! { "node_id" => "C001" });
        bus.publish(EventType::Uprising, 3, payload! { "node_id" => "C001" });
        let types: Vec<_> = bus.history().iter().map(|e| e.event_type).collect();
        assert_eq!(types, vec![EventType::ExcessiveForce, EventType::Uprising]);
        assert_eq!(bus.count(EventType::Uprising), 1);
    }

    #[test]
    fn test_timestamps_only_when_enabled() {
        let mut quiet = EventBus::new(false);
        quiet.publish(EventType::EntityDeath, 0, payload! {});
        assert!(quiet.history()[0].timestamp.is_none());

        let mut stamped = EventBus::new(true);
        stamped.publish(EventType::EntityDeath, 0, payload! {});
        assert!(stamped.history()[0].timestamp.is_some());
    }

    #[test]
    fn test_payload_macro_types() {
        let p = payload! { "amount" => 1.5, "deaths" => 3u64, "node_id" => "C001" };
        assert_eq!(p["amount"], PayloadValue::Float(1.5));
        assert_eq!(p["deaths"], PayloadValue::Int(3));
        assert_eq!(p["node_id"], PayloadValue::Text("C001".into()));
    }
}
