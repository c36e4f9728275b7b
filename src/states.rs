//! Snapshot of host entity states, as consumed by the renderer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// State of one host entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityState {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}

/// Entity id → state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSnapshot {
    entities: HashMap<String, EntityState>,
}

impl StateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity_id: impl Into<String>, state: EntityState) {
        self.entities.insert(entity_id.into(), state);
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.entities.get(entity_id)
    }

    /// The bare state string, if the entity is known.
    pub fn state(&self, entity_id: &str) -> Option<&str> {
        self.get(entity_id).map(|e| e.state.as_str())
    }
}

impl FromIterator<(String, EntityState)> for StateSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, EntityState)>>(iter: I) -> Self {
        Self {
            entities: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_host_state_map() {
        let snapshot: StateSnapshot = serde_json::from_value(json!({
            "person.alice": {"state": "home", "attributes": {"entity_picture": "/a.png"}},
            "weather.home": {"state": "sunny"}
        }))
        .unwrap();
        assert_eq!(snapshot.state("person.alice"), Some("home"));
        assert_eq!(
            snapshot.get("person.alice").and_then(|e| e.attribute_str("entity_picture")),
            Some("/a.png")
        );
        assert!(snapshot.get("weather.home").unwrap().attributes.is_empty());
        assert_eq!(snapshot.state("light.x"), None);
    }

    #[test]
    fn builds_from_pairs() {
        let snapshot: StateSnapshot = [("sensor.t".to_string(), EntityState::new("21"))]
            .into_iter()
            .collect();
        assert_eq!(snapshot.state("sensor.t"), Some("21"));
    }
}
