//! Reduce a canonical configuration to what needs to be persisted.
//!
//! The minimal document keeps a handful of always-written keys plus every
//! value that differs from its default, and is written back in the nested
//! shape. Normalizing the result reproduces the canonical configuration.

use serde_json::{Map, Value};

use crate::action::cleanup_action;
use crate::defaults;
use crate::keys::{self, ALWAYS_INCLUDED, PERSONS_ENTITIES};
use crate::migrate::migrate_legacy_to_nested;
use crate::normalize::CanonicalConfig;
use crate::person;

/// The minimal nested document for a canonical configuration.
pub fn strip_to_minimal(config: &CanonicalConfig) -> Map<String, Value> {
    migrate_legacy_to_nested(&strip_flat(config.as_map()))
}

/// The minimal set of flat keys: non-default values and the always-written
/// keys. Deprecated keys never appear.
pub fn strip_flat(values: &Map<String, Value>) -> Map<String, Value> {
    let table = defaults::table();
    let mut out = Map::new();

    for (key, value) in values {
        if keys::is_deprecated(key) {
            continue;
        }
        if ALWAYS_INCLUDED.contains(&key.as_str()) {
            out.insert(key.clone(), value.clone());
            continue;
        }
        if key == PERSONS_ENTITIES {
            let entries: Vec<Value> = value
                .as_array()
                .map(|entries| entries.iter().filter_map(person::strip_entry).collect())
                .unwrap_or_default();
            if !entries.is_empty() {
                out.insert(key.clone(), Value::Array(entries));
            }
            continue;
        }
        let default = table.get(key);
        if keys::is_action_key(key) {
            let cleaned = cleanup_action(value);
            if default.map(cleanup_action).as_ref() != Some(&cleaned) {
                out.insert(key.clone(), cleaned);
            }
            continue;
        }
        if default != Some(value) {
            out.insert(key.clone(), value.clone());
        }
    }

    tracing::debug!(kept = out.len(), total = values.len(), "configuration stripped");
    out
}
