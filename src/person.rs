//! Person entries shown as avatars in a bar.
//!
//! Entries arrive either as a bare entity id (the old shape) or as an object.
//! They are resolved into the object shape once, at normalization, and
//! everything downstream only sees objects.

use serde_json::{Map, Value, json};

use crate::action::{self, Action};
use crate::keys::{self, PERSON_STRING_FIELDS, POPUP_KEYS};
use crate::validate::Rule;

/// A raw entry as written in a document.
#[derive(Debug, Clone, PartialEq)]
pub enum PersonEntry<'a> {
    Id(&'a str),
    Object(&'a Map<String, Value>),
}

impl<'a> PersonEntry<'a> {
    /// `None` for values that cannot describe a person (null, numbers, ...).
    pub fn parse(value: &'a Value) -> Option<PersonEntry<'a>> {
        match value {
            Value::String(s) => Some(PersonEntry::Id(s)),
            Value::Object(obj) => Some(PersonEntry::Object(obj)),
            _ => None,
        }
    }
}

/// Default action for a person field.
pub fn default_action(field: &str) -> Value {
    match field {
        "tap_action" => json!({"action": "more-info"}),
        _ => json!({"action": "none"}),
    }
}

/// Normalize a single entry to the full object shape.
pub fn normalize_entry(value: &Value) -> Option<Value> {
    let mut out = Map::new();
    match PersonEntry::parse(value)? {
        PersonEntry::Id(id) => {
            out.insert("entity".into(), Value::String(id.to_string()));
            for field in &PERSON_STRING_FIELDS[1..] {
                out.insert((*field).into(), Value::String(String::new()));
            }
            for field in keys::ACTION_FIELDS {
                out.insert((*field).into(), default_action(field));
            }
        }
        PersonEntry::Object(obj) => {
            let empty = Value::String(String::new());
            let none = Map::new();
            for field in PERSON_STRING_FIELDS {
                let raw = obj.get(*field).unwrap_or(&Value::Null);
                let text = Rule::Text.apply(raw, &empty, &none).unwrap_or_else(|| empty.clone());
                out.insert((*field).into(), text);
            }
            for field in keys::ACTION_FIELDS {
                let cleaned = match obj.get(*field) {
                    None | Some(Value::Null) => default_action(field),
                    Some(raw) => action::cleanup_action(raw),
                };
                out.insert((*field).into(), cleaned);
            }
            for key in POPUP_KEYS {
                if let Some(v) = obj.get(*key).filter(|v| !v.is_null()) {
                    out.insert((*key).into(), v.clone());
                }
            }
        }
    }
    Some(Value::Object(out))
}

/// Normalize the `persons_entities` array. Entries that are neither strings
/// nor objects are dropped; a non-array value yields an empty list.
pub fn normalize_entries(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(entries) => entries.iter().filter_map(normalize_entry).collect(),
        _ => Vec::new(),
    }
}

/// Reduce a normalized entry to its non-default sub-fields for persisting.
pub fn strip_entry(value: &Value) -> Option<Value> {
    let normalized = normalize_entry(value)?;
    let obj = normalized.as_object()?;
    let mut out = Map::new();
    for field in PERSON_STRING_FIELDS {
        match obj.get(*field) {
            Some(Value::String(s)) if !s.is_empty() || *field == "entity" => {
                out.insert((*field).into(), Value::String(s.clone()));
            }
            _ => {}
        }
    }
    for field in keys::ACTION_FIELDS {
        if let Some(action) = obj.get(*field)
            && *action != default_action(field)
        {
            out.insert((*field).into(), action.clone());
        }
    }
    for key in POPUP_KEYS {
        if let Some(v) = obj.get(*key) {
            out.insert((*key).into(), v.clone());
        }
    }
    Some(Value::Object(out))
}

/// Apply the superseded top-level person actions to entries lacking their
/// own. An entry action equal to the default counts as lacking. String
/// entries are promoted to objects on the way.
pub fn apply_legacy_actions(entries: &[Value], legacy: &[(&str, Value)]) -> Vec<Value> {
    entries
        .iter()
        .map(|entry| {
            let mut obj = match PersonEntry::parse(entry) {
                Some(PersonEntry::Id(id)) => {
                    let mut map = Map::new();
                    map.insert("entity".into(), Value::String(id.to_string()));
                    map
                }
                Some(PersonEntry::Object(obj)) => obj.clone(),
                None => return entry.clone(),
            };
            for (field, action) in legacy {
                if obj
                    .get(*field)
                    .is_none_or(|v| v.is_null() || *v == default_action(field))
                {
                    obj.insert((*field).to_string(), action.clone());
                }
            }
            Value::Object(obj)
        })
        .collect()
}

/// A normalized person entry, typed for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonEntity {
    pub entity: String,
    pub grayscale_entity: Option<String>,
    pub icon_home: Option<String>,
    pub icon_away: Option<String>,
    pub picture_home: Option<String>,
    pub picture_away: Option<String>,
    pub tap_action: Action,
    pub hold_action: Action,
    pub double_tap_action: Action,
    /// Person-level popup overrides.
    pub popup: Map<String, Value>,
}

impl PersonEntity {
    pub fn from_value(value: &Value) -> Option<PersonEntity> {
        let normalized = normalize_entry(value)?;
        let obj = normalized.as_object()?;
        let text = |field: &str| {
            obj.get(field)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let action = |field: &str| Action::from_value(obj.get(field).unwrap_or(&Value::Null));
        Some(PersonEntity {
            entity: text("entity").unwrap_or_default(),
            grayscale_entity: text("grayscale_entity"),
            icon_home: text("icon_home"),
            icon_away: text("icon_away"),
            picture_home: text("picture_home"),
            picture_away: text("picture_away"),
            tap_action: action("tap_action"),
            hold_action: action("hold_action"),
            double_tap_action: action("double_tap_action"),
            popup: POPUP_KEYS
                .iter()
                .filter_map(|k| obj.get(*k).map(|v| ((*k).to_string(), v.clone())))
                .collect(),
        })
    }
}
