//! Nested → flat conversion.
//!
//! The inverse of [`crate::migrate`]. Values outside the nested structure
//! (simple properties, unknown keys, flat keys mixed into a nested document)
//! are copied first; values found inside nested objects are written after
//! and win on collision.

use serde_json::{Map, Value};

use crate::keys::{
    ACTION_FIELDS, ACTIONS_BLOCK, BAR_FIELDS, CARD_BLOCK, GLOBAL_GROUPS, INFO_STYLING_FIELDS,
    PERSONS_BLOCK, PERSONS_FIELDS, PERSONS_PREFIX, POPUP_BLOCK, POPUP_KEYS, SLOT_COMMON_FIELDS,
    SLOT_TEMPLATES, STYLING_BLOCK, STYLING_SUFFIX_PREFIX,
};
use crate::types::{Bar, SlotId};

/// Flatten a nested configuration into canonical flat keys.
pub fn flatten_nested(nested: &Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::new();

    for (key, value) in nested {
        if !is_structural(key, value) {
            flat.insert(key.clone(), value.clone());
        }
    }

    for bar in Bar::ALL {
        let Some(Value::Object(bar_obj)) = nested.get(bar.key()) else {
            continue;
        };
        for field in BAR_FIELDS {
            if let Some(v) = bar_obj.get(*field) {
                flat.insert(format!("{}_{field}", bar.key()), v.clone());
            }
        }
        for slot in SlotId::ALL.into_iter().filter(|s| s.bar == bar) {
            if let Some(Value::Object(slot_obj)) = bar_obj.get(slot.position.key()) {
                flatten_slot(slot, slot_obj, &mut flat);
            }
        }
    }

    // Slots written at the top level as `{bar}_{position}: {...}`.
    for slot in SlotId::ALL {
        if let Some(Value::Object(slot_obj)) = nested.get(&slot.prefix()) {
            flatten_slot(slot, slot_obj, &mut flat);
        }
    }

    for group in GLOBAL_GROUPS {
        let Some(Value::Object(group_obj)) = nested.get(group.nested) else {
            continue;
        };
        for field in group.fields {
            if let Some(v) = group_obj.get(*field) {
                flat.insert(group.flat_key(field), v.clone());
            }
        }
    }

    if let Some(Value::Object(persons)) = nested.get(PERSONS_BLOCK) {
        for field in PERSONS_FIELDS {
            if let Some(v) = persons.get(*field) {
                flat.insert(format!("{PERSONS_PREFIX}{field}"), v.clone());
            }
        }
    }

    flat
}

/// Whether a top-level entry is part of the nested structure rather than a
/// flat value.
fn is_structural(key: &str, value: &Value) -> bool {
    value.is_object()
        && (Bar::ALL.into_iter().any(|bar| bar.key() == key)
            || key == PERSONS_BLOCK
            || GLOBAL_GROUPS.iter().any(|group| group.nested == key)
            || SlotId::ALL.into_iter().any(|slot| slot.prefix() == key))
}

fn flatten_slot(slot: SlotId, obj: &Map<String, Value>, flat: &mut Map<String, Value>) {
    let mut put = |suffix: &str, value: &Value| {
        flat.insert(slot.key(suffix), value.clone());
    };

    for field in SLOT_COMMON_FIELDS {
        if let Some(v) = obj.get(*field) {
            put(field, v);
        }
    }
    if let Some(Value::Object(styling)) = obj.get(STYLING_BLOCK) {
        for field in INFO_STYLING_FIELDS {
            if let Some(v) = styling.get(*field) {
                put(&format!("{STYLING_SUFFIX_PREFIX}{field}"), v);
            }
        }
    }
    for template in SLOT_TEMPLATES {
        let Some(Value::Object(block)) = obj.get(template.block) else {
            continue;
        };
        for field in template.fields {
            if let Some(v) = block.get(field.nested) {
                put(field.suffix, v);
            }
        }
    }
    if let Some(card) = obj.get(CARD_BLOCK) {
        put(CARD_BLOCK, card);
    }
    if let Some(Value::Object(actions)) = obj.get(ACTIONS_BLOCK) {
        for field in ACTION_FIELDS {
            if let Some(v) = actions.get(*field) {
                put(field, v);
            }
        }
    }
    if let Some(Value::Object(popup)) = obj.get(POPUP_BLOCK) {
        for key in POPUP_KEYS {
            if let Some(v) = popup.get(*key) {
                put(key, v);
            }
        }
    }

    if let Some(slot_type) = obj.get("type") {
        flat.insert(slot.prefix(), slot_type.clone());
    }
}
