//! Legacy flat → nested conversion.
//!
//! Walks the key tables in a fixed order: simple properties, bar globals
//! with their slots, global setting groups, then persons. Each slot picks its
//! type-specific block by the slot type. Keys under a slot prefix that no
//! table describes are dropped; every other unrecognized key is carried over
//! at the top level unchanged.

use serde_json::{Map, Value};

use crate::defaults;
use crate::keys::{
    self, ACTION_FIELDS, ACTIONS_BLOCK, BAR_FIELDS, CARD_BLOCK, DEPRECATED_KEYS, GLOBAL_GROUPS,
    INFO_STYLING_FIELDS, PERSONS_BLOCK, PERSONS_FIELDS, PERSONS_PREFIX, POPUP_BLOCK, POPUP_KEYS,
    SIMPLE_PROPS, SLOT_COMMON_FIELDS, STYLING_BLOCK, STYLING_SUFFIX_PREFIX,
};
use crate::person;
use crate::types::{Bar, SlotId, SlotType};
use crate::validate::{number_value, parse_number};

/// Rebuild the nested shape from flat keys.
pub fn migrate_legacy_to_nested(flat: &Map<String, Value>) -> Map<String, Value> {
    let mut nested = Map::new();

    for key in SIMPLE_PROPS {
        copy_if_present(flat, key, &mut nested, key);
    }

    for bar in Bar::ALL {
        let mut bar_obj = Map::new();
        for field in BAR_FIELDS {
            copy_if_present(flat, &format!("{}_{field}", bar.key()), &mut bar_obj, field);
        }
        for slot in SlotId::ALL.into_iter().filter(|s| s.bar == bar) {
            if let Some(slot_obj) = migrate_slot(flat, slot) {
                bar_obj.insert(slot.position.key().into(), Value::Object(slot_obj));
            }
        }
        insert_non_empty(&mut nested, bar.key(), bar_obj);
    }

    for group in GLOBAL_GROUPS {
        let mut group_obj = Map::new();
        for field in group.fields {
            copy_if_present(flat, &group.flat_key(field), &mut group_obj, field);
        }
        insert_non_empty(&mut nested, group.nested, group_obj);
    }

    insert_non_empty(&mut nested, PERSONS_BLOCK, migrate_persons(flat));

    for (key, value) in flat {
        if !is_table_key(key) && !nested.contains_key(key) {
            nested.insert(key.clone(), value.clone());
        }
    }

    nested
}

fn copy_if_present(from: &Map<String, Value>, from_key: &str, to: &mut Map<String, Value>, to_key: &str) {
    if let Some(v) = from.get(from_key) {
        to.insert(to_key.to_string(), v.clone());
    }
}

fn insert_non_empty(to: &mut Map<String, Value>, key: &str, obj: Map<String, Value>) {
    if !obj.is_empty() {
        to.insert(key.to_string(), Value::Object(obj));
    }
}

/// The slot type steering block selection. A missing type falls back to the
/// table default; an unrecognized one selects no block.
fn slot_type_of(flat: &Map<String, Value>, slot: SlotId) -> SlotType {
    match flat.get(&slot.prefix()) {
        Some(value) => value.as_str().and_then(SlotType::parse).unwrap_or(SlotType::None),
        None => defaults::table().slot_type(slot),
    }
}

fn migrate_slot(flat: &Map<String, Value>, slot: SlotId) -> Option<Map<String, Value>> {
    let mut obj = Map::new();
    copy_if_present(flat, &slot.prefix(), &mut obj, "type");

    for field in SLOT_COMMON_FIELDS {
        copy_if_present(flat, &slot.key(field), &mut obj, field);
    }

    let mut styling = Map::new();
    for field in INFO_STYLING_FIELDS {
        copy_if_present(
            flat,
            &slot.key(&format!("{STYLING_SUFFIX_PREFIX}{field}")),
            &mut styling,
            field,
        );
    }
    insert_non_empty(&mut obj, STYLING_BLOCK, styling);

    match slot_type_of(flat, slot) {
        SlotType::Card => copy_if_present(flat, &slot.key(CARD_BLOCK), &mut obj, CARD_BLOCK),
        slot_type => {
            if let Some(template) = keys::template_for(slot_type) {
                let mut block = Map::new();
                for field in template.fields {
                    copy_if_present(flat, &slot.key(field.suffix), &mut block, field.nested);
                }
                insert_non_empty(&mut obj, template.block, block);
            }
        }
    }

    let mut actions = Map::new();
    for field in ACTION_FIELDS {
        copy_if_present(flat, &slot.key(field), &mut actions, field);
    }
    insert_non_empty(&mut obj, ACTIONS_BLOCK, actions);

    let mut popup = Map::new();
    for key in POPUP_KEYS {
        copy_if_present(flat, &slot.key(key), &mut popup, key);
    }
    insert_non_empty(&mut obj, POPUP_BLOCK, popup);

    (!obj.is_empty()).then_some(obj)
}

fn migrate_persons(flat: &Map<String, Value>) -> Map<String, Value> {
    let mut obj = Map::new();
    for field in PERSONS_FIELDS {
        copy_if_present(flat, &format!("{PERSONS_PREFIX}{field}"), &mut obj, field);
    }

    let legacy_actions: Vec<(&str, Value)> = ACTION_FIELDS
        .iter()
        .filter_map(|field| {
            flat.get(&format!("{PERSONS_PREFIX}{field}"))
                .filter(|v| !v.is_null())
                .map(|v| (*field, v.clone()))
        })
        .collect();
    if !legacy_actions.is_empty()
        && let Some(Value::Array(entries)) = obj.get("entities")
    {
        tracing::debug!(count = legacy_actions.len(), "moving top-level person actions onto entries");
        let entries = person::apply_legacy_actions(entries, &legacy_actions);
        obj.insert("entities".into(), Value::Array(entries));
    }

    if !obj.contains_key("spacing") {
        let spacing = flat
            .get("persons_gap")
            .and_then(parse_number)
            .or_else(|| flat.get("persons_overlap").and_then(parse_number).map(|o| -o));
        if let Some(spacing) = spacing {
            obj.insert("spacing".into(), number_value(spacing));
        }
    }

    obj
}

/// Whether a flat key is described by the tables (and so is either
/// migrated or deliberately dropped).
fn is_table_key(key: &str) -> bool {
    if SIMPLE_PROPS.contains(&key) || DEPRECATED_KEYS.contains(&key) {
        return true;
    }
    if SlotId::ALL.into_iter().any(|slot| slot.prefix() == key) || SlotId::owning(key).is_some() {
        return true;
    }
    if Bar::ALL.into_iter().any(|bar| {
        key.strip_prefix(bar.key())
            .and_then(|rest| rest.strip_prefix('_'))
            .is_some_and(|field| BAR_FIELDS.contains(&field))
    }) {
        return true;
    }
    if GLOBAL_GROUPS.iter().any(|group| {
        key.strip_prefix(group.prefix)
            .is_some_and(|field| group.fields.contains(&field))
    }) {
        return true;
    }
    key.strip_prefix(PERSONS_PREFIX)
        .is_some_and(|field| PERSONS_FIELDS.contains(&field))
}
