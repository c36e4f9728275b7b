//! The defaulting and sanitization engine.
//!
//! [`normalize_config`] is the single entry point that turns any accepted
//! input shape into the canonical flat configuration:
//!
//! 1. detect the format and convert legacy or nested input to flat keys,
//! 2. overlay the flat keys on the default table,
//! 3. run every recognized field through its validation rule,
//! 4. drop deprecated keys and slot keys that no longer apply,
//! 5. clean every action against the field set of its kind.
//!
//! Normalization never fails on malformed field values; the only error is a
//! configuration that is not an object at all. The output is a fixed point:
//! normalizing it again yields the same configuration.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::action::cleanup_action;
use crate::defaults;
use crate::detect::detect_format;
use crate::error::CardConfigError;
use crate::flatten::flatten_nested;
use crate::keys::{self, SlotKey};
use crate::merge::overlay_defaults;
use crate::migrate::migrate_legacy_to_nested;
use crate::types::{ConfigFormat, SlotId, SlotType};
use crate::validate::parse_number;

/// A fully defaulted, validated flat configuration.
///
/// Every key of the default table is present. Only [`normalize_config`]
/// constructs one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CanonicalConfig {
    values: Map<String, Value>,
}

impl CanonicalConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// String value of a key; `""` when absent or not a string.
    pub fn str(&self, key: &str) -> &str {
        self.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    pub fn bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or_default()
    }

    pub fn number(&self, key: &str) -> f64 {
        self.get(key).and_then(parse_number).unwrap_or_default()
    }

    /// The validated type of a slot.
    pub fn slot_type(&self, slot: SlotId) -> SlotType {
        self.get(&slot.prefix())
            .and_then(Value::as_str)
            .and_then(SlotType::parse)
            .unwrap_or(SlotType::None)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

/// Normalize a raw configuration of any accepted shape.
pub fn normalize_config(raw: &Value) -> Result<CanonicalConfig, CardConfigError> {
    let Value::Object(obj) = raw else {
        return Err(CardConfigError::invalid_configuration(raw));
    };
    let flat = to_flat(obj);
    let merged = overlay_defaults(defaults::table().values(), &flat);
    let values = sanitize(&merged);
    tracing::debug!(keys = values.len(), "configuration normalized");
    Ok(CanonicalConfig { values })
}

/// Convert a raw object to flat keys, whatever its shape. No defaults are
/// applied and no values are validated.
pub fn to_flat(obj: &Map<String, Value>) -> Map<String, Value> {
    match detect_format(obj) {
        ConfigFormat::Legacy => flatten_nested(&migrate_legacy_to_nested(obj)),
        ConfigFormat::Nested => flatten_nested(obj),
        ConfigFormat::Canonical => obj.clone(),
    }
}

fn sanitize(merged: &Map<String, Value>) -> Map<String, Value> {
    let table = defaults::table();
    let mut out = Map::new();

    for spec in table.specs() {
        let value = merged.get(&spec.key).unwrap_or(&spec.default);
        if let Some(v) = spec.rule.apply(value, &spec.default, &out) {
            out.insert(spec.key.clone(), v);
        }
    }

    for (key, value) in merged {
        if table.spec(key).is_some() {
            continue;
        }
        if keys::is_deprecated(key) {
            tracing::debug!(key = %key, "dropping deprecated key");
            continue;
        }
        if keys::is_block_name(key) {
            tracing::debug!(key = %key, "dropping flat value under a nested block name");
            continue;
        }
        if let Some((slot, suffix)) = SlotId::owning(key) {
            match sanitize_slot_key(slot, suffix, value, &out) {
                Some(v) => {
                    out.insert(key.clone(), v);
                }
                None => tracing::debug!(key = %key, "dropping slot key that does not apply"),
            }
            continue;
        }
        let v = if keys::is_action_key(key) {
            cleanup_action(value)
        } else {
            value.clone()
        };
        out.insert(key.clone(), v);
    }

    out
}

/// Validate an optional slot key (one the default table has no entry for).
///
/// `resolved` already holds the validated slot type. Type-specific keys for
/// any other type, unknown suffixes and `null` overrides are dropped.
fn sanitize_slot_key(
    slot: SlotId,
    suffix: &str,
    value: &Value,
    resolved: &Map<String, Value>,
) -> Option<Value> {
    if value.is_null() {
        return None;
    }
    let kind = keys::classify_slot_suffix(suffix)?;
    let slot_type = resolved
        .get(&slot.prefix())
        .and_then(Value::as_str)
        .and_then(SlotType::parse)
        .unwrap_or(SlotType::None);
    let table = defaults::table();

    let default = match kind {
        SlotKey::Template(template, field) => {
            if template.slot_type != slot_type {
                return None;
            }
            field.global.and_then(|g| table.get(g))
        }
        SlotKey::Styling(field) => table.get(&keys::INFO_STYLING.flat_key(field)),
        SlotKey::Card if slot_type != SlotType::Card => return None,
        SlotKey::Card | SlotKey::Popup(_) => None,
        // Covered by the default table.
        SlotKey::Common(_) | SlotKey::Action(_) => return None,
    };
    let fallback = Value::String(String::new());
    table
        .slot_override_rule(kind)
        .apply(value, default.unwrap_or(&fallback), resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: Value) -> CanonicalConfig {
        normalize_config(&value).unwrap()
    }

    #[test]
    fn non_object_is_rejected() {
        for raw in [json!(null), json!([1, 2]), json!("x"), json!(3)] {
            match normalize_config(&raw) {
                Err(CardConfigError::InvalidConfiguration { .. }) => {}
                other => panic!("Expected InvalidConfiguration, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_object_gets_every_default() {
        let config = normalize(json!({}));
        for (key, default) in defaults::table().values() {
            assert_eq!(config.get(key), Some(default), "{key}");
        }
        assert_eq!(config.as_map().len(), defaults::table().values().len());
    }

    #[test]
    fn numbers_are_clamped_and_coerced() {
        let config = normalize(json!({"height_vh": 5, "top_bar_height": "64", "blur_amount": "lots"}));
        assert_eq!(config.get("height_vh"), Some(&json!(10)));
        assert_eq!(config.get("top_bar_height"), Some(&json!(64)));
        assert_eq!(config.get("blur_amount"), Some(&json!(0)));
        assert_eq!(normalize(json!({"height_vh": 500})).get("height_vh"), Some(&json!(100)));
    }

    #[test]
    fn max_height_never_below_min_height() {
        let config = normalize(json!({"min_height": 300, "max_height": 200}));
        assert_eq!(config.get("max_height"), Some(&json!(300)));
    }

    #[test]
    fn enum_fields_fall_back() {
        let config = normalize(json!({"info_font_weight": "heavy", "top_bar_left_align": "middle"}));
        assert_eq!(config.str("info_font_weight"), "normal");
        assert_eq!(config.str("top_bar_left_align"), "start");
    }

    #[test]
    fn booleans_follow_their_default_direction() {
        let config = normalize(json!({"top_bar_enabled": "no", "bottom_bar_enabled": "yes"}));
        assert!(config.bool("top_bar_enabled"));
        assert!(config.bool("bottom_bar_enabled"));
        let config = normalize(json!({"top_bar_enabled": false, "bottom_bar_enabled": 0}));
        assert!(!config.bool("top_bar_enabled"));
        assert!(!config.bool("bottom_bar_enabled"));
    }

    #[test]
    fn mobile_offsets_stay_nullable() {
        let config = normalize(json!({
            "top_bar_left_offset_x_mobile": "",
            "top_bar_left_offset_y_mobile": "12",
            "top_bar_right_offset_x_mobile": 900
        }));
        assert_eq!(config.get("top_bar_left_offset_x_mobile"), Some(&Value::Null));
        assert_eq!(config.get("top_bar_left_offset_y_mobile"), Some(&json!(12)));
        assert_eq!(config.get("top_bar_right_offset_x_mobile"), Some(&json!(500)));
        assert_eq!(config.get("bottom_bar_left_offset_y_mobile"), Some(&Value::Null));
    }

    #[test]
    fn custom_slot_type_becomes_notifications() {
        let config = normalize(json!({"top_bar_center": "custom", "top_bar_center_custom_max_items": 80}));
        assert_eq!(config.str("top_bar_center"), "notifications");
        assert_eq!(config.get("top_bar_center_custom_max_items"), Some(&json!(50)));
    }

    #[test]
    fn unknown_slot_type_becomes_none() {
        let config = normalize(json!({"bottom_bar_left": "clock"}));
        assert_eq!(config.slot_type(SlotId::ALL[3]), SlotType::None);
    }

    #[test]
    fn stale_type_specific_keys_are_pruned() {
        let config = normalize(json!({
            "top_bar_center": "button",
            "top_bar_center_button_label": "Lights",
            "top_bar_center_weather_entity": "weather.old",
            "top_bar_center_card": {"type": "tile"},
            "top_bar_center_sparkle": true,
            "top_bar_center_info_color": null
        }));
        assert_eq!(config.str("top_bar_center_button_label"), "Lights");
        assert!(config.get("top_bar_center_weather_entity").is_none());
        assert!(config.get("top_bar_center_card").is_none());
        assert!(config.get("top_bar_center_sparkle").is_none());
        assert!(config.get("top_bar_center_info_color").is_none());
    }

    #[test]
    fn slot_overrides_use_global_rules() {
        let config = normalize(json!({
            "top_bar_left_weather_icon_size": 500,
            "top_bar_left_info_font_weight": "heavy",
            "top_bar_left_info_pill": "nope"
        }));
        assert_eq!(config.get("top_bar_left_weather_icon_size"), Some(&json!(96)));
        assert_eq!(config.str("top_bar_left_info_font_weight"), "normal");
        assert!(config.bool("top_bar_left_info_pill"));
    }

    #[test]
    fn card_slot_keeps_card_object() {
        let config = normalize(json!({
            "bottom_bar_right": "card",
            "bottom_bar_right_card": {"type": "tile", "entity": "light.a"}
        }));
        assert_eq!(config.get("bottom_bar_right_card"), Some(&json!({"type": "tile", "entity": "light.a"})));
        let config = normalize(json!({"bottom_bar_right": "card", "bottom_bar_right_card": "tile"}));
        assert!(config.get("bottom_bar_right_card").is_none());
    }

    #[test]
    fn actions_are_cleaned_everywhere() {
        let config = normalize(json!({
            "top_bar_left_tap_action": {"action": "url", "url_path": "/y", "navigation_path": "/x"},
            "top_bar_left_hold_action": null,
            "persons_entities": [{"entity": "person.a", "hold_action": {"action": "none", "entity": "x"}}],
            "extra_tap_action": "toggle"
        }));
        assert_eq!(config.get("top_bar_left_tap_action"), Some(&json!({"action": "url", "url_path": "/y"})));
        assert_eq!(config.get("top_bar_left_hold_action"), Some(&json!({"action": "none"})));
        assert_eq!(
            config.get("persons_entities").unwrap()[0]["hold_action"],
            json!({"action": "none"})
        );
        assert_eq!(config.get("extra_tap_action"), Some(&json!({"action": "toggle"})));
    }

    #[test]
    fn person_strings_are_migrated() {
        let config = normalize(json!({"persons_entities": ["person.alice", "person.bob"]}));
        let entries = config.get("persons_entities").unwrap().as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["entity"], json!("person.alice"));
        assert_eq!(entries[1]["tap_action"], json!({"action": "more-info"}));
    }

    #[test]
    fn deprecated_keys_are_purged() {
        let config = normalize(json!({
            "persons_enabled": true,
            "persons_gap": 6,
            "persons_overlap": 3,
            "persons_tap_action": {"action": "toggle"},
            "persons_entities": ["person.a"]
        }));
        for key in keys::DEPRECATED_KEYS {
            assert!(config.get(key).is_none(), "{key}");
        }
        assert_eq!(config.get("persons_spacing"), Some(&json!(6)));
        assert_eq!(
            config.get("persons_entities").unwrap()[0]["tap_action"],
            json!({"action": "toggle"})
        );
    }

    #[test]
    fn unknown_keys_pass_through() {
        let config = normalize(json!({"future_option": {"a": 1}}));
        assert_eq!(config.get("future_option"), Some(&json!({"a": 1})));
    }

    #[test]
    fn nested_input_is_flattened() {
        let config = normalize(json!({
            "top_bar": {"height": 60, "left": {"type": "spacer"}},
            "persons": {"enabled": true}
        }));
        assert_eq!(config.get("top_bar_height"), Some(&json!(60)));
        assert_eq!(config.str("top_bar_left"), "spacer");
        assert!(config.bool("persons_enabled"));
    }

    #[test]
    fn scalar_under_block_name_is_dropped() {
        let config = normalize(json!({"top_bar": "oops", "persons": 1, "title": "Hall"}));
        assert!(config.get("top_bar").is_none());
        assert!(config.get("persons").is_none());
        assert_eq!(config.str("title"), "Hall");
        assert!(config.bool("top_bar_enabled"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            json!({}),
            json!({
                "persons_enabled": true,
                "persons_entities": ["person.a"],
                "top_bar_left_weather_entity": "weather.home",
                "top_bar_center": "custom",
                "top_bar_center_custom_icon": "mdi:bell",
                "height_vh": "500",
                "future_option": 1
            }),
            json!({
                "top_bar": {"right": {"type": "card", "card": {"type": "tile"}}},
                "bottom_bar": {"enabled": true, "left": {"type": "button", "button": {"label": "Go"}}}
            }),
            json!({"top_bar": "oops"}),
            json!({"persons_enabled": true, "weather": 3, "info_styling": null}),
        ];
        for input in inputs {
            let once = normalize(input);
            let twice = normalize(once.to_value());
            assert_eq!(twice, once);
        }
    }
}
