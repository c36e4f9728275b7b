//! Popup settings and their layering.
//!
//! Popup keys can be set at four levels. From lowest to highest priority:
//! the global `popup` settings section, an `hki-more-info` action, then the
//! slot or person that owns the action.

use serde_json::{Map, Value};

use crate::keys::POPUP_KEYS;
use crate::merge::deep_merge;
use crate::types::SlotId;

/// Collect the popup overrides of a slot from a canonical flat config.
pub fn slot_popup(config: &Map<String, Value>, slot: SlotId) -> Map<String, Value> {
    POPUP_KEYS
        .iter()
        .filter_map(|key| {
            config
                .get(&slot.key(key))
                .filter(|v| !v.is_null())
                .map(|v| ((*key).to_string(), v.clone()))
        })
        .collect()
}

/// Layer popup settings. Later layers win; `None` layers are skipped.
pub fn resolve_popup(layers: &[Option<&Map<String, Value>>]) -> Map<String, Value> {
    layers
        .iter()
        .flatten()
        .fold(Map::new(), |acc, layer| deep_merge(acc, (*layer).clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bar, SlotPosition};
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn slot_popup_collects_prefixed_keys() {
        let slot = SlotId::new(Bar::Top, SlotPosition::Right);
        let config = obj(json!({
            "top_bar_right_popup_width": "wide",
            "top_bar_right_popup_height": null,
            "top_bar_left_popup_width": "narrow",
            "top_bar_right_offset_x": 4
        }));
        assert_eq!(Value::Object(slot_popup(&config, slot)), json!({"popup_width": "wide"}));
    }

    #[test]
    fn later_layers_win() {
        let global = obj(json!({"popup_width": "default", "popup_blur_amount": 10}));
        let action = obj(json!({"popup_blur_amount": 4, "popup_height": "auto"}));
        let slot = obj(json!({"popup_height": "full"}));
        let resolved = resolve_popup(&[Some(&global), Some(&action), Some(&slot)]);
        assert_eq!(
            Value::Object(resolved),
            json!({"popup_width": "default", "popup_blur_amount": 4, "popup_height": "full"})
        );
    }

    #[test]
    fn missing_layers_are_skipped() {
        let slot = obj(json!({"popup_width": "wide"}));
        assert_eq!(resolve_popup(&[None, None, Some(&slot)]), slot);
        assert!(resolve_popup(&[]).is_empty());
    }
}
