//! The header card's configuration surface.
//!
//! A [`HeaderCard`] holds the canonical configuration it was last given.
//! `set_config` replaces it wholesale; a configuration that cannot be
//! normalized clears the card so it renders nothing. Edits from a form are
//! merged into the current configuration, normalized, stripped and handed to
//! the config-changed callback for persisting.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::CardConfigError;
use crate::merge::overlay_defaults;
use crate::normalize::{CanonicalConfig, normalize_config};
use crate::popup;
use crate::resolve::{self, BarSettings, PersonsSettings, ResolvedSlot};
use crate::settings::SettingsService;
use crate::strip::strip_to_minimal;
use crate::types::{Bar, SlotId};

/// Receives the minimal nested document after every edit.
pub type ConfigChanged = Box<dyn FnMut(&Map<String, Value>) + Send>;

#[derive(Default)]
pub struct HeaderCard {
    config: Option<CanonicalConfig>,
    settings: Option<Arc<SettingsService>>,
    on_config_changed: Option<ConfigChanged>,
}

impl HeaderCard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share a settings service with other cards.
    pub fn with_settings(mut self, settings: Arc<SettingsService>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn on_config_changed(mut self, callback: impl FnMut(&Map<String, Value>) + Send + 'static) -> Self {
        self.on_config_changed = Some(Box::new(callback));
        self
    }

    /// Replace the configuration. On error the card is left without one.
    pub fn set_config(&mut self, raw: &Value) -> Result<(), CardConfigError> {
        match normalize_config(raw) {
            Ok(config) => {
                self.config = Some(config);
                Ok(())
            }
            Err(e) => {
                tracing::debug!(error = %e, "clearing card configuration");
                self.config = None;
                Err(e)
            }
        }
    }

    pub fn config(&self) -> Option<&CanonicalConfig> {
        self.config.as_ref()
    }

    /// Apply a form edit in any accepted shape on top of the current
    /// configuration. The raw edit is laid over the canonical keys and the
    /// result is detected and converted as a whole. Returns the minimal
    /// document that was emitted.
    pub fn apply_edit(&mut self, edit: &Value) -> Result<Map<String, Value>, CardConfigError> {
        let Value::Object(edit) = edit else {
            return Err(CardConfigError::invalid_configuration(edit));
        };
        let base = self
            .config
            .as_ref()
            .map(|c| c.as_map().clone())
            .unwrap_or_default();
        let merged = overlay_defaults(&base, edit);
        let config = normalize_config(&Value::Object(merged))?;
        let minimal = strip_to_minimal(&config);
        self.config = Some(config);
        if let Some(callback) = self.on_config_changed.as_mut() {
            callback(&minimal);
        }
        Ok(minimal)
    }

    /// Resolved slots, empty when the card has no configuration.
    pub fn slots(&self) -> Vec<ResolvedSlot> {
        self.config.as_ref().map(resolve::resolve_slots).unwrap_or_default()
    }

    pub fn bar(&self, bar: Bar) -> Option<BarSettings> {
        self.config.as_ref().map(|c| resolve::resolve_bar(c, bar))
    }

    pub fn persons(&self) -> Option<PersonsSettings> {
        self.config.as_ref().map(resolve::resolve_persons)
    }

    /// Popup settings for a slot's tap: the global popup section, then the
    /// tap action's own popup fields, then the slot's popup block.
    pub fn popup_for_slot(&self, slot: SlotId) -> Map<String, Value> {
        let Some(config) = self.config.as_ref() else {
            return Map::new();
        };
        let global = self.settings.as_ref().map(|s| s.get().popup);
        let resolved = resolve::resolve_slot(config, slot);
        popup::resolve_popup(&[
            global.as_ref(),
            resolved.actions.tap.popup_overrides(),
            Some(&resolved.popup),
        ])
    }
}

impl std::fmt::Debug for HeaderCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderCard")
            .field("config", &self.config)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{legacy_config, nested_config};
    use crate::resolve::SlotContent;
    use crate::settings::{MemoryStore, SettingsSection};
    use crate::types::SlotPosition;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn set_config_normalizes() {
        let mut card = HeaderCard::new();
        card.set_config(&legacy_config()).unwrap();
        let config = card.config().unwrap();
        assert_eq!(config.get("height_vh"), Some(&json!(40)));
        assert_eq!(config.str("top_bar_center"), "notifications");
        assert_eq!(card.slots().len(), 6);
    }

    #[test]
    fn invalid_config_clears_card() {
        let mut card = HeaderCard::new();
        card.set_config(&nested_config()).unwrap();
        assert!(card.set_config(&json!(null)).is_err());
        assert!(card.config().is_none());
        assert!(card.slots().is_empty());
        assert!(card.bar(Bar::Top).is_none());
    }

    #[test]
    fn legacy_weather_slot_end_to_end() {
        let mut card = HeaderCard::new();
        card.set_config(&json!({
            "top_bar_left": "weather",
            "top_bar_left_weather_entity": "weather.home",
            "top_bar_left_show_icon": false
        }))
        .unwrap();
        let slot = &card.slots()[0];
        match &slot.content {
            SlotContent::Weather(w) => {
                assert_eq!(w.entity.as_deref(), Some("weather.home"));
                assert!(!w.show_icon);
                assert!(w.show_condition);
                assert!(w.show_temperature);
                assert!(!w.show_humidity);
                assert!(!w.show_wind);
                assert!(w.colored_icons);
                assert_eq!(w.icon_size, 24.0);
                assert_eq!(w.precision, 0);
            }
            other => panic!("Expected Weather, got {other:?}"),
        }
    }

    #[test]
    fn edits_emit_minimal_document() {
        let emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&emitted);
        let mut card = HeaderCard::new().on_config_changed(move |doc| {
            sink.lock().unwrap().push(doc.clone());
        });
        card.set_config(&json!({"title": "Hall"})).unwrap();

        let minimal = card.apply_edit(&json!({"top_bar_height": 64})).unwrap();
        assert_eq!(minimal["title"], json!("Hall"));
        assert_eq!(minimal["top_bar"], json!({"enabled": true, "height": 64}));

        let minimal = card
            .apply_edit(&json!({"top_bar": {"left": {"type": "spacer"}}}))
            .unwrap();
        assert_eq!(minimal["top_bar"]["left"], json!({"type": "spacer"}));
        assert_eq!(card.config().unwrap().str("top_bar_left"), "spacer");

        let emitted = emitted.lock().unwrap();
        assert_eq!(emitted.len(), 2);
        assert_eq!(emitted[1], minimal);
    }

    #[test]
    fn legacy_person_action_edit_reaches_entries() {
        let mut card = HeaderCard::new();
        card.set_config(&legacy_config()).unwrap();
        card.apply_edit(&json!({
            "persons_tap_action": {"action": "navigate", "navigation_path": "/people", "entity": "x"}
        }))
        .unwrap();
        let entries = card.config().unwrap().get("persons_entities").unwrap().clone();
        for entry in entries.as_array().unwrap() {
            assert_eq!(entry["tap_action"], json!({"action": "navigate", "navigation_path": "/people"}));
        }
        assert!(card.config().unwrap().get("persons_tap_action").is_none());
    }

    #[test]
    fn edit_without_config_starts_from_defaults() {
        let mut card = HeaderCard::new();
        let minimal = card.apply_edit(&json!({"subtitle": "Evening"})).unwrap();
        assert_eq!(minimal["subtitle"], json!("Evening"));
        assert!(card.config().is_some());
    }

    #[test]
    fn popup_layers_global_action_and_slot() {
        let settings = Arc::new(SettingsService::new(MemoryStore::new()));
        settings.update_section(
            SettingsSection::Popup,
            json!({"popup_width": "default", "popup_blur_amount": 10, "popup_height": "auto"})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let mut card = HeaderCard::new().with_settings(Arc::clone(&settings));
        card.set_config(&json!({
            "top_bar": {
                "right": {
                    "type": "button",
                    "actions": {"tap_action": {
                        "action": "hki-more-info",
                        "entity": "light.lamp",
                        "popup_blur_amount": 4,
                        "popup_width": "narrow"
                    }},
                    "hki_popup": {"popup_width": "wide"}
                }
            }
        }))
        .unwrap();
        let popup = card.popup_for_slot(SlotId::new(Bar::Top, SlotPosition::Right));
        assert_eq!(
            Value::Object(popup),
            json!({"popup_width": "wide", "popup_blur_amount": 4, "popup_height": "auto"})
        );
    }

    #[test]
    fn cards_share_settings() {
        let settings = Arc::new(SettingsService::new(MemoryStore::new()));
        let first = HeaderCard::new().with_settings(Arc::clone(&settings));
        let mut second = HeaderCard::new().with_settings(Arc::clone(&settings));
        second.set_config(&json!({})).unwrap();
        settings.update_section(
            SettingsSection::Popup,
            json!({"popup_width": "wide"}).as_object().cloned().unwrap(),
        );
        assert!(first.popup_for_slot(SlotId::ALL[0]).is_empty());
        assert_eq!(
            second.popup_for_slot(SlotId::ALL[0]).get("popup_width"),
            Some(&json!("wide"))
        );
    }
}
