#[cfg(test)]
pub mod test {
    use serde_json::{Value, json};

    /// A legacy flat config as older card versions wrote it.
    pub fn legacy_config() -> Value {
        json!({
            "type": "custom:hki-header-card",
            "title": "Home",
            "height_vh": 40,
            "top_bar_left": "weather",
            "top_bar_left_weather_entity": "weather.home",
            "top_bar_left_show_icon": false,
            "top_bar_center": "custom",
            "top_bar_center_custom_icon": "mdi:bell-ring",
            "top_bar_right_tap_action": {"action": "navigate", "navigation_path": "/x", "url_path": "/y"},
            "persons_enabled": true,
            "persons_gap": 6,
            "persons_tap_action": {"action": "more-info"},
            "persons_entities": ["person.alice", "person.bob"]
        })
    }

    /// A hand-written nested config.
    pub fn nested_config() -> Value {
        json!({
            "type": "custom:hki-header-card",
            "title": "Living room",
            "top_bar": {
                "height": 56,
                "left": {"type": "spacer"},
                "right": {
                    "type": "button",
                    "offset_x_mobile": -8,
                    "button": {"entity": "light.lamp", "label": "Lamp"},
                    "actions": {"tap_action": {"action": "toggle"}},
                    "hki_popup": {"popup_width": "wide"}
                }
            },
            "bottom_bar": {
                "enabled": true,
                "center": {"type": "card", "card": {"type": "tile", "entity": "climate.living"}}
            },
            "info_styling": {"font_weight": "bold"},
            "persons": {
                "enabled": true,
                "bar": "bottom_bar",
                "entities": [{"entity": "person.alice", "picture_home": "/local/alice.png"}]
            }
        })
    }

    #[test]
    fn fixtures_are_objects() {
        assert!(legacy_config().is_object());
        assert!(nested_config().is_object());
    }
}
