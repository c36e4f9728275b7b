//! The default table: every recognized flat key, its default and its rule.
//!
//! This is the lowest-priority layer of normalization. It is built once,
//! never mutated, and read on every pass. Field order matters: rules that
//! depend on another field (see [`Rule::NumberAbove`]) come after it.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::{Map, Value, json};

use crate::keys::{self, SlotKey};
use crate::types::{Bar, SlotId, SlotPosition, SlotType};
use crate::validate::Rule;

/// One recognized flat key.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: String,
    pub default: Value,
    pub rule: Rule,
}

/// The immutable default table.
#[derive(Debug)]
pub struct DefaultTable {
    specs: Vec<FieldSpec>,
    index: HashMap<String, usize>,
    values: Map<String, Value>,
}

static TABLE: LazyLock<DefaultTable> = LazyLock::new(DefaultTable::build);

/// The process-wide default table.
pub fn table() -> &'static DefaultTable {
    &TABLE
}

const FONT_WEIGHTS: &[&str] = &["light", "normal", "medium", "semibold", "bold"];
const ALIGNS: &[&str] = &["start", "center", "end", "stretch"];

fn num(min: f64, max: f64, fallback: f64) -> Rule {
    Rule::Number { min, max, fallback }
}

fn int(min: f64, max: f64, fallback: f64) -> Rule {
    Rule::Integer { min, max, fallback }
}

fn choice(allowed: &'static [&'static str], fallback: &'static str) -> Rule {
    Rule::Choice { allowed, fallback }
}

fn default_slot_type(slot: SlotId) -> SlotType {
    match (slot.bar, slot.position) {
        (Bar::Top, SlotPosition::Left) => SlotType::Weather,
        (Bar::Top, SlotPosition::Right) => SlotType::DateTime,
        _ => SlotType::None,
    }
}

fn align_choice(position: SlotPosition) -> Rule {
    let fallback = match position {
        SlotPosition::Left => "start",
        SlotPosition::Center => "center",
        SlotPosition::Right => "end",
    };
    choice(ALIGNS, fallback)
}

impl DefaultTable {
    fn build() -> Self {
        let mut specs: Vec<FieldSpec> = Vec::new();
        let mut push = |key: String, default: Value, rule: Rule| {
            specs.push(FieldSpec { key, default, rule });
        };

        // Header
        push("type".into(), json!("custom:hki-header-card"), Rule::Passthrough);
        push("title".into(), json!(""), Rule::Text);
        push("subtitle".into(), json!(""), Rule::Text);
        push("image".into(), json!(""), Rule::Text);
        push("image_fit".into(), json!("cover"), choice(&["cover", "contain", "fill"], "cover"));
        push(
            "image_position".into(),
            json!("center"),
            choice(&["top", "center", "bottom"], "center"),
        );
        push("height_vh".into(), json!(35), num(10.0, 100.0, 35.0));
        push("min_height".into(), json!(120), num(0.0, 4000.0, 120.0));
        push(
            "max_height".into(),
            json!(600),
            Rule::NumberAbove {
                floor_key: "min_height",
                max: 4000.0,
                fallback: 600.0,
            },
        );
        push("blur_amount".into(), json!(0), num(0.0, 50.0, 0.0));
        push("overlay_color".into(), json!("#000000"), Rule::Text);
        push("overlay_opacity".into(), json!(0.3), num(0.0, 1.0, 0.3));
        push("border_radius".into(), json!(0), num(0.0, 100.0, 0.0));
        push(
            "font_family".into(),
            json!("system"),
            choice(&["system", "roboto", "inter", "montserrat", "serif", "mono"], "system"),
        );
        push("text_color".into(), json!(""), Rule::Text);
        push("mobile_breakpoint".into(), json!(768), num(320.0, 2000.0, 768.0));
        push("full_width".into(), json!(false), Rule::FalseUnlessTrue);
        push("reduce_motion".into(), json!(false), Rule::FalseUnlessTrue);
        push("parallax".into(), json!(true), Rule::TrueUnlessFalse);

        // Bars
        for bar in Bar::ALL {
            let key = |field: &str| format!("{}_{field}", bar.key());
            match bar {
                Bar::Top => push(key("enabled"), json!(true), Rule::TrueUnlessFalse),
                Bar::Bottom => push(key("enabled"), json!(false), Rule::FalseUnlessTrue),
            }
            push(key("height"), json!(48), num(24.0, 200.0, 48.0));
            push(key("padding_x"), json!(12), num(0.0, 100.0, 12.0));
            push(key("gap"), json!(8), num(0.0, 100.0, 8.0));
            push(key("background"), json!("transparent"), Rule::Text);
            push(key("blur"), json!(0), num(0.0, 50.0, 0.0));
            push(key("opacity"), json!(1), num(0.0, 1.0, 1.0));
            push(key("border_radius"), json!(0), num(0.0, 100.0, 0.0));
            push(key("sticky"), json!(false), Rule::FalseUnlessTrue);
        }

        // Info styling
        push("info_background".into(), json!("rgba(0, 0, 0, 0.3)"), Rule::Text);
        push("info_color".into(), json!("#ffffff"), Rule::Text);
        push("info_font_size".into(), json!(14), num(8.0, 48.0, 14.0));
        push("info_font_weight".into(), json!("medium"), choice(FONT_WEIGHTS, "normal"));
        push("info_pill".into(), json!(true), Rule::TrueUnlessFalse);
        push("info_blur".into(), json!(0), num(0.0, 50.0, 0.0));
        push("info_border_radius".into(), json!(16), num(0.0, 100.0, 16.0));
        push("info_padding".into(), json!(6), num(0.0, 50.0, 6.0));

        // Weather
        push("weather_entity".into(), json!(""), Rule::Text);
        push("weather_show_icon".into(), json!(true), Rule::TrueUnlessFalse);
        push("weather_show_condition".into(), json!(true), Rule::TrueUnlessFalse);
        push("weather_show_temperature".into(), json!(true), Rule::TrueUnlessFalse);
        push("weather_show_humidity".into(), json!(false), Rule::FalseUnlessTrue);
        push("weather_show_wind".into(), json!(false), Rule::FalseUnlessTrue);
        push("weather_colored_icons".into(), json!(true), Rule::TrueUnlessFalse);
        push("weather_icon_size".into(), json!(24), num(12.0, 96.0, 24.0));
        push("weather_precision".into(), json!(0), int(0.0, 2.0, 0.0));

        // Date and time
        push("datetime_show_date".into(), json!(true), Rule::TrueUnlessFalse);
        push("datetime_show_time".into(), json!(true), Rule::TrueUnlessFalse);
        push("datetime_show_seconds".into(), json!(false), Rule::FalseUnlessTrue);
        push("datetime_show_weekday".into(), json!(false), Rule::FalseUnlessTrue);
        push(
            "datetime_time_format".into(),
            json!("auto"),
            choice(&["auto", "12h", "24h"], "auto"),
        );
        push(
            "datetime_date_format".into(),
            json!("short"),
            choice(&["short", "long", "numeric"], "short"),
        );

        // Buttons
        push("button_show_state".into(), json!(false), Rule::FalseUnlessTrue);
        push("button_icon_size".into(), json!(24), num(12.0, 96.0, 24.0));
        push("button_color".into(), json!(""), Rule::Text);

        // Notifications
        push("notifications_icon".into(), json!("mdi:bell"), Rule::Text);
        push("notifications_show_count".into(), json!(true), Rule::TrueUnlessFalse);
        push("notifications_hide_when_empty".into(), json!(false), Rule::FalseUnlessTrue);
        push("notifications_max_items".into(), json!(5), int(1.0, 50.0, 5.0));

        // Slots
        for slot in SlotId::ALL {
            push(slot.prefix(), json!(default_slot_type(slot).as_str()), Rule::SlotType);
            push(slot.key("offset_x"), json!(0), num(-500.0, 500.0, 0.0));
            push(slot.key("offset_y"), json!(0), num(-500.0, 500.0, 0.0));
            for mobile in ["offset_x_mobile", "offset_y_mobile"] {
                push(
                    slot.key(mobile),
                    Value::Null,
                    Rule::NullableNumber {
                        min: -500.0,
                        max: 500.0,
                    },
                );
            }
            push(
                slot.key("align"),
                json!(slot.position.default_align().as_str()),
                align_choice(slot.position),
            );
            push(slot.key("overflow"), json!(false), Rule::FalseUnlessTrue);
            for action in keys::ACTION_FIELDS {
                push(slot.key(action), json!({"action": "none"}), Rule::Action);
            }
        }

        // Persons
        push("persons_enabled".into(), json!(false), Rule::FalseUnlessTrue);
        push(
            "persons_bar".into(),
            json!("top_bar"),
            choice(&["top_bar", "bottom_bar"], "top_bar"),
        );
        push(
            "persons_position".into(),
            json!("right"),
            choice(&["left", "center", "right"], "right"),
        );
        push("persons_size".into(), json!(40), num(16.0, 128.0, 40.0));
        push("persons_spacing".into(), json!(4), num(-64.0, 64.0, 4.0));
        push("persons_max_visible".into(), json!(5), int(1.0, 20.0, 5.0));
        push("persons_grayscale_away".into(), json!(true), Rule::TrueUnlessFalse);
        push("persons_show_badges".into(), json!(false), Rule::FalseUnlessTrue);
        push("persons_border_width".into(), json!(2), num(0.0, 10.0, 2.0));
        push("persons_border_color".into(), json!(""), Rule::Text);
        push(keys::PERSONS_ENTITIES.into(), json!([]), Rule::Persons);

        let index = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.key.clone(), i))
            .collect();
        let values = specs
            .iter()
            .map(|spec| (spec.key.clone(), spec.default.clone()))
            .collect();
        DefaultTable {
            specs,
            index,
            values,
        }
    }

    /// All recognized fields in validation order.
    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    /// Flat key → default value.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn spec(&self, key: &str) -> Option<&FieldSpec> {
        self.index.get(key).map(|&i| &self.specs[i])
    }

    /// Rule for an optional slot key (one without its own default). Template
    /// and styling overrides borrow the rule of the global they override.
    pub fn slot_override_rule(&self, kind: SlotKey) -> Rule {
        let global = match kind {
            SlotKey::Template(_, field) => field.global.map(str::to_string),
            SlotKey::Styling(field) => Some(keys::INFO_STYLING.flat_key(field)),
            SlotKey::Card => return Rule::Object,
            SlotKey::Popup(_) => return Rule::Passthrough,
            SlotKey::Common(_) | SlotKey::Action(_) => None,
        };
        global
            .and_then(|key| self.spec(&key))
            .map_or(Rule::Text, |spec| spec.rule.clone())
    }

    /// The slot type used when a flat config does not name one.
    pub fn slot_type(&self, slot: SlotId) -> SlotType {
        self.get(&slot.prefix())
            .and_then(Value::as_str)
            .and_then(SlotType::parse)
            .unwrap_or(SlotType::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        let t = table();
        assert_eq!(t.specs().len(), t.values().len());
    }

    #[test]
    fn min_height_precedes_max_height() {
        let keys: Vec<&str> = table().specs().iter().map(|s| s.key.as_str()).collect();
        let min = keys.iter().position(|k| *k == "min_height").unwrap();
        let max = keys.iter().position(|k| *k == "max_height").unwrap();
        assert!(min < max);
    }

    #[test]
    fn defaults_survive_their_own_rules() {
        let t = table();
        let mut resolved = Map::new();
        for spec in t.specs() {
            let out = spec.rule.apply(&spec.default, &spec.default, &resolved);
            assert_eq!(out.as_ref(), Some(&spec.default), "default of {} is not canonical", spec.key);
            resolved.insert(spec.key.clone(), spec.default.clone());
        }
    }

    #[test]
    fn slot_defaults() {
        let t = table();
        assert_eq!(t.get("top_bar_left"), Some(&json!("weather")));
        assert_eq!(t.get("top_bar_right"), Some(&json!("datetime")));
        assert_eq!(t.get("bottom_bar_center"), Some(&json!("none")));
        assert_eq!(t.get("top_bar_center_align"), Some(&json!("center")));
        assert_eq!(t.get("top_bar_left_offset_x_mobile"), Some(&Value::Null));
        assert_eq!(t.get("bottom_bar_right_tap_action"), Some(&json!({"action": "none"})));
    }

    #[test]
    fn slot_type_falls_back_to_table() {
        let slot = SlotId::new(Bar::Top, SlotPosition::Left);
        assert_eq!(table().slot_type(slot), SlotType::Weather);
    }

    #[test]
    fn override_rules_borrow_global_rule() {
        let t = table();
        let (template, field) = keys::WEATHER_TEMPLATE
            .fields
            .iter()
            .find(|f| f.nested == "icon_size")
            .map(|f| (&keys::WEATHER_TEMPLATE, f))
            .unwrap();
        assert_eq!(
            t.slot_override_rule(SlotKey::Template(template, field)),
            num(12.0, 96.0, 24.0)
        );
        assert_eq!(t.slot_override_rule(SlotKey::Styling("pill")), Rule::TrueUnlessFalse);
        assert_eq!(t.slot_override_rule(SlotKey::Card), Rule::Object);
        let label = keys::BUTTON_TEMPLATE.fields.iter().find(|f| f.nested == "label").unwrap();
        assert_eq!(
            t.slot_override_rule(SlotKey::Template(&keys::BUTTON_TEMPLATE, label)),
            Rule::Text
        );
    }
}
