//! Shared key tables for the flat and nested configuration shapes.
//!
//! Both converter directions, the defaulting engine and the stripper walk
//! these tables, so a key missing here is lost on migration in both
//! directions. Adding a slot type means adding a [`SlotTemplate`] and
//! listing it in [`SLOT_TEMPLATES`].

use crate::types::{Bar, SlotType};

/// Top-level scalar fields, identical in flat and nested form.
pub const SIMPLE_PROPS: &[&str] = &[
    "type",
    "title",
    "subtitle",
    "image",
    "image_fit",
    "image_position",
    "height_vh",
    "min_height",
    "max_height",
    "blur_amount",
    "overlay_color",
    "overlay_opacity",
    "border_radius",
    "font_family",
    "text_color",
    "mobile_breakpoint",
    "full_width",
    "reduce_motion",
    "parallax",
];

/// Per-bar global fields: nested `top_bar.height` ↔ flat `top_bar_height`.
pub const BAR_FIELDS: &[&str] = &[
    "enabled",
    "height",
    "padding_x",
    "gap",
    "background",
    "blur",
    "opacity",
    "border_radius",
    "sticky",
];

pub const INFO_STYLING_FIELDS: &[&str] = &[
    "background",
    "color",
    "font_size",
    "font_weight",
    "pill",
    "blur",
    "border_radius",
    "padding",
];

/// A group of global settings nested under one object.
#[derive(Debug)]
pub struct GroupTable {
    /// Name of the nested object, e.g. `info_styling`.
    pub nested: &'static str,
    /// Prefix of the flat keys, e.g. `info_`.
    pub prefix: &'static str,
    pub fields: &'static [&'static str],
}

impl GroupTable {
    pub fn flat_key(&self, field: &str) -> String {
        format!("{}{}", self.prefix, field)
    }
}

pub const INFO_STYLING: GroupTable = GroupTable {
    nested: "info_styling",
    prefix: "info_",
    fields: INFO_STYLING_FIELDS,
};

pub const GLOBAL_GROUPS: &[GroupTable] = &[
    INFO_STYLING,
    GroupTable {
        nested: "weather",
        prefix: "weather_",
        fields: &[
            "entity",
            "show_icon",
            "show_condition",
            "show_temperature",
            "show_humidity",
            "show_wind",
            "colored_icons",
            "icon_size",
            "precision",
        ],
    },
    GroupTable {
        nested: "datetime",
        prefix: "datetime_",
        fields: &[
            "show_date",
            "show_time",
            "show_seconds",
            "show_weekday",
            "time_format",
            "date_format",
        ],
    },
    GroupTable {
        nested: "button",
        prefix: "button_",
        fields: &["show_state", "icon_size", "color"],
    },
    GroupTable {
        nested: "notifications",
        prefix: "notifications_",
        fields: &["icon", "show_count", "hide_when_empty", "max_items"],
    },
];

/// Slot fields every slot type has. Nested name equals the flat suffix.
pub const SLOT_COMMON_FIELDS: &[&str] = &[
    "offset_x",
    "offset_y",
    "offset_x_mobile",
    "offset_y_mobile",
    "align",
    "overflow",
];

/// Fields of the nested `actions` block; flat keys are `{slot}_{field}`.
pub const ACTION_FIELDS: &[&str] = &["tap_action", "hold_action", "double_tap_action"];

/// Nested slot block names.
pub const STYLING_BLOCK: &str = "styling";
pub const ACTIONS_BLOCK: &str = "actions";
pub const POPUP_BLOCK: &str = "hki_popup";
pub const CARD_BLOCK: &str = "card";

/// Flat suffix prefix for slot styling overrides: `styling.color` ↔ `{slot}_info_color`.
pub const STYLING_SUFFIX_PREFIX: &str = "info_";

/// One field of a type-specific slot block.
#[derive(Debug)]
pub struct TemplateField {
    /// Name inside the nested block, e.g. `entity`.
    pub nested: &'static str,
    /// Flat key suffix after the slot prefix, e.g. `weather_entity`.
    pub suffix: &'static str,
    /// Global flat key this field overrides, if there is one.
    pub global: Option<&'static str>,
}

const fn field(
    nested: &'static str,
    suffix: &'static str,
    global: Option<&'static str>,
) -> TemplateField {
    TemplateField {
        nested,
        suffix,
        global,
    }
}

/// A type-specific slot block (`weather`, `datetime`, `button`, `custom`).
#[derive(Debug)]
pub struct SlotTemplate {
    pub slot_type: SlotType,
    pub block: &'static str,
    pub fields: &'static [TemplateField],
}

pub const WEATHER_TEMPLATE: SlotTemplate = SlotTemplate {
    slot_type: SlotType::Weather,
    block: "weather",
    fields: &[
        field("entity", "weather_entity", Some("weather_entity")),
        field("show_icon", "show_icon", Some("weather_show_icon")),
        field("show_condition", "show_condition", Some("weather_show_condition")),
        field("show_temperature", "show_temperature", Some("weather_show_temperature")),
        field("show_humidity", "show_humidity", Some("weather_show_humidity")),
        field("show_wind", "show_wind", Some("weather_show_wind")),
        field("colored_icons", "weather_colored_icons", Some("weather_colored_icons")),
        field("icon_size", "weather_icon_size", Some("weather_icon_size")),
        field("precision", "weather_precision", Some("weather_precision")),
    ],
};

pub const DATETIME_TEMPLATE: SlotTemplate = SlotTemplate {
    slot_type: SlotType::DateTime,
    block: "datetime",
    fields: &[
        field("show_date", "show_date", Some("datetime_show_date")),
        field("show_time", "show_time", Some("datetime_show_time")),
        field("show_seconds", "show_seconds", Some("datetime_show_seconds")),
        field("show_weekday", "show_weekday", Some("datetime_show_weekday")),
        field("time_format", "time_format", Some("datetime_time_format")),
        field("date_format", "date_format", Some("datetime_date_format")),
    ],
};

pub const BUTTON_TEMPLATE: SlotTemplate = SlotTemplate {
    slot_type: SlotType::Button,
    block: "button",
    fields: &[
        field("entity", "button_entity", None),
        field("icon", "button_icon", None),
        field("label", "button_label", None),
        field("show_state", "button_show_state", Some("button_show_state")),
        field("icon_size", "button_icon_size", Some("button_icon_size")),
        field("color", "button_color", Some("button_color")),
    ],
};

/// Notifications settings keep their historical `custom` naming.
pub const CUSTOM_TEMPLATE: SlotTemplate = SlotTemplate {
    slot_type: SlotType::Notifications,
    block: "custom",
    fields: &[
        field("entity", "custom_entity", None),
        field("icon", "custom_icon", Some("notifications_icon")),
        field("show_count", "custom_show_count", Some("notifications_show_count")),
        field(
            "hide_when_empty",
            "custom_hide_when_empty",
            Some("notifications_hide_when_empty"),
        ),
        field("max_items", "custom_max_items", Some("notifications_max_items")),
    ],
};

pub const SLOT_TEMPLATES: &[&SlotTemplate] = &[
    &WEATHER_TEMPLATE,
    &DATETIME_TEMPLATE,
    &BUTTON_TEMPLATE,
    &CUSTOM_TEMPLATE,
];

pub fn template_for(slot_type: SlotType) -> Option<&'static SlotTemplate> {
    SLOT_TEMPLATES
        .iter()
        .copied()
        .find(|t| t.slot_type == slot_type)
}

/// Persons settings: nested `persons.size` ↔ flat `persons_size`.
pub const PERSONS_FIELDS: &[&str] = &[
    "enabled",
    "bar",
    "position",
    "size",
    "spacing",
    "max_visible",
    "grayscale_away",
    "show_badges",
    "border_width",
    "border_color",
    "entities",
];

pub const PERSONS_PREFIX: &str = "persons_";
pub const PERSONS_BLOCK: &str = "persons";
pub const PERSONS_ENTITIES: &str = "persons_entities";

/// Optional string sub-fields of a person entry.
pub const PERSON_STRING_FIELDS: &[&str] = &[
    "entity",
    "grayscale_entity",
    "icon_home",
    "icon_away",
    "picture_home",
    "picture_away",
];

/// The shared popup configuration vocabulary, reused at slot, action and
/// person level.
pub const POPUP_KEYS: &[&str] = &[
    // container
    "popup_animation",
    "popup_animation_duration",
    "popup_open_animation",
    "popup_close_animation",
    "popup_width",
    "popup_width_custom",
    "popup_height",
    "popup_height_custom",
    "popup_border_radius",
    "popup_blur_enabled",
    "popup_blur_amount",
    "popup_card_blur_enabled",
    "popup_card_blur_amount",
    "popup_card_opacity",
    "popup_backdrop_opacity",
    "popup_close_button",
    "popup_default_view",
    "popup_default_section",
    "popup_show_favorites",
    "popup_hide_history",
    "popup_history_period",
    // typography
    "popup_font_family",
    "popup_title_font_size",
    "popup_title_font_weight",
    "popup_title_color",
    "popup_value_font_size",
    "popup_value_font_weight",
    "popup_label_font_size",
    "popup_text_transform",
    // highlight and buttons
    "popup_highlight_color",
    "popup_highlight_text_color",
    "popup_highlight_radius",
    "popup_highlight_opacity",
    "popup_highlight_border_color",
    "popup_highlight_border_width",
    "popup_button_bg",
    "popup_button_text_color",
    "popup_button_radius",
    "popup_button_opacity",
    "popup_button_border_color",
    "popup_button_border_width",
    "popup_slider_radius",
    "popup_dropdown_radius",
    // per-domain
    "climate_use_circular_slider",
    "climate_show_plus_minus",
    "climate_show_gradient",
    "climate_show_target_range",
    "humidifier_use_circular_slider",
    "humidifier_show_plus_minus",
    "sensor_graph_color",
    "sensor_graph_hours",
    "person_show_map",
];

pub fn is_popup_key(key: &str) -> bool {
    POPUP_KEYS.contains(&key)
}

/// Keys deleted from every canonical config. The person actions moved onto
/// individual entries; gap and overlap were folded into `persons_spacing`.
pub const DEPRECATED_KEYS: &[&str] = &[
    "persons_gap",
    "persons_overlap",
    "persons_tap_action",
    "persons_hold_action",
    "persons_double_tap_action",
];

pub fn is_deprecated(key: &str) -> bool {
    DEPRECATED_KEYS.contains(&key)
}

/// Whether a top-level key names an object of the nested shape. Migration
/// always rebuilds these, so a flat value under one of them cannot survive.
pub fn is_block_name(key: &str) -> bool {
    key == PERSONS_BLOCK
        || Bar::ALL.into_iter().any(|bar| bar.key() == key)
        || GLOBAL_GROUPS.iter().any(|group| group.nested == key)
}

/// Written on persist even when equal to the default.
pub const ALWAYS_INCLUDED: &[&str] = &["type", "height_vh", "top_bar_enabled", "bottom_bar_enabled"];

/// Whether a flat key holds an action.
pub fn is_action_key(key: &str) -> bool {
    key == "tap_action"
        || key == "hold_action"
        || key == "double_tap_action"
        || key.ends_with("_tap_action")
        || key.ends_with("_hold_action")
}

/// What a flat slot suffix refers to.
#[derive(Debug, Clone, Copy)]
pub enum SlotKey {
    /// An entry of [`SLOT_COMMON_FIELDS`].
    Common(&'static str),
    /// An entry of [`ACTION_FIELDS`].
    Action(&'static str),
    /// A styling override; carries the info styling field name.
    Styling(&'static str),
    /// A field of a type-specific block.
    Template(&'static SlotTemplate, &'static TemplateField),
    /// The embedded card of a `card` slot.
    Card,
    /// A popup key.
    Popup(&'static str),
}

/// Classify the suffix of a `{bar}_{position}_{suffix}` key.
pub fn classify_slot_suffix(suffix: &str) -> Option<SlotKey> {
    if let Some(f) = SLOT_COMMON_FIELDS.iter().find(|f| **f == suffix) {
        return Some(SlotKey::Common(*f));
    }
    if let Some(f) = ACTION_FIELDS.iter().find(|f| **f == suffix) {
        return Some(SlotKey::Action(*f));
    }
    if let Some(f) = suffix
        .strip_prefix(STYLING_SUFFIX_PREFIX)
        .and_then(|rest| INFO_STYLING_FIELDS.iter().find(|f| **f == rest))
    {
        return Some(SlotKey::Styling(*f));
    }
    for template in SLOT_TEMPLATES {
        if let Some(f) = template.fields.iter().find(|f| f.suffix == suffix) {
            return Some(SlotKey::Template(*template, f));
        }
    }
    if suffix == CARD_BLOCK {
        return Some(SlotKey::Card);
    }
    POPUP_KEYS
        .iter()
        .find(|k| **k == suffix)
        .map(|k| SlotKey::Popup(*k))
}
