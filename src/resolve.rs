//! Typed views over a canonical configuration.
//!
//! Rendering never reads flat keys directly. Each slot is resolved once into
//! a [`ResolvedSlot`], where slot-level overrides have already been layered
//! over the global settings they override. No I/O happens here.

use serde_json::{Map, Value};

use crate::action::Action;
use crate::keys::{self, SlotTemplate};
use crate::normalize::CanonicalConfig;
use crate::person::PersonEntity;
use crate::popup;
use crate::states::StateSnapshot;
use crate::types::{Align, Bar, SlotId, SlotPosition, SlotType};
use crate::validate::parse_number;

/// Per-bar settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSettings {
    pub enabled: bool,
    pub height: f64,
    pub padding_x: f64,
    pub gap: f64,
    pub background: String,
    pub blur: f64,
    pub opacity: f64,
    pub border_radius: f64,
    pub sticky: bool,
}

/// Pill styling of slot content.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoStyling {
    pub background: String,
    pub color: String,
    pub font_size: f64,
    pub font_weight: String,
    pub pill: bool,
    pub blur: f64,
    pub border_radius: f64,
    pub padding: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSettings {
    pub entity: Option<String>,
    pub show_icon: bool,
    pub show_condition: bool,
    pub show_temperature: bool,
    pub show_humidity: bool,
    pub show_wind: bool,
    pub colored_icons: bool,
    pub icon_size: f64,
    pub precision: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateTimeSettings {
    pub show_date: bool,
    pub show_time: bool,
    pub show_seconds: bool,
    pub show_weekday: bool,
    pub time_format: String,
    pub date_format: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonSettings {
    pub entity: Option<String>,
    pub icon: Option<String>,
    pub label: Option<String>,
    pub show_state: bool,
    pub icon_size: f64,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationSettings {
    pub entity: Option<String>,
    pub icon: String,
    pub show_count: bool,
    pub hide_when_empty: bool,
    pub max_items: usize,
}

/// What a slot renders.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotContent {
    None,
    Spacer,
    Weather(WeatherSettings),
    DateTime(DateTimeSettings),
    Notifications(NotificationSettings),
    /// An embedded card config; `None` when the slot has no card yet.
    Card(Option<Map<String, Value>>),
    Button(ButtonSettings),
}

/// Slot offsets in pixels. Mobile offsets of `None` inherit the desktop ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offsets {
    pub x: f64,
    pub y: f64,
    pub x_mobile: Option<f64>,
    pub y_mobile: Option<f64>,
}

impl Offsets {
    /// The `(x, y)` offset for the current viewport.
    pub fn effective(&self, mobile: bool) -> (f64, f64) {
        if mobile {
            (self.x_mobile.unwrap_or(self.x), self.y_mobile.unwrap_or(self.y))
        } else {
            (self.x, self.y)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotActions {
    pub tap: Action,
    pub hold: Action,
    pub double_tap: Action,
}

/// A slot with every override applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSlot {
    pub id: SlotId,
    pub content: SlotContent,
    pub offsets: Offsets,
    pub align: Align,
    pub overflow: bool,
    pub styling: InfoStyling,
    pub actions: SlotActions,
    /// Slot-level popup overrides only; see [`popup::resolve_popup`].
    pub popup: Map<String, Value>,
}

impl ResolvedSlot {
    pub fn is_empty(&self) -> bool {
        self.content == SlotContent::None
    }
}

/// Settings of the person avatar group.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonsSettings {
    pub enabled: bool,
    pub bar: Bar,
    pub position: SlotPosition,
    pub size: f64,
    pub spacing: f64,
    pub max_visible: usize,
    pub grayscale_away: bool,
    pub show_badges: bool,
    pub border_width: f64,
    pub border_color: Option<String>,
    pub entities: Vec<PersonEntity>,
}

/// One avatar, resolved against current entity states.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonView<'a> {
    pub person: &'a PersonEntity,
    pub home: bool,
    pub picture: Option<String>,
    pub icon: Option<String>,
    pub grayscale: bool,
}

impl PersonsSettings {
    /// Avatars to draw, capped at `max_visible`.
    pub fn views<'a>(&'a self, states: &StateSnapshot) -> Vec<PersonView<'a>> {
        self.entities
            .iter()
            .take(self.max_visible)
            .map(|person| {
                let entity = states.get(&person.entity);
                let home = entity.is_some_and(|e| e.state == "home");
                let (picture, icon) = if home {
                    (&person.picture_home, &person.icon_home)
                } else {
                    (&person.picture_away, &person.icon_away)
                };
                let picture = picture.clone().or_else(|| {
                    entity
                        .and_then(|e| e.attribute_str("entity_picture"))
                        .map(str::to_string)
                });
                let grayscale = match &person.grayscale_entity {
                    Some(id) => states.state(id) == Some("on"),
                    None => self.grayscale_away && !home,
                };
                PersonView {
                    person,
                    home,
                    picture,
                    icon: icon.clone(),
                    grayscale,
                }
            })
            .collect()
    }
}

fn non_empty(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

/// Lookup for one slot: slot keys first, then the global they override.
struct SlotScope<'a> {
    config: &'a CanonicalConfig,
    slot: SlotId,
}

impl SlotScope<'_> {
    fn template(&self, template: &SlotTemplate, nested: &str) -> Value {
        let Some(field) = template.fields.iter().find(|f| f.nested == nested) else {
            return Value::Null;
        };
        self.config
            .get(&self.slot.key(field.suffix))
            .or_else(|| field.global.and_then(|g| self.config.get(g)))
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn template_bool(&self, template: &SlotTemplate, nested: &str) -> bool {
        self.template(template, nested).as_bool().unwrap_or_default()
    }

    fn template_number(&self, template: &SlotTemplate, nested: &str) -> f64 {
        parse_number(&self.template(template, nested)).unwrap_or_default()
    }

    fn template_text(&self, template: &SlotTemplate, nested: &str) -> Option<String> {
        non_empty(&self.template(template, nested))
    }

    fn styling(&self, field: &str) -> Value {
        let suffix = format!("{}{field}", keys::STYLING_SUFFIX_PREFIX);
        self.config
            .get(&self.slot.key(&suffix))
            .or_else(|| self.config.get(&keys::INFO_STYLING.flat_key(field)))
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn own(&self, suffix: &str) -> Option<&Value> {
        self.config.get(&self.slot.key(suffix))
    }
}

/// Resolve a slot of a canonical configuration.
pub fn resolve_slot(config: &CanonicalConfig, slot: SlotId) -> ResolvedSlot {
    let scope = SlotScope { config, slot };
    let number = |suffix: &str| scope.own(suffix).and_then(parse_number).unwrap_or_default();
    let nullable = |suffix: &str| scope.own(suffix).and_then(parse_number);
    let action = |suffix: &str| Action::from_value(scope.own(suffix).unwrap_or(&Value::Null));

    let styling_number = |field: &str| parse_number(&scope.styling(field)).unwrap_or_default();
    let styling = InfoStyling {
        background: scope.styling("background").as_str().unwrap_or_default().to_string(),
        color: scope.styling("color").as_str().unwrap_or_default().to_string(),
        font_size: styling_number("font_size"),
        font_weight: scope.styling("font_weight").as_str().unwrap_or_default().to_string(),
        pill: scope.styling("pill").as_bool().unwrap_or_default(),
        blur: styling_number("blur"),
        border_radius: styling_number("border_radius"),
        padding: styling_number("padding"),
    };

    ResolvedSlot {
        id: slot,
        content: resolve_content(&scope),
        offsets: Offsets {
            x: number("offset_x"),
            y: number("offset_y"),
            x_mobile: nullable("offset_x_mobile"),
            y_mobile: nullable("offset_y_mobile"),
        },
        align: scope
            .own("align")
            .and_then(Value::as_str)
            .and_then(Align::parse)
            .unwrap_or(slot.position.default_align()),
        overflow: scope.own("overflow").and_then(Value::as_bool).unwrap_or_default(),
        styling,
        actions: SlotActions {
            tap: action("tap_action"),
            hold: action("hold_action"),
            double_tap: action("double_tap_action"),
        },
        popup: popup::slot_popup(config.as_map(), slot),
    }
}

fn resolve_content(scope: &SlotScope<'_>) -> SlotContent {
    match scope.config.slot_type(scope.slot) {
        SlotType::None => SlotContent::None,
        SlotType::Spacer => SlotContent::Spacer,
        SlotType::Weather => {
            let t = &keys::WEATHER_TEMPLATE;
            SlotContent::Weather(WeatherSettings {
                entity: scope.template_text(t, "entity"),
                show_icon: scope.template_bool(t, "show_icon"),
                show_condition: scope.template_bool(t, "show_condition"),
                show_temperature: scope.template_bool(t, "show_temperature"),
                show_humidity: scope.template_bool(t, "show_humidity"),
                show_wind: scope.template_bool(t, "show_wind"),
                colored_icons: scope.template_bool(t, "colored_icons"),
                icon_size: scope.template_number(t, "icon_size"),
                precision: scope.template_number(t, "precision") as u8,
            })
        }
        SlotType::DateTime => {
            let t = &keys::DATETIME_TEMPLATE;
            SlotContent::DateTime(DateTimeSettings {
                show_date: scope.template_bool(t, "show_date"),
                show_time: scope.template_bool(t, "show_time"),
                show_seconds: scope.template_bool(t, "show_seconds"),
                show_weekday: scope.template_bool(t, "show_weekday"),
                time_format: scope.template_text(t, "time_format").unwrap_or_default(),
                date_format: scope.template_text(t, "date_format").unwrap_or_default(),
            })
        }
        SlotType::Button => {
            let t = &keys::BUTTON_TEMPLATE;
            SlotContent::Button(ButtonSettings {
                entity: scope.template_text(t, "entity"),
                icon: scope.template_text(t, "icon"),
                label: scope.template_text(t, "label"),
                show_state: scope.template_bool(t, "show_state"),
                icon_size: scope.template_number(t, "icon_size"),
                color: scope.template_text(t, "color"),
            })
        }
        SlotType::Notifications => {
            let t = &keys::CUSTOM_TEMPLATE;
            SlotContent::Notifications(NotificationSettings {
                entity: scope.template_text(t, "entity"),
                icon: scope.template_text(t, "icon").unwrap_or_default(),
                show_count: scope.template_bool(t, "show_count"),
                hide_when_empty: scope.template_bool(t, "hide_when_empty"),
                max_items: scope.template_number(t, "max_items") as usize,
            })
        }
        SlotType::Card => SlotContent::Card(
            scope
                .own(keys::CARD_BLOCK)
                .and_then(Value::as_object)
                .cloned(),
        ),
    }
}

/// All six slots in bar order.
pub fn resolve_slots(config: &CanonicalConfig) -> Vec<ResolvedSlot> {
    SlotId::ALL
        .into_iter()
        .map(|slot| resolve_slot(config, slot))
        .collect()
}

pub fn resolve_bar(config: &CanonicalConfig, bar: Bar) -> BarSettings {
    let key = |field: &str| format!("{}_{field}", bar.key());
    BarSettings {
        enabled: config.bool(&key("enabled")),
        height: config.number(&key("height")),
        padding_x: config.number(&key("padding_x")),
        gap: config.number(&key("gap")),
        background: config.str(&key("background")).to_string(),
        blur: config.number(&key("blur")),
        opacity: config.number(&key("opacity")),
        border_radius: config.number(&key("border_radius")),
        sticky: config.bool(&key("sticky")),
    }
}

pub fn resolve_persons(config: &CanonicalConfig) -> PersonsSettings {
    let entities = config
        .get(keys::PERSONS_ENTITIES)
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(PersonEntity::from_value).collect())
        .unwrap_or_default();
    PersonsSettings {
        enabled: config.bool("persons_enabled"),
        bar: Bar::parse(config.str("persons_bar")).unwrap_or(Bar::Top),
        position: SlotPosition::parse(config.str("persons_position")).unwrap_or(SlotPosition::Right),
        size: config.number("persons_size"),
        spacing: config.number("persons_spacing"),
        max_visible: config.number("persons_max_visible") as usize,
        grayscale_away: config.bool("persons_grayscale_away"),
        show_badges: config.bool("persons_show_badges"),
        border_width: config.number("persons_border_width"),
        border_color: non_empty(config.get("persons_border_color").unwrap_or(&Value::Null)),
        entities,
    }
}
