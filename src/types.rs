//! Small shared vocabulary: bars, slot positions, slot types, formats.

use std::fmt;
use std::path::{Path, PathBuf};

/// One of the two header bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bar {
    Top,
    Bottom,
}

impl Bar {
    pub const ALL: [Bar; 2] = [Bar::Top, Bar::Bottom];

    /// Key used for the bar, both as nested object name and flat prefix.
    pub fn key(self) -> &'static str {
        match self {
            Bar::Top => "top_bar",
            Bar::Bottom => "bottom_bar",
        }
    }

    pub fn parse(s: &str) -> Option<Bar> {
        match s {
            "top_bar" => Some(Bar::Top),
            "bottom_bar" => Some(Bar::Bottom),
            _ => None,
        }
    }
}

/// Horizontal position of a slot within its bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotPosition {
    Left,
    Center,
    Right,
}

impl SlotPosition {
    pub const ALL: [SlotPosition; 3] = [SlotPosition::Left, SlotPosition::Center, SlotPosition::Right];

    pub fn key(self) -> &'static str {
        match self {
            SlotPosition::Left => "left",
            SlotPosition::Center => "center",
            SlotPosition::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<SlotPosition> {
        match s {
            "left" => Some(SlotPosition::Left),
            "center" => Some(SlotPosition::Center),
            "right" => Some(SlotPosition::Right),
            _ => None,
        }
    }

    /// Alignment a slot gets when none (or an invalid one) is configured.
    pub fn default_align(self) -> Align {
        match self {
            SlotPosition::Left => Align::Start,
            SlotPosition::Center => Align::Center,
            SlotPosition::Right => Align::End,
        }
    }
}

/// One of the six content slots.
///
/// This is the only place that knows how a slot maps to the flat
/// `{bar}_{position}` key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    pub bar: Bar,
    pub position: SlotPosition,
}

impl SlotId {
    pub const ALL: [SlotId; 6] = [
        SlotId::new(Bar::Top, SlotPosition::Left),
        SlotId::new(Bar::Top, SlotPosition::Center),
        SlotId::new(Bar::Top, SlotPosition::Right),
        SlotId::new(Bar::Bottom, SlotPosition::Left),
        SlotId::new(Bar::Bottom, SlotPosition::Center),
        SlotId::new(Bar::Bottom, SlotPosition::Right),
    ];

    pub const fn new(bar: Bar, position: SlotPosition) -> Self {
        Self { bar, position }
    }

    /// The flat key holding the slot type, e.g. `top_bar_left`.
    pub fn prefix(self) -> String {
        format!("{}_{}", self.bar.key(), self.position.key())
    }

    /// The flat key for a slot field, e.g. `top_bar_left_offset_x`.
    pub fn key(self, suffix: &str) -> String {
        format!("{}_{}_{}", self.bar.key(), self.position.key(), suffix)
    }

    /// If `flat_key` belongs to this slot, return its suffix.
    pub fn suffix_of(self, flat_key: &str) -> Option<&str> {
        flat_key
            .strip_prefix(self.bar.key())?
            .strip_prefix('_')?
            .strip_prefix(self.position.key())?
            .strip_prefix('_')
    }

    /// Find the slot a flat key belongs to, together with the suffix.
    pub fn owning(flat_key: &str) -> Option<(SlotId, &str)> {
        SlotId::ALL
            .into_iter()
            .find_map(|slot| slot.suffix_of(flat_key).map(|suffix| (slot, suffix)))
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.bar.key(), self.position.key())
    }
}

/// What a slot hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotType {
    None,
    Spacer,
    Weather,
    DateTime,
    Notifications,
    Card,
    Button,
}

impl SlotType {
    /// Parse a slot type. `custom` is accepted as the deprecated name of
    /// `notifications`.
    pub fn parse(s: &str) -> Option<SlotType> {
        match s {
            "none" => Some(SlotType::None),
            "spacer" => Some(SlotType::Spacer),
            "weather" => Some(SlotType::Weather),
            "datetime" => Some(SlotType::DateTime),
            "notifications" | "custom" => Some(SlotType::Notifications),
            "card" => Some(SlotType::Card),
            "button" => Some(SlotType::Button),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SlotType::None => "none",
            SlotType::Spacer => "spacer",
            SlotType::Weather => "weather",
            SlotType::DateTime => "datetime",
            SlotType::Notifications => "notifications",
            SlotType::Card => "card",
            SlotType::Button => "button",
        }
    }
}

/// Alignment of slot content inside its area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Align {
    Start,
    Center,
    End,
    Stretch,
}

impl Align {
    pub fn parse(s: &str) -> Option<Align> {
        match s {
            "start" => Some(Align::Start),
            "center" => Some(Align::Center),
            "end" => Some(Align::End),
            "stretch" => Some(Align::Stretch),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Align::Start => "start",
            Align::Center => "center",
            Align::End => "end",
            Align::Stretch => "stretch",
        }
    }
}

/// Shape of a raw configuration object, as classified by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// Oldest flat shape; needs the migrate-then-flatten round.
    Legacy,
    /// Human-authored shape with bar, group and persons sub-objects.
    Nested,
    /// Already flat; passes straight to the defaulting engine.
    Canonical,
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Legacy => write!(f, "legacy"),
            ConfigFormat::Nested => write!(f, "nested"),
            ConfigFormat::Canonical => write!(f, "canonical"),
        }
    }
}

/// Text format of a stored configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<DocumentFormat> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(DocumentFormat::Json),
            "toml" => Some(DocumentFormat::Toml),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Json => write!(f, "JSON"),
            DocumentFormat::Toml => write!(f, "TOML"),
        }
    }
}

/// A config operation on a stored document, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    Detect { path: PathBuf },
    Normalize { path: PathBuf },
    Migrate { path: PathBuf },
    Flatten { path: PathBuf },
    Strip { path: PathBuf, output: Option<PathBuf> },
}
