//! Format detection for raw configuration objects.
//!
//! Detection is shape-sniffing: an explicit `schema_version` tag wins when
//! present, otherwise nested sub-objects mark the nested shape and a fixed
//! set of legacy-only keys marks the legacy shape. Anything else is taken as
//! canonical flat input and passed through.

use serde_json::{Map, Value};

use crate::keys::{DEPRECATED_KEYS, GLOBAL_GROUPS, PERSONS_BLOCK};
use crate::types::{Bar, ConfigFormat, SlotId};

/// Key of the optional explicit format tag.
pub const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Flat keys only the legacy shape writes.
const LEGACY_SENTINELS: &[&str] = &["persons_enabled"];

/// Classify a raw configuration object.
pub fn detect_format(config: &Map<String, Value>) -> ConfigFormat {
    if let Some(format) = schema_tag(config) {
        tracing::debug!(%format, "format taken from schema_version");
        return format;
    }
    let format = if looks_nested(config) {
        ConfigFormat::Nested
    } else if is_legacy_format(config) {
        ConfigFormat::Legacy
    } else {
        ConfigFormat::Canonical
    };
    tracing::debug!(%format, "format detected from shape");
    format
}

/// `schema_version: 1` is legacy flat, `2` is nested. Other values are ignored.
pub fn schema_tag(config: &Map<String, Value>) -> Option<ConfigFormat> {
    match config.get(SCHEMA_VERSION_KEY)?.as_u64()? {
        1 => Some(ConfigFormat::Legacy),
        2 => Some(ConfigFormat::Nested),
        _ => None,
    }
}

/// True iff the object holds at least one legacy-only key.
pub fn is_legacy_format(config: &Map<String, Value>) -> bool {
    LEGACY_SENTINELS
        .iter()
        .chain(DEPRECATED_KEYS)
        .any(|key| config.contains_key(*key))
        || SlotId::ALL
            .into_iter()
            .any(|slot| config.contains_key(&slot.key("weather_entity")))
}

/// True iff a bar, group, persons or slot field is itself an object.
pub fn looks_nested(config: &Map<String, Value>) -> bool {
    let is_object = |key: &str| config.get(key).is_some_and(Value::is_object);
    Bar::ALL.into_iter().any(|bar| is_object(bar.key()))
        || is_object(PERSONS_BLOCK)
        || GLOBAL_GROUPS.iter().any(|group| is_object(group.nested))
        || SlotId::ALL.into_iter().any(|slot| is_object(&slot.prefix()))
}
