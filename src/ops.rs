//! Document operations and their result type.
//!
//! Provides the logic behind `detect`, `normalize`, `migrate`, `flatten` and
//! `strip`, and the `ConfigResult` enum that callers use to display results.

use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

use crate::detect::detect_format;
use crate::document::load_document;
use crate::error::CardConfigError;
use crate::migrate::migrate_legacy_to_nested;
use crate::normalize::{normalize_config, to_flat};
use crate::persist::persist_minimal;
use crate::strip::strip_to_minimal;
use crate::types::{ConfigAction, ConfigFormat};

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// The detected shape of a document.
    Format { path: PathBuf, format: ConfigFormat },
    /// A transformed configuration, displayed as pretty JSON.
    Document(Value),
    /// Confirmation that a minimal configuration was written to a file.
    MinimalWritten { path: PathBuf },
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Format { path, format } => write!(f, "{}: {format}", path.display()),
            ConfigResult::Document(value) => {
                let text = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
                write!(f, "{text}")
            }
            ConfigResult::MinimalWritten { path } => {
                write!(f, "Minimal configuration written to {}", path.display())
            }
        }
    }
}

/// Run an operation against a document on disk.
pub fn handle(action: ConfigAction) -> Result<ConfigResult, CardConfigError> {
    match action {
        ConfigAction::Detect { path } => {
            let raw = load_document(&path)?;
            let obj = raw
                .as_object()
                .ok_or_else(|| CardConfigError::invalid_configuration(&raw))?;
            Ok(ConfigResult::Format {
                format: detect_format(obj),
                path,
            })
        }
        ConfigAction::Normalize { path } => {
            let config = normalize_config(&load_document(&path)?)?;
            Ok(ConfigResult::Document(config.to_value()))
        }
        ConfigAction::Migrate { path } => {
            let raw = load_document(&path)?;
            let obj = raw
                .as_object()
                .ok_or_else(|| CardConfigError::invalid_configuration(&raw))?;
            Ok(ConfigResult::Document(Value::Object(migrate_legacy_to_nested(&to_flat(obj)))))
        }
        ConfigAction::Flatten { path } => {
            let raw = load_document(&path)?;
            let obj = raw
                .as_object()
                .ok_or_else(|| CardConfigError::invalid_configuration(&raw))?;
            Ok(ConfigResult::Document(Value::Object(to_flat(obj))))
        }
        ConfigAction::Strip { path, output } => {
            let config = normalize_config(&load_document(&path)?)?;
            let minimal = strip_to_minimal(&config);
            match output {
                Some(out) => {
                    persist_minimal(&out, &minimal)?;
                    Ok(ConfigResult::MinimalWritten { path: out })
                }
                None => Ok(ConfigResult::Document(Value::Object(minimal))),
            }
        }
    }
}
