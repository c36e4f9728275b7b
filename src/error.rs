use std::path::PathBuf;

use thiserror::Error;

use crate::types::DocumentFormat;

#[derive(Debug, Error)]
pub enum CardConfigError {
    /// The card configuration is not an object (null, array, scalar).
    /// This is the only fatal normalization failure; the card renders nothing.
    #[error("Invalid configuration: expected an object, got {found}")]
    InvalidConfiguration { found: &'static str },

    #[error("Failed to parse {format} document: {reason}")]
    ParseError {
        format: DocumentFormat,
        reason: String,
    },

    #[error("Failed to read or write {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize {what}: {reason}")]
    Serialize { what: &'static str, reason: String },

    #[error("Cannot determine document format of {0} (expected .json or .toml)")]
    UnknownDocumentFormat(PathBuf),
}

impl CardConfigError {
    pub(crate) fn invalid_configuration(value: &serde_json::Value) -> Self {
        let found = match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "an array",
            serde_json::Value::Object(_) => "an object",
        };
        CardConfigError::InvalidConfiguration { found }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invalid_configuration_names_the_found_kind() {
        let err = CardConfigError::invalid_configuration(&json!(null));
        let msg = err.to_string();
        assert!(msg.contains("Invalid configuration"));
        assert!(msg.contains("null"));
    }

    #[test]
    fn invalid_configuration_for_array() {
        let err = CardConfigError::invalid_configuration(&json!([1, 2]));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn parse_error_formats() {
        let err = CardConfigError::ParseError {
            format: DocumentFormat::Toml,
            reason: "expected `=`".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("TOML"));
        assert!(msg.contains("expected `=`"));
    }

    #[test]
    fn unknown_document_format_mentions_path() {
        let err = CardConfigError::UnknownDocumentFormat("/tmp/card.yaml".into());
        assert!(err.to_string().contains("card.yaml"));
    }
}
