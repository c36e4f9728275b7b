//! Loading raw configuration documents from JSON or TOML.
//!
//! Documents are read into the JSON value model regardless of their text
//! format; shape detection happens later, in normalization.

use std::path::Path;

use serde_json::Value;

use crate::error::CardConfigError;
use crate::types::DocumentFormat;

/// Parse document text. The result may be any JSON value; only
/// normalization insists on an object.
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Value, CardConfigError> {
    match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| CardConfigError::ParseError {
            format,
            reason: e.to_string(),
        }),
        DocumentFormat::Toml => {
            let table: toml::Table = toml::from_str(text).map_err(|e| CardConfigError::ParseError {
                format,
                reason: e.message().to_string(),
            })?;
            serde_json::to_value(table).map_err(|e| CardConfigError::ParseError {
                format,
                reason: e.to_string(),
            })
        }
    }
}

/// Read and parse a document, picking the format from its extension.
pub fn load_document(path: &Path) -> Result<Value, CardConfigError> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| CardConfigError::UnknownDocumentFormat(path.to_path_buf()))?;
    let text = std::fs::read_to_string(path).map_err(|e| CardConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), %format, "loading configuration document");
    parse_document(&text, format)
}
