//! Writing minimal configurations back to documents.
//!
//! JSON documents are rewritten whole. TOML documents are edited in place
//! with `toml_edit`, so comments and formatting on keys that survive the
//! edit are preserved. Creates parent directories as needed.

use std::path::Path;

use serde_json::{Map, Value};
use toml_edit::{Array, ArrayOfTables, DocumentMut, InlineTable, Item, Table};

use crate::error::CardConfigError;
use crate::types::DocumentFormat;

/// Pure function: render a minimal config as a pretty JSON document.
pub fn to_json_document(minimal: &Map<String, Value>) -> Result<String, CardConfigError> {
    let mut text = serde_json::to_string_pretty(minimal).map_err(|e| CardConfigError::Serialize {
        what: "JSON document",
        reason: e.to_string(),
    })?;
    text.push('\n');
    Ok(text)
}

/// Pure function: make a TOML document hold exactly `minimal`.
///
/// If `content` is `None` (file doesn't exist yet), starts from an empty
/// document. Keys absent from `minimal` are removed; kept keys keep their
/// comments and position.
pub fn set_in_toml_document(content: Option<&str>, minimal: &Map<String, Value>) -> Result<String, CardConfigError> {
    let mut doc: DocumentMut = content
        .unwrap_or_default()
        .parse()
        .map_err(|e: toml_edit::TomlError| CardConfigError::ParseError {
            format: DocumentFormat::Toml,
            reason: e.to_string(),
        })?;
    sync_table(doc.as_table_mut(), minimal);
    Ok(doc.to_string())
}

fn sync_table(table: &mut Table, source: &Map<String, Value>) {
    let stale: Vec<String> = table
        .iter()
        .map(|(k, _)| k.to_string())
        .filter(|k| !source.contains_key(k))
        .collect();
    for key in stale {
        table.remove(&key);
    }

    for (key, value) in source {
        if let Value::Object(child) = value
            && let Some(existing) = table.get_mut(key).and_then(Item::as_table_mut)
        {
            sync_table(existing, child);
            continue;
        }
        let Some(mut item) = to_item(value) else {
            table.remove(key);
            continue;
        };
        if let (Some(Item::Value(existing)), Item::Value(new)) = (table.get(key), &mut item) {
            *new.decor_mut() = existing.decor().clone();
        }
        table[key.as_str()] = item;
    }
}

fn to_table(obj: &Map<String, Value>) -> Table {
    let mut table = Table::new();
    for (key, value) in obj {
        if let Some(item) = to_item(value) {
            table.insert(key, item);
        }
    }
    if !table.is_empty()
        && table
            .iter()
            .all(|(_, item)| matches!(item, Item::Table(_) | Item::ArrayOfTables(_)))
    {
        table.set_implicit(true);
    }
    table
}

/// Objects become standard tables and arrays of objects become arrays of
/// tables; `null` has no TOML form and is skipped.
fn to_item(value: &Value) -> Option<Item> {
    match value {
        Value::Null => None,
        Value::Object(obj) => Some(Item::Table(to_table(obj))),
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            let mut tables = ArrayOfTables::new();
            for obj in items.iter().filter_map(Value::as_object) {
                tables.push(to_table(obj));
            }
            Some(Item::ArrayOfTables(tables))
        }
        other => to_value(other).map(Item::Value),
    }
}

fn to_value(value: &Value) -> Option<toml_edit::Value> {
    let out = match value {
        Value::Null => return None,
        Value::Bool(b) => toml_edit::Value::from(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => toml_edit::Value::from(i),
            None => toml_edit::Value::from(n.as_f64()?),
        },
        Value::String(s) => toml_edit::Value::from(s.as_str()),
        Value::Array(items) => {
            let mut array = Array::new();
            for item in items.iter().filter_map(to_value) {
                array.push(item);
            }
            toml_edit::Value::Array(array)
        }
        Value::Object(obj) => {
            let mut inline = InlineTable::new();
            for (key, v) in obj {
                if let Some(v) = to_value(v) {
                    inline.insert(key.as_str(), v);
                }
            }
            toml_edit::Value::InlineTable(inline)
        }
    };
    Some(out)
}

/// I/O wrapper: write a minimal config to `file_path`, in the format its
/// extension names. Existing TOML files are edited in place.
pub fn persist_minimal(file_path: &Path, minimal: &Map<String, Value>) -> Result<(), CardConfigError> {
    let format = DocumentFormat::from_path(file_path)
        .ok_or_else(|| CardConfigError::UnknownDocumentFormat(file_path.to_path_buf()))?;

    let new_content = match format {
        DocumentFormat::Json => to_json_document(minimal)?,
        DocumentFormat::Toml => {
            let content = match std::fs::read_to_string(file_path) {
                Ok(c) => Some(c),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => {
                    return Err(CardConfigError::IoError {
                        path: file_path.to_path_buf(),
                        source: e,
                    });
                }
            };
            set_in_toml_document(content.as_deref(), minimal)?
        }
    };

    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CardConfigError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(file_path, &new_content).map_err(|e| CardConfigError::IoError {
        path: file_path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %file_path.display(), %format, "minimal configuration written");
    Ok(())
}
