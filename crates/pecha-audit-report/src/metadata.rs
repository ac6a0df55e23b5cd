//! Metadata report: the standard pecha metadata keys merged with `meta.yml`.

use crate::table::Row;
use serde_json::Value;

/// Keys every pecha row starts with, in column order.
pub const PREDEFINED_METADATA_KEYS: [&str; 13] = [
    "id",
    "source",
    "source_file",
    "initial_creation_type",
    "imported",
    "last_modified",
    "parser",
    "default_language",
    "source_metadata",
    "statistics",
    "bases",
    "copyright",
    "license",
];

/// Seed a row with the predefined keys, then overlay `meta`. Later values
/// win; keys only `meta` has are appended in their file order.
pub fn metadata_row(pecha_id: &str, meta: Option<&Value>) -> Row {
    let mut row: Row = PREDEFINED_METADATA_KEYS
        .iter()
        .map(|key| (key.to_string(), Value::Null))
        .collect();
    row.insert("id".into(), Value::from(pecha_id));

    match meta {
        None | Some(Value::Null) => {}
        Some(Value::Object(fields)) => {
            for (key, value) in fields {
                row.insert(key.clone(), value.clone());
            }
        }
        Some(other) => {
            tracing::warn!(pecha_id, kind = value_kind(other), "meta.yml is not a mapping");
        }
    }
    row
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
