//! Structured-file decoding into `serde_json::Value`.
//!
//! OPF layer and meta files are YAML. The kernel works on JSON values, so
//! YAML documents are converted here: mapping order is kept, non-string keys
//! are stringified, and tags are dropped in favour of the tagged value.

use crate::error::StoreError;
use serde_json::{Map, Number, Value};
use std::fs;
use std::path::Path;

/// Decode a YAML document. An empty or whitespace-only document is `null`.
pub fn decode_yaml(text: &str, origin: &Path) -> Result<Value, StoreError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|source| StoreError::Yaml {
            path: origin.to_path_buf(),
            source,
        })?;
    Ok(yaml_to_json(yaml))
}

/// Read a `.json`, `.yml` or `.yaml` file. Anything that is not `.json` is
/// read as YAML, which also accepts JSON documents.
pub fn read_structured_file(path: impl AsRef<Path>) -> Result<Value, StoreError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return serde_json::from_str(&text).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        });
    }
    decode_yaml(&text, path)
}

pub fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => number_to_json(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(key_to_string(key), yaml_to_json(value));
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn number_to_json(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

fn key_to_string(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Tagged(tagged) => key_to_string(tagged.value),
        other => yaml_to_json(other).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(text: &str) -> Value {
        decode_yaml(text, Path::new("test.yml")).unwrap()
    }

    #[test]
    fn mapping_order_survives_decoding() {
        let value = decode("zeta: 1\nalpha: 2\nmid: 3\n");
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn integer_keys_become_strings() {
        let value = decode("annotations:\n  1: {span: {start: 0, end: 2}}\n");
        assert_eq!(value["annotations"]["1"]["span"]["end"], json!(2));
    }

    #[test]
    fn numbers_keep_their_kind() {
        let value = decode("a: -3\nb: 18446744073709551615\nc: 0.5\nd: .nan\n");
        assert_eq!(value["a"], json!(-3));
        assert_eq!(value["b"], json!(u64::MAX));
        assert_eq!(value["c"], json!(0.5));
        assert_eq!(value["d"], Value::Null);
    }

    #[test]
    fn tags_are_unwrapped() {
        let value = decode("layer: !custom {span: {start: 1, end: 2}}\n");
        assert_eq!(value["layer"]["span"]["start"], json!(1));
    }

    #[test]
    fn empty_document_is_null() {
        assert_eq!(decode(""), Value::Null);
        assert_eq!(decode("  \n"), Value::Null);
    }

    #[test]
    fn invalid_yaml_reports_its_origin() {
        let err = decode_yaml("a: [1, 2", Path::new("broken.yml")).unwrap_err();
        assert!(err.to_string().contains("broken.yml"));
    }

    #[test]
    fn json_extension_uses_json_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layer.json");
        fs::write(&path, r#"{"id": "x", "annotations": []}"#).unwrap();
        let value = read_structured_file(&path).unwrap();
        assert_eq!(value, json!({"id": "x", "annotations": []}));
    }
}
