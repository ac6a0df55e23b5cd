//! Decoded layer content and the normalization of its `annotations` field.

use serde_json::{Map, Value};

/// Top-level keys a layer file is allowed to carry.
pub const BASE_ANNOTATION_FEATURES: [&str; 4] =
    ["id", "annotation_type", "revision", "annotations"];

/// Annotation id → annotation record, in file order.
pub type AnnotationMap = Map<String, Value>;

/// Borrowed view over one decoded layer file.
///
/// The content stays a raw JSON value: a diagnostic has to describe exactly
/// what was on disk, including the shapes a typed model would reject.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationLayerContent<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> AnnotationLayerContent<'a> {
    /// `None` when the decoded document is not a mapping.
    pub fn new(value: &'a Value) -> Option<Self> {
        value.as_object().map(|fields| Self { fields })
    }

    /// Observed top-level keys, in file order.
    pub fn keys(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Observed keys outside [`BASE_ANNOTATION_FEATURES`], in file order.
    pub fn undefined_keys(&self) -> Vec<String> {
        self.fields
            .keys()
            .filter(|key| !BASE_ANNOTATION_FEATURES.contains(&key.as_str()))
            .cloned()
            .collect()
    }

    /// The declared layer type, if it is a non-empty string.
    pub fn annotation_type(&self) -> Option<&'a str> {
        self.fields
            .get("annotation_type")
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    /// The `annotations` field, classified by shape. `None` when absent.
    pub fn annotations(&self) -> Option<Annotations<'a>> {
        self.fields.get("annotations").map(Annotations::classify)
    }
}

/// The two legal shapes of `annotations`, plus everything else.
#[derive(Debug, Clone, Copy)]
pub enum Annotations<'a> {
    Sequence(&'a [Value]),
    Mapping(&'a Map<String, Value>),
    /// Null, scalar, or any other non-collection value.
    Malformed(&'a Value),
}

impl<'a> Annotations<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Self::Sequence(items),
            Value::Object(map) => Self::Mapping(map),
            other => Self::Malformed(other),
        }
    }

    /// Canonical mapping form. A sequence gets its 0-based positions as ids.
    pub fn normalize(self) -> NormalizedAnnotations {
        match self {
            Self::Sequence(items) => NormalizedAnnotations {
                records: items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| (idx.to_string(), item.clone()))
                    .collect(),
                ids_synthesized: true,
            },
            Self::Mapping(map) => NormalizedAnnotations {
                records: map.clone(),
                ids_synthesized: false,
            },
            Self::Malformed(_) => NormalizedAnnotations {
                records: Map::new(),
                ids_synthesized: false,
            },
        }
    }
}

/// `annotations` after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAnnotations {
    pub records: AnnotationMap,
    /// The input was a sequence and the ids are positions.
    pub ids_synthesized: bool,
}

impl NormalizedAnnotations {
    /// First record in insertion order.
    pub fn first(&self) -> Option<(&String, &Value)> {
        self.records.iter().next()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn undefined_keys_keep_observed_order() {
        let value = json!({"id": "x", "annotation_type": "Author", "rev": 1, "content": []});
        let content = AnnotationLayerContent::new(&value).unwrap();
        assert_eq!(content.undefined_keys(), vec!["rev", "content"]);
        assert_eq!(content.keys(), vec!["id", "annotation_type", "rev", "content"]);
    }

    #[test]
    fn empty_annotation_type_is_absent() {
        let value = json!({"annotation_type": ""});
        let content = AnnotationLayerContent::new(&value).unwrap();
        assert_eq!(content.annotation_type(), None);

        let value = json!({"annotation_type": 7});
        let content = AnnotationLayerContent::new(&value).unwrap();
        assert_eq!(content.annotation_type(), None);
    }

    #[test]
    fn sequence_normalizes_to_positional_ids() {
        let value = json!([{"a": 1}, {"b": 2}, {"c": 3}]);
        let normalized = Annotations::classify(&value).normalize();
        assert!(normalized.ids_synthesized);
        let keys: Vec<&str> = normalized.records.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["0", "1", "2"]);
        assert_eq!(normalized.records["1"], json!({"b": 2}));
    }

    #[test]
    fn mapping_keeps_ids_and_order() {
        let value = json!({"z9": {"a": 1}, "a1": {"b": 2}});
        let normalized = Annotations::classify(&value).normalize();
        assert!(!normalized.ids_synthesized);
        assert_eq!(normalized.first().map(|(id, _)| id.as_str()), Some("z9"));
    }

    #[test]
    fn malformed_normalizes_to_empty() {
        let value = json!(null);
        let normalized = Annotations::classify(&value).normalize();
        assert!(normalized.is_empty());
        assert!(!normalized.ids_synthesized);
    }

    #[test]
    fn non_mapping_document_has_no_view() {
        assert!(AnnotationLayerContent::new(&json!([1, 2])).is_none());
    }
}
