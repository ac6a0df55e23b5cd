//! Field-set deltas and schema verdict for a layer's representative record.

use crate::schema::LayerSchema;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConformanceReport {
    /// Schema-required names, schema order.
    pub required_fields: Vec<String>,
    /// Required but not observed, schema order.
    pub missing_fields: Vec<String>,
    /// Observed but not required, observed order.
    pub extra_fields: Vec<String>,
    pub validation_passed: bool,
}

/// Compare one record and its observed field names against `schema`.
///
/// Validation errors are logged and collapsed into `validation_passed`;
/// they never leave this function.
pub fn check(
    first_record: &Value,
    observed_fields: &[String],
    schema: &LayerSchema,
) -> ConformanceReport {
    let required_fields = schema.required_fields();
    let missing_fields = required_fields
        .iter()
        .filter(|name| !observed_fields.contains(name))
        .cloned()
        .collect();
    let extra_fields = observed_fields
        .iter()
        .filter(|name| !required_fields.contains(name))
        .cloned()
        .collect();

    let validation_passed = match schema.validate(first_record) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(layer = %schema.layer, error = %err, "schema validation failed");
            false
        }
    };

    ConformanceReport {
        required_fields,
        missing_fields,
        extra_fields,
        validation_passed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerType;
    use crate::schema::{FieldKind, FieldSpec, LayerSchemaTable, SchemaRegistry};
    use serde_json::json;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn deltas_follow_their_source_order() {
        let schema = LayerSchema::new(
            LayerType::Durchen,
            vec![
                FieldSpec::required("span", FieldKind::Span),
                FieldSpec::required("default", FieldKind::String),
                FieldSpec::required("options", FieldKind::Mapping),
            ],
        );
        let record = json!({"note": "x", "span": {"start": 0, "end": 1}, "extra": 1});
        let report = check(&record, &fields(&["note", "span", "extra"]), &schema);
        assert_eq!(report.required_fields, fields(&["span", "default", "options"]));
        assert_eq!(report.missing_fields, fields(&["default", "options"]));
        assert_eq!(report.extra_fields, fields(&["note", "extra"]));
        assert!(!report.validation_passed);
    }

    #[test]
    fn missing_and_extra_are_disjoint() {
        let table = LayerSchemaTable::builtin();
        let schema = table.schema_for(LayerType::OcrConfidence).unwrap();
        let record = json!({"span": {"start": 0, "end": 1}, "metadata": {}});
        let observed = fields(&["span", "metadata"]);
        let report = check(&record, &observed, schema);
        assert_eq!(report.missing_fields, fields(&["confidence"]));
        assert_eq!(report.extra_fields, fields(&["metadata"]));
        assert!(
            report
                .missing_fields
                .iter()
                .all(|name| !report.extra_fields.contains(name))
        );
    }

    #[test]
    fn malformed_record_fails_without_panicking() {
        let table = LayerSchemaTable::builtin();
        let schema = table.schema_for(LayerType::Author).unwrap();
        let report = check(&json!(42), &[], schema);
        assert!(!report.validation_passed);
        assert_eq!(report.missing_fields, fields(&["span"]));
        assert!(report.extra_fields.is_empty());
    }

    #[test]
    fn conforming_record_passes() {
        let table = LayerSchemaTable::builtin();
        let schema = table.schema_for(LayerType::Author).unwrap();
        let record = json!({"span": {"start": 0, "end": 4}});
        let report = check(&record, &fields(&["span"]), schema);
        assert!(report.validation_passed);
        assert!(report.missing_fields.is_empty());
        assert!(report.extra_fields.is_empty());
    }
}
