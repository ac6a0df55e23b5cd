//! Annotation-layer diagnostics.
//!
//! One `AnnotationLayerDiagnostic` describes one layer file of one volume:
//! what was present, what the schema expected, and which span bounds are
//! broken. Building never fails. Absent or malformed input leaves the
//! affected fields at their defaults, and the diagnostic is the report.
//!
//! ```text
//! content ─► base keys ─► annotation_type ─► annotations (normalize)
//!                                                 │ first record
//!                                   ┌─────────────┴─────────────┐
//!                              span::analyze            conformance::check
//!                               (all records)             (schema only)
//! ```

use crate::conformance::{self, ConformanceReport};
use crate::content::{AnnotationLayerContent, Annotations};
use crate::layer::is_known_layer_type;
use crate::schema::LayerSchema;
use crate::span::{self, SpanReport, ViolationMap};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Report columns, in output order. Every diagnostic renders every column.
pub const DIAGNOSTIC_COLUMNS: [&str; 25] = [
    "pecha_id",
    "volume_name",
    "has_base_file",
    "base_file_length",
    "annotation_file_name",
    "is_annotation_file_name_enumed",
    "base_fields",
    "undefined_base_fields",
    "has_annotation_type",
    "annotation_type",
    "is_annotation_type_enumed",
    "has_annotations",
    "has_annotation_id_missing",
    "annotation_fields",
    "required_annotation_fields",
    "missing_annotation_fields",
    "extra_annotation_fields",
    "has_span_annotation",
    "has_start_end_in_span",
    "start_end_are_integer",
    "start_greater_equal_than_end",
    "start_end_negative_values",
    "start_end_greater_than_base_file_length",
    "validation_passed",
    "annotation_count",
];

/// Knobs for behaviour that differs between corpus generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticOptions {
    /// Whether a present-but-empty `annotations` value counts as
    /// `has_annotations = true`.
    pub empty_annotations_present: bool,
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        Self {
            empty_annotations_present: true,
        }
    }
}

/// Structured findings for one (volume, layer file) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct AnnotationLayerDiagnostic {
    pub pecha_id: String,
    pub volume_name: String,
    pub has_base_file: bool,
    pub base_file_length: Option<u64>,
    pub annotation_file_name: Option<String>,
    pub is_annotation_file_name_enumed: bool,
    pub base_fields: Vec<String>,
    pub undefined_base_fields: Vec<String>,
    pub has_annotation_type: bool,
    pub annotation_type: Option<String>,
    pub is_annotation_type_enumed: bool,
    pub has_annotations: bool,
    pub has_annotation_id_missing: bool,
    pub annotation_fields: Vec<String>,
    pub required_annotation_fields: Vec<String>,
    pub missing_annotation_fields: Vec<String>,
    pub extra_annotation_fields: Vec<String>,
    pub has_span_annotation: bool,
    pub has_start_end_in_span: bool,
    pub start_end_are_integer: ViolationMap,
    pub start_greater_equal_than_end: ViolationMap,
    pub start_end_negative_values: ViolationMap,
    pub start_end_greater_than_base_file_length: ViolationMap,
    /// `None` when no conformance check ran.
    pub validation_passed: Option<bool>,
    pub annotation_count: usize,
}

impl AnnotationLayerDiagnostic {
    pub fn builder<'a>(
        pecha_id: impl Into<String>,
        volume_name: impl Into<String>,
    ) -> DiagnosticBuilder<'a> {
        DiagnosticBuilder {
            pecha_id: pecha_id.into(),
            volume_name: volume_name.into(),
            content: None,
            base_file_length: None,
            schema: None,
            file_stem: None,
            options: DiagnosticOptions::default(),
        }
    }

    /// The row for a volume that has no base file at all.
    pub fn no_base_file(pecha_id: impl Into<String>, volume_name: impl Into<String>) -> Self {
        Self::builder(pecha_id, volume_name).build()
    }

    /// Total entries across the four span-violation maps.
    pub fn span_violation_count(&self) -> usize {
        self.start_end_are_integer.len()
            + self.start_greater_equal_than_end.len()
            + self.start_end_negative_values.len()
            + self.start_end_greater_than_base_file_length.len()
    }

    /// Whether anything in this diagnostic points at a data problem.
    pub fn has_findings(&self) -> bool {
        !self.has_base_file
            || !self.undefined_base_fields.is_empty()
            || !self.is_annotation_type_enumed
            || !self.missing_annotation_fields.is_empty()
            || self.span_violation_count() > 0
            || self.validation_passed == Some(false)
    }

    /// Flatten into `column → value`, in [`DIAGNOSTIC_COLUMNS`] order.
    pub fn to_row(&self) -> IndexMap<String, Value> {
        let mut fields = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        DIAGNOSTIC_COLUMNS
            .iter()
            .map(|column| {
                (
                    column.to_string(),
                    fields.remove(*column).unwrap_or(Value::Null),
                )
            })
            .collect()
    }
}

/// Collects the inputs of one diagnostic, then derives it in one pass.
#[derive(Debug, Clone)]
pub struct DiagnosticBuilder<'a> {
    pecha_id: String,
    volume_name: String,
    content: Option<&'a Value>,
    base_file_length: Option<u64>,
    schema: Option<&'a LayerSchema>,
    file_stem: Option<String>,
    options: DiagnosticOptions,
}

impl<'a> DiagnosticBuilder<'a> {
    /// Decoded layer file. Leaving it unset means "no base file".
    pub fn content(mut self, content: &'a Value) -> Self {
        self.content = Some(content);
        self
    }

    pub fn content_opt(mut self, content: Option<&'a Value>) -> Self {
        self.content = content;
        self
    }

    /// Base text length in characters. Unset means unknown.
    pub fn base_file_length(mut self, length: Option<u64>) -> Self {
        self.base_file_length = length;
        self
    }

    pub fn schema(mut self, schema: Option<&'a LayerSchema>) -> Self {
        self.schema = schema;
        self
    }

    /// On-disk stem of the layer file, when the caller knows it.
    pub fn file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = Some(stem.into());
        self
    }

    pub fn options(mut self, options: DiagnosticOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> AnnotationLayerDiagnostic {
        let Some(raw) = self.content else {
            return AnnotationLayerDiagnostic {
                pecha_id: self.pecha_id,
                volume_name: self.volume_name,
                has_base_file: false,
                base_file_length: None,
                annotation_file_name: None,
                is_annotation_file_name_enumed: false,
                base_fields: Vec::new(),
                undefined_base_fields: Vec::new(),
                has_annotation_type: false,
                annotation_type: None,
                is_annotation_type_enumed: false,
                has_annotations: false,
                has_annotation_id_missing: false,
                annotation_fields: Vec::new(),
                required_annotation_fields: Vec::new(),
                missing_annotation_fields: Vec::new(),
                extra_annotation_fields: Vec::new(),
                has_span_annotation: false,
                has_start_end_in_span: false,
                start_end_are_integer: ViolationMap::new(),
                start_greater_equal_than_end: ViolationMap::new(),
                start_end_negative_values: ViolationMap::new(),
                start_end_greater_than_base_file_length: ViolationMap::new(),
                validation_passed: None,
                annotation_count: 0,
            };
        };

        let content = AnnotationLayerContent::new(raw);
        let base_fields = content.map(|c| c.keys()).unwrap_or_default();
        let undefined_base_fields = content.map(|c| c.undefined_keys()).unwrap_or_default();

        let annotation_type = content
            .and_then(|c| c.annotation_type())
            .map(str::to_string);
        let is_annotation_type_enumed = annotation_type
            .as_deref()
            .is_some_and(is_known_layer_type);

        // Stem first, then the layer the schema was chosen for, then the
        // declared type.
        let annotation_file_name = self
            .file_stem
            .or_else(|| self.schema.map(|schema| schema.layer.value().to_string()))
            .or_else(|| annotation_type.clone());
        let is_annotation_file_name_enumed = annotation_file_name
            .as_deref()
            .is_some_and(is_known_layer_type);

        let normalized = content
            .and_then(|c| c.annotations())
            .map(Annotations::normalize);
        let has_annotations = match &normalized {
            None => false,
            Some(n) if n.is_empty() => self.options.empty_annotations_present,
            Some(_) => true,
        };
        let has_annotation_id_missing = normalized.as_ref().is_some_and(|n| n.ids_synthesized);
        let annotation_count = normalized.as_ref().map_or(0, |n| n.records.len());

        let first = normalized.as_ref().and_then(|n| n.first());
        let annotation_fields: Vec<String> = first
            .and_then(|(_, record)| record.as_object())
            .map(|record| record.keys().cloned().collect())
            .unwrap_or_default();

        let span_report = match (&normalized, first) {
            (Some(n), Some(_)) => span::analyze(&n.records, self.base_file_length),
            _ => SpanReport::default(),
        };
        let conformance = match (self.schema, first) {
            (Some(schema), Some((_, record))) => {
                Some(conformance::check(record, &annotation_fields, schema))
            }
            _ => None,
        };
        let validation_passed = conformance.as_ref().map(|c| c.validation_passed);
        let ConformanceReport {
            required_fields,
            missing_fields,
            extra_fields,
            ..
        } = conformance.unwrap_or_default();

        tracing::debug!(
            pecha_id = %self.pecha_id,
            volume = %self.volume_name,
            file = annotation_file_name.as_deref().unwrap_or("-"),
            annotations = annotation_count,
            span_violations = span_report.violation_count(),
            "layer diagnosed"
        );

        AnnotationLayerDiagnostic {
            pecha_id: self.pecha_id,
            volume_name: self.volume_name,
            has_base_file: true,
            base_file_length: self.base_file_length,
            annotation_file_name,
            is_annotation_file_name_enumed,
            base_fields,
            undefined_base_fields,
            has_annotation_type: annotation_type.is_some(),
            annotation_type,
            is_annotation_type_enumed,
            has_annotations,
            has_annotation_id_missing,
            annotation_fields,
            required_annotation_fields: required_fields,
            missing_annotation_fields: missing_fields,
            extra_annotation_fields: extra_fields,
            has_span_annotation: span_report.has_span_annotation,
            has_start_end_in_span: span_report.has_start_end_in_span,
            start_end_are_integer: span_report.start_end_are_integer,
            start_greater_equal_than_end: span_report.start_greater_equal_than_end,
            start_end_negative_values: span_report.start_end_negative_values,
            start_end_greater_than_base_file_length: span_report
                .start_end_greater_than_base_file_length,
            validation_passed,
            annotation_count,
        }
    }
}

/// Diagnose one layer with default options and no known file stem.
pub fn build(
    pecha_id: &str,
    volume_name: &str,
    content: Option<&Value>,
    base_file_length: Option<u64>,
    schema: Option<&LayerSchema>,
) -> AnnotationLayerDiagnostic {
    AnnotationLayerDiagnostic::builder(pecha_id, volume_name)
        .content_opt(content)
        .base_file_length(base_file_length)
        .schema(schema)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerType;
    use crate::schema::{LayerSchemaTable, SchemaRegistry};
    use serde_json::json;

    #[test]
    fn absent_content_is_all_defaults() {
        let diagnostic = AnnotationLayerDiagnostic::no_base_file("P000216", "v002");
        assert!(!diagnostic.has_base_file);
        assert!(diagnostic.has_findings());
        assert_eq!(diagnostic.annotation_file_name, None);
        assert!(diagnostic.base_fields.is_empty());
        assert!(!diagnostic.has_annotations);
        assert_eq!(diagnostic.validation_passed, None);
        assert_eq!(diagnostic.span_violation_count(), 0);
    }

    #[test]
    fn absent_content_ignores_other_inputs() {
        let table = LayerSchemaTable::builtin();
        let diagnostic = AnnotationLayerDiagnostic::builder("P1", "v1")
            .base_file_length(Some(10))
            .schema(table.schema_for(LayerType::Author))
            .file_stem("Author")
            .build();
        assert_eq!(diagnostic, AnnotationLayerDiagnostic::no_base_file("P1", "v1"));
    }

    #[test]
    fn non_mapping_document_only_sets_base_file() {
        let value = json!(["not", "a", "layer"]);
        let diagnostic = build("P1", "v1", Some(&value), Some(5), None);
        assert!(diagnostic.has_base_file);
        assert!(diagnostic.base_fields.is_empty());
        assert!(!diagnostic.has_annotations);
    }

    #[test]
    fn file_stem_wins_over_declared_type() {
        let value = json!({"annotation_type": "Author", "annotations": {}});
        let diagnostic = AnnotationLayerDiagnostic::builder("P1", "v1")
            .content(&value)
            .file_stem("Quotation")
            .build();
        assert_eq!(diagnostic.annotation_file_name.as_deref(), Some("Quotation"));
        assert!(!diagnostic.is_annotation_file_name_enumed);
        assert_eq!(diagnostic.annotation_type.as_deref(), Some("Author"));
        assert!(diagnostic.is_annotation_type_enumed);
    }

    #[test]
    fn declared_type_names_the_file_when_nothing_else_does() {
        let value = json!({"annotation_type": "Yigchung"});
        let diagnostic = build("P1", "v1", Some(&value), None, None);
        assert_eq!(diagnostic.annotation_file_name.as_deref(), Some("Yigchung"));
        assert!(diagnostic.is_annotation_file_name_enumed);
        assert!(!diagnostic.has_annotations);
    }

    #[test]
    fn schema_layer_names_the_file_without_stem() {
        let table = LayerSchemaTable::builtin();
        let value = json!({"annotation_type": "Wrong", "annotations": {}});
        let diagnostic = build(
            "P1",
            "v1",
            Some(&value),
            None,
            table.schema_for(LayerType::Sabche),
        );
        assert_eq!(diagnostic.annotation_file_name.as_deref(), Some("Sabche"));
        assert!(diagnostic.is_annotation_file_name_enumed);
        assert!(!diagnostic.is_annotation_type_enumed);
    }

    #[test]
    fn empty_annotations_policy_is_configurable() {
        let value = json!({"annotation_type": "Author", "annotations": {}});
        let present = build("P1", "v1", Some(&value), None, None);
        assert!(present.has_annotations);

        let absent = AnnotationLayerDiagnostic::builder("P1", "v1")
            .content(&value)
            .options(DiagnosticOptions {
                empty_annotations_present: false,
            })
            .build();
        assert!(!absent.has_annotations);
    }

    #[test]
    fn schema_without_records_skips_conformance() {
        let table = LayerSchemaTable::builtin();
        let value = json!({"annotation_type": "Author", "annotations": []});
        let diagnostic = build(
            "P1",
            "v1",
            Some(&value),
            Some(10),
            table.schema_for(LayerType::Author),
        );
        assert!(diagnostic.has_annotation_id_missing);
        assert!(diagnostic.required_annotation_fields.is_empty());
        assert_eq!(diagnostic.validation_passed, None);
    }

    #[test]
    fn conformance_fields_flow_into_diagnostic() {
        let table = LayerSchemaTable::builtin();
        let value = json!({
            "id": "abc",
            "annotation_type": "Durchen",
            "revision": "00001",
            "annotations": {
                "a1": {"span": {"start": 0, "end": 5}, "default": "x", "note": 1},
            },
        });
        let diagnostic = build(
            "P1",
            "v1",
            Some(&value),
            Some(100),
            table.schema_for(LayerType::Durchen),
        );
        assert_eq!(diagnostic.annotation_fields, vec!["span", "default", "note"]);
        assert_eq!(
            diagnostic.required_annotation_fields,
            vec!["span", "default", "options"]
        );
        assert_eq!(diagnostic.missing_annotation_fields, vec!["options"]);
        assert_eq!(diagnostic.extra_annotation_fields, vec!["note"]);
        assert_eq!(diagnostic.validation_passed, Some(false));
        assert!(diagnostic.undefined_base_fields.is_empty());
        assert_eq!(diagnostic.annotation_count, 1);
    }

    #[test]
    fn build_is_idempotent() {
        let table = LayerSchemaTable::builtin();
        let value = json!({
            "annotation_type": "Author",
            "annotations": [{"span": {"start": 3, "end": 1}}, {"span": {"start": "a", "end": 2}}],
        });
        let schema = table.schema_for(LayerType::Author);
        let first = build("P1", "v1", Some(&value), Some(2), schema);
        let second = build("P1", "v1", Some(&value), Some(2), schema);
        assert_eq!(first, second);
        assert_eq!(first.to_row(), second.to_row());
    }

    #[test]
    fn row_covers_every_column_in_order() {
        let value = json!({"annotation_type": "Author"});
        let row = build("P1", "v1", Some(&value), None, None).to_row();
        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(columns, DIAGNOSTIC_COLUMNS.to_vec());
        assert_eq!(row["validation_passed"], Value::Null);
        assert_eq!(row["base_file_length"], Value::Null);
        assert_eq!(row["annotation_type"], json!("Author"));
    }

    #[test]
    fn column_list_is_stable() {
        insta::assert_snapshot!(DIAGNOSTIC_COLUMNS.join("\n"), @r"
        pecha_id
        volume_name
        has_base_file
        base_file_length
        annotation_file_name
        is_annotation_file_name_enumed
        base_fields
        undefined_base_fields
        has_annotation_type
        annotation_type
        is_annotation_type_enumed
        has_annotations
        has_annotation_id_missing
        annotation_fields
        required_annotation_fields
        missing_annotation_fields
        extra_annotation_fields
        has_span_annotation
        has_start_end_in_span
        start_end_are_integer
        start_greater_equal_than_end
        start_end_negative_values
        start_end_greater_than_base_file_length
        validation_passed
        annotation_count
        ");
    }
}
