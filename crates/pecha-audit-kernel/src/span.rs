//! Span-boundary analysis over a normalized annotation mapping.
//!
//! The first record is a structural probe: only when it carries a span with
//! both `start` and `end` is the whole mapping scanned. Each violation
//! category is collected independently, so one malformed record never hides
//! another record's problem.

use crate::content::AnnotationMap;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Annotation id → offending record.
pub type ViolationMap = IndexMap<String, Value>;

/// Result of one span analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpanReport {
    pub has_span_annotation: bool,
    pub has_start_end_in_span: bool,
    /// `start`/`end` missing or not integers. Exclusive of the other maps.
    pub start_end_are_integer: ViolationMap,
    pub start_greater_equal_than_end: ViolationMap,
    pub start_end_negative_values: ViolationMap,
    pub start_end_greater_than_base_file_length: ViolationMap,
}

impl SpanReport {
    pub fn violation_count(&self) -> usize {
        self.start_end_are_integer.len()
            + self.start_greater_equal_than_end.len()
            + self.start_end_negative_values.len()
            + self.start_end_greater_than_base_file_length.len()
    }
}

/// Classify span bounds of every record.
///
/// `base_file_length = None` means the length is unknown; the
/// exceeds-length check is then skipped for every record.
pub fn analyze(annotations: &AnnotationMap, base_file_length: Option<u64>) -> SpanReport {
    let mut report = SpanReport::default();
    let Some((_, first)) = annotations.iter().next() else {
        return report;
    };

    let Some(span) = first.get("span") else {
        return report;
    };
    report.has_span_annotation = true;
    if !(span.get("start").is_some() && span.get("end").is_some()) {
        return report;
    }
    report.has_start_end_in_span = true;

    let length = base_file_length.map(i128::from);
    for (id, record) in annotations {
        let Some((start, end)) = integer_bounds(record) else {
            report
                .start_end_are_integer
                .insert(id.clone(), record.clone());
            continue;
        };
        if start >= end {
            report
                .start_greater_equal_than_end
                .insert(id.clone(), record.clone());
        }
        if start < 0 || end < 0 {
            report
                .start_end_negative_values
                .insert(id.clone(), record.clone());
        }
        if let Some(length) = length
            && (start > length || end > length)
        {
            report
                .start_end_greater_than_base_file_length
                .insert(id.clone(), record.clone());
        }
    }
    report
}

/// Both bounds as integers, or `None` when either is missing or not an
/// integer. A record without a span object has no bounds.
fn integer_bounds(record: &Value) -> Option<(i128, i128)> {
    let span = record.get("span")?;
    Some((as_integer(span.get("start")?)?, as_integer(span.get("end")?)?))
}

fn as_integer(value: &Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn records(value: Value) -> AnnotationMap {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn empty_mapping_reports_nothing() {
        let report = analyze(&Map::new(), Some(10));
        assert_eq!(report, SpanReport::default());
    }

    #[test]
    fn first_record_without_span_skips_scan() {
        let map = records(json!({
            "a": {"text": "x"},
            "b": {"span": {"start": 9, "end": 1}},
        }));
        let report = analyze(&map, Some(10));
        assert!(!report.has_span_annotation);
        assert!(!report.has_start_end_in_span);
        assert_eq!(report.violation_count(), 0);
    }

    #[test]
    fn first_record_with_partial_span_skips_scan() {
        let map = records(json!({
            "a": {"span": {"start": 1}},
            "b": {"span": {"start": 9, "end": 1}},
        }));
        let report = analyze(&map, Some(10));
        assert!(report.has_span_annotation);
        assert!(!report.has_start_end_in_span);
        assert_eq!(report.violation_count(), 0);
    }

    #[test]
    fn non_integer_bounds_are_exclusive() {
        let map = records(json!({
            "a": {"span": {"start": 1, "end": 2}},
            "b": {"span": {"start": "5", "end": 1}},
            "c": {"span": {"start": 1.5, "end": -3}},
            "d": {"span": {"start": 1}},
            "e": {"text": "no span"},
        }));
        let report = analyze(&map, Some(2));
        let ids: Vec<&str> = report
            .start_end_are_integer
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(ids, vec!["b", "c", "d", "e"]);
        assert!(report.start_greater_equal_than_end.is_empty());
        assert!(report.start_end_negative_values.is_empty());
        assert!(report.start_end_greater_than_base_file_length.is_empty());
    }

    #[test]
    fn one_record_can_hit_several_categories() {
        let map = records(json!({
            "a": {"span": {"start": 50, "end": -1}},
        }));
        let report = analyze(&map, Some(20));
        assert!(report.start_greater_equal_than_end.contains_key("a"));
        assert!(report.start_end_negative_values.contains_key("a"));
        assert!(report.start_end_greater_than_base_file_length.contains_key("a"));
        assert_eq!(report.start_end_greater_than_base_file_length["a"], map["a"]);
    }

    #[test]
    fn length_bound_is_inclusive() {
        let map = records(json!({
            "a": {"span": {"start": 0, "end": 10}},
            "b": {"span": {"start": 0, "end": 11}},
        }));
        let report = analyze(&map, Some(10));
        let ids: Vec<&str> = report
            .start_end_greater_than_base_file_length
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn unknown_length_never_flags_out_of_range() {
        let map = records(json!({
            "a": {"span": {"start": 0, "end": u64::MAX}},
        }));
        let report = analyze(&map, None);
        assert!(report.start_end_greater_than_base_file_length.is_empty());
        assert!(report.start_end_are_integer.is_empty());
    }
}
