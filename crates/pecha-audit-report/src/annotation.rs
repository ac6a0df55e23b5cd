//! Annotation content report: one diagnostic row per (volume, layer file).
//!
//! Per pecha and volume, in order:
//! - a volume without a base text yields one "no base file" row
//! - each enumerated layer is diagnosed with its schema
//! - each unenumerated layer file is diagnosed without a schema
//!
//! A read failure drops the rest of that volume, records it as skipped, and
//! moves on to the next volume.

use crate::table::ReportTable;
use pecha_audit_kernel::{
    AnnotationLayerDiagnostic, DIAGNOSTIC_COLUMNS, DiagnosticOptions, LayerType, SchemaRegistry,
};
use pecha_audit_store::{LayerSource, StoreError};
use serde::Serialize;
use serde_json::Value;

/// A pecha or volume left out of a report, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedItem {
    pub pecha_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    pub reason: String,
}

impl SkippedItem {
    pub fn pecha(pecha_id: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            pecha_id: pecha_id.into(),
            volume: None,
            reason: reason.to_string(),
        }
    }

    pub fn volume(
        pecha_id: impl Into<String>,
        volume: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self {
            pecha_id: pecha_id.into(),
            volume: Some(volume.into()),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationReport {
    pub diagnostics: Vec<AnnotationLayerDiagnostic>,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationReportSummary {
    pub pecha_count: usize,
    pub row_count: usize,
    pub rows_with_findings: usize,
    pub no_base_file_rows: usize,
    pub unenumerated_layer_rows: usize,
    pub span_violations: usize,
    pub validation_failures: usize,
    pub skipped_count: usize,
}

impl AnnotationReport {
    pub fn table(&self) -> ReportTable {
        let mut table = ReportTable::with_columns(DIAGNOSTIC_COLUMNS);
        for diagnostic in &self.diagnostics {
            table.push_row(diagnostic.to_row());
        }
        table
    }

    pub fn summary(&self) -> AnnotationReportSummary {
        let mut pechas: Vec<&str> = self
            .diagnostics
            .iter()
            .map(|d| d.pecha_id.as_str())
            .collect();
        pechas.sort_unstable();
        pechas.dedup();

        AnnotationReportSummary {
            pecha_count: pechas.len(),
            row_count: self.diagnostics.len(),
            rows_with_findings: self.diagnostics.iter().filter(|d| d.has_findings()).count(),
            no_base_file_rows: self.diagnostics.iter().filter(|d| !d.has_base_file).count(),
            unenumerated_layer_rows: self
                .diagnostics
                .iter()
                .filter(|d| d.has_base_file && !d.is_annotation_file_name_enumed)
                .count(),
            span_violations: self
                .diagnostics
                .iter()
                .map(AnnotationLayerDiagnostic::span_violation_count)
                .sum(),
            validation_failures: self
                .diagnostics
                .iter()
                .filter(|d| d.validation_passed == Some(false))
                .count(),
            skipped_count: self.skipped.len(),
        }
    }

    pub fn has_findings(&self) -> bool {
        !self.skipped.is_empty() || self.diagnostics.iter().any(|d| d.has_findings())
    }
}

/// Builds annotation report rows from layer sources.
#[derive(Debug, Clone)]
pub struct AnnotationReportAssembler<'r, R: SchemaRegistry> {
    registry: &'r R,
    options: DiagnosticOptions,
}

impl<'r, R: SchemaRegistry> AnnotationReportAssembler<'r, R> {
    pub fn new(registry: &'r R) -> Self {
        Self {
            registry,
            options: DiagnosticOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DiagnosticOptions) -> Self {
        self.options = options;
        self
    }

    /// Append every row for one pecha to `report`.
    pub fn assemble_pecha(&self, source: &impl LayerSource, report: &mut AnnotationReport) {
        let pecha_id = source.pecha_id();
        let listing = source
            .components()
            .and_then(|components| Ok((components, source.base_names()?)));
        let (components, base_names) = match listing {
            Ok(listing) => listing,
            Err(err) => {
                tracing::warn!(pecha_id, error = %err, "skipping pecha: volume listing failed");
                report.skipped.push(SkippedItem::pecha(pecha_id, err));
                return;
            }
        };

        let before = report.diagnostics.len();
        for (volume, layers) in &components {
            if !base_names.contains(volume) {
                report
                    .diagnostics
                    .push(AnnotationLayerDiagnostic::no_base_file(pecha_id, volume.as_str()));
                continue;
            }
            let rows = &mut report.diagnostics;
            if let Err(err) = self.assemble_volume(source, volume, layers, rows) {
                tracing::warn!(pecha_id, volume = %volume, error = %err, "skipping rest of volume");
                report
                    .skipped
                    .push(SkippedItem::volume(pecha_id, volume.as_str(), err));
            }
        }
        tracing::info!(
            pecha_id,
            volumes = components.len(),
            rows = report.diagnostics.len() - before,
            "pecha assembled"
        );
    }

    fn assemble_volume(
        &self,
        source: &impl LayerSource,
        volume: &str,
        layers: &[LayerType],
        rows: &mut Vec<AnnotationLayerDiagnostic>,
    ) -> Result<(), StoreError> {
        let pecha_id = source.pecha_id();
        let base_file_length = source.base_file_length(volume)?;

        for &layer in layers {
            let content = source.fetch_layer_content(volume, layer)?;
            rows.push(
                AnnotationLayerDiagnostic::builder(pecha_id, volume)
                    .content_opt(document(&content))
                    .base_file_length(base_file_length)
                    .schema(self.registry.schema_for(layer))
                    .file_stem(layer.value())
                    .options(self.options)
                    .build(),
            );
        }

        for (stem, content) in source.fetch_unenumerated_layer_files(volume)? {
            rows.push(
                AnnotationLayerDiagnostic::builder(pecha_id, volume)
                    .content_opt(document(&content))
                    .base_file_length(base_file_length)
                    .file_stem(stem)
                    .options(self.options)
                    .build(),
            );
        }
        Ok(())
    }
}

/// An empty layer document decodes to `null` and counts as no content.
fn document(content: &Value) -> Option<&Value> {
    (!content.is_null()).then_some(content)
}
