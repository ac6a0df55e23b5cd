use crate::cli::{ConfigArgs, ReportArgs};
use crate::config::{AuditConfig, FileConfig, Overrides};
use pecha_audit_kernel::{DiagnosticOptions, LayerSchemaTable};
use pecha_audit_report::{Cataloger, OutputFormat, ReportTable, SkippedItem};
use pecha_audit_store::read_catalog_ids_from_path;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Exit status when the audit itself found problems.
pub const EXIT_FINDINGS: i32 = 1;
/// Exit status for usage, config and I/O errors.
pub const EXIT_ERROR: i32 = 2;

pub fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(EXIT_ERROR);
}

pub fn load_config_or_exit(args: &ConfigArgs, report: Option<&ReportArgs>) -> AuditConfig {
    let file = FileConfig::load(args.config.as_deref()).unwrap_or_else(|e| fail(e));
    let overrides = Overrides {
        pechas_path: report.and_then(|r| r.pechas_path.clone()),
        catalog_path: report.and_then(|r| r.catalog.clone()),
        schema_path: args.schemas.clone(),
        empty_annotations_absent: args.empty_annotations_absent,
    };
    AuditConfig::resolve(file, overrides)
}

pub fn registry_or_exit(config: &AuditConfig) -> LayerSchemaTable {
    match &config.schema_path {
        Some(path) => LayerSchemaTable::builtin_with_overlay(path).unwrap_or_else(|e| fail(e)),
        None => LayerSchemaTable::builtin(),
    }
}

pub fn cataloger_or_exit(config: &AuditConfig) -> Cataloger {
    Cataloger::with_registry(&config.pechas_path, registry_or_exit(config)).with_options(
        DiagnosticOptions {
            empty_annotations_present: config.empty_annotations_present,
        },
    )
}

/// Explicit ids, else the catalog's ids, else every local pecha.
pub fn pecha_ids_or_exit(
    explicit: &[String],
    config: &AuditConfig,
    cataloger: &Cataloger,
) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    if let Some(catalog) = &config.catalog_path {
        return read_catalog_ids_from_path(catalog).unwrap_or_else(|e| fail(e));
    }
    cataloger.local_pecha_ids().unwrap_or_else(|e| fail(e))
}

pub fn parse_format_or_exit(format: &str) -> OutputFormat {
    format.parse().unwrap_or_else(|e| fail(e))
}

/// Where a report goes: a file path, or stdout for `-`.
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    pub fn resolve(
        out: Option<&Path>,
        output_dir: &Path,
        report: &str,
        format: OutputFormat,
    ) -> Self {
        match out {
            Some(path) if path == Path::new("-") => Self::Stdout,
            Some(path) => Self::File(path.to_path_buf()),
            None => Self::File(output_dir.join(format!("{report}.{}", format.extension()))),
        }
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, Self::Stdout)
    }

    pub fn label(&self) -> String {
        match self {
            Self::Stdout => "-".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

pub fn write_table_or_exit(table: &ReportTable, destination: &Destination, format: OutputFormat) {
    let result = match destination {
        Destination::Stdout => table.write(io::stdout().lock(), format),
        Destination::File(path) => table.write_to_path(path, format),
    };
    if let Err(e) = result {
        fail(format!("failed to write {}: {e}", destination.label()));
    }
}

pub fn print_json_or_exit(payload: &impl Serialize) {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => println!("{text}"),
        Err(e) => fail(format!("failed to render JSON: {e}")),
    }
}

pub fn print_skipped_block(skipped: &[SkippedItem]) {
    if skipped.is_empty() {
        return;
    }
    println!("  Skipped: {}", skipped.len());
    for item in skipped {
        match &item.volume {
            Some(volume) => println!("    - {}/{volume}: {}", item.pecha_id, item.reason),
            None => println!("    - {}: {}", item.pecha_id, item.reason),
        }
    }
}
