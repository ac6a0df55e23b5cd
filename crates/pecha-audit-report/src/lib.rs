//! Report assembly for pecha audits.
//!
//! Turns pechas on disk into tables: the annotation content report (one
//! kernel diagnostic per layer file), the folder-structure report, and the
//! metadata report. Tables are written as CSV or JSONL.

mod annotation;
mod cataloger;
mod error;
mod folder;
mod metadata;
mod table;

pub use annotation::{
    AnnotationReport, AnnotationReportAssembler, AnnotationReportSummary, SkippedItem,
};
pub use cataloger::{Cataloger, TableReport};
pub use error::ReportError;
pub use folder::{FOLDER_STRUCTURE_COLUMNS, folder_structure_row};
pub use metadata::{PREDEFINED_METADATA_KEYS, metadata_row};
pub use table::{OutputFormat, ReportTable, Row, cell_text};
