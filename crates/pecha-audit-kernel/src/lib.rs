//! # pecha-audit kernel
//!
//! Judges one decoded annotation layer of an OPF pecha against its base
//! text and its layer schema, and reports what it finds. Nothing here reads
//! files or repairs data.
//!
//! ## Architecture
//!
//! ```text
//! LayerType                 ← closed enumeration of known layer files
//!     │
//! SchemaRegistry            ← LayerType → LayerSchema (required fields + validator)
//!     │
//! AnnotationLayerContent    ← raw layer document, annotations normalized to a mapping
//!     │
//! span::analyze             ← boundary violations over every record
//! conformance::check        ← field deltas + verdict for the first record
//!     │
//! AnnotationLayerDiagnostic ← immutable result, flattened to one report row
//! ```

pub mod conformance;
pub mod content;
pub mod diagnostic;
pub mod error;
pub mod layer;
pub mod schema;
pub mod span;

pub use conformance::ConformanceReport;
pub use content::{
    AnnotationLayerContent, AnnotationMap, Annotations, BASE_ANNOTATION_FEATURES,
    NormalizedAnnotations,
};
pub use diagnostic::{
    AnnotationLayerDiagnostic, DIAGNOSTIC_COLUMNS, DiagnosticBuilder, DiagnosticOptions, build,
};
pub use error::{SchemaError, ValidationError};
pub use layer::{LayerType, is_known_layer_type};
pub use schema::{FieldKind, FieldSpec, LayerSchema, LayerSchemaTable, SchemaRegistry};
pub use span::{SpanReport, ViolationMap};
