//! # pecha-audit-store
//!
//! Repository layer for pecha audits.
//!
//! This crate provides:
//! - `OpfRepository` (one pecha's `.opf` directory on disk)
//! - `LayerSource` (what report assembly reads) and `MemorySource`
//! - YAML/JSON decoding into ordered `serde_json::Value`s
//! - catalog CSV reading and repository format classification
//!
//! It does not judge content. Diagnostics live in `pecha-audit-kernel`.
//!
//! ## Data flow
//!
//! ```text
//! <pechas>/<id>/<id>.opf   (YAML + base texts on disk)
//!     ↓  OpfRepository
//! LayerSource              (volumes, layer values, base lengths)
//!     ↓
//! pecha-audit-report
//! ```

pub mod catalog;
pub mod classify;
pub mod error;
pub mod opf;
pub mod source;
pub mod yaml;

pub use catalog::{PECHA_ID_COLUMN, read_catalog_ids, read_catalog_ids_from_path};
pub use classify::{PechaFormat, classify_repository};
pub use error::StoreError;
pub use opf::OpfRepository;
pub use source::{LayerSource, MemorySource};
pub use yaml::{decode_yaml, read_structured_file, yaml_to_json};
