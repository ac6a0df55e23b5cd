//! Error types for kernel operations.
//!
//! Diagnostics never fail: a malformed layer is reported, not raised. The
//! errors here cover the two places where a caller does get a `Result`:
//! validating one record against a schema, and loading a schema registry.

/// Why one annotation record does not conform to its layer schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The record is not a mapping at all.
    #[error("annotation record is not a mapping")]
    NotAMapping,

    /// A required field is absent (or null).
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    /// A field is present with the wrong JSON type.
    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    /// A span object breaks its own bounds contract.
    #[error("invalid span in `{field}`: {description}")]
    InvalidSpan { field: String, description: String },
}

/// Errors raised while loading a schema registry definition.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read schema registry: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema registry toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown layer type in schema registry: {0}")]
    UnknownLayer(String),

    #[error("unknown field kind `{kind}` for field `{field}`")]
    UnknownFieldKind { field: String, kind: String },
}
