use std::path::PathBuf;

/// Errors raised while reading a pecha repository or a catalog.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid CSV at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: missing column `{column}`")]
    MissingColumn { path: PathBuf, column: String },

    #[error("pecha not found: {pecha_id} (looked in {path})")]
    PechaNotFound { pecha_id: String, path: PathBuf },

    #[error("layer file not found: {pecha_id}/{volume}/{layer}")]
    LayerNotFound {
        pecha_id: String,
        volume: String,
        layer: String,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
