//! Pecha format classification from a repository's top-level entries.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PechaFormat {
    #[serde(rename = "OPF")]
    Opf,
    #[serde(rename = "OPA")]
    Opa,
    #[serde(rename = "OPC")]
    Opc,
    Other,
}

impl PechaFormat {
    /// Checked in this order; the first suffix any entry carries wins.
    const BY_PRIORITY: [(PechaFormat, &'static str); 3] = [
        (PechaFormat::Opf, ".opf"),
        (PechaFormat::Opa, ".opa"),
        (PechaFormat::Opc, ".opc"),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opf => "OPF",
            Self::Opa => "OPA",
            Self::Opc => "OPC",
            Self::Other => "Other",
        }
    }

    /// Classify from entry names alone.
    pub fn from_entry_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self::BY_PRIORITY
            .iter()
            .find(|(_, suffix)| names.iter().any(|name| name.as_ref().ends_with(suffix)))
            .map_or(Self::Other, |(format, _)| *format)
    }
}

impl fmt::Display for PechaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the repository directory at `path`.
pub fn classify_repository(path: impl AsRef<Path>) -> Result<PechaFormat, StoreError> {
    let path = path.as_ref();
    let entries = std::fs::read_dir(path).map_err(|e| StoreError::io(path, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(path, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(PechaFormat::from_entry_names(&names))
}
