//! `pecha-audit.toml` loading and CLI overrides.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "pecha-audit.toml";
pub const DEFAULT_PECHAS_PATH: &str = "pechas";
pub const DEFAULT_OUTPUT_DIR: &str = ".catalog";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Keys accepted in the config file. All optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub pechas_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub empty_annotations_present: Option<bool>,
    pub schema_path: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load `explicit`, or `./pecha-audit.toml` when it exists, or defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&text, &path)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

/// Values given on the command line. `None` defers to the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub pechas_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub schema_path: Option<PathBuf>,
    pub empty_annotations_absent: bool,
}

/// Effective settings after file values and overrides are combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    pub pechas_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub empty_annotations_present: bool,
    pub schema_path: Option<PathBuf>,
}

impl AuditConfig {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Self {
        let empty_annotations_present = if overrides.empty_annotations_absent {
            false
        } else {
            file.empty_annotations_present.unwrap_or(true)
        };
        Self {
            pechas_path: overrides
                .pechas_path
                .or(file.pechas_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PECHAS_PATH)),
            catalog_path: overrides.catalog_path.or(file.catalog_path),
            output_dir: file
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            empty_annotations_present,
            schema_path: overrides.schema_path.or(file.schema_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let file = FileConfig::parse("", Path::new("pecha-audit.toml")).unwrap();
        let config = AuditConfig::resolve(file, Overrides::default());
        assert_eq!(config.pechas_path, PathBuf::from("pechas"));
        assert_eq!(config.output_dir, PathBuf::from(".catalog"));
        assert_eq!(config.catalog_path, None);
        assert!(config.empty_annotations_present);
    }

    #[test]
    fn overrides_beat_file_values() {
        let file = FileConfig::parse(
            "pechas_path = \"/data/pechas\"\ncatalog_path = \"opf_catalog.csv\"\nempty_annotations_present = true\n",
            Path::new("pecha-audit.toml"),
        )
        .unwrap();
        let config = AuditConfig::resolve(
            file,
            Overrides {
                pechas_path: Some(PathBuf::from("local")),
                empty_annotations_absent: true,
                ..Overrides::default()
            },
        );
        assert_eq!(config.pechas_path, PathBuf::from("local"));
        assert_eq!(config.catalog_path, Some(PathBuf::from("opf_catalog.csv")));
        assert!(!config.empty_annotations_present);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FileConfig::parse("pecha_path = \"typo\"\n", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
