//! OPF repository reader.
//!
//! Layout of one pecha under the pechas root:
//!
//! ```text
//! <root>/<id>/<id>.opf/
//!     base/<volume>.txt
//!     layers/<volume>/<Layer>.yml
//!     meta.yml
//!     index.yml            (optional)
//! ```
//!
//! Listings are sorted by name so reports are stable across filesystems.

use crate::error::StoreError;
use crate::source::LayerSource;
use crate::yaml::read_structured_file;
use indexmap::IndexMap;
use pecha_audit_kernel::LayerType;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

const LAYER_EXTENSIONS: [&str; 3] = ["yml", "yaml", "json"];

/// One pecha checked out under a local pechas directory.
#[derive(Debug, Clone)]
pub struct OpfRepository {
    pecha_id: String,
    opf_path: PathBuf,
}

impl OpfRepository {
    /// Open `<root>/<pecha_id>/<pecha_id>.opf`.
    pub fn open(root: impl AsRef<Path>, pecha_id: &str) -> Result<Self, StoreError> {
        let opf_path = root
            .as_ref()
            .join(pecha_id)
            .join(format!("{pecha_id}.opf"));
        if !opf_path.is_dir() {
            return Err(StoreError::PechaNotFound {
                pecha_id: pecha_id.to_string(),
                path: opf_path,
            });
        }
        Ok(Self {
            pecha_id: pecha_id.to_string(),
            opf_path,
        })
    }

    pub fn opf_path(&self) -> &Path {
        &self.opf_path
    }

    pub fn base_path(&self) -> PathBuf {
        self.opf_path.join("base")
    }

    pub fn layers_path(&self) -> PathBuf {
        self.opf_path.join("layers")
    }

    pub fn meta_path(&self) -> PathBuf {
        self.opf_path.join("meta.yml")
    }

    pub fn has_index(&self) -> bool {
        self.opf_path.join("index.yml").is_file()
    }

    pub fn has_layers_dir(&self) -> bool {
        self.layers_path().is_dir()
    }

    /// Volume directory names under `layers/`.
    pub fn volume_names(&self) -> Result<Vec<String>, StoreError> {
        let layers = self.layers_path();
        if !layers.is_dir() {
            return Ok(Vec::new());
        }
        list_entries(&layers, |path| path.is_dir())
    }

    /// Stems of every `.yml`/`.yaml`/`.json` file in one volume, known or not.
    pub fn layer_stems(&self, volume: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.layers_path().join(volume);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut stems: Vec<String> = list_entries(&dir, |path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| LAYER_EXTENSIONS.contains(&ext))
        })?
        .into_iter()
        .filter_map(|name| {
            Path::new(&name)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
        })
        .collect();
        stems.sort();
        stems.dedup();
        Ok(stems)
    }

    /// Volume → stems not in the layer enumeration.
    pub fn unenumerated_layer_names(&self) -> Result<IndexMap<String, Vec<String>>, StoreError> {
        let mut names = IndexMap::new();
        for volume in self.volume_names()? {
            let unknown = self
                .layer_stems(&volume)?
                .into_iter()
                .filter(|stem| LayerType::from_value(stem).is_none())
                .collect();
            names.insert(volume, unknown);
        }
        Ok(names)
    }

    /// Decode the layer file of `volume` whose stem is `stem`.
    pub fn read_layer_file(&self, volume: &str, stem: &str) -> Result<Value, StoreError> {
        let path = self
            .layer_file_path(volume, stem)
            .ok_or_else(|| StoreError::LayerNotFound {
                pecha_id: self.pecha_id.clone(),
                volume: volume.to_string(),
                layer: stem.to_string(),
            })?;
        read_structured_file(path)
    }

    pub fn read_layer(&self, volume: &str, layer: LayerType) -> Result<Value, StoreError> {
        self.read_layer_file(volume, layer.value())
    }

    fn layer_file_path(&self, volume: &str, stem: &str) -> Option<PathBuf> {
        let dir = self.layers_path().join(volume);
        LAYER_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{stem}.{ext}")))
            .find(|path| path.is_file())
    }

    /// Decoded `meta.yml`, `None` when the file does not exist.
    pub fn read_meta(&self) -> Result<Option<Value>, StoreError> {
        let path = self.meta_path();
        if !path.is_file() {
            return Ok(None);
        }
        read_structured_file(path).map(Some)
    }
}

impl LayerSource for OpfRepository {
    fn pecha_id(&self) -> &str {
        &self.pecha_id
    }

    fn base_names(&self) -> Result<Vec<String>, StoreError> {
        let base = self.base_path();
        if !base.is_dir() {
            return Ok(Vec::new());
        }
        Ok(list_entries(&base, |path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == "txt")
        })?
        .into_iter()
        .filter_map(|name| name.strip_suffix(".txt").map(str::to_string))
        .collect())
    }

    fn components(&self) -> Result<IndexMap<String, Vec<LayerType>>, StoreError> {
        let mut components = IndexMap::new();
        for volume in self.volume_names()? {
            let layers = self
                .layer_stems(&volume)?
                .iter()
                .filter_map(|stem| LayerType::from_value(stem))
                .collect();
            components.insert(volume, layers);
        }
        Ok(components)
    }

    fn base_file_length(&self, volume: &str) -> Result<Option<u64>, StoreError> {
        let path = self.base_path().join(format!("{volume}.txt"));
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        Ok(Some(text.chars().count() as u64))
    }

    fn fetch_layer_content(&self, volume: &str, layer: LayerType) -> Result<Value, StoreError> {
        self.read_layer(volume, layer)
    }

    fn fetch_unenumerated_layer_files(
        &self,
        volume: &str,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        let mut files = Vec::new();
        for stem in self.layer_stems(volume)? {
            if LayerType::from_value(&stem).is_some() {
                continue;
            }
            let content = self.read_layer_file(volume, &stem)?;
            files.push((stem, content));
        }
        Ok(files)
    }
}

/// Sorted UTF-8 entry names of `dir` that pass `keep`. Dotfiles are skipped.
fn list_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<String>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(dir, e))?;
        let path = entry.path();
        if !keep(&path) {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if !name.starts_with('.') => names.push(name),
            Ok(_) => {}
            Err(raw) => {
                tracing::warn!(dir = %dir.display(), name = ?raw, "skipping non-UTF-8 entry");
            }
        }
    }
    names.sort();
    Ok(names)
}
