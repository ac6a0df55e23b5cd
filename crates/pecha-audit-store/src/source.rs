//! The layer-source boundary between report assembly and storage.
//!
//! Report code only asks for volumes, layer content and base lengths.
//! `OpfRepository` answers from disk, `MemorySource` from memory.

use crate::error::StoreError;
use indexmap::IndexMap;
use pecha_audit_kernel::LayerType;
use serde_json::Value;
use std::collections::BTreeMap;

/// Everything report assembly needs from one pecha.
pub trait LayerSource {
    fn pecha_id(&self) -> &str;

    /// Volume names that have a base text.
    fn base_names(&self) -> Result<Vec<String>, StoreError>;

    /// Volume name → enumerated layers present for it, in volume order.
    fn components(&self) -> Result<IndexMap<String, Vec<LayerType>>, StoreError>;

    /// Base text length in characters, `None` when the volume has no base.
    fn base_file_length(&self, volume: &str) -> Result<Option<u64>, StoreError>;

    /// Decoded content of an enumerated layer file.
    fn fetch_layer_content(&self, volume: &str, layer: LayerType) -> Result<Value, StoreError>;

    /// `(stem, content)` for each layer file of `volume` whose stem is not a
    /// known layer type.
    fn fetch_unenumerated_layer_files(
        &self,
        volume: &str,
    ) -> Result<Vec<(String, Value)>, StoreError>;
}

/// In-memory pecha with the same shape as an OPF directory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pecha_id: String,
    bases: BTreeMap<String, String>,
    layers: BTreeMap<String, BTreeMap<String, Value>>,
}

impl MemorySource {
    pub fn new(pecha_id: impl Into<String>) -> Self {
        Self {
            pecha_id: pecha_id.into(),
            ..Self::default()
        }
    }

    pub fn with_base(mut self, volume: impl Into<String>, text: impl Into<String>) -> Self {
        self.bases.insert(volume.into(), text.into());
        self
    }

    /// Add a layer file under `volume`, keyed by its file stem.
    pub fn with_layer(
        mut self,
        volume: impl Into<String>,
        stem: impl Into<String>,
        content: Value,
    ) -> Self {
        self.layers
            .entry(volume.into())
            .or_default()
            .insert(stem.into(), content);
        self
    }
}

impl LayerSource for MemorySource {
    fn pecha_id(&self) -> &str {
        &self.pecha_id
    }

    fn base_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.bases.keys().cloned().collect())
    }

    fn components(&self) -> Result<IndexMap<String, Vec<LayerType>>, StoreError> {
        Ok(self
            .layers
            .iter()
            .map(|(volume, files)| {
                let layers = files
                    .keys()
                    .filter_map(|stem| LayerType::from_value(stem))
                    .collect();
                (volume.clone(), layers)
            })
            .collect())
    }

    fn base_file_length(&self, volume: &str) -> Result<Option<u64>, StoreError> {
        Ok(self
            .bases
            .get(volume)
            .map(|text| text.chars().count() as u64))
    }

    fn fetch_layer_content(&self, volume: &str, layer: LayerType) -> Result<Value, StoreError> {
        self.layers
            .get(volume)
            .and_then(|files| files.get(layer.value()))
            .cloned()
            .ok_or_else(|| StoreError::LayerNotFound {
                pecha_id: self.pecha_id.clone(),
                volume: volume.to_string(),
                layer: layer.value().to_string(),
            })
    }

    fn fetch_unenumerated_layer_files(
        &self,
        volume: &str,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        Ok(self
            .layers
            .get(volume)
            .map(|files| {
                files
                    .iter()
                    .filter(|(stem, _)| LayerType::from_value(stem).is_none())
                    .map(|(stem, content)| (stem.clone(), content.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
