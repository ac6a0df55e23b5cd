//! Per-layer annotation schemas and the registry that serves them.
//!
//! A `LayerSchema` is an ordered field list. Required fields drive the
//! missing/extra field deltas; the full list drives structural validation of
//! a representative record. The built-in table follows the OPF annotation
//! classes; a TOML file can replace or add entries.

use crate::error::{SchemaError, ValidationError};
use crate::layer::LayerType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Shape a field value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// `{start, end}` with non-negative integers and `end >= start`.
    Span,
    String,
    Integer,
    Number,
    Mapping,
    Any,
}

impl FieldKind {
    fn expected(self) -> &'static str {
        match self {
            Self::Span => "a span mapping",
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Mapping => "a mapping",
            Self::Any => "any value",
        }
    }

    fn check(self, field: &str, value: &Value) -> Result<(), ValidationError> {
        let ok = match self {
            Self::Span => return check_span(field, value),
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Mapping => value.is_object(),
            Self::Any => true,
        };
        if ok {
            Ok(())
        } else {
            Err(ValidationError::WrongType {
                field: field.to_string(),
                expected: self.expected(),
            })
        }
    }
}

impl std::str::FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "span" => Ok(Self::Span),
            "string" | "str" => Ok(Self::String),
            "integer" | "int" => Ok(Self::Integer),
            "number" | "float" => Ok(Self::Number),
            "mapping" | "dict" | "object" => Ok(Self::Mapping),
            "any" => Ok(Self::Any),
            _ => Err(format!("unknown field kind: {s}")),
        }
    }
}

fn check_span(field: &str, value: &Value) -> Result<(), ValidationError> {
    let invalid = |description: &str| ValidationError::InvalidSpan {
        field: field.to_string(),
        description: description.to_string(),
    };
    let span = value.as_object().ok_or_else(|| ValidationError::WrongType {
        field: field.to_string(),
        expected: FieldKind::Span.expected(),
    })?;
    let start = span
        .get("start")
        .ok_or_else(|| invalid("missing `start`"))?
        .as_u64()
        .ok_or_else(|| invalid("`start` must be a non-negative integer"))?;
    let end = span
        .get("end")
        .ok_or_else(|| invalid("missing `end`"))?
        .as_u64()
        .ok_or_else(|| invalid("`end` must be a non-negative integer"))?;
    if end < start {
        return Err(invalid("`end` must not be less than `start`"));
    }
    Ok(())
}

/// One declared field of a layer schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn required(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
        }
    }

    pub fn optional(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
        }
    }
}

/// The required-field contract and validator for one layer type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSchema {
    pub layer: LayerType,
    pub fields: Vec<FieldSpec>,
}

impl LayerSchema {
    pub fn new(layer: LayerType, fields: Vec<FieldSpec>) -> Self {
        Self { layer, fields }
    }

    /// Required field names in declaration order.
    pub fn required_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name.clone())
            .collect()
    }

    /// Full structural validation of one annotation record.
    ///
    /// Unknown fields are tolerated; they only show up as extra fields in
    /// the conformance deltas. A null optional field counts as absent.
    pub fn validate(&self, record: &Value) -> Result<(), ValidationError> {
        let record = record.as_object().ok_or(ValidationError::NotAMapping)?;
        for field in &self.fields {
            match record.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(ValidationError::MissingField {
                        field: field.name.clone(),
                    });
                }
                None | Some(Value::Null) => {}
                Some(value) => field.kind.check(&field.name, value)?,
            }
        }
        Ok(())
    }

    /// `validate` collapsed to a verdict.
    pub fn validates(&self, record: &Value) -> bool {
        self.validate(record).is_ok()
    }
}

/// Source of layer schemas, keyed by the closed layer enumeration.
pub trait SchemaRegistry {
    fn schema_for(&self, layer: LayerType) -> Option<&LayerSchema>;
}

/// Table-backed registry: the built-in OPF schemas, optionally overlaid
/// from a TOML definition.
#[derive(Debug, Clone, Default)]
pub struct LayerSchemaTable {
    schemas: BTreeMap<LayerType, LayerSchema>,
}

impl LayerSchemaTable {
    /// An empty table. Every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Schemas for every known layer type.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for layer in LayerType::ALL {
            table.insert(LayerSchema::new(layer, builtin_fields(layer)));
        }
        table
    }

    /// Built-in table with the entries of a TOML registry file on top.
    pub fn builtin_with_overlay(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        let mut table = Self::builtin();
        table.apply_toml(&text, &path.display().to_string())?;
        Ok(table)
    }

    /// Parse registry TOML and replace the matching entries.
    ///
    /// ```toml
    /// [layers.Pagination]
    /// fields = [
    ///   { name = "span", kind = "span", required = true },
    ///   { name = "imgnum", kind = "integer" },
    /// ]
    /// ```
    pub fn apply_toml(&mut self, text: &str, origin: &str) -> Result<(), SchemaError> {
        let parsed: RegistryFile =
            toml::from_str(text).map_err(|source| SchemaError::ParseToml {
                path: origin.to_string(),
                source,
            })?;
        for (layer_value, entry) in parsed.layers {
            let layer: LayerType = layer_value
                .parse()
                .map_err(|_| SchemaError::UnknownLayer(layer_value.clone()))?;
            let mut fields = Vec::with_capacity(entry.fields.len());
            for field in entry.fields {
                let kind = field
                    .kind
                    .parse()
                    .map_err(|_| SchemaError::UnknownFieldKind {
                        field: field.name.clone(),
                        kind: field.kind.clone(),
                    })?;
                fields.push(FieldSpec {
                    name: field.name,
                    kind,
                    required: field.required,
                });
            }
            tracing::debug!(layer = %layer, fields = fields.len(), "schema overlay entry");
            self.insert(LayerSchema::new(layer, fields));
        }
        Ok(())
    }

    pub fn insert(&mut self, schema: LayerSchema) {
        self.schemas.insert(schema.layer, schema);
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerSchema> {
        self.schemas.values()
    }

    /// Registry listing for `layers --json`.
    pub fn to_json(&self) -> Value {
        let mut layers = Map::new();
        for schema in self.iter() {
            layers.insert(
                schema.layer.value().to_string(),
                serde_json::json!({
                    "name": schema.layer.name(),
                    "requiredFields": schema.required_fields(),
                    "fields": schema.fields,
                }),
            );
        }
        serde_json::json!({
            "schema": 1,
            "registryKind": "pecha_audit.layer_schema_registry.v1",
            "layers": Value::Object(layers),
        })
    }
}

impl SchemaRegistry for LayerSchemaTable {
    fn schema_for(&self, layer: LayerType) -> Option<&LayerSchema> {
        self.schemas.get(&layer)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    layers: BTreeMap<String, RegistryLayer>,
}

#[derive(Debug, Deserialize)]
struct RegistryLayer {
    #[serde(default)]
    fields: Vec<RegistryField>,
}

#[derive(Debug, Deserialize)]
struct RegistryField {
    name: String,
    kind: String,
    #[serde(default)]
    required: bool,
}

fn builtin_fields(layer: LayerType) -> Vec<FieldSpec> {
    use FieldKind::*;

    let mut fields = vec![
        FieldSpec::required("span", Span),
        FieldSpec::optional("metadata", Mapping),
    ];
    match layer {
        LayerType::Pagination => {
            fields.push(FieldSpec::optional("page_info", String));
            fields.push(FieldSpec::optional("imgnum", Integer));
            fields.push(FieldSpec::optional("reference", String));
        }
        LayerType::Language => {
            fields.push(FieldSpec::optional("language", String));
        }
        LayerType::OcrConfidence => {
            fields.push(FieldSpec::required("confidence", Number));
            fields.push(FieldSpec::optional("nb_below_threshold", Integer));
        }
        LayerType::Durchen => {
            fields.push(FieldSpec::required("default", String));
            fields.push(FieldSpec::required("options", Mapping));
        }
        LayerType::TranscriptionTimeSpan => {
            fields.push(FieldSpec::required("start", Number));
            fields.push(FieldSpec::required("end", Number));
        }
        _ => {}
    }
    fields
}
