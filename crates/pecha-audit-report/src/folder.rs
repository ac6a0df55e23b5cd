//! Folder-structure report: what each pecha's `.opf` directory holds.

use crate::table::Row;
use indexmap::IndexMap;
use pecha_audit_kernel::LayerType;
use pecha_audit_store::{LayerSource, OpfRepository};
use serde_json::{Value, json};

pub const FOLDER_STRUCTURE_COLUMNS: [&str; 6] = [
    "id",
    "contains index",
    "contains annotations",
    "volume count",
    "volumes",
    "unenumed volumes",
];

fn yes_no(flag: bool) -> Value {
    Value::from(if flag { "Yes" } else { "No" })
}

/// One row for one pecha. A layers directory that cannot be listed reads as
/// "no annotations".
pub fn folder_structure_row(repo: &OpfRepository) -> Row {
    let mut row = Row::new();
    row.insert("id".into(), Value::from(repo.pecha_id()));
    row.insert("contains index".into(), yes_no(repo.has_index()));

    let listing = repo
        .components()
        .and_then(|components| Ok((components, repo.unenumerated_layer_names()?)));
    let (components, unenumerated) = match listing {
        Ok((components, _)) if components.is_empty() => (None, None),
        Ok((components, unenumerated)) => (Some(components), Some(unenumerated)),
        Err(err) => {
            tracing::warn!(pecha_id = repo.pecha_id(), error = %err, "layers unreadable");
            (None, None)
        }
    };

    row.insert("contains annotations".into(), yes_no(components.is_some()));
    row.insert(
        "volume count".into(),
        Value::from(components.as_ref().map_or(0, IndexMap::len)),
    );
    row.insert(
        "volumes".into(),
        components.map_or(Value::Null, |components| layer_names(&components)),
    );
    row.insert(
        "unenumed volumes".into(),
        unenumerated.map_or(Value::Null, |names| json!(names)),
    );
    row
}

/// Volume → enumerated layer member names.
fn layer_names(components: &IndexMap<String, Vec<LayerType>>) -> Value {
    let map: serde_json::Map<String, Value> = components
        .iter()
        .map(|(volume, layers)| {
            let names = layers.iter().map(|layer| layer.name()).collect::<Vec<_>>();
            (volume.clone(), json!(names))
        })
        .collect();
    Value::Object(map)
}
