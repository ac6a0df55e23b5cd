//! Pecha catalog CSV: the list of pecha ids to audit.

use crate::error::StoreError;
use std::io::Read;
use std::path::Path;

pub const PECHA_ID_COLUMN: &str = "Pecha ID";

/// Read the `Pecha ID` column of a catalog. Blank cells are skipped.
pub fn read_catalog_ids(reader: impl Read, origin: &Path) -> Result<Vec<String>, StoreError> {
    let csv_error = |source| StoreError::Csv {
        path: origin.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().map_err(csv_error)?;
    let column = headers
        .iter()
        .position(|h| h.trim() == PECHA_ID_COLUMN)
        .ok_or_else(|| StoreError::MissingColumn {
            path: origin.to_path_buf(),
            column: PECHA_ID_COLUMN.to_string(),
        })?;

    let mut ids = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_error)?;
        if let Some(id) = record.get(column).map(str::trim)
            && !id.is_empty()
        {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

pub fn read_catalog_ids_from_path(path: impl AsRef<Path>) -> Result<Vec<String>, StoreError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| StoreError::io(path, e))?;
    read_catalog_ids(file, path)
}
