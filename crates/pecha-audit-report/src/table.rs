//! Tabular report sink: ordered columns, one JSON value per cell.
//!
//! CSV cells render `null` as empty, strings verbatim, and collections as
//! compact JSON. JSONL writes one object per row with every column present.

use crate::error::ReportError;
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

pub type Row = IndexMap<String, Value>;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Jsonl,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Jsonl => "jsonl",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "jsonl" | "ndjson" => Ok(Self::Jsonl),
            _ => Err(ReportError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl ReportTable {
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Columns are the first-seen union of the rows' keys.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns: IndexSet<String> = rows.iter().flat_map(|row| row.keys().cloned()).collect();
        Self {
            columns: columns.into_iter().collect(),
            rows,
        }
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The value of `column` in `row`, `null` when the row lacks it.
    pub fn cell<'a>(&self, row: &'a Row, column: &str) -> &'a Value {
        row.get(column).unwrap_or(&NULL)
    }

    pub fn write_csv(&self, writer: impl Write) -> Result<(), ReportError> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(&self.columns)?;
        for row in &self.rows {
            out.write_record(
                self.columns
                    .iter()
                    .map(|column| cell_text(self.cell(row, column))),
            )?;
        }
        out.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn write_jsonl(&self, writer: &mut impl Write) -> Result<(), ReportError> {
        for row in &self.rows {
            let object: Map<String, Value> = self
                .columns
                .iter()
                .map(|column| (column.clone(), self.cell(row, column).clone()))
                .collect();
            let line = serde_json::to_string(&Value::Object(object))?;
            writeln!(writer, "{line}").map_err(ReportError::Write)?;
        }
        Ok(())
    }

    pub fn write(&self, writer: impl Write, format: OutputFormat) -> Result<(), ReportError> {
        match format {
            OutputFormat::Csv => self.write_csv(writer),
            OutputFormat::Jsonl => {
                let mut writer = writer;
                self.write_jsonl(&mut writer)?;
                writer.flush().map_err(ReportError::Write)?;
                Ok(())
            }
        }
    }

    /// Write to `path`, creating parent directories.
    pub fn write_to_path(
        &self,
        path: impl AsRef<Path>,
        format: OutputFormat,
    ) -> Result<(), ReportError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| ReportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = File::create(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.write(BufWriter::new(file), format)
    }
}

/// CSV cell text for one value.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        collection => collection.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: Value) -> Row {
        pairs
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    #[test]
    fn union_columns_keep_first_seen_order() {
        let table = ReportTable::from_rows(vec![
            row(json!({"id": "P1", "source": "ocr"})),
            row(json!({"id": "P2", "license": "CC0", "source": null})),
        ]);
        assert_eq!(table.columns(), ["id", "source", "license"]);
        assert_eq!(table.cell(&table.rows()[0], "license"), &Value::Null);
    }

    #[test]
    fn csv_renders_cells() {
        let mut table = ReportTable::with_columns(["id", "ok", "fields", "missing", "map"]);
        table.push_row(row(json!({
            "id": "P1",
            "ok": true,
            "fields": ["span", "metadata"],
            "map": {"a": {"span": {"start": 1, "end": 0}}}
        })));
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r###"
        id,ok,fields,missing,map
        P1,true,"[""span"",""metadata""]",,"{""a"":{""span"":{""start"":1,""end"":0}}}"
        "###);
    }

    #[test]
    fn jsonl_writes_every_column() {
        let mut table = ReportTable::with_columns(["id", "count"]);
        table.push_row(row(json!({"id": "P1"})));
        table.push_row(row(json!({"id": "P2", "count": 3})));
        let mut out = Vec::new();
        table.write_jsonl(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![r#"{"id":"P1","count":null}"#, r#"{"id":"P2","count":3}"#]);
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("jsonl".parse::<OutputFormat>().unwrap(), OutputFormat::Jsonl);
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn write_to_path_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/report.csv");
        let mut table = ReportTable::with_columns(["id"]);
        table.push_row(row(json!({"id": "P1"})));
        table.write_to_path(&path, OutputFormat::Csv).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "id\nP1\n");
    }
}
