//! `Cataloger`: runs the three reports over pechas under one directory.

use crate::annotation::{AnnotationReport, AnnotationReportAssembler, SkippedItem};
use crate::error::ReportError;
use crate::folder::{FOLDER_STRUCTURE_COLUMNS, folder_structure_row};
use crate::metadata::metadata_row;
use crate::table::ReportTable;
use pecha_audit_kernel::{
    AnnotationLayerDiagnostic, DiagnosticOptions, LayerSchemaTable, LayerType, SchemaRegistry,
};
use pecha_audit_store::{OpfRepository, StoreError, read_structured_file};
use std::fs;
use std::path::{Path, PathBuf};

/// A table plus the pechas that could not be read for it.
#[derive(Debug, Clone, Default)]
pub struct TableReport {
    pub table: ReportTable,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone)]
pub struct Cataloger<R: SchemaRegistry = LayerSchemaTable> {
    pechas_path: PathBuf,
    registry: R,
    options: DiagnosticOptions,
}

impl Cataloger<LayerSchemaTable> {
    /// Cataloger over `pechas_path` with the built-in schema registry.
    pub fn new(pechas_path: impl Into<PathBuf>) -> Self {
        Self::with_registry(pechas_path, LayerSchemaTable::builtin())
    }
}

impl<R: SchemaRegistry> Cataloger<R> {
    pub fn with_registry(pechas_path: impl Into<PathBuf>, registry: R) -> Self {
        Self {
            pechas_path: pechas_path.into(),
            registry,
            options: DiagnosticOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DiagnosticOptions) -> Self {
        self.options = options;
        self
    }

    pub fn pechas_path(&self) -> &Path {
        &self.pechas_path
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn open(&self, pecha_id: &str) -> Result<OpfRepository, StoreError> {
        OpfRepository::open(&self.pechas_path, pecha_id)
    }

    /// Ids of every `<id>/<id>.opf` directory under the pechas path, sorted.
    pub fn local_pecha_ids(&self) -> Result<Vec<String>, ReportError> {
        let entries = fs::read_dir(&self.pechas_path).map_err(|source| ReportError::Io {
            path: self.pechas_path.clone(),
            source,
        })?;
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ReportError::Io {
                path: self.pechas_path.clone(),
                source,
            })?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if entry.path().join(format!("{name}.opf")).is_dir() {
                ids.push(name);
            }
        }
        ids.sort();
        Ok(ids)
    }

    pub fn annotation_report(&self, pecha_ids: &[String]) -> AnnotationReport {
        let assembler = AnnotationReportAssembler::new(&self.registry).with_options(self.options);
        let mut report = AnnotationReport::default();
        for pecha_id in pecha_ids {
            match self.open(pecha_id) {
                Ok(repo) => assembler.assemble_pecha(&repo, &mut report),
                Err(err) => skip_pecha(&mut report.skipped, pecha_id, err),
            }
        }
        report
    }

    pub fn folder_structure_report(&self, pecha_ids: &[String]) -> TableReport {
        let mut report = TableReport {
            table: ReportTable::with_columns(FOLDER_STRUCTURE_COLUMNS),
            skipped: Vec::new(),
        };
        for pecha_id in pecha_ids {
            match self.open(pecha_id) {
                Ok(repo) => report.table.push_row(folder_structure_row(&repo)),
                Err(err) => skip_pecha(&mut report.skipped, pecha_id, err),
            }
        }
        report
    }

    pub fn metadata_report(&self, pecha_ids: &[String]) -> TableReport {
        let mut rows = Vec::new();
        let mut skipped = Vec::new();
        for pecha_id in pecha_ids {
            let meta = self.open(pecha_id).and_then(|repo| repo.read_meta());
            match meta {
                Ok(meta) => rows.push(metadata_row(pecha_id, meta.as_ref())),
                Err(err) => skip_pecha(&mut skipped, pecha_id, err),
            }
        }
        TableReport {
            table: ReportTable::from_rows(rows),
            skipped,
        }
    }

    /// Diagnose one layer file on its own.
    ///
    /// For a file inside an OPF tree (`<id>.opf/layers/<volume>/<Layer>.yml`)
    /// the pecha id, volume and base text are taken from the tree; `base`
    /// overrides the base text.
    pub fn inspect_layer_file(
        &self,
        layer_path: &Path,
        base: Option<&Path>,
    ) -> Result<AnnotationLayerDiagnostic, ReportError> {
        let content = read_structured_file(layer_path)?;
        let stem = layer_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        let location = OpfLocation::of(layer_path);
        let base_path = base
            .map(Path::to_path_buf)
            .or_else(|| location.as_ref().map(OpfLocation::base_path));
        let base_file_length = match base_path {
            Some(path) if path.is_file() => {
                let text = fs::read_to_string(&path)
                    .map_err(|source| ReportError::Io { path, source })?;
                Some(text.chars().count() as u64)
            }
            _ => None,
        };

        let (pecha_id, volume) = location
            .map(|loc| (loc.pecha_id, loc.volume))
            .unwrap_or_default();
        let schema = LayerType::from_value(&stem).and_then(|layer| self.registry.schema_for(layer));
        let content = (!content.is_null()).then_some(&content);
        Ok(AnnotationLayerDiagnostic::builder(pecha_id, volume)
            .content_opt(content)
            .base_file_length(base_file_length)
            .schema(schema)
            .file_stem(stem)
            .options(self.options)
            .build())
    }
}

fn skip_pecha(skipped: &mut Vec<SkippedItem>, pecha_id: &str, err: StoreError) {
    tracing::warn!(pecha_id, error = %err, "skipping pecha");
    skipped.push(SkippedItem::pecha(pecha_id, err));
}

/// Where a layer file sits inside an OPF tree.
struct OpfLocation {
    opf_path: PathBuf,
    pecha_id: String,
    volume: String,
}

impl OpfLocation {
    fn of(layer_path: &Path) -> Option<Self> {
        let volume_dir = layer_path.parent()?;
        let layers_dir = volume_dir.parent()?;
        if layers_dir.file_name()? != "layers" {
            return None;
        }
        let opf_path = layers_dir.parent()?;
        let opf_name = opf_path.file_name()?.to_str()?;
        let pecha_id = opf_name.strip_suffix(".opf")?;
        Some(Self {
            opf_path: opf_path.to_path_buf(),
            pecha_id: pecha_id.to_string(),
            volume: volume_dir.file_name()?.to_str()?.to_string(),
        })
    }

    fn base_path(&self) -> PathBuf {
        self.opf_path.join("base").join(format!("{}.txt", self.volume))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn touch(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn pechas() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let opf = root.path().join("P000216/P000216.opf");
        touch(&opf.join("base/v001.txt"), "0123456789");
        touch(
            &opf.join("layers/v001/Pagination.yml"),
            "id: p1\nannotation_type: Pagination\nrevision: '00001'\nannotations:\n  a1:\n    span:\n      start: 0\n      end: 12\n",
        );
        touch(&opf.join("layers/v002/Author.yml"), "annotations: {}\n");
        touch(&opf.join("meta.yml"), "id: P000216\nsource: https://example.org\n");
        fs::create_dir_all(root.path().join("P000002/P000002.opf")).unwrap();
        fs::create_dir_all(root.path().join("scratch")).unwrap();
        root
    }

    #[test]
    fn local_ids_need_an_opf_dir() {
        let root = pechas();
        let ids = Cataloger::new(root.path()).local_pecha_ids().unwrap();
        assert_eq!(ids, vec!["P000002", "P000216"]);
    }

    #[test]
    fn annotation_report_skips_missing_pechas() {
        let root = pechas();
        let ids = vec!["P000216".to_string(), "P404".to_string()];
        let report = Cataloger::new(root.path()).annotation_report(&ids);
        assert_eq!(report.diagnostics.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].pecha_id, "P404");
        assert!(report.skipped[0].volume.is_none());

        let pagination = &report.diagnostics[0];
        assert_eq!(pagination.base_file_length, Some(10));
        assert!(pagination.start_end_greater_than_base_file_length.contains_key("a1"));
        assert!(!report.diagnostics[1].has_base_file);
    }

    #[test]
    fn folder_and_metadata_reports() {
        let root = pechas();
        let cataloger = Cataloger::new(root.path());
        let ids = cataloger.local_pecha_ids().unwrap();

        let folders = cataloger.folder_structure_report(&ids);
        assert_eq!(folders.table.len(), 2);
        assert_eq!(folders.table.rows()[0]["contains annotations"], json!("No"));
        assert_eq!(folders.table.rows()[1]["volume count"], json!(2));

        let metadata = cataloger.metadata_report(&ids);
        assert_eq!(metadata.table.len(), 2);
        assert_eq!(metadata.table.rows()[0]["source"], Value::Null);
        assert_eq!(metadata.table.rows()[1]["source"], json!("https://example.org"));
        assert!(metadata.skipped.is_empty());
    }

    #[test]
    fn inspect_reads_location_from_the_tree() {
        let root = pechas();
        let layer = root
            .path()
            .join("P000216/P000216.opf/layers/v001/Pagination.yml");
        let diagnostic = Cataloger::new(root.path())
            .inspect_layer_file(&layer, None)
            .unwrap();
        assert_eq!(diagnostic.pecha_id, "P000216");
        assert_eq!(diagnostic.volume_name, "v001");
        assert_eq!(diagnostic.base_file_length, Some(10));
        assert_eq!(diagnostic.annotation_file_name.as_deref(), Some("Pagination"));
        assert_eq!(diagnostic.validation_passed, Some(true));
    }

    #[test]
    fn inspect_loose_file_without_base() {
        let dir = tempfile::tempdir().unwrap();
        let layer = dir.path().join("Quotation.yml");
        touch(&layer, "annotations:\n  - span: {start: 3, end: 1}\n");
        let diagnostic = Cataloger::new(dir.path())
            .inspect_layer_file(&layer, None)
            .unwrap();
        assert_eq!(diagnostic.pecha_id, "");
        assert_eq!(diagnostic.base_file_length, None);
        assert!(diagnostic.has_annotation_id_missing);
        assert!(diagnostic.start_greater_equal_than_end.contains_key("0"));
        assert_eq!(diagnostic.validation_passed, None);
    }
}
