use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pecha-audit",
    about = "pecha-audit: structural diagnostics for OpenPecha annotation layers",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Diagnose every annotation layer file of the selected pechas
    AnnotationReport(ReportArgs),

    /// Report base/layers/index presence per pecha
    FolderReport(ReportArgs),

    /// Report meta.yml contents merged with the standard metadata keys
    MetadataReport(ReportArgs),

    /// Diagnose a single layer file
    Inspect {
        /// Path to the layer file (.yml, .yaml or .json)
        path: PathBuf,

        /// Base text to measure spans against (defaults to the OPF tree's base)
        #[arg(long)]
        base: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Exit with status 1 when the diagnostic has findings
        #[arg(long)]
        fail_on_findings: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Label repository directories as OPF, OPA, OPC or Other
    Classify {
        /// Repository directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List known layer types and their schemas
    Layers {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Configuration sources shared by every command that reads pechas.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Config file (defaults to ./pecha-audit.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// TOML file that replaces or extends built-in layer schemas
    #[arg(long)]
    pub schemas: Option<PathBuf>,

    /// Count a present-but-empty `annotations` value as no annotations
    #[arg(long)]
    pub empty_annotations_absent: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Pecha ids (default: the catalog, or every pecha under --pechas-path)
    pub pecha_ids: Vec<String>,

    /// Directory holding <pecha_id>/<pecha_id>.opf repositories
    #[arg(long)]
    pub pechas_path: Option<PathBuf>,

    /// Catalog CSV with a `Pecha ID` column
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Output file (`-` for stdout; default: <output_dir>/<report>.<format>)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Output format: csv or jsonl
    #[arg(long, default_value = "csv")]
    pub format: String,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Exit with status 1 when the report has findings
    #[arg(long)]
    pub fail_on_findings: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}
