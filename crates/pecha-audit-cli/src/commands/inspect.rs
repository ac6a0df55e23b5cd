use crate::cli::ConfigArgs;
use crate::support::{
    EXIT_FINDINGS, cataloger_or_exit, fail, load_config_or_exit, print_json_or_exit,
};
use pecha_audit_report::cell_text;
use std::path::PathBuf;

pub fn run(
    path: PathBuf,
    base: Option<PathBuf>,
    config: ConfigArgs,
    fail_on_findings: bool,
    json_output: bool,
) {
    let config = load_config_or_exit(&config, None);
    let cataloger = cataloger_or_exit(&config);
    let diagnostic = cataloger
        .inspect_layer_file(&path, base.as_deref())
        .unwrap_or_else(|e| fail(e));
    let row = diagnostic.to_row();

    if json_output {
        print_json_or_exit(&row);
    } else {
        println!("pecha-audit inspect {}", path.display());
        for (column, value) in &row {
            let text = cell_text(value);
            println!("  {column}: {}", if text.is_empty() { "-" } else { text.as_str() });
        }
    }

    if fail_on_findings && diagnostic.has_findings() {
        std::process::exit(EXIT_FINDINGS);
    }
}
