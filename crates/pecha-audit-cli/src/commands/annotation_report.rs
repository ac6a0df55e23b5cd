use crate::cli::ReportArgs;
use crate::support::{
    Destination, EXIT_FINDINGS, cataloger_or_exit, load_config_or_exit, parse_format_or_exit,
    pecha_ids_or_exit, print_json_or_exit, print_skipped_block, write_table_or_exit,
};
use serde_json::json;

pub const REPORT_NAME: &str = "annotation_content_report";

pub fn run(args: ReportArgs) {
    let config = load_config_or_exit(&args.config, Some(&args));
    let format = parse_format_or_exit(&args.format);
    let cataloger = cataloger_or_exit(&config);
    let pecha_ids = pecha_ids_or_exit(&args.pecha_ids, &config, &cataloger);

    let report = cataloger.annotation_report(&pecha_ids);
    let destination =
        Destination::resolve(args.out.as_deref(), &config.output_dir, REPORT_NAME, format);
    write_table_or_exit(&report.table(), &destination, format);
    let summary = report.summary();

    if args.json {
        print_json_or_exit(&json!({
            "report": REPORT_NAME,
            "output": destination.label(),
            "format": format.to_string(),
            "summary": summary,
            "skipped": report.skipped,
        }));
    } else if !destination.is_stdout() {
        println!("pecha-audit annotation-report");
        println!("  Output: {}", destination.label());
        println!("  Pechas: {}", summary.pecha_count);
        println!("  Rows: {}", summary.row_count);
        println!("  Rows with findings: {}", summary.rows_with_findings);
        println!("  Volumes without base file: {}", summary.no_base_file_rows);
        println!("  Unenumerated layer files: {}", summary.unenumerated_layer_rows);
        println!("  Span violations: {}", summary.span_violations);
        println!("  Schema validation failures: {}", summary.validation_failures);
        print_skipped_block(&report.skipped);
    }

    if args.fail_on_findings && report.has_findings() {
        std::process::exit(EXIT_FINDINGS);
    }
}
