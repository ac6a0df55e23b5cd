//! pecha-audit CLI: the `pecha-audit` command.

mod cli;
mod commands;
mod config;
mod logging;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    logging::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::AnnotationReport(args) => commands::annotation_report::run(args),

        Commands::FolderReport(args) => commands::folder_report::run(args),

        Commands::MetadataReport(args) => commands::metadata_report::run(args),

        Commands::Inspect {
            path,
            base,
            config,
            fail_on_findings,
            json,
        } => commands::inspect::run(path, base, config, fail_on_findings, json),

        Commands::Classify { paths, json } => commands::classify::run(paths, json),

        Commands::Layers { config, json } => commands::layers::run(config, json),
    }
}
