use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::import::{self, ImportOutcome};
use crate::load_config::load_config;
use crate::prompt::StdinPrompter;
use crate::store::S3Connector;

/// CLI for media-import: push a local media directory into a cloud bucket.
#[derive(Parser)]
#[clap(
    name = "media-import",
    version,
    about = "Upload a directory of media files to the configured cloud storage bucket"
)]
pub struct Cli {
    /// Perform every step except the network write. Only the literal value
    /// "false" disables it; a bare flag or no flag at all keeps dry-run on.
    #[clap(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_value = "true",
        default_missing_value = "true"
    )]
    pub dry_run: String,

    /// Absolute path of the uploads directory (skips the prompt).
    #[clap(long)]
    pub source_dir: Option<PathBuf>,

    /// Target collection slug, as configured in your CMS (skips the prompt).
    #[clap(long)]
    pub collection: Option<String>,
}

/// Dry-run is the safe default: anything but the literal "false" is true.
pub fn parse_dry_run(raw: &str) -> bool {
    raw != "false"
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    let dry_run = parse_dry_run(&cli.dry_run);
    println!("DRY_RUN: {dry_run}");

    let config = load_config(dry_run, cli.source_dir, cli.collection)?;

    let prompter = StdinPrompter;
    let connector = S3Connector::new(&config.cloud);

    match import::run_import(&config, &prompter, &connector).await {
        Ok(ImportOutcome::Aborted(reason)) => {
            tracing::info!(?reason, "Import aborted before any upload");
            Ok(())
        }
        Ok(ImportOutcome::Completed(report)) => {
            println!(
                "Report: {} uploaded, {} skipped, {} failed",
                report.uploaded(),
                report.skipped(),
                report.failed()
            );
            let failed = report.failed_files();
            if failed.is_empty() {
                Ok(())
            } else {
                eprintln!("[ERROR] Files failed to upload: {}", failed.join(", "));
                Err(anyhow::anyhow!(
                    "{} of {} files failed to upload",
                    failed.len(),
                    report.outcomes.len()
                ))
            }
        }
        Err(e) => {
            eprintln!("[ERROR] Import failed: {e}");
            Err(anyhow::Error::msg(e))
        }
    }
}
