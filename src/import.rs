//! Coordinating module for the resolve → confirm → batch-upload pipeline.
//!
//! The orchestrator resolves the source directory and collection slug
//! (static options first, prompts otherwise), lists the directory, holds at
//! the confirmation gate, and only then opens the storage session and walks
//! the batches. Batches run strictly in sequence; uploads inside a batch run
//! concurrently and are individually fault-isolated, so one file's failure
//! never disturbs its siblings or later batches. Every per-file outcome is
//! recorded in the returned [`ImportReport`], which drives the CLI summary
//! and the process exit code.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::ImportConfig;
use crate::prompt::Prompter;
use crate::sniff;
use crate::store::{self, PutObject, StorageConnector, StorageSession};

/// Maximum number of uploads in flight at once; also the chunk size.
pub const BATCH_SIZE: usize = 5;

/// Why a run ended before any upload was attempted. All of these are normal
/// terminations, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abort {
    NoSourceDir,
    NoCollection,
    Declined,
}

/// Result of a full pipeline run.
#[derive(Debug)]
pub enum ImportOutcome {
    /// The operator backed out at an input prompt or the confirmation gate.
    Aborted(Abort),
    /// Every file was attempted exactly once; see the report for outcomes.
    Completed(ImportReport),
}

/// Terminal state of one file's upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UploadStatus {
    Uploaded,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file_name: String,
    pub status: UploadStatus,
}

/// Aggregated per-file outcomes for a completed run.
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub outcomes: Vec<FileOutcome>,
}

impl ImportReport {
    pub fn uploaded(&self) -> usize {
        self.count(|status| matches!(status, UploadStatus::Uploaded))
    }

    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, UploadStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, UploadStatus::Failed(_)))
    }

    /// Names of the files that failed, in attempt order.
    pub fn failed_files(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, UploadStatus::Failed(_)))
            .map(|outcome| outcome.file_name.as_str())
            .collect()
    }

    fn count(&self, pred: impl Fn(&UploadStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| pred(&outcome.status))
            .count()
    }
}

/// Partitions `files` into consecutive chunks of at most `size` elements.
/// The last chunk may be shorter; zero-length input (or a zero size) yields
/// zero chunks. Concatenating the chunks in order reproduces the input.
pub fn chunk_files(files: &[String], size: usize) -> Vec<Vec<String>> {
    if size == 0 {
        return Vec::new();
    }
    files.chunks(size).map(<[String]>::to_vec).collect()
}

/// Lists the source directory non-recursively. Every entry name is a
/// candidate file; nothing is filtered by extension or type here (sniffing
/// happens later, per file, from content). Names are sorted so batch
/// composition is deterministic.
pub fn list_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    names.sort();
    Ok(names)
}

/// Entrypoint: run the whole import pipeline according to config.
pub async fn run_import<P, C>(
    config: &ImportConfig,
    prompter: &P,
    connector: &C,
) -> Result<ImportOutcome, String>
where
    P: Prompter,
    C: StorageConnector,
{
    info!(dry_run = config.run.dry_run, "[IMPORT] Starting media import pipeline");

    // Both values provided up front means the static variant: no prompts,
    // no confirmation gate.
    let statically_resolved =
        config.run.source_dir.is_some() && config.run.collection.is_some();

    let source_dir = match &config.run.source_dir {
        Some(dir) => dir.clone(),
        None => {
            let answer = prompter
                .input("Enter absolute path of uploads directory")
                .map_err(|e| format!("Prompt failed: {e}"))?;
            if answer.is_empty() {
                println!("No upload directory provided");
                info!("[IMPORT] No source directory provided, aborting");
                return Ok(ImportOutcome::Aborted(Abort::NoSourceDir));
            }
            PathBuf::from(answer)
        }
    };

    let collection = match &config.run.collection {
        Some(slug) => slug.clone(),
        None => {
            let answer = prompter
                .input("Enter upload collection slug. Reference your CMS config. (usually \"media\")")
                .map_err(|e| format!("Prompt failed: {e}"))?;
            if answer.is_empty() {
                println!("No collection slug provided");
                info!("[IMPORT] No collection slug provided, aborting");
                return Ok(ImportOutcome::Aborted(Abort::NoCollection));
            }
            answer
        }
    };

    let files = list_files(&source_dir)
        .map_err(|e| format!("Failed to list {}: {e}", source_dir.display()))?;
    info!(
        count = files.len(),
        dir = %source_dir.display(),
        collection = %collection,
        "[IMPORT] Listed source directory"
    );

    if !statically_resolved {
        let message = format!(
            "Preparing to upload {} files from {}... Continue?",
            files.len(),
            source_dir.display()
        );
        let confirmed = prompter
            .confirm(&message, false)
            .map_err(|e| format!("Prompt failed: {e}"))?;
        if !confirmed {
            println!("Aborting upload operation.");
            info!("[IMPORT] Operator declined confirmation, aborting");
            return Ok(ImportOutcome::Aborted(Abort::Declined));
        }
    }

    if files.is_empty() {
        println!("Upload completed!");
        info!("[IMPORT] Source directory is empty, nothing to upload");
        return Ok(ImportOutcome::Completed(ImportReport { outcomes: vec![] }));
    }

    // The session is opened once, after consent, and only for wet runs: a
    // dry run must stay fully offline.
    let session = if config.run.dry_run {
        None
    } else {
        match connector.open_session().await {
            Ok(session) => {
                info!(identity = %session.caller_identity, "[IMPORT] Storage session opened");
                Some(session)
            }
            Err(e) => {
                error!(error = ?e, "[IMPORT][ERROR] Failed to open storage session");
                return Err(format!(
                    "Failed to open storage session, no files attempted ({}): {e:?}",
                    files.join(", ")
                ));
            }
        }
    };

    let batches = chunk_files(&files, BATCH_SIZE);
    info!(
        batches = batches.len(),
        batch_size = BATCH_SIZE,
        "[IMPORT] Partitioned files into batches"
    );

    let mut outcomes: Vec<FileOutcome> = Vec::with_capacity(files.len());
    for batch in &batches {
        debug!(files = ?batch, "[IMPORT] Starting batch");
        let uploads = batch
            .iter()
            .map(|file_name| upload_file(config, session.as_ref(), &source_dir, &collection, file_name));
        outcomes.extend(join_all(uploads).await);
    }

    let report = ImportReport { outcomes };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => debug!(json = %json, "[IMPORT] Final report as JSON"),
        Err(e) => error!(error = ?e, "[IMPORT] Failed to serialize report as JSON"),
    }
    println!("Upload completed!");
    info!(
        uploaded = report.uploaded(),
        skipped = report.skipped(),
        failed = report.failed(),
        "[IMPORT] Import finished"
    );
    Ok(ImportOutcome::Completed(report))
}

/// Uploads (or, in dry-run, skips) a single file. Every failure is caught
/// and recorded here so sibling uploads are unaffected, and the terminal
/// completion line runs on every exit path.
async fn upload_file(
    config: &ImportConfig,
    session: Option<&StorageSession>,
    source_dir: &Path,
    collection: &str,
    file_name: &str,
) -> FileOutcome {
    let prefix = if config.run.dry_run { "[DRY RUN] " } else { "" };
    println!("{prefix}{file_name}: Uploading...");
    info!(file = file_name, "[IMPORT] Upload starting");

    let status = if config.run.dry_run {
        println!("{prefix}{file_name}: Skipped upload");
        info!(file = file_name, "[IMPORT] Dry run, skipped upload");
        UploadStatus::Skipped
    } else {
        match attempt_upload(config, session, source_dir, collection, file_name).await {
            Ok(()) => {
                println!("{prefix}{file_name}: Uploaded");
                info!(file = file_name, "[IMPORT] Upload succeeded");
                UploadStatus::Uploaded
            }
            Err(reason) => {
                eprintln!("File {file_name} failed to upload");
                error!(file = file_name, reason = %reason, "[IMPORT][ERROR] Upload failed");
                UploadStatus::Failed(reason)
            }
        }
    };

    // Terminal marker, present whatever the outcome.
    println!("{prefix}{file_name}: Upload complete!");
    FileOutcome {
        file_name: file_name.to_string(),
        status,
    }
}

async fn attempt_upload(
    config: &ImportConfig,
    session: Option<&StorageSession>,
    source_dir: &Path,
    collection: &str,
    file_name: &str,
) -> Result<(), String> {
    let session = session.ok_or_else(|| "No storage session for wet run".to_string())?;

    let path = source_dir.join(file_name);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let content_type = sniff::detect_content_type(&bytes)
        .map_err(|e| format!("Failed to sniff content type: {e:?}"))?;
    let key = store::object_key(collection, file_name, &session.caller_identity);
    debug!(file = file_name, key = %key, content_type, "[IMPORT] Submitting to storage");

    session
        .store
        .put_object(PutObject {
            bucket: &config.cloud.bucket,
            key: &key,
            body: &bytes,
            content_type,
        })
        .await
        .map_err(|e| format!("Storage put failed: {e:?}"))?;
    Ok(())
}
