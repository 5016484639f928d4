//! Mock-driven pipeline tests: batching, dry-run offline guarantees,
//! per-file fault isolation, abort paths and session failure, all without
//! touching a network.

use std::path::PathBuf;
use std::sync::Arc;

use media_import::config::{CloudConfig, ImportConfig, RunOptions};
use media_import::import::{run_import, Abort, ImportOutcome, UploadStatus};
use media_import::prompt::MockPrompter;
use media_import::store::{
    MockObjectStore, MockStorageConnector, PutObject, StorageSession,
};
use tempfile::TempDir;

fn test_config(
    dry_run: bool,
    source_dir: Option<PathBuf>,
    collection: Option<String>,
) -> ImportConfig {
    ImportConfig {
        cloud: CloudConfig {
            cloud: "true".into(),
            cognito_user_pool_id: "us-east-1_testpool".into(),
            cognito_user_pool_client_id: "pool-client".into(),
            cognito_identity_pool_id: "us-east-1:test-identity-pool".into(),
            bucket: "media-bucket".into(),
            cognito_password: "secret".into(),
            project_id: "project".into(),
            environment: "prod".into(),
        },
        run: RunOptions {
            dry_run,
            source_dir,
            collection,
        },
    }
}

/// A directory of `count` small PNG files (real signature so sniffing
/// resolves to image/png), named so their sorted order is predictable.
fn dir_with_png_files(count: usize) -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for i in 0..count {
        let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[i as u8; 8]);
        std::fs::write(dir.path().join(format!("file-{i:02}.png")), bytes)
            .expect("write fixture");
    }
    dir
}

fn session_with(store: MockObjectStore, identity: &str) -> StorageSession {
    StorageSession {
        store: Arc::new(store),
        caller_identity: identity.to_string(),
    }
}

fn completed(outcome: ImportOutcome) -> media_import::import::ImportReport {
    match outcome {
        ImportOutcome::Completed(report) => report,
        other => panic!("Expected a completed run, got: {other:?}"),
    }
}

/// Seven files in dry-run: every file is reported skipped and neither the
/// session nor the store is ever touched.
#[tokio::test]
async fn dry_run_skips_every_file_and_stays_offline() {
    let dir = dir_with_png_files(7);
    let config = test_config(true, Some(dir.path().to_path_buf()), Some("media".into()));

    // Static resolution: no prompts expected either.
    let prompter = MockPrompter::new();
    let mut connector = MockStorageConnector::new();
    connector.expect_open_session().times(0);

    let report = completed(
        run_import(&config, &prompter, &connector)
            .await
            .expect("dry run should complete"),
    );

    assert_eq!(report.outcomes.len(), 7);
    assert_eq!(report.skipped(), 7);
    assert_eq!(report.uploaded(), 0);
    assert_eq!(report.failed(), 0);
    assert!(report
        .outcomes
        .iter()
        .all(|outcome| outcome.status == UploadStatus::Skipped));
}

/// Full interactive wet run: prompts resolve the inputs, the gate is
/// confirmed, and every file lands in the store with an identity-namespaced
/// key and a sniffed content type.
#[tokio::test]
async fn interactive_run_uploads_through_the_session() {
    let dir = dir_with_png_files(3);
    let dir_answer = dir.path().to_string_lossy().into_owned();
    let config = test_config(false, None, None);

    let mut prompter = MockPrompter::new();
    prompter
        .expect_input()
        .withf(|message: &str| message.contains("uploads directory"))
        .return_once(move |_| Ok(dir_answer));
    prompter
        .expect_input()
        .withf(|message: &str| message.contains("collection slug"))
        .return_once(|_| Ok("media".to_string()));
    prompter
        .expect_confirm()
        .withf(|message: &str, default: &bool| message.contains("3 files") && !default)
        .return_once(|_, _| Ok(true));

    let mut store = MockObjectStore::new();
    store
        .expect_put_object()
        .times(3)
        .returning(|req: PutObject<'_>| {
            assert_eq!(req.bucket, "media-bucket");
            assert!(
                req.key.starts_with("us-east-1:identity-1/media/file-"),
                "unexpected key: {}",
                req.key
            );
            assert_eq!(req.content_type, "image/png");
            assert!(!req.body.is_empty());
            Ok(())
        });

    let mut connector = MockStorageConnector::new();
    let session = session_with(store, "us-east-1:identity-1");
    connector
        .expect_open_session()
        .times(1)
        .return_once(move || Ok(session));

    let report = completed(
        run_import(&config, &prompter, &connector)
            .await
            .expect("wet run should complete"),
    );

    assert_eq!(report.uploaded(), 3);
    assert_eq!(report.failed(), 0);
}

/// One file's storage failure is isolated: siblings in the same batch and
/// files in later batches all still complete, and attempt order follows the
/// listing order.
#[tokio::test]
async fn single_failure_leaves_siblings_and_later_batches_intact() {
    let dir = dir_with_png_files(7);
    let config = test_config(false, Some(dir.path().to_path_buf()), Some("media".into()));

    let prompter = MockPrompter::new();

    let mut store = MockObjectStore::new();
    store
        .expect_put_object()
        .times(7)
        .returning(|req: PutObject<'_>| {
            if req.key.ends_with("file-02.png") {
                Err("simulated storage failure".into())
            } else {
                Ok(())
            }
        });

    let mut connector = MockStorageConnector::new();
    let session = session_with(store, "identity-2");
    connector
        .expect_open_session()
        .times(1)
        .return_once(move || Ok(session));

    let report = completed(
        run_import(&config, &prompter, &connector)
            .await
            .expect("run should complete despite one failure"),
    );

    assert_eq!(report.outcomes.len(), 7);
    assert_eq!(report.uploaded(), 6);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failed_files(), vec!["file-02.png"]);

    let attempted: Vec<&str> = report
        .outcomes
        .iter()
        .map(|outcome| outcome.file_name.as_str())
        .collect();
    let expected: Vec<String> = (0..7).map(|i| format!("file-{i:02}.png")).collect();
    assert_eq!(attempted, expected);
}

/// Declining the gate terminates normally with zero storage activity.
#[tokio::test]
async fn declining_the_confirmation_gate_makes_no_storage_calls() {
    let dir = dir_with_png_files(2);
    let dir_answer = dir.path().to_string_lossy().into_owned();
    let config = test_config(false, None, None);

    let mut prompter = MockPrompter::new();
    prompter
        .expect_input()
        .withf(|message: &str| message.contains("uploads directory"))
        .return_once(move |_| Ok(dir_answer));
    prompter
        .expect_input()
        .withf(|message: &str| message.contains("collection slug"))
        .return_once(|_| Ok("media".to_string()));
    prompter.expect_confirm().return_once(|_, _| Ok(false));

    let mut connector = MockStorageConnector::new();
    connector.expect_open_session().times(0);

    let outcome = run_import(&config, &prompter, &connector)
        .await
        .expect("decline is a normal termination");
    assert!(matches!(outcome, ImportOutcome::Aborted(Abort::Declined)));
}

/// Empty answers at either prompt abort the run before any listing of work.
#[tokio::test]
async fn empty_prompt_answers_abort_normally() {
    let config = test_config(false, None, None);

    let mut prompter = MockPrompter::new();
    prompter.expect_input().return_once(|_| Ok(String::new()));
    let connector = MockStorageConnector::new();

    let outcome = run_import(&config, &prompter, &connector)
        .await
        .expect("empty input is a normal termination");
    assert!(matches!(outcome, ImportOutcome::Aborted(Abort::NoSourceDir)));

    // Same for the collection slug when the directory came from a flag.
    let dir = dir_with_png_files(1);
    let config = test_config(false, Some(dir.path().to_path_buf()), None);
    let mut prompter = MockPrompter::new();
    prompter.expect_input().return_once(|_| Ok(String::new()));
    let connector = MockStorageConnector::new();

    let outcome = run_import(&config, &prompter, &connector)
        .await
        .expect("empty input is a normal termination");
    assert!(matches!(outcome, ImportOutcome::Aborted(Abort::NoCollection)));
}

/// Zero files: zero batches, no session, immediate successful completion.
#[tokio::test]
async fn empty_directory_completes_without_a_session() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = test_config(false, Some(dir.path().to_path_buf()), Some("media".into()));

    let prompter = MockPrompter::new();
    let mut connector = MockStorageConnector::new();
    connector.expect_open_session().times(0);

    let report = completed(
        run_import(&config, &prompter, &connector)
            .await
            .expect("empty run should complete"),
    );
    assert!(report.outcomes.is_empty());
}

/// Session construction failing is a run-level error (not a silent
/// success), and the error names the files that were never attempted.
#[tokio::test]
async fn session_failure_fails_the_run_and_names_unattempted_files() {
    let dir = dir_with_png_files(2);
    let config = test_config(false, Some(dir.path().to_path_buf()), Some("media".into()));

    let prompter = MockPrompter::new();
    let mut connector = MockStorageConnector::new();
    connector
        .expect_open_session()
        .return_once(|| Err("session construction failed".into()));

    let err = run_import(&config, &prompter, &connector)
        .await
        .expect_err("session failure should fail the run");
    assert!(err.contains("storage session"), "got: {err}");
    assert!(err.contains("file-00.png") && err.contains("file-01.png"), "got: {err}");
}

/// Content that matches no known signature fails that file alone; sibling
/// files still upload.
#[tokio::test]
async fn unknown_content_signature_fails_only_that_file() {
    let dir = dir_with_png_files(1);
    std::fs::write(dir.path().join("notes.txt"), b"just some text").expect("write fixture");
    let config = test_config(false, Some(dir.path().to_path_buf()), Some("media".into()));

    let prompter = MockPrompter::new();

    let mut store = MockObjectStore::new();
    // Only the PNG ever reaches the store.
    store
        .expect_put_object()
        .times(1)
        .returning(|req: PutObject<'_>| {
            assert!(req.key.ends_with("file-00.png"));
            Ok(())
        });

    let mut connector = MockStorageConnector::new();
    let session = session_with(store, "identity-3");
    connector
        .expect_open_session()
        .times(1)
        .return_once(move || Ok(session));

    let report = completed(
        run_import(&config, &prompter, &connector)
            .await
            .expect("run should complete"),
    );

    assert_eq!(report.uploaded(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failed_files(), vec!["notes.txt"]);
}
