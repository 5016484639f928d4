use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// The full import configuration, built once at startup and passed by
/// reference through the pipeline. Nothing reads the environment after this
/// is constructed.
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportConfig {
    pub cloud: CloudConfig,
    pub run: RunOptions,
}

impl ImportConfig {
    pub fn trace_loaded(&self) {
        info!(
            bucket = %self.cloud.bucket,
            project_id = %self.cloud.project_id,
            environment = %self.cloud.environment,
            dry_run = self.run.dry_run,
            "Loaded ImportConfig"
        );
        debug!(run = ?self.run, "Run options (full debug)");
    }
}

/// Credentials and addressing for the cloud storage backend. All fields come
/// from the required environment variables, validated for presence only.
#[derive(Debug, Serialize, Deserialize)]
pub struct CloudConfig {
    pub cloud: String,
    pub cognito_user_pool_id: String,
    pub cognito_user_pool_client_id: String,
    pub cognito_identity_pool_id: String,
    pub bucket: String,
    pub cognito_password: String,
    pub project_id: String,
    pub environment: String,
}

/// Per-run options from the CLI surface. `source_dir` and `collection` are
/// the static resolver variant; when either is absent the operator is
/// prompted for it.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunOptions {
    pub dry_run: bool,
    pub source_dir: Option<PathBuf>,
    pub collection: Option<String>,
}
