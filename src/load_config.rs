/// `load_config` module: validates the required environment and merges CLI
/// options into the internal ImportConfig.
///
/// This is the only place where the process environment is read. Validation
/// is fail-fast: the first missing (or empty) variable halts startup with an
/// error naming it, before any prompting or filesystem access.
///
/// # Errors
/// All errors here use `anyhow::Error` for context-rich diagnostics and are
/// surfaced at the CLI boundary.
use crate::config::{CloudConfig, ImportConfig, RunOptions};
use anyhow::Result;
use std::env;
use std::path::PathBuf;
use tracing::{error, info};

/// The fixed set of environment variables the importer requires, in the
/// order they are checked. Presence-only: values are not format-checked.
pub const REQUIRED_ENV_VARS: [&str; 8] = [
    "PAYLOAD_CLOUD",
    "PAYLOAD_CLOUD_COGNITO_USER_POOL_ID",
    "PAYLOAD_CLOUD_COGNITO_USER_POOL_CLIENT_ID",
    "PAYLOAD_CLOUD_COGNITO_IDENTITY_POOL_ID",
    "PAYLOAD_CLOUD_BUCKET",
    "PAYLOAD_CLOUD_COGNITO_PASSWORD",
    "PAYLOAD_CLOUD_PROJECT_ID",
    "PAYLOAD_CLOUD_ENVIRONMENT",
];

fn required_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => {
            error!(var = name, "Required environment variable missing");
            Err(anyhow::anyhow!("Missing required env: {name}"))
        }
    }
}

/// Validates the required environment and builds the ImportConfig.
/// Returns the merged config, or an error naming the first missing variable.
pub fn load_config(
    dry_run: bool,
    source_dir: Option<PathBuf>,
    collection: Option<String>,
) -> Result<ImportConfig> {
    // Fail fast on the first missing variable, in declaration order.
    for name in REQUIRED_ENV_VARS {
        required_env(name)?;
    }
    info!(
        count = REQUIRED_ENV_VARS.len(),
        "All required environment variables present"
    );

    let cloud = CloudConfig {
        cloud: required_env("PAYLOAD_CLOUD")?,
        cognito_user_pool_id: required_env("PAYLOAD_CLOUD_COGNITO_USER_POOL_ID")?,
        cognito_user_pool_client_id: required_env("PAYLOAD_CLOUD_COGNITO_USER_POOL_CLIENT_ID")?,
        cognito_identity_pool_id: required_env("PAYLOAD_CLOUD_COGNITO_IDENTITY_POOL_ID")?,
        bucket: required_env("PAYLOAD_CLOUD_BUCKET")?,
        cognito_password: required_env("PAYLOAD_CLOUD_COGNITO_PASSWORD")?,
        project_id: required_env("PAYLOAD_CLOUD_PROJECT_ID")?,
        environment: required_env("PAYLOAD_CLOUD_ENVIRONMENT")?,
    };

    let config = ImportConfig {
        cloud,
        run: RunOptions {
            dry_run,
            source_dir,
            collection,
        },
    };
    config.trace_loaded();

    Ok(config)
}
