//! Storage adapter: the upload seam the pipeline talks to, and the concrete
//! AWS implementation behind it.
//!
//! The pipeline only sees two traits: [`StorageConnector`] opens an
//! authenticated session once per run, and [`ObjectStore`] performs the
//! actual object writes through that session. Both are annotated for
//! `mockall` so integration tests can drive the whole pipeline without a
//! network. The production implementation resolves a Cognito identity from
//! the configured identity pool, exchanges it for temporary credentials and
//! writes through the S3 API; those details stay behind the trait.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, SharedCredentialsProvider};
use aws_sdk_s3::primitives::ByteStream;
use mockall::automock;
use tracing::{error, info};

use crate::config::CloudConfig;

/// Error type for the storage adapter (simple boxed error).
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// A single object write request.
pub struct PutObject<'a> {
    /// Destination bucket name.
    pub bucket: &'a str,
    /// Full object key, already namespaced by the caller identity.
    pub key: &'a str,
    /// The whole file content.
    pub body: &'a [u8],
    /// MIME type sniffed from the content.
    pub content_type: &'a str,
}

/// Trait for writing objects into the bucket. Implemented by the real S3
/// client and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write one object. The implementor handles transport, auth and
    /// serialization; callers only learn success or failure.
    async fn put_object<'a>(&self, req: PutObject<'a>) -> Result<(), StoreError>;
}

/// An authenticated session: the shared store handle plus the opaque caller
/// identity used to namespace object keys. Opened once per run and shared
/// read-only across all concurrent uploads.
pub struct StorageSession {
    pub store: Arc<dyn ObjectStore>,
    pub caller_identity: String,
}

/// Trait for opening the storage session. Kept separate from [`ObjectStore`]
/// so the pipeline can defer all network activity until after the
/// confirmation gate.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait StorageConnector: Send + Sync {
    async fn open_session(&self) -> Result<StorageSession, StoreError>;
}

/// Derives the object key for an upload. Pure function of the collection
/// slug, the file name and the session's caller identity.
pub fn object_key(collection: &str, file_name: &str, identity: &str) -> String {
    format!("{identity}/{collection}/{file_name}")
}

/// Region is encoded as the prefix of the identity pool id ("region:guid").
fn pool_region(identity_pool_id: &str) -> &str {
    identity_pool_id
        .split(':')
        .next()
        .filter(|region| !region.is_empty())
        .unwrap_or("us-east-1")
}

/// Connector for the production backend. Carries only what session
/// construction needs; everything else in [`CloudConfig`] belongs to the
/// black-box credential exchange.
pub struct S3Connector {
    identity_pool_id: String,
}

impl S3Connector {
    pub fn new(cloud: &CloudConfig) -> Self {
        S3Connector {
            identity_pool_id: cloud.cognito_identity_pool_id.clone(),
        }
    }
}

#[async_trait]
impl StorageConnector for S3Connector {
    async fn open_session(&self) -> Result<StorageSession, StoreError> {
        let region = pool_region(&self.identity_pool_id).to_string();
        info!(region = %region, "Opening storage session");
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region))
            .load()
            .await;

        let cognito = aws_sdk_cognitoidentity::Client::new(&sdk_config);
        let identity = cognito
            .get_id()
            .identity_pool_id(&self.identity_pool_id)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to resolve caller identity");
                format!("API error resolving caller identity: {e:?}")
            })?;
        let identity_id = identity
            .identity_id()
            .ok_or("Identity pool returned no identity id")?
            .to_string();

        let credentials = cognito
            .get_credentials_for_identity()
            .identity_id(&identity_id)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, identity_id = %identity_id, "Failed to fetch identity credentials");
                format!("API error fetching identity credentials: {e:?}")
            })?;
        let credentials = credentials
            .credentials()
            .ok_or("Identity returned no credentials")?;
        let (access_key, secret_key) = match (credentials.access_key_id(), credentials.secret_key())
        {
            (Some(access_key), Some(secret_key)) => {
                (access_key.to_string(), secret_key.to_string())
            }
            _ => return Err("Identity credentials incomplete".into()),
        };
        let session_token = credentials.session_token().map(str::to_string);

        let s3_credentials = Credentials::new(
            access_key,
            secret_key,
            session_token,
            None,
            "cognito-identity",
        );
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .credentials_provider(SharedCredentialsProvider::new(s3_credentials))
            .build();
        let client = aws_sdk_s3::Client::from_conf(s3_config);

        info!(identity_id = %identity_id, "Storage session opened");
        Ok(StorageSession {
            store: Arc::new(S3Store { client }),
            caller_identity: identity_id,
        })
    }
}

/// The production object store: plain `PutObject` calls against S3.
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object<'a>(&self, req: PutObject<'a>) -> Result<(), StoreError> {
        info!(
            bucket = req.bucket,
            key = req.key,
            content_type = req.content_type,
            size = req.body.len(),
            "Putting object"
        );
        let result = self
            .client
            .put_object()
            .bucket(req.bucket)
            .key(req.key)
            .body(ByteStream::from(req.body.to_vec()))
            .content_type(req.content_type)
            .send()
            .await;

        match result {
            Ok(_) => {
                info!(key = req.key, "Successfully put object");
                Ok(())
            }
            Err(e) => {
                error!(error = ?e, key = req.key, "API error putting object");
                Err(format!("API error: {e:?}").into())
            }
        }
    }
}
