//! S3 object backend.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info, warn};

use crate::config::CredentialOptions;
use crate::error::{BackendError, BackendResult};
use crate::traits::ObjectBackend;

const CREDENTIALS_PROVIDER_NAME: &str = "keeval";

/// Object backend talking to one S3 bucket.
#[derive(Clone)]
pub struct S3Backend {
    client: Client,
    bucket: String,
}

impl S3Backend {
    /// Wrap an already configured client.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the shared AWS config chain.
    ///
    /// The profile and static keys in `credentials` are passed through when
    /// present; everything else (region included) comes from the provider's
    /// default resolution. A custom `endpoint_url` switches to path-style
    /// addressing for S3-compatible services.
    pub async fn connect(
        bucket: impl Into<String>,
        credentials: &CredentialOptions,
        endpoint_url: Option<&str>,
    ) -> Self {
        let bucket = bucket.into();
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(profile) = &credentials.profile {
            loader = loader.profile_name(profile);
        }
        if let Some((access_key_id, secret_access_key)) = credentials.static_keys() {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                credentials.session_token.clone(),
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        } else if credentials.is_partial() {
            warn!("incomplete access key pair supplied, falling back to default credential chain");
        }

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        info!(
            bucket = %bucket,
            profile = credentials.profile.as_deref().unwrap_or("default"),
            endpoint = endpoint_url.unwrap_or("aws"),
            "S3 backend initialized"
        );

        Self::new(Client::from_conf(builder.build()), bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Map an SDK failure onto a provider code, or a transport classification
/// when the service never answered.
fn backend_error<E, R>(err: SdkError<E, R>) -> BackendError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = aws_sdk_s3::error::DisplayErrorContext(&err).to_string();
    let code = match &err {
        SdkError::ServiceError(_) => err.code().unwrap_or("ServiceError").to_string(),
        SdkError::DispatchFailure(_) => "DispatchFailure".to_string(),
        SdkError::TimeoutError(_) => "Timeout".to_string(),
        SdkError::ResponseError(_) => "ResponseError".to_string(),
        SdkError::ConstructionFailure(_) => "ConstructionFailure".to_string(),
        _ => err.code().unwrap_or("Unknown").to_string(),
    };
    BackendError::new(code, message)
}

#[async_trait]
impl ObjectBackend for S3Backend {
    async fn get_object(&self, path: &str) -> BackendResult<Vec<u8>> {
        debug!(bucket = %self.bucket, path = %path, "get_object");

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(backend_error)?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| BackendError::new("BodyReadError", e.to_string()))?;

        Ok(body.into_bytes().to_vec())
    }

    async fn put_object(&self, path: &str, body: Vec<u8>) -> BackendResult<()> {
        debug!(bucket = %self.bucket, path = %path, size = body.len(), "put_object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> BackendResult<Vec<String>> {
        debug!(bucket = %self.bucket, prefix = %prefix, "list_objects");

        let mut paths = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(backend_error)?;

            paths.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(paths)
    }
}

impl std::fmt::Debug for S3Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Backend")
            .field("bucket", &self.bucket)
            .finish()
    }
}
