//! S3-compatible store backed by the AWS SDK

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;

use crate::app::models::StorageKey;
use crate::app::store::upload::MultipartUpload;
use crate::app::store::{ByteStream, ObjectStore, StoreSettings};
use crate::constants::transfer;
use crate::errors::{StoreError, StoreResult, TransferResult};

/// S3-compatible object store
pub struct S3Store {
    client: Client,
    bucket: String,
    part_size: usize,
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("bucket", &self.bucket)
            .field("part_size", &self.part_size)
            .finish_non_exhaustive()
    }
}

impl S3Store {
    /// Build a store client from explicit credentials
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the part size is below the S3 minimum
    /// or the bucket name is empty
    pub fn new(settings: &StoreSettings) -> StoreResult<Self> {
        if settings.bucket.trim().is_empty() {
            return Err(StoreError::Config("bucket name is empty".to_string()));
        }
        if settings.part_size < transfer::MIN_PART_SIZE {
            return Err(StoreError::Config(format!(
                "part size {} is below the {} byte minimum",
                settings.part_size,
                transfer::MIN_PART_SIZE
            )));
        }

        let credentials = aws_sdk_s3::config::Credentials::new(
            settings.access_key_id.clone(),
            settings.secret_access_key.clone(),
            None,
            None,
            "video-migrator",
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_config::Region::new(settings.region.clone()))
            .credentials_provider(credentials);

        if let Some(endpoint) = &settings.endpoint {
            builder = builder
                .endpoint_url(normalize_endpoint(endpoint))
                .force_path_style(true);
        }

        tracing::info!(
            "Created S3 store for bucket {} in {}",
            settings.bucket,
            settings.region
        );

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: settings.bucket.clone(),
            part_size: settings.part_size,
        })
    }
}

/// Bare `host:port` endpoints get an http scheme
fn normalize_endpoint(endpoint: &str) -> String {
    let lower = endpoint.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn exists(&self, key: &StorageKey) -> bool {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send()
            .await
        {
            Ok(_) => true,
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false);
                if not_found {
                    tracing::debug!("{} not present in store", key);
                } else {
                    tracing::warn!(
                        "Existence check for {} failed, treating as absent: {}",
                        key,
                        DisplayErrorContext(&err)
                    );
                }
                false
            }
        }
    }

    async fn put_stream(
        &self,
        key: &StorageKey,
        body: ByteStream,
        size_hint: Option<u64>,
    ) -> TransferResult<u64> {
        tracing::debug!(
            "Uploading {} (size hint: {:?}, part size: {})",
            key,
            size_hint,
            self.part_size
        );
        MultipartUpload::new(&self.client, &self.bucket, key.as_str(), self.part_size)
            .run(body)
            .await
    }

    async fn list_keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);

            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let output = request.send().await.map_err(|err| StoreError::List {
                prefix: prefix.to_string(),
                reason: DisplayErrorContext(&err).to_string(),
            })?;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            if output.is_truncated() == Some(true) {
                continuation_token = output.next_continuation_token().map(str::to_string);
                if continuation_token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        tracing::info!("Store lists {} keys under '{}'", keys.len(), prefix);
        Ok(keys)
    }
}
