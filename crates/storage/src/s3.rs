//! S3 implementation of [`ObjectStore`] using presigned requests.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;

use crate::{ObjectStore, StorageError};

/// Issues presigned upload/download URLs against a single S3 bucket.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a store for `bucket` using the ambient AWS configuration
    /// (environment credentials, region, endpoint overrides).
    pub async fn new(bucket: String) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self {
            client: Client::new(&config),
            bucket,
        }
    }

    fn presigning_config(expires_in: Duration) -> Result<PresigningConfig, StorageError> {
        PresigningConfig::expires_in(expires_in).map_err(|e| StorageError::Presign(e.to_string()))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_upload(
        &self,
        storage_path: &str,
        mime_type: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(storage_path)
            .content_type(mime_type)
            .presigned(Self::presigning_config(expires_in)?)
            .await
            .map_err(|e| {
                tracing::error!(
                    bucket = %self.bucket,
                    key = storage_path,
                    error = %e,
                    "Failed to presign upload URL"
                );
                StorageError::Store(e.to_string())
            })?;

        Ok(presigned.uri().to_string())
    }

    async fn presign_download(&self, storage_path: &str, expires_in: Duration) -> Option<String> {
        // Confirm the object exists first; presigning alone does not.
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(storage_path)
            .send()
            .await
        {
            Ok(_) => {}
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    tracing::debug!(key = storage_path, "Object not found, no download URL");
                } else {
                    tracing::error!(
                        bucket = %self.bucket,
                        key = storage_path,
                        error = %service_error,
                        "Object store unreachable while checking existence"
                    );
                }
                return None;
            }
        }

        let config = match Self::presigning_config(expires_in) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Invalid presigning configuration");
                return None;
            }
        };

        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(storage_path)
            .presigned(config)
            .await
        {
            Ok(presigned) => Some(presigned.uri().to_string()),
            Err(e) => {
                tracing::error!(
                    bucket = %self.bucket,
                    key = storage_path,
                    error = %e,
                    "Failed to presign download URL"
                );
                None
            }
        }
    }
}
