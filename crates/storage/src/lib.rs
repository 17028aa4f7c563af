//! Object-store boundary: short-lived presigned upload/download URLs.
//!
//! The [`ObjectStore`] trait is the seam between the workflow engine and the
//! backing store; [`s3::S3ObjectStore`] is the production implementation.
//! Download-URL absence is not an error -- callers treat `None` as "no
//! preview available".

use std::time::Duration;

use async_trait::async_trait;

pub mod path;
pub mod s3;

pub use s3::S3ObjectStore;

/// How long issued upload URLs stay valid.
pub const UPLOAD_URL_EXPIRY: Duration = Duration::from_secs(3600);

/// How long issued download URLs stay valid.
pub const DOWNLOAD_URL_EXPIRY: Duration = Duration::from_secs(600);

/// Error type for object-store failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing store rejected or failed the request.
    #[error("Object store error: {0}")]
    Store(String),

    /// The presigning configuration could not be built.
    #[error("Presign configuration error: {0}")]
    Presign(String),
}

/// A time-limited, write-capable URL with the storage path it targets.
#[derive(Debug, Clone)]
pub struct PresignedUpload {
    pub upload_url: String,
    pub storage_path: String,
    pub expires_in_secs: u64,
}

/// Backing object store capable of issuing presigned URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Issue a time-limited write-capable URL for `storage_path`.
    async fn presign_upload(
        &self,
        storage_path: &str,
        mime_type: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;

    /// Issue a time-limited read URL for `storage_path`.
    ///
    /// Returns `None` when the object does not exist or the store is
    /// unreachable; the underlying error is logged, never propagated.
    async fn presign_download(&self, storage_path: &str, expires_in: Duration) -> Option<String>;
}
