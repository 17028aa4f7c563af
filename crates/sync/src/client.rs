//! HTTP client for the external headless content store.
//!
//! The store holds typed documents addressed by an opaque id. Every document
//! this service creates carries a `local_key` field (the local record's
//! UUID), which is the stable identifier used to find a document whose id
//! was never persisted locally -- the recovery path for half-failed syncs.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::SyncError;

/// Bounded timeout for every content-store request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A document as stored in the external content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalDocument {
    pub id: String,
    pub doc_type: String,
    pub local_key: String,
    pub fields: serde_json::Value,
}

/// A document payload to create or update.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentDraft {
    pub doc_type: String,
    pub local_key: String,
    pub fields: serde_json::Value,
}

/// External content-store operations used by the sync adapter.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Find a document by type and local key, if one exists.
    async fn find_by_local_key(
        &self,
        doc_type: &str,
        local_key: &str,
    ) -> Result<Option<ExternalDocument>, SyncError>;

    /// Create a new document, returning it with its assigned id.
    async fn create_document(&self, draft: &DocumentDraft) -> Result<ExternalDocument, SyncError>;

    /// Replace the content of an existing document.
    async fn update_document(
        &self,
        id: &str,
        draft: &DocumentDraft,
    ) -> Result<ExternalDocument, SyncError>;
}

/// Reqwest-backed [`ContentStore`] implementation.
pub struct HttpContentStore {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

/// Response envelope for document queries.
#[derive(Debug, Deserialize)]
struct DocumentsResponse {
    data: Vec<ExternalDocument>,
}

/// Response envelope for single-document operations.
#[derive(Debug, Deserialize)]
struct DocumentResponse {
    data: ExternalDocument,
}

impl HttpContentStore {
    /// Create a client for the store at `base_url`, authenticating with a
    /// bearer token. Every request carries a bounded timeout so a stalled
    /// store surfaces as a failure rather than a hang.
    pub fn new(base_url: String, token: String) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SyncError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn find_by_local_key(
        &self,
        doc_type: &str,
        local_key: &str,
    ) -> Result<Option<ExternalDocument>, SyncError> {
        let response = self
            .http
            .get(format!("{}/documents", self.base_url))
            .bearer_auth(&self.token)
            .query(&[("type", doc_type), ("local_key", local_key)])
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let documents: DocumentsResponse = response.json().await?;
        Ok(documents.data.into_iter().next())
    }

    async fn create_document(&self, draft: &DocumentDraft) -> Result<ExternalDocument, SyncError> {
        let response = self
            .http
            .post(format!("{}/documents", self.base_url))
            .bearer_auth(&self.token)
            .json(draft)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let document: DocumentResponse = response.json().await?;
        Ok(document.data)
    }

    async fn update_document(
        &self,
        id: &str,
        draft: &DocumentDraft,
    ) -> Result<ExternalDocument, SyncError> {
        let response = self
            .http
            .put(format!("{}/documents/{id}", self.base_url))
            .bearer_auth(&self.token)
            .json(draft)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let document: DocumentResponse = response.json().await?;
        Ok(document.data)
    }
}
