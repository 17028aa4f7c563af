//! Handlers for presigned upload and download URLs.
//!
//! Upload signing is public (rate-limited): the returned storage path is
//! derived server-side, so the client file name never shapes the object
//! key. Download URLs are admin-only previews; an absent object yields
//! `null`, not an error.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use postbox_core::error::CoreError;
use postbox_core::upload::validate_upload_request;
use postbox_storage::path::{derive_storage_path, is_safe_storage_path};
use postbox_storage::{DOWNLOAD_URL_EXPIRY, UPLOAD_URL_EXPIRY};

use crate::error::{AppError, AppResult};
use crate::middleware::rate_limit::{enforce, ClientIp};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Namespace segment for sponsor logo uploads.
const PURPOSE_SPONSOR_LOGO: &str = "sponsor-logos";

// ---------------------------------------------------------------------------
// POST /uploads/sign
// ---------------------------------------------------------------------------

/// Request body for upload-URL signing.
#[derive(Debug, Deserialize)]
pub struct SignUploadRequest {
    pub file_name: String,
    pub mime_type: String,
    pub file_size: u64,
}

/// A signed upload grant.
#[derive(Debug, Serialize)]
pub struct SignUploadResponse {
    pub upload_url: String,
    pub storage_path: String,
    pub expires_in_secs: u64,
}

/// Issue a time-limited, write-capable upload URL. Public, rate-limited.
pub async fn sign_upload(
    ClientIp(client_key): ClientIp,
    State(state): State<AppState>,
    Json(input): Json<SignUploadRequest>,
) -> AppResult<impl IntoResponse> {
    enforce(
        state.rate_limiter.as_ref(),
        &client_key,
        state.config.rate_limits.uploads,
    )
    .await?;

    validate_upload_request(&input.file_name, &input.mime_type, input.file_size)?;

    let store = state
        .object_store
        .clone()
        .ok_or_else(|| AppError::Core(CoreError::Upstream("Object store is not configured".into())))?;

    let storage_path = derive_storage_path(PURPOSE_SPONSOR_LOGO, &input.mime_type)
        .ok_or_else(|| CoreError::validation("mime_type", "has no known file extension"))?;

    let upload_url = store
        .presign_upload(&storage_path, &input.mime_type, UPLOAD_URL_EXPIRY)
        .await?;

    tracing::info!(
        storage_path = %storage_path,
        mime_type = %input.mime_type,
        file_size = input.file_size,
        "Upload URL issued",
    );

    Ok(Json(DataResponse {
        data: SignUploadResponse {
            upload_url,
            storage_path,
            expires_in_secs: UPLOAD_URL_EXPIRY.as_secs(),
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /uploads/download-url
// ---------------------------------------------------------------------------

/// Query parameters for download-URL issuing.
#[derive(Debug, Deserialize)]
pub struct DownloadUrlParams {
    pub path: String,
}

/// A download-URL result; `url` is `null` when no preview is available.
#[derive(Debug, Serialize)]
pub struct DownloadUrlResponse {
    pub url: Option<String>,
}

/// Issue a time-limited download URL for a staged upload. Admin only.
///
/// Returns `null` when the object does not exist or the store is
/// unreachable -- callers treat absence as "no preview available".
pub async fn download_url(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<DownloadUrlParams>,
) -> AppResult<impl IntoResponse> {
    if !is_safe_storage_path(&params.path) {
        return Err(AppError::Core(CoreError::validation(
            "path",
            "must be a staged upload path",
        )));
    }

    let url = match state.object_store.clone() {
        Some(store) => store.presign_download(&params.path, DOWNLOAD_URL_EXPIRY).await,
        None => {
            tracing::warn!("Object store not configured, no download URL");
            None
        }
    };

    Ok(Json(DataResponse {
        data: DownloadUrlResponse { url },
    }))
}
