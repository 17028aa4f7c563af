//! Route definitions for presigned upload/download URLs.
//!
//! Mounted at `/uploads` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

/// Upload routes.
///
/// ```text
/// POST   /sign              -> sign_upload (public, rate-limited)
/// GET    /download-url      -> download_url (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sign", post(uploads::sign_upload))
        .route("/download-url", get(uploads::download_url))
}
