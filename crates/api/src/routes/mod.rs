//! Route definitions.

pub mod health;
pub mod sponsors;
pub mod submissions;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /submissions                          create (public), list (admin)
/// /submissions/published                public listing
/// /submissions/{id}                     get (admin), patch moderation (admin)
/// /submissions/{id}/status              transition (admin)
///
/// /sponsor-applications                 create (public), list (admin)
/// /sponsor-applications/{id}/decision   approve/reject (admin)
///
/// /sponsors                             list (admin)
/// /sponsors/{id}/sync                   manual content-store sync (admin)
///
/// /uploads/sign                         presigned upload URL (public)
/// /uploads/download-url                 presigned download URL (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/submissions", submissions::router())
        .nest("/sponsor-applications", sponsors::applications_router())
        .nest("/sponsors", sponsors::sponsors_router())
        .nest("/uploads", uploads::router())
}
