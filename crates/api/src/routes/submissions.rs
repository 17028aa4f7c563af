//! Route definitions for submissions.
//!
//! Mounted at `/submissions` by `api_routes()`.

use axum::routing::{get, patch, put};
use axum::Router;

use crate::handlers::submissions;
use crate::state::AppState;

/// Submission routes.
///
/// ```text
/// POST   /                  -> create_submission (public, rate-limited)
/// GET    /                  -> list_submissions (admin)
/// GET    /published         -> list_published (public)
/// GET    /{id}              -> get_submission (admin)
/// PATCH  /{id}              -> update_moderation (admin)
/// PUT    /{id}/status       -> transition_submission (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(submissions::list_submissions).post(submissions::create_submission),
        )
        .route("/published", get(submissions::list_published))
        .route(
            "/{id}",
            get(submissions::get_submission).patch(submissions::update_moderation),
        )
        .route("/{id}/status", put(submissions::transition_submission))
}
