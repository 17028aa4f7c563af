//! Route definitions for sponsor applications and sponsors.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::sponsors;
use crate::state::AppState;

/// Sponsor application routes, mounted at `/sponsor-applications`.
///
/// ```text
/// POST   /                  -> create_application (public, rate-limited)
/// GET    /                  -> list_applications (admin)
/// PUT    /{id}/decision     -> decide_application (admin)
/// ```
pub fn applications_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(sponsors::list_applications).post(sponsors::create_application),
        )
        .route("/{id}/decision", put(sponsors::decide_application))
}

/// Sponsor routes, mounted at `/sponsors`.
///
/// ```text
/// GET    /                  -> list_sponsors (admin)
/// POST   /{id}/sync         -> sync_sponsor_now (admin)
/// ```
pub fn sponsors_router() -> Router<AppState> {
    Router::new()
        .route("/", get(sponsors::list_sponsors))
        .route("/{id}/sync", post(sponsors::sync_sponsor_now))
}
