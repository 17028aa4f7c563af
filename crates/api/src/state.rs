use std::sync::Arc;

use postbox_storage::ObjectStore;
use postbox_sync::ContentStore;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::RateLimiter;
use crate::notifications::Mailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). Unconfigured
/// subsystems are `None`; the handlers that need them degrade explicitly.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: postbox_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Rate limiter gating the public mutating endpoints.
    pub rate_limiter: Arc<dyn RateLimiter>,
    /// Object store for presigned upload/download URLs, if configured.
    pub object_store: Option<Arc<dyn ObjectStore>>,
    /// External content-store client, if configured.
    pub content_store: Option<Arc<dyn ContentStore>>,
    /// Outbound email dispatcher, if SMTP is configured.
    pub mailer: Option<Arc<Mailer>>,
}
