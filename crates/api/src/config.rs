//! Server configuration loaded from environment variables.

use std::time::Duration;

use postbox_core::rate_limit::RateLimitPolicy;

use crate::auth::jwt::JwtConfig;

/// Server configuration.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables. Optional subsystems
/// (object store, content store, SMTP) are `None` when unconfigured and the
/// features depending on them degrade with a log line.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret).
    pub jwt: JwtConfig,
    /// Per-endpoint-class rate-limit budgets.
    pub rate_limits: RateLimitSettings,
    /// Object-store bucket for staged uploads, if configured.
    pub storage: Option<StorageConfig>,
    /// External content-store endpoint, if configured.
    pub content_store: Option<ContentStoreConfig>,
}

/// Request budgets for the public endpoints, keyed by endpoint class.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    /// Submission creation.
    pub submissions: RateLimitPolicy,
    /// Sponsor application creation.
    pub sponsor_applications: RateLimitPolicy,
    /// Upload URL signing.
    pub uploads: RateLimitPolicy,
}

/// Object-store settings for staged uploads.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket holding staged uploads.
    pub bucket: String,
}

/// External content-store settings.
#[derive(Debug, Clone)]
pub struct ContentStoreConfig {
    /// Base URL of the content-store API.
    pub base_url: String,
    /// Bearer token for write access.
    pub token: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default       |
    /// |--------------------------|---------------|
    /// | `HOST`                   | `0.0.0.0`     |
    /// | `PORT`                   | `3000`        |
    /// | `CORS_ORIGINS`           | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`          |
    /// | `RATE_LIMIT_SUBMISSIONS_MAX` / `_WINDOW_SECS` | `5` / `600` |
    /// | `RATE_LIMIT_APPLICATIONS_MAX` / `_WINDOW_SECS` | `3` / `3600` |
    /// | `RATE_LIMIT_UPLOADS_MAX` / `_WINDOW_SECS` | `10` / `3600` |
    /// | `UPLOADS_BUCKET`         | unset -- uploads disabled |
    /// | `CONTENT_STORE_URL` / `CONTENT_STORE_TOKEN` | unset -- sync disabled |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let storage = std::env::var("UPLOADS_BUCKET")
            .ok()
            .map(|bucket| StorageConfig { bucket });

        let content_store = std::env::var("CONTENT_STORE_URL").ok().map(|base_url| {
            let token = std::env::var("CONTENT_STORE_TOKEN")
                .expect("CONTENT_STORE_TOKEN must be set when CONTENT_STORE_URL is");
            ContentStoreConfig { base_url, token }
        });

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            rate_limits: RateLimitSettings::from_env(),
            storage,
            content_store,
        }
    }
}

impl RateLimitSettings {
    /// Load rate-limit budgets from environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            submissions: policy_from_env("RATE_LIMIT_SUBMISSIONS", 5, 600),
            sponsor_applications: policy_from_env("RATE_LIMIT_APPLICATIONS", 3, 3600),
            uploads: policy_from_env("RATE_LIMIT_UPLOADS", 10, 3600),
        }
    }
}

fn policy_from_env(prefix: &str, default_max: u32, default_window_secs: u64) -> RateLimitPolicy {
    let max_requests: u32 = std::env::var(format!("{prefix}_MAX"))
        .unwrap_or_else(|_| default_max.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{prefix}_MAX must be a valid u32"));
    let window_secs: u64 = std::env::var(format!("{prefix}_WINDOW_SECS"))
        .unwrap_or_else(|_| default_window_secs.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{prefix}_WINDOW_SECS must be a valid u64"));
    RateLimitPolicy {
        max_requests,
        window: Duration::from_secs(window_secs),
    }
}
