use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use postbox_core::rate_limit::FixedWindowLimiter;
use postbox_storage::S3ObjectStore;
use postbox_sync::{HttpContentStore, SyncScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postbox_api::config::ServerConfig;
use postbox_api::notifications::{EmailConfig, Mailer};
use postbox_api::router::build_app_router;
use postbox_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "postbox_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = postbox_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    postbox_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    postbox_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Rate limiter ---
    let rate_limiter = Arc::new(FixedWindowLimiter::new());

    // --- Object store ---
    let object_store = match &config.storage {
        Some(storage) => {
            let store = S3ObjectStore::new(storage.bucket.clone()).await;
            tracing::info!(bucket = %storage.bucket, "Object store configured");
            Some(Arc::new(store) as Arc<dyn postbox_storage::ObjectStore>)
        }
        None => {
            tracing::warn!("UPLOADS_BUCKET not set, upload URLs disabled");
            None
        }
    };

    // --- Content store ---
    let content_store = match &config.content_store {
        Some(cs) => {
            let client = HttpContentStore::new(cs.base_url.clone(), cs.token.clone())
                .expect("Failed to build content-store client");
            tracing::info!(base_url = %cs.base_url, "Content store configured");
            Some(Arc::new(client) as Arc<dyn postbox_sync::ContentStore>)
        }
        None => {
            tracing::warn!("CONTENT_STORE_URL not set, external sync disabled");
            None
        }
    };

    // --- Mailer ---
    let mailer = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(host = %email_config.smtp_host, "SMTP mailer configured");
            Some(Arc::new(Mailer::new(email_config)))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, email notifications disabled");
            None
        }
    };

    // --- Sync scheduler ---
    let sync_cancel = tokio_util::sync::CancellationToken::new();
    let sync_handle = content_store.clone().map(|store| {
        let scheduler = SyncScheduler::new(pool.clone(), store);
        let cancel = sync_cancel.clone();
        tokio::spawn(async move {
            scheduler.run(cancel).await;
        })
    });
    if sync_handle.is_some() {
        tracing::info!("Sync scheduler started");
    }

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        rate_limiter,
        object_store,
        content_store,
        mailer,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sync_cancel.cancel();
    if let Some(handle) = sync_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Sync scheduler stopped");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
