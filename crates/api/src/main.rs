mod config;
mod error;
mod middleware;
mod routes;
mod state;

use std::sync::Arc;

use sitesync_core::auth::AdminCredentials;
use sitesync_core::cache::{FileLocalCache, LocalCache};
use sitesync_core::events::{EventBus, SyncEvent};
use sitesync_core::sync::{ContentSynchronizer, SyncPolicy};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience)
    let _ = dotenvy::dotenv();

    // Load configuration
    let config = config::AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    tracing::info!("Starting sitesync API server");

    let local: Arc<dyn LocalCache> = Arc::new(FileLocalCache::new(
        config.local_cache_dir.clone(),
        Some(config.local_cache_quota_bytes),
    ));
    let remote = state::remote_store(&config)
        .map_err(|e| anyhow::anyhow!("Failed to set up object storage: {e}"))?;
    if let (true, Some(store)) = (config.storage_configured(), &remote) {
        tracing::info!(backend = store.name(), "Object storage configured");
    } else {
        tracing::warn!("No object storage configured; publishing is disabled");
    }

    // Create event bus
    let event_bus = EventBus::new(config.event_bus_capacity);
    tokio::spawn(log_sync_events(event_bus.clone()));

    let sync = Arc::new(
        ContentSynchronizer::new(local.clone(), remote, event_bus).with_policy(SyncPolicy {
            publish_echo_buffer_ms: config.sync_buffer_ms,
        }),
    );
    let credentials = AdminCredentials::load(local, config.admin_password.as_deref())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load admin credentials: {e}"))?;
    let http = reqwest::Client::builder()
        .user_agent(concat!("sitesync/", env!("CARGO_PKG_VERSION")))
        .build()?;

    // Reconcile in the background; edits and publishes wait for it to finish.
    {
        let sync = sync.clone();
        tokio::spawn(async move {
            sync.initialize().await;
        });
    }

    // Build application state
    let state = state::AppState::new(config.clone(), sync, credentials, http);

    // Build router with middleware
    let app = routes::build_router(state)
        .layer(middleware::request_tracing::trace_layer())
        .layer(middleware::cors::cors_layer());

    // Start server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Log every sync event until the bus closes.
async fn log_sync_events(bus: EventBus) {
    let mut rx = bus.subscribe();
    loop {
        match rx.recv().await {
            Ok(SyncEvent::Initialized(e)) => tracing::info!(
                source = %e.source,
                updated_at = e.updated_at,
                unsaved = e.has_unsaved_changes,
                "sync initialized"
            ),
            Ok(SyncEvent::ContentChanged(e)) => {
                tracing::debug!(mutation = %e.mutation, updated_at = e.updated_at, "content changed")
            }
            Ok(SyncEvent::Published(e)) => {
                tracing::info!(version = %e.version, updated_at = e.updated_at, "published")
            }
            Ok(SyncEvent::PublishFailed(e)) => {
                tracing::error!(updated_at = e.updated_at, message = %e.message, "publish failed")
            }
            Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "event logger lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("Received Ctrl+C, shutting down..."); }
        _ = terminate => { tracing::info!("Received SIGTERM, shutting down..."); }
    }
}
