use neo_backend::config::{BackendConfig, DEFAULT_CONFIG_PATH};
use neo_backend::http::{AppState, create_router};
use neo_backend::module::feed::{MemoryCache, NasaFeedClient, NeoService};

use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = BackendConfig::load(DEFAULT_CONFIG_PATH)?;

    // Initialize logging
    let _logging_guard = neo_backend::logging::init_logging(&config.log_dir, "neo-backend", &config.log_level)?;

    tracing::info!("NEO backend starting...");
    tracing::debug!("Loaded configuration: {:?}", config);

    let source = Arc::new(NasaFeedClient::new(&config.upstream)?);
    let cache = Arc::new(MemoryCache::new());
    let purge_task = cache.clone().start_purge_task(config.cache.purge_interval());

    let service = NeoService::new(source, cache, config.cache.ttl());
    let app = create_router(AppState::new(Arc::new(service)), config.cors_origin.as_deref());

    let listener = TcpListener::bind(config.server_address()).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge_task.abort();
    tracing::info!("NEO backend stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
