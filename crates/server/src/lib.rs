//! HTTP server for the Gateway API coverage graph
//!
//! This crate serves the current coverage graph over REST and streams a
//! fresh snapshot to every connected client whenever the resource directory
//! changes on disk.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod error;
mod routes;
mod service;

pub use error::ApiError;
pub use routes::{build_router, AppState, GRAPH_EVENT, PING_EVENT};
pub use service::GraphService;

// Re-export error types from core
pub use gav_core::error::{Error, Result};

use gav_core::config::Config;
use gav_watcher::{FileWatcher, WatcherConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Run the coverage server with the given configuration.
///
/// It:
/// 1. Builds the initial graph from the data directory
/// 2. Starts the filesystem watcher that triggers rebuilds
/// 3. Serves the REST and event-stream endpoints
/// 4. Handles graceful shutdown on Ctrl+C
pub async fn run_server(config: Config) -> Result<()> {
    config.validate()?;

    let service = Arc::new(GraphService::new(
        config.data.clone(),
        config.server.broadcast_capacity,
    ));

    if service.rebuild().await.is_err() {
        warn!("Serving an empty graph until the next successful rebuild");
    }

    let mut watcher = if config.watcher.enabled {
        start_watcher(&config, Arc::clone(&service)).await
    } else {
        info!("File watching disabled");
        None
    };

    let state = AppState::new(service, &config.server);
    let shutdown = state.shutdown.clone();
    let app = build_router(state, &config.server);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Coverage server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .map_err(|e| Error::with_context("Server error", e))?;

    if let Some(watcher) = watcher.as_mut() {
        info!("Stopping file watcher...");
        if let Err(e) = watcher.stop().await {
            error!("Error stopping file watcher: {e}");
        }
    }

    info!("Coverage server shut down successfully");
    Ok(())
}

/// Watch the data directory and rebuild the graph after each change
///
/// Returns `None` when the directory cannot be watched; the server keeps
/// serving the graph it has.
async fn start_watcher(config: &Config, service: Arc<GraphService>) -> Option<FileWatcher> {
    let watcher_config = WatcherConfig::for_data_dir(&config.watcher, &config.data);

    let mut watcher = match FileWatcher::new(watcher_config) {
        Ok(watcher) => watcher,
        Err(e) => {
            error!("Failed to create file watcher: {e}");
            return None;
        }
    };

    let mut events = match watcher.watch(&config.data.dir).await {
        Ok(events) => events,
        Err(e) => {
            warn!("Live reload disabled: {e}");
            return None;
        }
    };

    tokio::spawn(async move {
        while let Some(change) = events.recv().await {
            info!("Resource file {change}, rebuilding graph");
            // Changes already queued are covered by this rebuild
            while let Ok(queued) = events.try_recv() {
                debug!("Coalescing {queued}");
            }
            // Failures are logged by the service
            let _ = service.rebuild().await;
        }
        debug!("Watcher task finished");
    });

    Some(watcher)
}

async fn shutdown_signal(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        Err(e) => {
            error!("Error setting up signal handler: {e}");
            std::future::pending::<()>().await;
        }
    }
    shutdown.cancel();
}
