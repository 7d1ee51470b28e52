//! REST and event-stream endpoints using Axum

use crate::error::ApiError;
use crate::service::GraphService;
use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream, StreamExt};
use gav_core::config::ServerConfig;
use gav_core::{CoverageGraph, CoverageSummary};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// SSE event name carrying a full graph snapshot
pub const GRAPH_EVENT: &str = "graph";

/// SSE event sent every keep-alive interval, with an empty object as data
pub const PING_EVENT: &str = "ping";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GraphService>,
    pub keep_alive: Duration,
    /// Cancelled on shutdown so open event streams end
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(service: Arc<GraphService>, server_config: &ServerConfig) -> Self {
        Self {
            service,
            keep_alive: server_config.keep_alive(),
            shutdown: CancellationToken::new(),
        }
    }
}

/// Build the Axum router with all endpoints
pub fn build_router(state: AppState, server_config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/graph", get(graph_handler))
        .route("/api/summary", get(summary_handler))
        .route("/api/rebuild", post(rebuild_handler))
        .route("/api/events", get(events_handler))
        .fallback(not_found_handler);

    // Configure CORS based on allowed_origins
    let cors_layer = if server_config.allowed_origins.is_empty() {
        // CORS disabled
        CorsLayer::new()
    } else if server_config.allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let mut cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([axum::http::header::CONTENT_TYPE]);

        for origin in &server_config.allowed_origins {
            match HeaderValue::from_str(origin) {
                Ok(header_value) => cors = cors.allow_origin(header_value),
                Err(_) => warn!("Ignoring invalid CORS origin {origin:?}"),
            }
        }
        cors
    };

    router
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /
async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let graph = state.service.current().await;

    let health_status = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "dataDir": state.service.data_config().dir.display().to_string(),
        "summary": graph.summary,
    });

    (StatusCode::OK, Json(health_status))
}

/// GET /api/graph
async fn graph_handler(State(state): State<AppState>) -> Response {
    let graph = state.service.current().await;
    Json(&*graph).into_response()
}

/// GET /api/summary
async fn summary_handler(State(state): State<AppState>) -> Json<CoverageSummary> {
    Json(state.service.current().await.summary.clone())
}

/// POST /api/rebuild
async fn rebuild_handler(
    State(state): State<AppState>,
) -> Result<Json<CoverageSummary>, ApiError> {
    tracing::info!("Rebuild requested");
    let graph = state.service.rebuild().await?;
    Ok(Json(graph.summary.clone()))
}

async fn not_found_handler() -> ApiError {
    ApiError::NotFound("No such endpoint".to_string())
}

/// GET /api/events
///
/// Sends the current graph immediately, then every rebuilt graph, with a
/// `ping` event every keep-alive interval in between.
async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before reading the snapshot so no rebuild slips between them
    let rx = state.service.subscribe();
    let initial = state.service.current().await;

    let updates = stream::unfold(
        (rx, Arc::clone(&state.service)),
        |(mut rx, service)| async move {
            let graph = next_snapshot(&mut rx, &service).await?;
            Some((Ok(graph_event(&graph)), (rx, service)))
        },
    );

    let graphs = stream::once(async move { Ok(graph_event(&initial)) }).chain(updates);

    let period = state.keep_alive;
    let pings = stream::unfold(
        interval_at(Instant::now() + period, period),
        |mut ticker| async move {
            ticker.tick().await;
            Some((Ok(ping_event()), ticker))
        },
    );

    let stream = stream::select(graphs, pings).take_until(state.shutdown.cancelled_owned());

    Sse::new(stream)
}

/// Wait for the next graph, skipping straight to the newest after a lag
async fn next_snapshot(
    rx: &mut Receiver<Arc<CoverageGraph>>,
    service: &GraphService,
) -> Option<Arc<CoverageGraph>> {
    match rx.recv().await {
        Ok(graph) => Some(graph),
        Err(RecvError::Lagged(skipped)) => {
            debug!("Event stream lagged by {skipped} graphs, sending latest");
            *rx = rx.resubscribe();
            Some(service.current().await)
        }
        Err(RecvError::Closed) => None,
    }
}

fn ping_event() -> Event {
    Event::default().event(PING_EVENT).data("{}")
}

fn graph_event(graph: &CoverageGraph) -> Event {
    match serde_json::to_string(graph) {
        Ok(data) => Event::default().event(GRAPH_EVENT).data(data),
        Err(e) => {
            warn!("Failed to serialize graph event: {e}");
            Event::default().comment("serialization failed")
        }
    }
}
