//! Router construction and server startup.

use std::{io, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{health_check, list_connections, list_servers, reload_servers, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};
use crate::config::ServerConfig;

/// Build the hub's router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(websocket_handler))
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/connections", get(list_connections))
        .route("/api/servers", get(list_servers))
        .route("/admin/servers", post(reload_servers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until the future completes (never, unless
/// the listener fails). Used by `run` and by tests binding port 0.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> io::Result<()> {
    axum::serve(listener, router(state)).await
}

/// Run the hub with the given configuration until a shutdown signal arrives.
pub async fn run(config: ServerConfig) -> io::Result<()> {
    let state = Arc::new(AppState::new(&config.servers_path, config.queue_capacity));

    match state.directory.reload().await {
        Ok(outcome) => tracing::debug!("Initial directory load: {:?}", outcome),
        Err(e) => tracing::warn!(
            "Endpoint directory not loaded from {}: {}",
            state.directory.path().display(),
            e
        ),
    }

    let listener = TcpListener::bind(&config.addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}
