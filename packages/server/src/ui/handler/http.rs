//! HTTP API endpoint handlers.

use std::{collections::BTreeMap, sync::Arc};

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    infrastructure::directory::{DirectoryError, ReloadOutcome},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint listing the active connections (for testing purposes)
pub async fn list_connections(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let mut ids: Vec<String> = state
        .repository
        .ids()
        .await
        .into_iter()
        .map(|id| id.into_string())
        .collect();
    ids.sort();

    Json(serde_json::json!({"count": ids.len(), "connections": ids}))
}

/// Current endpoint directory (name → URL)
pub async fn list_servers(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, String>> {
    Json(state.directory.endpoints().await)
}

/// Reload the endpoint directory from its backing file
pub async fn reload_servers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    match state.directory.reload().await {
        Ok(ReloadOutcome::Applied(count)) => {
            Ok(Json(serde_json::json!({"status": "reloaded", "count": count})))
        }
        Ok(ReloadOutcome::Unchanged) => Ok(Json(serde_json::json!({"status": "unchanged"}))),
        Err(e) => {
            let status = match &e {
                DirectoryError::NotFound => StatusCode::NOT_FOUND,
                DirectoryError::Malformed(_) | DirectoryError::Invalid(_) => {
                    StatusCode::BAD_REQUEST
                }
                DirectoryError::Io(_) => {
                    tracing::error!("Error reading servers file: {}", e);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            Err((status, e.to_string()))
        }
    }
}
