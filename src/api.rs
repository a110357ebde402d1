//! HTTP routes next to the socket: health and lobby lookup.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;
use crate::types::{LobbyCode, LobbyStatus};
use crate::ws;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub lobbies: usize,
}

/// Public facts about a lobby, enough to decide whether to join it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbySummary {
    pub code: LobbyCode,
    pub status: LobbyStatus,
    pub players: usize,
}

/// Routes served with the shared state: `/ws` and `/api/*`
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/health", get(health))
        .route("/api/lobbies/{code}", get(lobby_summary))
        .with_state(state)
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        lobbies: state.lobby_count().await,
    })
}

/// GET /api/lobbies/{code}
pub async fn lobby_summary(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    let code = code.to_uppercase();
    match state.get_lobby(&code).await {
        Some(lobby) => Json(LobbySummary {
            code: lobby.code,
            status: lobby.status,
            players: lobby.players.len(),
        })
        .into_response(),
        None => (StatusCode::NOT_FOUND, "Lobby not found").into_response(),
    }
}
