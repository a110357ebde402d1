//! Lobby membership: create, join, leave

use super::Connection;
use crate::protocol::ServerMessage;
use crate::state::{AppState, Membership};
use crate::types::LobbyCode;
use std::sync::Arc;

/// Leave whatever lobby the connection is in before entering another
async fn leave_current(state: &Arc<AppState>, conn: &mut Connection) {
    if let Some(code) = conn.exit() {
        if let Err(e) = state.leave_lobby(&code, &conn.player_id).await {
            tracing::debug!("Leaving {} for {}: {}", code, conn.player_id, e);
        }
    }
}

pub async fn handle_create(
    state: &Arc<AppState>,
    conn: &mut Connection,
    name: String,
) -> Option<ServerMessage> {
    leave_current(state, conn).await;

    let Membership { code, room } = state.create_lobby(&conn.player_id, &name).await;
    conn.enter(code.clone(), room);

    Some(ServerMessage::LobbyJoined {
        lobby_id: code,
        player_id: conn.player_id.clone(),
    })
}

pub async fn handle_join(
    state: &Arc<AppState>,
    conn: &mut Connection,
    lobby_id: LobbyCode,
    name: String,
) -> Option<ServerMessage> {
    let lobby_id = lobby_id.trim().to_uppercase();

    // A refused join must not cost the caller their current seat
    match state.join_lobby(&lobby_id, &conn.player_id, &name).await {
        Ok(room) => {
            if conn.lobby.as_deref() != Some(lobby_id.as_str()) {
                leave_current(state, conn).await;
            }
            conn.enter(lobby_id.clone(), room);
            Some(ServerMessage::LobbyJoined {
                lobby_id,
                player_id: conn.player_id.clone(),
            })
        }
        Err(e) => {
            tracing::debug!("Join {} by {} refused: {}", lobby_id, conn.player_id, e);
            Some(e.into())
        }
    }
}

pub async fn handle_leave(
    state: &Arc<AppState>,
    conn: &mut Connection,
    lobby_id: LobbyCode,
) -> Option<ServerMessage> {
    if conn.lobby.as_deref() == Some(lobby_id.as_str()) {
        conn.exit();
    }
    match state.leave_lobby(&lobby_id, &conn.player_id).await {
        Ok(()) => Some(ServerMessage::LeftLobby),
        Err(e) => {
            tracing::debug!("Leave {} by {}: {}", lobby_id, conn.player_id, e);
            None
        }
    }
}
