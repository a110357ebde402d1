use super::Connection;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::{LobbyCode, PlayerId};
use std::sync::Arc;

/// Killer's sabotage. The outcome goes to the killer alone.
pub async fn handle_steal(
    state: &Arc<AppState>,
    conn: &Connection,
    lobby_id: LobbyCode,
    target: PlayerId,
) -> Option<ServerMessage> {
    match state.steal_clue(&lobby_id, &conn.player_id, &target).await {
        Ok(message) => Some(ServerMessage::StealResult { message }),
        Err(e) => {
            tracing::debug!("Steal in {} by {} refused: {}", lobby_id, conn.player_id, e);
            Some(e.into())
        }
    }
}
