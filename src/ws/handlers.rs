//! WebSocket message dispatch
//!
//! Routes each client message to the lobby or gameplay handlers. Only
//! create, join and steal answer the sender directly; every other failure is
//! logged and dropped, and success shows up as a room broadcast.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

use super::{lobby, play, Connection};

/// Handle a client message and return the optional direct reply
pub async fn handle_message(
    msg: ClientMessage,
    conn: &mut Connection,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::CreateLobby { name } => lobby::handle_create(state, conn, name).await,
        ClientMessage::JoinLobby { lobby_id, name } => {
            lobby::handle_join(state, conn, lobby_id, name).await
        }
        ClientMessage::LeaveLobby { lobby_id } => lobby::handle_leave(state, conn, lobby_id).await,

        ClientMessage::StartGame { lobby_id } => {
            let result = state.start_game(&lobby_id, &conn.player_id).await;
            dropped(conn, "start_game", result)
        }
        ClientMessage::Move { lobby_id, x, y } => {
            let result = state.move_player(&lobby_id, &conn.player_id, x, y).await;
            dropped(conn, "move", result)
        }
        ClientMessage::TaskCompleted { lobby_id, task_id } => {
            let result = state
                .complete_task(&lobby_id, &conn.player_id, &task_id)
                .await;
            dropped(conn, "task_completed", result)
        }
        ClientMessage::LockTask { lobby_id, task_id } => {
            let result = state
                .abandon_task(&lobby_id, &conn.player_id, &task_id)
                .await;
            dropped(conn, "lock_task", result)
        }
        ClientMessage::StealClue {
            lobby_id,
            target_player_id,
        } => play::handle_steal(state, conn, lobby_id, target_player_id).await,

        ClientMessage::StartVoting { lobby_id } => {
            let result = state.start_voting(&lobby_id, &conn.player_id).await;
            dropped(conn, "start_voting", result)
        }
        ClientMessage::Vote {
            lobby_id,
            target_player_id,
        } => {
            let result = state
                .cast_vote(&lobby_id, &conn.player_id, &target_player_id)
                .await;
            dropped(conn, "vote", result)
        }
        ClientMessage::GuessWitness {
            lobby_id,
            target_player_id,
        } => {
            let result = state
                .guess_witness(&lobby_id, &conn.player_id, &target_player_id)
                .await;
            dropped(conn, "guess_witness", result)
        }
    }
}

/// Silent-failure policy for everything without a direct reply
fn dropped<E: std::fmt::Display>(
    conn: &Connection,
    action: &str,
    result: Result<(), E>,
) -> Option<ServerMessage> {
    if let Err(e) = result {
        tracing::debug!("Ignoring {} from {}: {}", action, conn.player_id, e);
    }
    None
}
