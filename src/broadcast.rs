use crate::protocol::{clue_views, LobbyView, ServerMessage};
use crate::state::AppState;
use crate::types::{GameTask, Lobby, LobbyCode, PlayerId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Capacity of each room channel. Receivers that fall further behind skip
/// ahead, which only ever costs stale positions or superseded snapshots.
pub const ROOM_CHANNEL_CAPACITY: usize = 256;

/// Something that happened in a lobby, fanned out to every member's socket.
///
/// Snapshots carry the full lobby; each connection renders its own redacted
/// view before sending.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    LobbyUpdate(Arc<Lobby>),
    GameStarted(Arc<Lobby>),
    PlayerMoved { id: PlayerId, x: f32, y: f32 },
    TaskUpdate(Vec<GameTask>),
    ClueFound(Arc<Lobby>),
}

impl RoomEvent {
    /// The message this event becomes for `viewer`, if any
    pub fn render_for(&self, viewer: &str) -> Option<ServerMessage> {
        match self {
            RoomEvent::LobbyUpdate(lobby) => Some(ServerMessage::LobbyUpdate {
                lobby: LobbyView::for_viewer(lobby, viewer),
            }),
            RoomEvent::GameStarted(lobby) => Some(ServerMessage::GameStarted {
                lobby: LobbyView::for_viewer(lobby, viewer),
            }),
            RoomEvent::PlayerMoved { id, .. } if id == viewer => None,
            RoomEvent::PlayerMoved { id, x, y } => Some(ServerMessage::PlayerMoved {
                id: id.clone(),
                x: *x,
                y: *y,
            }),
            RoomEvent::TaskUpdate(tasks) => Some(ServerMessage::TaskUpdate {
                tasks: tasks.clone(),
            }),
            RoomEvent::ClueFound(lobby) => Some(ServerMessage::ClueFound {
                clues: clue_views(lobby, viewer),
            }),
        }
    }
}

/// Spawn the one-shot timer that moves a game from `playing` to
/// `discussion` once the task phase has run out.
///
/// The timer holds no lock while sleeping. When it wakes it only acts if the
/// lobby still exists and is still in the game that scheduled it.
pub fn spawn_task_phase_timer(
    state: AppState,
    code: LobbyCode,
    started_at: DateTime<Utc>,
    after: Duration,
) {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;

        match state.end_task_phase(&code, started_at).await {
            Ok(()) => tracing::info!("Lobby {}: task phase over, discussion started", code),
            Err(e) => tracing::debug!("Lobby {}: task phase timer skipped: {}", code, e),
        }
    });
}
