use crate::error::GameError;
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateLobby {
        name: String,
    },
    JoinLobby {
        lobby_id: LobbyCode,
        name: String,
    },
    LeaveLobby {
        lobby_id: LobbyCode,
    },
    // Host-only
    StartGame {
        lobby_id: LobbyCode,
    },
    Move {
        lobby_id: LobbyCode,
        x: f32,
        y: f32,
    },
    /// Mini-game finished successfully
    TaskCompleted {
        lobby_id: LobbyCode,
        task_id: TaskId,
    },
    /// Mini-game exited without finishing
    LockTask {
        lobby_id: LobbyCode,
        task_id: TaskId,
    },
    // Killer-only
    StealClue {
        lobby_id: LobbyCode,
        target_player_id: PlayerId,
    },
    Vote {
        lobby_id: LobbyCode,
        target_player_id: PlayerId,
    },
    // Killer-only
    GuessWitness {
        lobby_id: LobbyCode,
        target_player_id: PlayerId,
    },
    // Host-only
    StartVoting {
        lobby_id: LobbyCode,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        player_id: PlayerId,
    },
    /// Reply to create_lobby / join_lobby
    LobbyJoined {
        lobby_id: LobbyCode,
        player_id: PlayerId,
    },
    LobbyUpdate {
        lobby: LobbyView,
    },
    GameStarted {
        lobby: LobbyView,
    },
    LeftLobby,
    /// Best-effort position delta, never sent back to the mover
    PlayerMoved {
        id: PlayerId,
        x: f32,
        y: f32,
    },
    TaskUpdate {
        tasks: Vec<GameTask>,
    },
    ClueFound {
        clues: Vec<ClueView>,
    },
    /// Reply to steal_clue
    StealResult {
        message: String,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl From<GameError> for ServerMessage {
    fn from(e: GameError) -> Self {
        ServerMessage::Error {
            code: e.code().to_string(),
            msg: e.to_string(),
        }
    }
}

/// A player as seen by one particular recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub color: String,
    pub x: f32,
    pub y: f32,
    pub connected: bool,
    pub has_voted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voted_for: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_stolen_clue: Option<bool>,
}

/// Clue as seen by one recipient (`is_tampered` only for the killer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClueView {
    pub id: ClueId,
    pub text: String,
    pub found_by: PlayerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_tampered: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyView {
    pub lobby_id: LobbyCode,
    pub status: LobbyStatus,
    pub players: Vec<PlayerView>,
    pub clues: Vec<ClueView>,
    pub tasks: Vec<GameTask>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub winner: Option<Winner>,
}

fn votes_public(status: LobbyStatus) -> bool {
    matches!(
        status,
        LobbyStatus::WitnessGuessing | LobbyStatus::GameOver
    )
}

fn sees_tampering(lobby: &Lobby, viewer: &str) -> bool {
    lobby.status == LobbyStatus::GameOver || lobby.player(viewer).is_some_and(Player::is_killer)
}

impl PlayerView {
    pub fn new(player: &Player, viewer: &str, status: LobbyStatus) -> Self {
        let private = player.id == viewer || status == LobbyStatus::GameOver;
        let show_vote = player.id == viewer || votes_public(status);
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            is_host: player.is_host,
            color: player.color.clone(),
            x: player.x,
            y: player.y,
            connected: player.connected,
            has_voted: player.voted_for.is_some(),
            voted_for: player.voted_for.clone().filter(|_| show_vote),
            role: player.role.filter(|_| private),
            attributes: player.attributes.clone().filter(|_| private),
            has_stolen_clue: Some(player.has_stolen_clue).filter(|_| private),
        }
    }
}

pub fn clue_views(lobby: &Lobby, viewer: &str) -> Vec<ClueView> {
    let reveal = sees_tampering(lobby, viewer);
    lobby
        .clues
        .iter()
        .map(|c| ClueView {
            id: c.id.clone(),
            text: c.text.clone(),
            found_by: c.found_by.clone(),
            is_tampered: Some(c.is_tampered).filter(|_| reveal),
        })
        .collect()
}

impl LobbyView {
    /// Render the lobby for one recipient, hiding what they may not know
    pub fn for_viewer(lobby: &Lobby, viewer: &str) -> Self {
        Self {
            lobby_id: lobby.code.clone(),
            status: lobby.status,
            players: lobby
                .players
                .iter()
                .map(|p| PlayerView::new(p, viewer, lobby.status))
                .collect(),
            clues: clue_views(lobby, viewer),
            tasks: lobby.tasks.clone(),
            start_time: lobby.start_time,
            end_time: lobby.end_time,
            winner: lobby.winner,
        }
    }
}
