use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Opaque ID types for type safety
pub type LobbyCode = String;
pub type PlayerId = String;
pub type TaskId = String;
pub type ClueId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LobbyStatus {
    Lobby,
    Playing,
    Discussion,
    Voting,
    WitnessGuessing,
    GameOver,
}

/// Hidden role dealt at game start
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Killer,
    Witness,
    Forensics,
    Investigator,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Killer,
    Investigators,
}

/// Private physical description of a player.
///
/// Seven categorical traits plus height. Height is rolled in inches and
/// rendered as a feet/inches string for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attributes {
    pub hair_color: String,
    pub hair_style: String,
    pub eye_color: String,
    pub outfit: String,
    pub accessory: String,
    pub build: String,
    pub footwear: String,
    pub height_inches: u8,
    pub height: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Option<Role>,
    pub attributes: Option<Attributes>,
    pub is_host: bool,
    pub voted_for: Option<PlayerId>,
    pub x: f32,
    pub y: f32,
    pub color: String,
    pub has_stolen_clue: bool,
    /// False once the player's connection dropped after the lobby phase
    pub connected: bool,
}

impl Player {
    pub fn is_killer(&self) -> bool {
        self.role == Some(Role::Killer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clue {
    pub id: ClueId,
    pub text: String,
    pub is_tampered: bool,
    /// Player the clue is attributed to, not necessarily who produced it
    pub found_by: PlayerId,
}

/// The four client-side puzzles a task can open
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MiniGame {
    WordFusion,
    WordGuess,
    SlidingBlock,
    SurveyGuess,
}

impl MiniGame {
    pub const ALL: [MiniGame; 4] = [
        MiniGame::WordFusion,
        MiniGame::WordGuess,
        MiniGame::SlidingBlock,
        MiniGame::SurveyGuess,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameTask {
    pub id: TaskId,
    pub x: f32,
    pub y: f32,
    pub kind: MiniGame,
    pub completed: bool,
    /// Players who walked away from this task and may not reopen it
    pub locked_for: BTreeSet<PlayerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lobby {
    pub code: LobbyCode,
    pub status: LobbyStatus,
    pub players: Vec<Player>,
    pub clues: Vec<Clue>,
    pub tasks: Vec<GameTask>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub winner: Option<Winner>,
}

/// Playable area and phase timing for a lobby
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// How long `playing` lasts before discussion starts on its own
    pub task_phase: Duration,
    pub map_width: f32,
    pub map_height: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            task_phase: Duration::from_secs(180),
            map_width: 2000.0,
            map_height: 1500.0,
        }
    }
}

impl GameConfig {
    pub fn spawn_point(&self) -> (f32, f32) {
        (self.map_width / 2.0, self.map_height / 2.0)
    }
}

/// Fixed game rules
pub const MIN_PLAYERS: usize = 3;
pub const FORENSICS_MIN_PLAYERS: usize = 4;
pub const TASK_COUNT: usize = 15;
pub const MAX_NAME_CHARS: usize = 24;

pub const PLAYER_COLORS: &[&str] = &[
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
    "#bcf60c", "#fabebe",
];
