//! Errors raised by the lobby state machine.
//!
//! Only a handful of these ever reach a client (the operations that answer
//! with a callback). Everything else is logged and dropped by the handlers.

use crate::types::LobbyStatus;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Lobby not found")]
    NotFound,

    #[error("Game already in progress")]
    AlreadyInProgress,

    #[error("Action not allowed while lobby is {actual:?}")]
    InvalidPhase { actual: LobbyStatus },

    #[error("Permission denied: {0}")]
    PermissionDenied(&'static str),

    #[error("Only the killer can do that")]
    NotKiller,

    #[error("Game is not active")]
    GameNotActive,

    #[error("You have already used this ability")]
    AlreadyUsed,

    #[error("Target player not found")]
    TargetNotFound,

    #[error("Player is not in this lobby")]
    PlayerNotFound,

    #[error("Task not found")]
    TaskNotFound,

    #[error("Need at least {required} players, have {actual}")]
    NotEnoughPlayers { required: usize, actual: usize },
}

impl GameError {
    /// Stable machine-readable code sent alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NotFound => "NOT_FOUND",
            GameError::AlreadyInProgress => "ALREADY_IN_PROGRESS",
            GameError::InvalidPhase { .. } => "INVALID_PHASE",
            GameError::PermissionDenied(_) => "PERMISSION_DENIED",
            GameError::NotKiller => "NOT_KILLER",
            GameError::GameNotActive => "GAME_NOT_ACTIVE",
            GameError::AlreadyUsed => "ALREADY_USED",
            GameError::TargetNotFound => "TARGET_NOT_FOUND",
            GameError::PlayerNotFound => "PLAYER_NOT_FOUND",
            GameError::TaskNotFound => "TASK_NOT_FOUND",
            GameError::NotEnoughPlayers { .. } => "NOT_ENOUGH_PLAYERS",
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
