mod game;
mod registry;
mod session;
mod vote;

pub use registry::{LobbyEntry, SessionRegistry};
pub use session::Membership;

use crate::broadcast::RoomEvent;
use crate::error::{GameError, GameResult};
use crate::types::*;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Shared application state.
///
/// Every operation takes the registry write lock once, runs the synchronous
/// lobby transition and publishes the resulting events before releasing it,
/// so no two handlers ever interleave on the same lobby.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RwLock<SessionRegistry>>,
    pub config: Arc<GameConfig>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self {
            registry: Arc::new(RwLock::new(SessionRegistry::new())),
            config: Arc::new(config),
        }
    }

    /// Listen to a lobby's room events
    pub async fn subscribe(&self, code: &str) -> Option<broadcast::Receiver<RoomEvent>> {
        self.registry.read().await.subscribe(code)
    }

    /// Snapshot of a lobby
    pub async fn get_lobby(&self, code: &str) -> Option<Lobby> {
        self.registry
            .read()
            .await
            .get(code)
            .map(|entry| entry.lobby.clone())
    }

    pub async fn lobby_count(&self) -> usize {
        self.registry.read().await.len()
    }

    /// Run `f` against a lobby under the write lock
    async fn with_lobby<T>(
        &self,
        code: &str,
        f: impl FnOnce(&mut LobbyEntry) -> GameResult<T>,
    ) -> GameResult<T> {
        let mut registry = self.registry.write().await;
        let entry = registry.get_mut(code).ok_or(GameError::NotFound)?;
        f(entry)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
