use super::AppState;
use crate::broadcast::RoomEvent;
use crate::error::{GameError, GameResult};
use crate::game::{Departure, Verdict};
use crate::types::*;
use tokio::sync::broadcast;

/// A freshly created lobby and the creator's subscription to it
pub struct Membership {
    pub code: LobbyCode,
    pub room: broadcast::Receiver<RoomEvent>,
}

impl AppState {
    /// Open a new lobby with `player_id` as host
    pub async fn create_lobby(&self, player_id: &str, name: &str) -> Membership {
        let mut registry = self.registry.write().await;
        let code = registry.unused_code();
        let lobby = Lobby::new(code.clone(), player_id.to_string(), name, &self.config);
        let entry = registry.insert(lobby);
        let room = entry.room.subscribe();
        entry.publish_update();

        tracing::info!("Lobby {} created (total: {})", code, registry.len());
        Membership { code, room }
    }

    /// Add a player to a waiting lobby.
    ///
    /// The returned receiver is subscribed before the join is announced, so
    /// the newcomer sees their own arrival.
    pub async fn join_lobby(
        &self,
        code: &str,
        player_id: &str,
        name: &str,
    ) -> GameResult<broadcast::Receiver<RoomEvent>> {
        let config = self.config.clone();
        self.with_lobby(code, |entry| {
            entry.lobby.join(player_id, name, &config)?;
            let room = entry.room.subscribe();
            entry.publish_update();
            tracing::info!(
                "Player {} joined lobby {} ({} players)",
                player_id,
                code,
                entry.lobby.players.len()
            );
            Ok(room)
        })
        .await
    }

    pub async fn leave_lobby(&self, code: &str, player_id: &str) -> GameResult<()> {
        self.depart(code, player_id, false).await
    }

    /// Connection dropped. Only frees the seat while still in the lobby
    /// phase; a running game keeps the player's data.
    pub async fn disconnect(&self, code: &str, player_id: &str) -> GameResult<()> {
        self.depart(code, player_id, true).await
    }

    async fn depart(&self, code: &str, player_id: &str, dropped: bool) -> GameResult<()> {
        let mut registry = self.registry.write().await;
        let entry = registry.get_mut(code).ok_or(GameError::NotFound)?;
        let was_waiting = entry.lobby.status == LobbyStatus::Lobby;

        let departure = if dropped {
            entry.lobby.disconnect(player_id)?
        } else {
            entry.lobby.leave(player_id)?
        };
        let Departure { abandoned, verdict } = departure;

        if abandoned {
            registry.remove(code);
            tracing::info!("Lobby {} is empty, removed (total: {})", code, registry.len());
            return Ok(());
        }

        let resolved = verdict.is_some();
        if let Some(verdict) = verdict {
            log_verdict(code, verdict);
        }
        if !dropped || was_waiting || resolved {
            entry.publish_update();
        }
        tracing::info!(
            "Player {} {} lobby {}",
            player_id,
            if dropped { "disconnected from" } else { "left" },
            code
        );
        Ok(())
    }
}

pub(super) fn log_verdict(code: &str, verdict: Verdict) {
    match verdict {
        Verdict::KillerCaught => {
            tracing::info!("Lobby {}: killer accused, witness guessing begins", code)
        }
        Verdict::KillerEscapes => tracing::info!("Lobby {}: accusation failed, killer wins", code),
    }
}
