use super::AppState;
use crate::broadcast::{spawn_task_phase_timer, RoomEvent};
use crate::error::GameResult;
use crate::game::Sabotage;
use chrono::{DateTime, Utc};
use std::sync::Arc;

impl AppState {
    /// Start the game and schedule the end of its task phase
    pub async fn start_game(&self, code: &str, caller: &str) -> GameResult<()> {
        let config = self.config.clone();
        let started_at = self
            .with_lobby(code, |entry| {
                let started_at =
                    entry
                        .lobby
                        .start_game(caller, &config, Utc::now(), &mut rand::rng())?;
                entry.publish(RoomEvent::GameStarted(Arc::new(entry.lobby.clone())));
                Ok(started_at)
            })
            .await?;

        tracing::info!(
            "Lobby {} started, task phase ends in {:?}",
            code,
            config.task_phase
        );
        spawn_task_phase_timer(self.clone(), code.to_string(), started_at, config.task_phase);
        Ok(())
    }

    pub async fn end_task_phase(&self, code: &str, started_at: DateTime<Utc>) -> GameResult<()> {
        self.with_lobby(code, |entry| {
            entry.lobby.end_task_phase(started_at)?;
            entry.publish_update();
            Ok(())
        })
        .await
    }

    pub async fn move_player(&self, code: &str, caller: &str, x: f32, y: f32) -> GameResult<()> {
        self.with_lobby(code, |entry| {
            entry.lobby.move_player(caller, x, y)?;
            entry.publish(RoomEvent::PlayerMoved {
                id: caller.to_string(),
                x,
                y,
            });
            Ok(())
        })
        .await
    }

    pub async fn complete_task(&self, code: &str, caller: &str, task_id: &str) -> GameResult<()> {
        self.with_lobby(code, |entry| {
            if !entry
                .lobby
                .complete_task(caller, task_id, &mut rand::rng())?
            {
                return Ok(());
            }
            entry.publish(RoomEvent::TaskUpdate(entry.lobby.tasks.clone()));
            entry.publish(RoomEvent::ClueFound(Arc::new(entry.lobby.clone())));
            tracing::debug!("Lobby {}: {} completed task {}", code, caller, task_id);
            Ok(())
        })
        .await
    }

    pub async fn abandon_task(&self, code: &str, caller: &str, task_id: &str) -> GameResult<()> {
        self.with_lobby(code, |entry| {
            if entry.lobby.abandon_task(caller, task_id)? {
                entry.publish(RoomEvent::TaskUpdate(entry.lobby.tasks.clone()));
            }
            Ok(())
        })
        .await
    }

    /// The killer's one-time sabotage. Returns the feedback line for the killer.
    pub async fn steal_clue(&self, code: &str, caller: &str, target: &str) -> GameResult<String> {
        self.with_lobby(code, |entry| {
            let report = entry.lobby.steal_clue(caller, target, &mut rand::rng())?;
            entry.publish(RoomEvent::ClueFound(Arc::new(entry.lobby.clone())));
            entry.publish_update();

            match &report.sabotage {
                Sabotage::Tampered(clue) => {
                    tracing::info!("Lobby {}: clue {} tampered", code, clue)
                }
                Sabotage::Planted(clue) => tracing::info!("Lobby {}: clue {} planted", code, clue),
            }
            Ok(report.message)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::types::*;
    use std::time::Duration;

    async fn started(task_phase: Duration) -> (AppState, LobbyCode) {
        let state = AppState::with_config(GameConfig {
            task_phase,
            ..GameConfig::default()
        });
        let code = state.create_lobby("p0", "A").await.code;
        state.join_lobby(&code, "p1", "B").await.unwrap();
        state.join_lobby(&code, "p2", "C").await.unwrap();
        state.start_game(&code, "p0").await.unwrap();
        (state, code)
    }

    #[tokio::test]
    async fn test_start_requires_host_and_players() {
        let state = AppState::new();
        let code = state.create_lobby("p0", "A").await.code;
        state.join_lobby(&code, "p1", "B").await.unwrap();

        assert_eq!(
            state.start_game(&code, "p0").await,
            Err(GameError::NotEnoughPlayers {
                required: MIN_PLAYERS,
                actual: 2
            })
        );
        state.join_lobby(&code, "p2", "C").await.unwrap();
        assert!(matches!(
            state.start_game(&code, "p1").await,
            Err(GameError::PermissionDenied(_))
        ));
        state.start_game(&code, "p0").await.unwrap();

        let lobby = state.get_lobby(&code).await.unwrap();
        assert_eq!(lobby.status, LobbyStatus::Playing);
        assert_eq!(lobby.tasks.len(), TASK_COUNT);
    }

    #[tokio::test]
    async fn test_timer_moves_to_discussion() {
        let (state, code) = started(Duration::from_millis(20)).await;
        let mut rx = state.subscribe(&code).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            RoomEvent::LobbyUpdate(lobby) => assert_eq!(lobby.status, LobbyStatus::Discussion),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stale_timer_is_ignored() {
        let (state, code) = started(Duration::from_secs(60)).await;
        assert!(state.end_task_phase(&code, Utc::now()).await.is_err());

        let started_at = state.get_lobby(&code).await.unwrap().start_time.unwrap();
        state.end_task_phase(&code, started_at).await.unwrap();
        assert_eq!(
            state.end_task_phase(&code, started_at).await,
            Err(GameError::InvalidPhase {
                actual: LobbyStatus::Discussion
            })
        );
    }

    #[tokio::test]
    async fn test_complete_task_publishes_tasks_and_clues() {
        let (state, code) = started(Duration::from_secs(60)).await;
        let mut rx = state.subscribe(&code).await.unwrap();
        let task_id = state.get_lobby(&code).await.unwrap().tasks[0].id.clone();

        state.complete_task(&code, "p1", &task_id).await.unwrap();
        assert!(matches!(rx.recv().await, Ok(RoomEvent::TaskUpdate(_))));
        match rx.recv().await.unwrap() {
            RoomEvent::ClueFound(lobby) => assert_eq!(lobby.clues.len(), 1),
            other => panic!("unexpected {other:?}"),
        }

        // Second completion is a quiet no-op
        state.complete_task(&code, "p2", &task_id).await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_steal_returns_message_once() {
        let (state, code) = started(Duration::from_secs(60)).await;
        let lobby = state.get_lobby(&code).await.unwrap();
        let killer = lobby.killer().unwrap().id.clone();
        let target = lobby
            .players
            .iter()
            .find(|p| !p.is_killer())
            .unwrap()
            .id
            .clone();

        let message = state.steal_clue(&code, &killer, &target).await.unwrap();
        assert!(message.starts_with("You planted a false clue on"));
        assert_eq!(
            state.steal_clue(&code, &killer, &target).await,
            Err(GameError::AlreadyUsed)
        );
    }
}
