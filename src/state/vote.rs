use super::session::log_verdict;
use super::AppState;
use crate::error::GameResult;
use crate::types::Winner;

impl AppState {
    pub async fn start_voting(&self, code: &str, caller: &str) -> GameResult<()> {
        self.with_lobby(code, |entry| {
            entry.lobby.start_voting(caller)?;
            entry.publish_update();
            tracing::info!("Lobby {}: voting opened", code);
            Ok(())
        })
        .await
    }

    /// Record a vote; the last one resolves the accusation in the same update
    pub async fn cast_vote(&self, code: &str, caller: &str, target: &str) -> GameResult<()> {
        self.with_lobby(code, |entry| {
            let verdict = entry.lobby.cast_vote(caller, target)?;
            entry.publish_update();
            if let Some(verdict) = verdict {
                log_verdict(code, verdict);
            }
            Ok(())
        })
        .await
    }

    pub async fn guess_witness(&self, code: &str, caller: &str, target: &str) -> GameResult<()> {
        self.with_lobby(code, |entry| {
            let winner = entry.lobby.guess_witness(caller, target)?;
            entry.publish_update();
            match winner {
                Winner::Killer => tracing::info!("Lobby {}: witness found, killer wins", code),
                Winner::Investigators => {
                    tracing::info!("Lobby {}: witness guess missed, investigators win", code)
                }
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::RoomEvent;
    use crate::error::GameError;
    use crate::types::*;

    async fn in_voting() -> (AppState, LobbyCode) {
        let state = AppState::new();
        let code = state.create_lobby("p0", "A").await.code;
        state.join_lobby(&code, "p1", "B").await.unwrap();
        state.join_lobby(&code, "p2", "C").await.unwrap();
        state.start_game(&code, "p0").await.unwrap();
        let started_at = state.get_lobby(&code).await.unwrap().start_time.unwrap();
        state.end_task_phase(&code, started_at).await.unwrap();
        state.start_voting(&code, "p0").await.unwrap();
        (state, code)
    }

    fn killer_and_innocents(lobby: &Lobby) -> (PlayerId, Vec<PlayerId>) {
        let killer = lobby.killer().unwrap().id.clone();
        let innocents = lobby
            .players
            .iter()
            .filter(|p| !p.is_killer())
            .map(|p| p.id.clone())
            .collect();
        (killer, innocents)
    }

    #[tokio::test]
    async fn test_only_host_opens_voting() {
        let state = AppState::new();
        let code = state.create_lobby("p0", "A").await.code;
        state.join_lobby(&code, "p1", "B").await.unwrap();
        state.join_lobby(&code, "p2", "C").await.unwrap();
        state.start_game(&code, "p0").await.unwrap();
        let started_at = state.get_lobby(&code).await.unwrap().start_time.unwrap();
        state.end_task_phase(&code, started_at).await.unwrap();

        assert!(matches!(
            state.start_voting(&code, "p2").await,
            Err(GameError::PermissionDenied(_))
        ));
        state.start_voting(&code, "p0").await.unwrap();
    }

    #[tokio::test]
    async fn test_unanimous_accusation_then_witness_guess() {
        let (state, code) = in_voting().await;
        let lobby = state.get_lobby(&code).await.unwrap();
        let (killer, innocents) = killer_and_innocents(&lobby);
        let witness = lobby
            .players
            .iter()
            .find(|p| p.role == Some(Role::Witness))
            .unwrap()
            .id
            .clone();

        let mut rx = state.subscribe(&code).await.unwrap();
        for voter in lobby.players.iter().map(|p| p.id.clone()) {
            state.cast_vote(&code, &voter, &killer).await.unwrap();
        }
        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            last = Some(event);
        }
        match last {
            Some(RoomEvent::LobbyUpdate(lobby)) => {
                assert_eq!(lobby.status, LobbyStatus::WitnessGuessing)
            }
            other => panic!("unexpected {other:?}"),
        }

        assert_eq!(
            state.guess_witness(&code, &innocents[0], &witness).await,
            Err(GameError::NotKiller)
        );
        state.guess_witness(&code, &killer, &witness).await.unwrap();
        let lobby = state.get_lobby(&code).await.unwrap();
        assert_eq!(lobby.status, LobbyStatus::GameOver);
        assert_eq!(lobby.winner, Some(Winner::Killer));
    }

    #[tokio::test]
    async fn test_votes_are_final() {
        let (state, code) = in_voting().await;
        state.cast_vote(&code, "p0", "p1").await.unwrap();
        assert_eq!(
            state.cast_vote(&code, "p0", "p2").await,
            Err(GameError::AlreadyUsed)
        );
        assert_eq!(
            state.cast_vote(&code, "p1", "nobody").await,
            Err(GameError::TargetNotFound)
        );
    }
}
