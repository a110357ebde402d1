//! The killer's one-shot sabotage.

use super::clues;
use crate::error::{GameError, GameResult};
use crate::types::{Clue, ClueId, Lobby, LobbyStatus};
use rand::seq::IndexedRandom;
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sabotage {
    /// An existing truthful clue of the target was falsified
    Tampered(ClueId),
    /// A fabricated clue was planted on the target
    Planted(ClueId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StealReport {
    pub sabotage: Sabotage,
    pub message: String,
}

pub fn steal<R: Rng + ?Sized>(
    lobby: &mut Lobby,
    killer_id: &str,
    target_id: &str,
    rng: &mut R,
) -> GameResult<StealReport> {
    if lobby.status != LobbyStatus::Playing {
        return Err(GameError::GameNotActive);
    }
    let killer = lobby
        .players
        .iter()
        .find(|p| p.id == killer_id)
        .filter(|p| p.is_killer())
        .ok_or(GameError::NotKiller)?;
    if killer.has_stolen_clue {
        return Err(GameError::AlreadyUsed);
    }
    let target_name = lobby
        .players
        .iter()
        .find(|p| p.id == target_id)
        .map(|p| p.name.clone())
        .ok_or(GameError::TargetNotFound)?;

    let truthful: Vec<usize> = lobby
        .clues
        .iter()
        .enumerate()
        .filter(|(_, c)| c.found_by == target_id && !c.is_tampered)
        .map(|(i, _)| i)
        .collect();

    let report = match truthful.choose(rng) {
        Some(&index) => {
            let clue = &mut lobby.clues[index];
            clue.is_tampered = true;
            StealReport {
                sabotage: Sabotage::Tampered(clue.id.clone()),
                message: format!("You tampered with a clue found by {target_name}."),
            }
        }
        None => {
            let text = clues::synthesize(lobby, true, rng).ok_or(GameError::TargetNotFound)?;
            let clue = Clue {
                id: ulid::Ulid::new().to_string(),
                text,
                is_tampered: true,
                found_by: target_id.to_string(),
            };
            let id = clue.id.clone();
            lobby.clues.push(clue);
            StealReport {
                sabotage: Sabotage::Planted(id),
                message: format!("You planted a false clue on {target_name}."),
            }
        }
    };

    if let Some(killer) = lobby.players.iter_mut().find(|p| p.id == killer_id) {
        killer.has_stolen_clue = true;
    }
    Ok(report)
}
