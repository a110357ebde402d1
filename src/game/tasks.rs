use crate::types::{GameConfig, GameTask, MiniGame, TASK_COUNT};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// Scatter the session's tasks over the playable area.
///
/// Positions are not checked against walls or rooms; the client map decides
/// what is reachable.
pub fn generate<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Vec<GameTask> {
    (0..TASK_COUNT)
        .map(|_| GameTask {
            id: ulid::Ulid::new().to_string(),
            x: rng.random_range(0.0..config.map_width),
            y: rng.random_range(0.0..config.map_height),
            kind: MiniGame::ALL
                .choose(rng)
                .copied()
                .unwrap_or(MiniGame::WordFusion),
            completed: false,
            locked_for: BTreeSet::new(),
        })
        .collect()
}
