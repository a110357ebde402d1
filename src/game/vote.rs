//! Accusation resolution.

use crate::types::PlayerId;
use std::collections::HashMap;

/// Result of tallying a completed vote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub counts: HashMap<PlayerId, u32>,
    /// Most-voted player, `None` when the top count is shared or nobody voted
    pub leader: Option<PlayerId>,
    pub top_count: u32,
    pub tied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Unique plurality on the true killer
    KillerCaught,
    /// Tie, or the plurality landed on an innocent
    KillerEscapes,
}

pub fn tally<'a>(votes: impl IntoIterator<Item = &'a PlayerId>) -> Tally {
    let mut counts: HashMap<PlayerId, u32> = HashMap::new();
    for target in votes {
        *counts.entry(target.clone()).or_insert(0) += 1;
    }

    let top_count = counts.values().copied().max().unwrap_or(0);
    let mut leaders = counts.iter().filter(|(_, &n)| n == top_count);
    let first = leaders.next().map(|(id, _)| id.clone());
    let tied = leaders.next().is_some();

    Tally {
        leader: if tied { None } else { first },
        counts,
        top_count,
        tied,
    }
}

/// Ties always go to the killer.
pub fn resolve(tally: &Tally, killer_id: Option<&PlayerId>) -> Verdict {
    match (&tally.leader, killer_id) {
        (Some(leader), Some(killer)) if !tally.tied && leader == killer => Verdict::KillerCaught,
        _ => Verdict::KillerEscapes,
    }
}
