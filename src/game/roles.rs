use crate::types::{Player, Role, FORENSICS_MIN_PLAYERS};
use rand::seq::SliceRandom;
use rand::Rng;

/// The multiset of roles for a table of `count` players, before shuffling
pub fn role_pool(count: usize) -> Vec<Role> {
    let mut pool = vec![Role::Killer, Role::Witness];
    if count >= FORENSICS_MIN_PLAYERS {
        pool.push(Role::Forensics);
    }
    while pool.len() < count {
        pool.push(Role::Investigator);
    }
    pool.truncate(count);
    pool
}

/// Deal a uniformly shuffled role pool to the players by seat
pub fn assign<R: Rng + ?Sized>(players: &mut [Player], rng: &mut R) {
    let mut pool = role_pool(players.len());
    pool.shuffle(rng);
    for (player, role) in players.iter_mut().zip(pool) {
        player.role = Some(role);
    }
}
