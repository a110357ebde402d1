//! Game rules: everything that decides what happens to a lobby.
//!
//! All of it is synchronous and free of I/O. Randomness is passed in so the
//! rules can be exercised with a seeded generator.

pub mod attributes;
pub mod clues;
pub mod lobby;
pub mod roles;
pub mod steal;
pub mod tasks;
pub mod vote;

pub use lobby::Departure;
pub use steal::{Sabotage, StealReport};
pub use vote::Verdict;
