use crate::broadcast::{RoomEvent, ROOM_CHANNEL_CAPACITY};
use crate::types::{Lobby, LobbyCode};
use rand::Rng;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Safe character set for lobby codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 5;

/// Generate a random short code (5 characters)
fn generate_short_code<R: Rng + ?Sized>(rng: &mut R) -> LobbyCode {
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// One live session and the channel its members listen on
pub struct LobbyEntry {
    pub lobby: Lobby,
    pub room: broadcast::Sender<RoomEvent>,
}

impl LobbyEntry {
    /// Send an event to everyone in the room. Nobody listening is fine.
    pub fn publish(&self, event: RoomEvent) {
        let _ = self.room.send(event);
    }

    pub fn publish_update(&self) {
        self.publish(RoomEvent::LobbyUpdate(Arc::new(self.lobby.clone())));
    }
}

/// All active lobbies by code
#[derive(Default)]
pub struct SessionRegistry {
    lobbies: HashMap<LobbyCode, LobbyEntry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }

    /// A code no live lobby is using
    pub fn unused_code(&self) -> LobbyCode {
        let mut rng = rand::rng();
        loop {
            let code = generate_short_code(&mut rng);
            if !self.lobbies.contains_key(&code) {
                return code;
            }
            // Collision - try again (rare with 28M combinations)
        }
    }

    pub fn insert(&mut self, lobby: Lobby) -> &mut LobbyEntry {
        let (room, _rx) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
        let entry = LobbyEntry { lobby, room };
        match self.lobbies.entry(entry.lobby.code.clone()) {
            Entry::Occupied(mut slot) => {
                slot.insert(entry);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(entry),
        }
    }

    pub fn get(&self, code: &str) -> Option<&LobbyEntry> {
        self.lobbies.get(code)
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut LobbyEntry> {
        self.lobbies.get_mut(code)
    }

    /// Drop a lobby; its room channel closes with it
    pub fn remove(&mut self, code: &str) -> Option<LobbyEntry> {
        self.lobbies.remove(code)
    }

    pub fn subscribe(&self, code: &str) -> Option<broadcast::Receiver<RoomEvent>> {
        self.lobbies.get(code).map(|entry| entry.room.subscribe())
    }

    pub fn lobbies(&self) -> impl Iterator<Item = &Lobby> {
        self.lobbies.values().map(|entry| &entry.lobby)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lobby(code: &str) -> Lobby {
        Lobby::new(code.to_string(), "p0".into(), "Host", &GameConfig::default())
    }

    #[test]
    fn test_short_code_alphabet() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let code = generate_short_code(&mut rng);
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_CHARS.contains(&b)));
        }
    }

    #[test]
    fn test_insert_get_remove() {
        let mut registry = SessionRegistry::new();
        let code = registry.unused_code();
        registry.insert(lobby(&code));

        assert_eq!(registry.len(), 1);
        assert!(registry.get(&code).is_some());
        assert!(registry.subscribe(&code).is_some());
        assert!(registry.subscribe("NOPE1").is_none());

        assert!(registry.remove(&code).is_some());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_removing_lobby_closes_room() {
        let mut registry = SessionRegistry::new();
        registry.insert(lobby("ROOM1"));
        let mut rx = registry.subscribe("ROOM1").unwrap();

        registry.get("ROOM1").unwrap().publish_update();
        assert!(matches!(rx.recv().await, Ok(RoomEvent::LobbyUpdate(_))));

        registry.remove("ROOM1");
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }
}
