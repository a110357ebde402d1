//! Lobby state machine.
//!
//! Every operation validates the lobby status and the caller before touching
//! anything, and either mutates the lobby completely or not at all. Nothing
//! in here awaits, so a caller holding the registry lock sees each operation
//! as atomic.

use super::steal::{self, StealReport};
use super::vote::{self, Verdict};
use super::{attributes, clues, roles, tasks};
use crate::error::{GameError, GameResult};
use crate::types::*;
use chrono::{DateTime, Utc};
use rand::Rng;

/// What a departure did to the lobby
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// No connected player is left; the lobby should be torn down
    pub abandoned: bool,
    /// The departure completed a pending vote
    pub verdict: Option<Verdict>,
}

/// Trim and cap a requested display name, inventing one if nothing is left
pub fn clean_name(raw: &str) -> String {
    let trimmed: String = raw.trim().chars().take(MAX_NAME_CHARS).collect();
    let trimmed = trimmed.trim_end().to_string();
    if trimmed.is_empty() {
        petname::petname(2, " ").unwrap_or_else(|| "Player".to_string())
    } else {
        trimmed
    }
}

/// Append " 1", " 2", ... until the name is unused in the lobby
pub fn disambiguate_name(players: &[Player], requested: &str) -> String {
    let taken = |name: &str| players.iter().any(|p| p.name == name);
    if !taken(requested) {
        return requested.to_string();
    }
    let mut suffix = 1u32;
    loop {
        let candidate = format!("{requested} {suffix}");
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn next_color(players: &[Player]) -> String {
    PLAYER_COLORS
        .iter()
        .find(|c| !players.iter().any(|p| p.color == **c))
        .unwrap_or(&PLAYER_COLORS[players.len() % PLAYER_COLORS.len()])
        .to_string()
}

fn new_player(id: PlayerId, name: String, color: String, config: &GameConfig) -> Player {
    let (x, y) = config.spawn_point();
    Player {
        id,
        name,
        role: None,
        attributes: None,
        is_host: false,
        voted_for: None,
        x,
        y,
        color,
        has_stolen_clue: false,
        connected: true,
    }
}

impl Lobby {
    /// A fresh lobby with its creator seated as host
    pub fn new(code: LobbyCode, host_id: PlayerId, name: &str, config: &GameConfig) -> Self {
        let mut host = new_player(host_id, clean_name(name), next_color(&[]), config);
        host.is_host = true;
        Self {
            code,
            status: LobbyStatus::Lobby,
            players: vec![host],
            clues: Vec::new(),
            tasks: Vec::new(),
            start_time: None,
            end_time: None,
            winner: None,
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn killer(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_killer())
    }

    fn require_status(&self, status: LobbyStatus) -> GameResult<()> {
        if self.status == status {
            Ok(())
        } else {
            Err(GameError::InvalidPhase {
                actual: self.status,
            })
        }
    }

    fn require_host(&self, caller: &str) -> GameResult<()> {
        match self.player(caller) {
            Some(p) if p.is_host => Ok(()),
            Some(_) => Err(GameError::PermissionDenied("host only")),
            None => Err(GameError::PlayerNotFound),
        }
    }

    /// Seat a new player. Rejoining with the same connection is a no-op.
    pub fn join(&mut self, player_id: &str, name: &str, config: &GameConfig) -> GameResult<()> {
        if self.status != LobbyStatus::Lobby {
            return Err(GameError::AlreadyInProgress);
        }
        if self.player(player_id).is_some() {
            return Ok(());
        }
        let name = disambiguate_name(&self.players, &clean_name(name));
        let color = next_color(&self.players);
        self.players
            .push(new_player(player_id.to_string(), name, color, config));
        Ok(())
    }

    /// Remove the caller.
    ///
    /// In the lobby phase the seat is freed and a new host is promoted if
    /// needed. Once a game is running the entry stays, marked disconnected,
    /// so role, vote and clues survive and the host is not replaced.
    pub fn leave(&mut self, player_id: &str) -> GameResult<Departure> {
        if self.status != LobbyStatus::Lobby {
            return self.mark_departed(player_id);
        }
        let index = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound)?;
        self.players.remove(index);
        self.promote_host();

        Ok(Departure {
            abandoned: self.players.is_empty(),
            verdict: None,
        })
    }

    /// A dropped connection. Behaves like `leave`: only the lobby phase frees
    /// the seat.
    pub fn disconnect(&mut self, player_id: &str) -> GameResult<Departure> {
        self.leave(player_id)
    }

    /// Mid-game departure: the player stops counting as present. Their
    /// missing vote no longer holds up the accusation.
    fn mark_departed(&mut self, player_id: &str) -> GameResult<Departure> {
        let player = self
            .player_mut(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        player.connected = false;
        let verdict = self.resolve_votes_if_complete();
        Ok(Departure {
            abandoned: !self.players.iter().any(|p| p.connected),
            verdict,
        })
    }

    /// Lowest remaining seat becomes host when nobody holds it
    fn promote_host(&mut self) {
        if self.players.iter().any(|p| p.is_host) {
            return;
        }
        if let Some(first) = self.players.first_mut() {
            first.is_host = true;
        }
    }

    /// Deal roles and profiles, scatter tasks and open the task phase.
    ///
    /// Returns the start timestamp, which identifies this game for the
    /// deferred switch to discussion.
    pub fn start_game<R: Rng + ?Sized>(
        &mut self,
        caller: &str,
        config: &GameConfig,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> GameResult<DateTime<Utc>> {
        self.require_status(LobbyStatus::Lobby)?;
        self.require_host(caller)?;
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers {
                required: MIN_PLAYERS,
                actual: self.players.len(),
            });
        }

        roles::assign(&mut self.players, rng);
        let (x, y) = config.spawn_point();
        for player in &mut self.players {
            player.attributes = Some(attributes::generate(rng));
            player.voted_for = None;
            player.has_stolen_clue = false;
            player.x = x;
            player.y = y;
        }
        self.tasks = tasks::generate(config, rng);
        self.clues.clear();
        self.winner = None;
        self.start_time = Some(now);
        self.end_time = chrono::Duration::from_std(config.task_phase)
            .ok()
            .and_then(|d| now.checked_add_signed(d));
        self.status = LobbyStatus::Playing;
        Ok(now)
    }

    /// Timer-driven switch to discussion for the game started at `started_at`
    pub fn end_task_phase(&mut self, started_at: DateTime<Utc>) -> GameResult<()> {
        self.require_status(LobbyStatus::Playing)?;
        if self.start_time != Some(started_at) {
            return Err(GameError::GameNotActive);
        }
        self.status = LobbyStatus::Discussion;
        Ok(())
    }

    pub fn move_player(&mut self, caller: &str, x: f32, y: f32) -> GameResult<()> {
        self.require_status(LobbyStatus::Playing)?;
        let player = self.player_mut(caller).ok_or(GameError::PlayerNotFound)?;
        player.x = x;
        player.y = y;
        Ok(())
    }

    /// Finish a task and file the clue it yields.
    ///
    /// The killer's completions always produce a tampered clue about an
    /// innocent. Returns `Ok(false)` if the task was already done.
    pub fn complete_task<R: Rng + ?Sized>(
        &mut self,
        caller: &str,
        task_id: &str,
        rng: &mut R,
    ) -> GameResult<bool> {
        self.require_status(LobbyStatus::Playing)?;
        let finder = self.player(caller).ok_or(GameError::PlayerNotFound)?;
        let tampered = finder.is_killer();
        let task = self
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or(GameError::TaskNotFound)?;
        if task.completed {
            return Ok(false);
        }
        if task.locked_for.contains(caller) {
            return Err(GameError::PermissionDenied("task abandoned"));
        }

        // No subject to describe means no clue, and the task stays open
        let text = clues::synthesize(self, tampered, rng).ok_or(GameError::TargetNotFound)?;
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            task.completed = true;
        }
        self.clues.push(Clue {
            id: ulid::Ulid::new().to_string(),
            text,
            is_tampered: tampered,
            found_by: caller.to_string(),
        });
        Ok(true)
    }

    /// Keep the caller from reopening a task they walked away from
    pub fn abandon_task(&mut self, caller: &str, task_id: &str) -> GameResult<bool> {
        self.require_status(LobbyStatus::Playing)?;
        if self.player(caller).is_none() {
            return Err(GameError::PlayerNotFound);
        }
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or(GameError::TaskNotFound)?;
        Ok(task.locked_for.insert(caller.to_string()))
    }

    pub fn steal_clue<R: Rng + ?Sized>(
        &mut self,
        caller: &str,
        target: &str,
        rng: &mut R,
    ) -> GameResult<StealReport> {
        steal::steal(self, caller, target, rng)
    }

    pub fn start_voting(&mut self, caller: &str) -> GameResult<()> {
        self.require_status(LobbyStatus::Discussion)?;
        self.require_host(caller)?;
        self.status = LobbyStatus::Voting;
        Ok(())
    }

    /// Record the caller's vote. Votes are final.
    ///
    /// When this was the last missing vote, the accusation is resolved here
    /// and the verdict returned.
    pub fn cast_vote(&mut self, caller: &str, target: &str) -> GameResult<Option<Verdict>> {
        self.require_status(LobbyStatus::Voting)?;
        if self.player(target).is_none() {
            return Err(GameError::TargetNotFound);
        }
        let voter = self.player_mut(caller).ok_or(GameError::PlayerNotFound)?;
        if voter.voted_for.is_some() {
            return Err(GameError::AlreadyUsed);
        }
        voter.voted_for = Some(target.to_string());
        Ok(self.resolve_votes_if_complete())
    }

    fn resolve_votes_if_complete(&mut self) -> Option<Verdict> {
        let mut present = self.players.iter().filter(|p| p.connected).peekable();
        if self.status != LobbyStatus::Voting
            || present.peek().is_none()
            || present.any(|p| p.voted_for.is_none())
        {
            return None;
        }

        let tally = vote::tally(self.players.iter().filter_map(|p| p.voted_for.as_ref()));
        let killer_id = self.killer().map(|p| p.id.clone());
        let verdict = vote::resolve(&tally, killer_id.as_ref());
        match verdict {
            Verdict::KillerCaught => self.status = LobbyStatus::WitnessGuessing,
            Verdict::KillerEscapes => {
                self.status = LobbyStatus::GameOver;
                self.winner = Some(Winner::Killer);
            }
        }
        Some(verdict)
    }

    /// The caught killer's last move: naming the witness wins them the game
    pub fn guess_witness(&mut self, caller: &str, target: &str) -> GameResult<Winner> {
        self.require_status(LobbyStatus::WitnessGuessing)?;
        if !self.player(caller).is_some_and(Player::is_killer) {
            return Err(GameError::NotKiller);
        }
        let guessed = self.player(target).ok_or(GameError::TargetNotFound)?;
        let winner = if guessed.role == Some(Role::Witness) {
            Winner::Killer
        } else {
            Winner::Investigators
        };
        self.status = LobbyStatus::GameOver;
        self.winner = Some(winner);
        Ok(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::{config, lobby_with, started_lobby};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn id_of(lobby: &Lobby, pred: impl Fn(&Player) -> bool) -> String {
        lobby.players.iter().find(|p| pred(p)).unwrap().id.clone()
    }

    /// Drive a started lobby into voting
    fn voting_lobby(size: usize, seed: u64) -> Lobby {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut lobby = started_lobby(size, &mut rng);
        let started = lobby.start_time.unwrap();
        lobby.end_task_phase(started).unwrap();
        lobby.start_voting("p0").unwrap();
        lobby
    }

    #[test]
    fn test_new_lobby_seats_host() {
        let lobby = Lobby::new("ABCDE".into(), "p0".into(), "Alex", &config());
        assert_eq!(lobby.status, LobbyStatus::Lobby);
        assert_eq!(lobby.players.len(), 1);
        assert!(lobby.players[0].is_host);
        assert_eq!(lobby.players[0].name, "Alex");
    }

    #[test]
    fn test_name_collisions_get_suffixes() {
        let mut lobby = Lobby::new("ABCDE".into(), "p0".into(), "Alex", &config());
        lobby.join("p1", "Alex", &config()).unwrap();
        lobby.join("p2", "  Alex ", &config()).unwrap();
        let names: Vec<_> = lobby.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alex", "Alex 1", "Alex 2"]);
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  Sam  "), "Sam");
        assert_eq!(clean_name(&"x".repeat(40)).len(), MAX_NAME_CHARS);
        assert!(!clean_name("   ").is_empty());
    }

    #[test]
    fn test_colors_are_distinct() {
        let lobby = lobby_with(5);
        let mut colors: Vec<_> = lobby.players.iter().map(|p| p.color.clone()).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), 5);
    }

    #[test]
    fn test_join_rejected_after_start() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut lobby = started_lobby(3, &mut rng);
        assert_eq!(
            lobby.join("late", "Late", &config()),
            Err(GameError::AlreadyInProgress)
        );
    }

    #[test]
    fn test_host_leaving_promotes_next_seat() {
        let mut lobby = lobby_with(3);
        let departure = lobby.leave("p0").unwrap();
        assert!(!departure.abandoned);
        assert_eq!(lobby.host().map(|p| p.id.as_str()), Some("p1"));
        assert_eq!(lobby.players.iter().filter(|p| p.is_host).count(), 1);
    }

    #[test]
    fn test_last_player_leaving_abandons_lobby() {
        let mut lobby = lobby_with(1);
        assert!(lobby.leave("p0").unwrap().abandoned);
    }

    #[test]
    fn test_host_leaving_mid_game_is_not_replaced() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut lobby = started_lobby(4, &mut rng);
        let task_id = lobby.tasks[0].id.clone();
        lobby.complete_task("p0", &task_id, &mut rng).unwrap();
        let clues_before = lobby.clues.len();
        let role = lobby.players[0].role;

        let departure = lobby.leave("p0").unwrap();
        assert!(!departure.abandoned);
        assert_eq!(lobby.players.len(), 4);
        assert_eq!(lobby.host().map(|p| p.id.as_str()), Some("p0"));
        assert_eq!(lobby.players.iter().filter(|p| p.is_host).count(), 1);
        assert_eq!(lobby.players[0].role, role);
        assert!(!lobby.players[0].connected);
        assert_eq!(lobby.clues.len(), clues_before);
    }

    #[test]
    fn test_leaving_during_vote_keeps_ballot() {
        let mut lobby = voting_lobby(4, 17);
        lobby.cast_vote("p1", "p2").unwrap();

        let departure = lobby.leave("p1").unwrap();
        assert_eq!(departure.verdict, None);
        let leaver = lobby.player("p1").unwrap();
        assert_eq!(leaver.voted_for.as_deref(), Some("p2"));
        assert!(leaver.role.is_some());
        assert_eq!(lobby.status, LobbyStatus::Voting);
    }

    #[test]
    fn test_killer_leaving_mid_game_still_yields_clues() {
        let mut rng = StdRng::seed_from_u64(18);
        let mut lobby = started_lobby(3, &mut rng);
        let killer = id_of(&lobby, Player::is_killer);
        let innocent = id_of(&lobby, |p| !p.is_killer());

        lobby.leave(&killer).unwrap();
        assert_eq!(lobby.killer().map(|p| p.id.clone()), Some(killer.clone()));
        assert_eq!(lobby.player(&killer).unwrap().role, Some(Role::Killer));

        let task_id = lobby.tasks[0].id.clone();
        assert!(lobby.complete_task(&innocent, &task_id, &mut rng).unwrap());
        assert_eq!(lobby.clues.len(), 1);
        assert!(!lobby.clues[0].is_tampered);
        assert_eq!(lobby.status, LobbyStatus::Playing);
    }

    #[test]
    fn test_task_without_clue_subject_stays_open() {
        let mut rng = StdRng::seed_from_u64(19);
        let mut lobby = started_lobby(3, &mut rng);
        for player in &mut lobby.players {
            player.role = Some(Role::Investigator);
        }
        let task_id = lobby.tasks[0].id.clone();

        assert_eq!(
            lobby.complete_task("p1", &task_id, &mut rng),
            Err(GameError::TargetNotFound)
        );
        assert!(!lobby.tasks[0].completed);
        assert!(lobby.clues.is_empty());
    }

    #[test]
    fn test_disconnect_mid_game_keeps_player() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut lobby = started_lobby(3, &mut rng);
        let role = lobby.players[1].role;

        let departure = lobby.disconnect("p1").unwrap();
        assert!(!departure.abandoned);
        assert_eq!(lobby.players.len(), 3);
        assert_eq!(lobby.players[1].role, role);
        assert!(!lobby.players[1].connected);

        lobby.disconnect("p0").unwrap();
        assert!(lobby.disconnect("p2").unwrap().abandoned);
    }

    #[test]
    fn test_disconnect_in_lobby_frees_seat() {
        let mut lobby = lobby_with(3);
        lobby.disconnect("p1").unwrap();
        assert_eq!(lobby.players.len(), 2);
    }

    #[test]
    fn test_start_game_requirements() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut lobby = lobby_with(2);
        assert_eq!(
            lobby.start_game("p0", &config(), Utc::now(), &mut rng),
            Err(GameError::NotEnoughPlayers {
                required: 3,
                actual: 2
            })
        );

        lobby.join("p2", "Third", &config()).unwrap();
        assert_eq!(
            lobby.start_game("p1", &config(), Utc::now(), &mut rng),
            Err(GameError::PermissionDenied("host only"))
        );
        assert_eq!(lobby.status, LobbyStatus::Lobby);
        assert!(lobby.players.iter().all(|p| p.role.is_none()));
    }

    #[test]
    fn test_start_game_deals_everything() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut lobby = lobby_with(5);
        let now = Utc::now();
        lobby.start_game("p0", &config(), now, &mut rng).unwrap();

        assert_eq!(lobby.status, LobbyStatus::Playing);
        assert_eq!(lobby.players.iter().filter(|p| p.is_killer()).count(), 1);
        assert_eq!(
            lobby
                .players
                .iter()
                .filter(|p| p.role == Some(Role::Witness))
                .count(),
            1
        );
        assert!(lobby.players.iter().all(|p| p.attributes.is_some()));
        assert_eq!(lobby.tasks.len(), TASK_COUNT);
        assert_eq!(lobby.start_time, Some(now));
        assert!(lobby.end_time.unwrap() > now);
    }

    #[test]
    fn test_timer_only_ends_its_own_game() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut lobby = started_lobby(3, &mut rng);
        let other = lobby.start_time.unwrap() - chrono::Duration::seconds(1);
        assert!(lobby.end_task_phase(other).is_err());
        assert_eq!(lobby.status, LobbyStatus::Playing);

        lobby.end_task_phase(lobby.start_time.unwrap()).unwrap();
        assert_eq!(lobby.status, LobbyStatus::Discussion);
        assert!(lobby.end_task_phase(lobby.start_time.unwrap()).is_err());
    }

    #[test]
    fn test_move_only_while_playing() {
        let mut lobby = lobby_with(3);
        assert!(lobby.move_player("p0", 1.0, 2.0).is_err());

        let mut rng = StdRng::seed_from_u64(7);
        let mut lobby = started_lobby(3, &mut rng);
        lobby.move_player("p1", 10.0, 20.0).unwrap();
        assert_eq!((lobby.players[1].x, lobby.players[1].y), (10.0, 20.0));
    }

    #[test]
    fn test_complete_task_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut lobby = started_lobby(4, &mut rng);
        let task_id = lobby.tasks[3].id.clone();

        assert!(lobby.complete_task("p1", &task_id, &mut rng).unwrap());
        assert!(!lobby.complete_task("p2", &task_id, &mut rng).unwrap());
        assert!(lobby.tasks[3].completed);
        assert_eq!(lobby.clues.len(), 1);
    }

    #[test]
    fn test_clue_truthfulness() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut lobby = started_lobby(5, &mut rng);
        let killer = id_of(&lobby, Player::is_killer);
        let innocent = id_of(&lobby, |p| !p.is_killer());

        for i in 0..TASK_COUNT {
            let finder = if i % 2 == 0 { &killer } else { &innocent };
            let task_id = lobby.tasks[i].id.clone();
            lobby.complete_task(finder, &task_id, &mut rng).unwrap();
        }

        assert_eq!(lobby.clues.len(), TASK_COUNT);
        for clue in &lobby.clues {
            assert_eq!(clue.is_tampered, clue.found_by == killer);
        }
    }

    #[test]
    fn test_abandoned_task_cannot_be_completed_by_quitter() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut lobby = started_lobby(3, &mut rng);
        let task_id = lobby.tasks[0].id.clone();

        assert!(lobby.abandon_task("p1", &task_id).unwrap());
        assert!(!lobby.abandon_task("p1", &task_id).unwrap());
        assert_eq!(
            lobby.complete_task("p1", &task_id, &mut rng),
            Err(GameError::PermissionDenied("task abandoned"))
        );
        assert!(lobby.complete_task("p2", &task_id, &mut rng).unwrap());
    }

    #[test]
    fn test_only_host_starts_voting_from_discussion() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut lobby = started_lobby(3, &mut rng);
        assert!(lobby.start_voting("p0").is_err());

        lobby.end_task_phase(lobby.start_time.unwrap()).unwrap();
        assert!(lobby.start_voting("p1").is_err());
        lobby.start_voting("p0").unwrap();
        assert_eq!(lobby.status, LobbyStatus::Voting);
    }

    #[test]
    fn test_caught_killer_moves_to_witness_guessing() {
        let mut lobby = voting_lobby(4, 12);
        let killer = id_of(&lobby, Player::is_killer);
        let others: Vec<String> = lobby
            .players
            .iter()
            .filter(|p| !p.is_killer())
            .map(|p| p.id.clone())
            .collect();

        // killer: 2, others[0]: 1, others[1]: 1
        assert_eq!(lobby.cast_vote(&others[0], &killer), Ok(None));
        assert_eq!(lobby.cast_vote(&others[1], &killer), Ok(None));
        assert_eq!(lobby.cast_vote(&others[2], &others[0]), Ok(None));
        assert_eq!(
            lobby.cast_vote(&killer, &others[1]),
            Ok(Some(Verdict::KillerCaught))
        );
        assert_eq!(lobby.status, LobbyStatus::WitnessGuessing);
        assert_eq!(lobby.winner, None);
    }

    #[test]
    fn test_tied_vote_goes_to_killer() {
        let mut lobby = voting_lobby(4, 13);
        let killer = id_of(&lobby, Player::is_killer);
        let innocent = id_of(&lobby, |p| !p.is_killer());
        let voters: Vec<String> = lobby.players.iter().map(|p| p.id.clone()).collect();

        lobby.cast_vote(&voters[0], &killer).unwrap();
        lobby.cast_vote(&voters[1], &killer).unwrap();
        lobby.cast_vote(&voters[2], &innocent).unwrap();
        let verdict = lobby.cast_vote(&voters[3], &innocent).unwrap();

        assert_eq!(verdict, Some(Verdict::KillerEscapes));
        assert_eq!(lobby.status, LobbyStatus::GameOver);
        assert_eq!(lobby.winner, Some(Winner::Killer));
    }

    #[test]
    fn test_votes_are_final_and_validated() {
        let mut lobby = voting_lobby(3, 14);
        assert_eq!(
            lobby.cast_vote("p0", "ghost"),
            Err(GameError::TargetNotFound)
        );
        lobby.cast_vote("p0", "p1").unwrap();
        assert_eq!(lobby.cast_vote("p0", "p2"), Err(GameError::AlreadyUsed));
        assert_eq!(lobby.player("p0").unwrap().voted_for.as_deref(), Some("p1"));
    }

    #[test]
    fn test_leave_can_complete_the_vote() {
        let mut lobby = voting_lobby(3, 15);
        let innocent = id_of(&lobby, |p| !p.is_killer());
        let voters: Vec<String> = lobby.players.iter().map(|p| p.id.clone()).collect();
        lobby.cast_vote(&voters[0], &innocent).unwrap();
        lobby.cast_vote(&voters[1], &innocent).unwrap();

        let departure = lobby.leave(&voters[2]).unwrap();
        assert_eq!(departure.verdict, Some(Verdict::KillerEscapes));
        assert_eq!(lobby.status, LobbyStatus::GameOver);
        assert_eq!(lobby.players.len(), 3);
    }

    #[test]
    fn test_departed_voter_ballot_still_counts() {
        let mut lobby = voting_lobby(3, 20);
        let killer = id_of(&lobby, Player::is_killer);
        let innocents: Vec<String> = lobby
            .players
            .iter()
            .filter(|p| !p.is_killer())
            .map(|p| p.id.clone())
            .collect();

        lobby.cast_vote(&innocents[0], &killer).unwrap();
        lobby.disconnect(&innocents[0]).unwrap();
        lobby.cast_vote(&innocents[1], &killer).unwrap();
        // killer: 2, innocents[1]: 1 once the last present player votes
        let verdict = lobby.cast_vote(&killer, &innocents[1]).unwrap();

        assert_eq!(verdict, Some(Verdict::KillerCaught));
        assert_eq!(lobby.status, LobbyStatus::WitnessGuessing);
    }

    #[test]
    fn test_witness_guess_outcomes() {
        for (guess_witness, expected) in [(true, Winner::Killer), (false, Winner::Investigators)] {
            let mut lobby = voting_lobby(4, 16);
            let killer = id_of(&lobby, Player::is_killer);
            let ids: Vec<String> = lobby.players.iter().map(|p| p.id.clone()).collect();
            for voter in &ids {
                lobby.cast_vote(voter, &killer).unwrap();
            }
            assert_eq!(lobby.status, LobbyStatus::WitnessGuessing);

            let witness = id_of(&lobby, |p| p.role == Some(Role::Witness));
            let bystander = id_of(&lobby, |p| {
                !p.is_killer() && p.role != Some(Role::Witness)
            });
            assert_eq!(
                lobby.guess_witness(&witness, &bystander),
                Err(GameError::NotKiller)
            );

            let target = if guess_witness { witness } else { bystander };
            assert_eq!(lobby.guess_witness(&killer, &target), Ok(expected));
            assert_eq!(lobby.status, LobbyStatus::GameOver);
            assert_eq!(lobby.winner, Some(expected));
        }
    }
}
