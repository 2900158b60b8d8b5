//! The seam between the persistence layer and the game engine.
//!
//! RULE: the save path only reads through `GameView`.
//! The only write the persistence layer ever makes is
//! `LiveGame::set_game_state`, once, from `resume_play`.
//!
//! `Game` is a minimal game record implementing both traits. The real
//! rules engine implements them on its own game type.

use crate::{
    error::{PersistError, PersistResult},
    game_state::GameState,
    types::{ClientVersion, SeatNumber},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read access needed to snapshot a game.
pub trait GameView {
    fn name(&self) -> &str;
    fn game_state(&self) -> GameState;
    fn start_time(&self) -> DateTime<Utc>;
    fn game_options(&self) -> Option<&GameOptions>;
    /// Minimum client version able to play this game's rules and options.
    fn client_version_min_required(&self) -> ClientVersion;
    fn max_players(&self) -> usize;
    /// Player data for `seat`. Meaningful only when the seat is occupied.
    /// Implementations may panic if `seat >= max_players()`.
    fn player(&self, seat: SeatNumber) -> &Player;
    fn is_seat_vacant(&self, seat: SeatNumber) -> bool;
}

/// A game the persistence layer may hand back to play.
pub trait LiveGame: GameView {
    fn set_game_state(&mut self, state: GameState);
}

impl<T: GameView + ?Sized> GameView for &T {
    fn name(&self) -> &str { (**self).name() }
    fn game_state(&self) -> GameState { (**self).game_state() }
    fn start_time(&self) -> DateTime<Utc> { (**self).start_time() }
    fn game_options(&self) -> Option<&GameOptions> { (**self).game_options() }
    fn client_version_min_required(&self) -> ClientVersion { (**self).client_version_min_required() }
    fn max_players(&self) -> usize { (**self).max_players() }
    fn player(&self, seat: SeatNumber) -> &Player { (**self).player(seat) }
    fn is_seat_vacant(&self, seat: SeatNumber) -> bool { (**self).is_seat_vacant(seat) }
}

impl<T: GameView + ?Sized> GameView for &mut T {
    fn name(&self) -> &str { (**self).name() }
    fn game_state(&self) -> GameState { (**self).game_state() }
    fn start_time(&self) -> DateTime<Utc> { (**self).start_time() }
    fn game_options(&self) -> Option<&GameOptions> { (**self).game_options() }
    fn client_version_min_required(&self) -> ClientVersion { (**self).client_version_min_required() }
    fn max_players(&self) -> usize { (**self).max_players() }
    fn player(&self, seat: SeatNumber) -> &Player { (**self).player(seat) }
    fn is_seat_vacant(&self, seat: SeatNumber) -> bool { (**self).is_seat_vacant(seat) }
}

impl<T: LiveGame + ?Sized> LiveGame for &mut T {
    fn set_game_state(&mut self, state: GameState) { (**self).set_game_state(state) }
}

// ── Game options ─────────────────────────────────────────────

/// Game options as `key -> value` text, packed as `KEY=VAL,KEY=VAL`.
///
/// The persistence layer treats the packed form as opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions(BTreeMap<String, String>);

impl GameOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pack into the wire/save form. Keys are emitted in sorted order.
    pub fn pack(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn unpack(packed: &str) -> PersistResult<Self> {
        let mut opts = Self::new();
        for pair in packed.split(',').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| PersistError::MalformedEncoding(packed.to_string()))?;
            opts.set(key, value);
        }
        Ok(opts)
    }
}

// ── Game record ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name:              String,
    pub total_vp:          u32,
    pub is_robot:          bool,
    pub is_built_in_robot: bool,
}

impl Player {
    pub fn human(name: impl Into<String>, total_vp: u32) -> Self {
        Self { name: name.into(), total_vp, is_robot: false, is_built_in_robot: false }
    }

    pub fn built_in_robot(name: impl Into<String>, total_vp: u32) -> Self {
        Self { name: name.into(), total_vp, is_robot: true, is_built_in_robot: true }
    }

    /// A robot connected from outside the server process.
    pub fn third_party_robot(name: impl Into<String>, total_vp: u32) -> Self {
        Self { name: name.into(), total_vp, is_robot: true, is_built_in_robot: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Seat {
    player: Player,
    vacant: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    name:               String,
    state:              GameState,
    start_time:         DateTime<Utc>,
    options:            Option<GameOptions>,
    client_version_min: ClientVersion,
    seats:              Vec<Seat>,
}

impl Game {
    /// A new game in state `New` with every seat vacant.
    pub fn new(name: impl Into<String>, max_players: usize, start_time: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            state: GameState::New,
            start_time,
            options: None,
            client_version_min: 0,
            seats: vec![Seat { player: Player::default(), vacant: true }; max_players],
        }
    }

    /// # Panics
    ///
    /// If `seat >= max_players()`. Seat-level accessors share this rule.
    pub fn sit_down(&mut self, seat: SeatNumber, player: Player) {
        self.seats[seat] = Seat { player, vacant: false };
    }

    /// # Panics
    ///
    /// If `seat >= max_players()`.
    pub fn vacate(&mut self, seat: SeatNumber) {
        self.seats[seat].vacant = true;
    }

    pub fn set_options(&mut self, options: Option<GameOptions>) {
        self.options = options;
    }

    pub fn set_client_version_min(&mut self, version: ClientVersion) {
        self.client_version_min = version;
    }
}

impl GameView for Game {
    fn name(&self) -> &str { &self.name }
    fn game_state(&self) -> GameState { self.state }
    fn start_time(&self) -> DateTime<Utc> { self.start_time }
    fn game_options(&self) -> Option<&GameOptions> { self.options.as_ref() }
    fn client_version_min_required(&self) -> ClientVersion { self.client_version_min }
    fn max_players(&self) -> usize { self.seats.len() }
    fn player(&self, seat: SeatNumber) -> &Player { &self.seats[seat].player }
    fn is_seat_vacant(&self, seat: SeatNumber) -> bool { self.seats[seat].vacant }
}

impl LiveGame for Game {
    fn set_game_state(&mut self, state: GameState) {
        self.state = state;
    }
}
