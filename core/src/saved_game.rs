//! Saved game model: the data written to a save file, and the
//! lifecycle that turns a loaded file back into a playable game.
//!
//! SAVE: `SavedGameModel::from_game` copies fields out of a live game.
//! Nothing in the live game changes.
//!
//! LOAD: a deserializer fills a `SavedGameData`; the caller builds a new
//! game in `GameState::Loading`, attaches it, and calls `resume_play`.
//! `resume_play` is the only write the model makes to the game.

use crate::{
    constraint::{Constraint, ConstraintSet},
    error::{PersistError, PersistResult},
    game::{Game, GameOptions, GameView, LiveGame, Player},
    game_state::GameState,
    types::{ClientVersion, ModelVersion, CURRENT_MODEL_VERSION},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Settings for the save path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveConfig {
    /// Written into every snapshot as `modelVersion`.
    pub model_version: ModelVersion,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self { model_version: CURRENT_MODEL_VERSION }
    }
}

/// One seat, vacant or occupied, as written to a save file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    /// Meaningless when the seat is vacant.
    pub name:              String,
    pub is_seat_vacant:    bool,
    #[serde(rename = "totalVP")]
    pub total_vp:          u32,
    pub is_robot:          bool,
    pub is_built_in_robot: bool,
}

impl PlayerInfo {
    pub fn from_player(player: &Player, is_seat_vacant: bool) -> Self {
        Self {
            name:              player.name.clone(),
            is_seat_vacant,
            total_vp:          player.total_vp,
            is_robot:          player.is_robot,
            is_built_in_robot: player.is_built_in_robot,
        }
    }

    pub fn to_player(&self) -> Player {
        Player {
            name:              self.name.clone(),
            total_vp:          self.total_vp,
            is_robot:          self.is_robot,
            is_built_in_robot: self.is_built_in_robot,
        }
    }
}

/// The data fields of a saved game, in save-file field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGameData {
    /// Format version when saved, in the same numbering as `CURRENT_MODEL_VERSION`.
    pub model_version:         ModelVersion,
    /// Minimum client version able to play the saved game.
    pub game_version:          ClientVersion,
    pub game_name:             String,
    /// Packed game options, or `None` if the game had none.
    #[serde(default)]
    pub game_options:          Option<String>,
    pub game_duration_seconds: u32,
    pub game_state:            GameState,
    /// One entry per seat; length is the game's max players.
    pub player_seats:          Vec<PlayerInfo>,
}

impl SavedGameData {
    /// Copy the essential state out of `game` as of `now`.
    ///
    /// Fails with `InvalidState` if the game is still in initial placement.
    pub fn capture(
        game: &impl GameView,
        config: &SaveConfig,
        now: DateTime<Utc>,
    ) -> PersistResult<Self> {
        let state = game.game_state();
        if !state.is_saveable() {
            return Err(PersistError::InvalidState {
                required: GameState::MIN_SAVEABLE,
                actual:   state,
            });
        }

        let player_seats = (0..game.max_players())
            .map(|pn| PlayerInfo::from_player(game.player(pn), game.is_seat_vacant(pn)))
            .collect();

        Ok(Self {
            model_version:         config.model_version,
            game_version:          game.client_version_min_required(),
            game_name:             game.name().to_string(),
            game_options:          game.game_options().map(GameOptions::pack),
            game_duration_seconds: duration_seconds(game.start_time(), now),
            game_state:            state,
            player_seats,
        })
    }

    /// Build a fresh game from this record, in `GameState::Loading`.
    ///
    /// The start time is set back from `now` by the saved duration, so
    /// the game keeps counting from where it left off.
    pub fn create_loading_game(&self, now: DateTime<Utc>) -> PersistResult<Game> {
        let start_time = now - chrono::Duration::seconds(i64::from(self.game_duration_seconds));
        let mut game = Game::new(self.game_name.as_str(), self.player_seats.len(), start_time);
        game.set_options(
            self.game_options
                .as_deref()
                .map(GameOptions::unpack)
                .transpose()?,
        );
        game.set_client_version_min(self.game_version);
        for (pn, info) in self.player_seats.iter().enumerate() {
            if !info.is_seat_vacant {
                game.sit_down(pn, info.to_player());
            }
        }
        game.set_game_state(GameState::Loading);
        Ok(game)
    }
}

/// Whole seconds from `start` to `now`, rounding half up.
///
/// Matches the rounding used when reporting live game statistics.
/// A start time in the future counts as zero.
pub fn duration_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let elapsed_ms = (now - start).num_milliseconds();
    if elapsed_ms < 0 {
        log::warn!("game start time is {}ms in the future; saving duration 0", -elapsed_ms);
        return 0;
    }
    ((elapsed_ms + 500) / 1000).min(i64::from(i32::MAX)) as u32
}

/// Whether a model holds a game yet.
#[derive(Debug)]
pub enum GameSlot<G> {
    Unloaded,
    Loaded(G),
}

#[derive(Debug)]
pub struct SavedGameModel<G> {
    data:        SavedGameData,
    game:        GameSlot<G>,
    constraints: ConstraintSet,
}

impl<G> Default for SavedGameModel<G> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<G> SavedGameModel<G> {
    /// An empty model to load a save file into. All fields are zero-valued.
    pub fn empty() -> Self {
        Self::from_data(SavedGameData::default())
    }

    /// A model hydrated by a deserializer, with no game attached yet.
    pub fn from_data(data: SavedGameData) -> Self {
        Self {
            data,
            game: GameSlot::Unloaded,
            constraints: ConstraintSet::new(),
        }
    }

    pub fn data(&self) -> &SavedGameData {
        &self.data
    }

    /// The loaded game, or the game this model was saved from.
    /// `None` until a game is attached.
    pub fn game(&self) -> Option<&G> {
        match &self.game {
            GameSlot::Loaded(game) => Some(game),
            GameSlot::Unloaded     => None,
        }
    }

    pub fn into_game(self) -> Option<G> {
        match self.game {
            GameSlot::Loaded(game) => Some(game),
            GameSlot::Unloaded     => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.game, GameSlot::Loaded(_))
    }

    pub fn register_constraint(&mut self, constraint: Box<dyn Constraint>) {
        self.constraints.register(constraint);
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }
}

impl<G: GameView> SavedGameModel<G> {
    /// Snapshot a live game for saving, as of now.
    pub fn from_game(game: G, config: &SaveConfig) -> PersistResult<Self> {
        Self::from_game_at(game, config, Utc::now())
    }

    /// Snapshot a live game for saving, as of `now`.
    ///
    /// Fails with `InvalidState` if the game is before `RollOrCard`.
    pub fn from_game_at(game: G, config: &SaveConfig, now: DateTime<Utc>) -> PersistResult<Self> {
        let data = SavedGameData::capture(&game, config, now)?;
        log::debug!(
            "snapshot of game '{}': state={:?} duration={}s seats={}",
            data.game_name,
            data.game_state,
            data.game_duration_seconds,
            data.player_seats.len()
        );
        Ok(Self {
            data,
            game: GameSlot::Loaded(game),
            constraints: ConstraintSet::new(),
        })
    }

    /// Attach the newly built game that this model's data will resume.
    ///
    /// The saved state must be at or past `GameState::MIN_SAVEABLE`, and
    /// the game's seat count must equal the saved seat count.
    pub fn attach(&mut self, game: G) -> PersistResult<()> {
        if self.is_loaded() {
            return Err(PersistError::InvalidArgument(format!(
                "game '{}' already attached",
                self.data.game_name
            )));
        }
        if !self.data.game_state.is_saveable() {
            return Err(PersistError::InvalidState {
                required: GameState::MIN_SAVEABLE,
                actual:   self.data.game_state,
            });
        }
        let expected = game.max_players();
        let actual = self.data.player_seats.len();
        if expected != actual {
            return Err(PersistError::SeatCountMismatch { expected, actual });
        }
        log::debug!("attached game '{}' in state {:?}", game.name(), game.game_state());
        self.game = GameSlot::Loaded(game);
        Ok(())
    }

    /// `from_data` followed by `attach`.
    pub fn load(data: SavedGameData, game: G) -> PersistResult<Self> {
        let mut model = Self::from_data(data);
        model.attach(game)?;
        Ok(model)
    }
}

impl<G: LiveGame> SavedGameModel<G> {
    /// Resume play of a loaded game: check constraints, then restore the
    /// saved game state.
    ///
    /// Fails with `UnsupportedOperation` unless the game is in `Loading`,
    /// and with `ConstraintViolation` if a registered constraint rejects
    /// the load. On failure the game is untouched.
    pub fn resume_play(&mut self, ignore_constraints: bool) -> PersistResult<&mut G> {
        let game = match &mut self.game {
            GameSlot::Loaded(game) => game,
            GameSlot::Unloaded     => return Err(PersistError::NoGameAttached),
        };

        let state = game.game_state();
        if state != GameState::Loading {
            return Err(PersistError::UnsupportedOperation { state });
        }

        if ignore_constraints {
            if !self.constraints.is_empty() {
                log::warn!(
                    "resuming '{}' without checking {} constraint(s)",
                    self.data.game_name,
                    self.constraints.len()
                );
            }
        } else if let Some(constraint) = self.constraints.first_failure(&self.data, &*game) {
            return Err(PersistError::ConstraintViolation { constraint });
        }

        game.set_game_state(self.data.game_state);
        log::debug!("resumed '{}' in state {:?}", self.data.game_name, self.data.game_state);
        Ok(game)
    }
}

impl SavedGameModel<Game> {
    /// Hydrate, build the loading game, and attach it in one step.
    pub fn load_new(data: SavedGameData, now: DateTime<Utc>) -> PersistResult<Self> {
        let game = data.create_loading_game(now)?;
        Self::load(data, game)
    }
}
