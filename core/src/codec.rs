//! JSON save-file encoding of `SavedGameData`.
//!
//! Field names are the save-file names (`modelVersion`, `playerSeats`, ...).
//! Loading refuses files written by a newer model version.

use crate::{
    error::{PersistError, PersistResult},
    game_state::GameState,
    saved_game::SavedGameData,
    types::ModelVersion,
};

pub fn to_json(data: &SavedGameData) -> PersistResult<String> {
    Ok(serde_json::to_string(data)?)
}

pub fn to_json_pretty(data: &SavedGameData) -> PersistResult<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Decode a save file, accepting model versions up to `supported_version`.
///
/// Unknown game state tags fail the decode. So do states before
/// `GameState::MIN_SAVEABLE`, which no save can legitimately hold.
pub fn from_json(json: &str, supported_version: ModelVersion) -> PersistResult<SavedGameData> {
    let data: SavedGameData = serde_json::from_str(json)?;
    if data.model_version > supported_version {
        return Err(PersistError::ModelVersionTooNew {
            found:     data.model_version,
            supported: supported_version,
        });
    }
    if !data.game_state.is_saveable() {
        return Err(PersistError::InvalidState {
            required: GameState::MIN_SAVEABLE,
            actual:   data.game_state,
        });
    }
    log::debug!(
        "decoded save of '{}' (model {}, {} seats)",
        data.game_name,
        data.model_version,
        data.player_seats.len()
    );
    Ok(data)
}
