//! SQLite persistence for saved games.
//!
//! RULE: Only store.rs talks to the database.
//! Rows hold the JSON save file produced by `codec`; the store never
//! interprets it beyond the indexed summary columns.

use crate::{
    codec,
    error::{PersistError, PersistResult},
    game_state::GameState,
    saved_game::SavedGameData,
    types::{ModelVersion, SaveId},
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// Listing row for a stored save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub save_id:       SaveId,
    pub game_name:     String,
    pub model_version: ModelVersion,
    pub game_state:    GameState,
    pub saved_at:      DateTime<Utc>,
}

pub struct SaveStore {
    conn: Connection,
}

impl SaveStore {
    /// Open (or create) the save database at `path`.
    pub fn open(path: &str) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        // WAL: better concurrent read performance. `:memory:` reports "memory".
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PersistResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_saved_games.sql"))?;
        Ok(())
    }

    // ── Write ──────────────────────────────────────────────────

    /// Store a snapshot. Returns the new save id.
    pub fn insert_save(&self, data: &SavedGameData, saved_at: DateTime<Utc>) -> PersistResult<SaveId> {
        let save_id = uuid::Uuid::new_v4().to_string();
        let payload = codec::to_json(data)?;
        self.conn.execute(
            "INSERT INTO saved_game (save_id, game_name, model_version, game_state, saved_at_ms, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                save_id,
                data.game_name,
                data.model_version,
                data.game_state.tag(),
                saved_at.timestamp_millis(),
                payload,
            ],
        )?;
        log::debug!("stored save {save_id} of game '{}'", data.game_name);
        Ok(save_id)
    }

    /// Returns true if a row was removed.
    pub fn delete_save(&self, save_id: &str) -> PersistResult<bool> {
        let n = self
            .conn
            .execute("DELETE FROM saved_game WHERE save_id = ?1", params![save_id])?;
        Ok(n > 0)
    }

    // ── Read ───────────────────────────────────────────────────

    pub fn load_save(
        &self,
        save_id: &str,
        supported_version: ModelVersion,
    ) -> PersistResult<Option<SavedGameData>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM saved_game WHERE save_id = ?1",
                params![save_id],
                |row| row.get(0),
            )
            .optional()?;
        payload
            .map(|json| codec::from_json(&json, supported_version))
            .transpose()
    }

    /// Most recent save of `game_name`, if any.
    pub fn latest_for_game(
        &self,
        game_name: &str,
        supported_version: ModelVersion,
    ) -> PersistResult<Option<(SaveId, SavedGameData)>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT save_id, payload FROM saved_game
                 WHERE game_name = ?1
                 ORDER BY saved_at_ms DESC, rowid DESC
                 LIMIT 1",
                params![game_name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        match row {
            Some((save_id, json)) => Ok(Some((save_id, codec::from_json(&json, supported_version)?))),
            None => Ok(None),
        }
    }

    /// All saves, newest first.
    pub fn list_saves(&self) -> PersistResult<Vec<SaveSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT save_id, game_name, model_version, game_state, saved_at_ms
             FROM saved_game
             ORDER BY saved_at_ms DESC, rowid DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i32>(2)?,
                    row.get::<_, i32>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(save_id, game_name, model_version, state_tag, saved_at_ms)| {
                let saved_at = DateTime::<Utc>::from_timestamp_millis(saved_at_ms).ok_or_else(|| {
                    PersistError::Other(anyhow::anyhow!("save {save_id}: bad timestamp {saved_at_ms}"))
                })?;
                Ok(SaveSummary {
                    save_id,
                    game_name,
                    model_version,
                    game_state: GameState::try_from(state_tag)?,
                    saved_at,
                })
            })
            .collect()
    }

    pub fn save_count(&self) -> PersistResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM saved_game", [], |row| row.get(0))?)
    }
}
