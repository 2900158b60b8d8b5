use crate::game_state::GameState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Invalid game state: requires at least {required:?}, game is in {actual:?}")]
    InvalidState { required: GameState, actual: GameState },

    #[error("Unsupported operation: game must be in Loading, is in {state:?}")]
    UnsupportedOperation { state: GameState },

    #[error("Resume constraint not met: {constraint}")]
    ConstraintViolation { constraint: String },

    #[error("Bad encoding: {0}")]
    MalformedEncoding(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Seat count mismatch: game has {expected} seats, snapshot has {actual}")]
    SeatCountMismatch { expected: usize, actual: usize },

    #[error("Unknown game state tag {0}")]
    UnknownGameState(i32),

    #[error("Snapshot model version {found} is newer than supported version {supported}")]
    ModelVersionTooNew { found: i32, supported: i32 },

    #[error("No game attached to saved game model")]
    NoGameAttached,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PersistResult<T> = Result<T, PersistError>;
