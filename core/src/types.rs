//! Shared primitive types used across the persistence layer.

/// A client or server protocol version, e.g. 2300 for v2.3.00.
pub type ClientVersion = i32;

/// Snapshot format version, in the same numbering as `ClientVersion`.
pub type ModelVersion = i32;

/// A seat index within a game. Seat 0 is the first player.
pub type SeatNumber = usize;

/// Protocol version of this build: 2300 for v2.3.00.
pub const CURRENT_CLIENT_VERSION: ClientVersion = 2300;

/// Snapshot format written by this build: 2300 for v2.3.00.
pub const CURRENT_MODEL_VERSION: ModelVersion = 2300;

/// Unique identifier of a stored snapshot row.
pub type SaveId = String;
