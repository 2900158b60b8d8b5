//! Save/resume model and server feature lists for a multiplayer
//! board-game server.

pub mod codec;
pub mod config;
pub mod constraint;
pub mod error;
pub mod features;
pub mod game;
pub mod game_state;
pub mod saved_game;
pub mod store;
pub mod types;
