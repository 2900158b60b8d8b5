//! Game state machine tags.
//!
//! Tags are stable integers written into saved games. Ordering between
//! tags is meaningful: every tag at or above `RollOrCard` means initial
//! placement has finished.

use crate::error::PersistError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "i32", into = "i32")]
pub enum GameState {
    New,
    Ready,
    /// Transitional: loaded from a saved game, waiting for `resume_play`.
    Loading,
    ReadyResetWaitRobotDismiss,
    Start1A,
    Start1B,
    Start2A,
    Start2B,
    Start3A,
    Start3B,
    /// Current player may roll dice or play a development card.
    RollOrCard,
    Play1,
    PlacingRoad,
    PlacingSettlement,
    PlacingCity,
    PlacingRobber,
    PlacingPirate,
    PlacingShip,
    PlacingFreeRoad1,
    PlacingFreeRoad2,
    WaitingForDiscards,
    WaitingForRobChoosePlayer,
    WaitingForDiscovery,
    WaitingForMonopoly,
    Over,
}

impl GameState {
    /// Lowest state a game may be saved in.
    pub const MIN_SAVEABLE: GameState = GameState::RollOrCard;

    const ALL: [GameState; 25] = [
        GameState::New,
        GameState::Ready,
        GameState::Loading,
        GameState::ReadyResetWaitRobotDismiss,
        GameState::Start1A,
        GameState::Start1B,
        GameState::Start2A,
        GameState::Start2B,
        GameState::Start3A,
        GameState::Start3B,
        GameState::RollOrCard,
        GameState::Play1,
        GameState::PlacingRoad,
        GameState::PlacingSettlement,
        GameState::PlacingCity,
        GameState::PlacingRobber,
        GameState::PlacingPirate,
        GameState::PlacingShip,
        GameState::PlacingFreeRoad1,
        GameState::PlacingFreeRoad2,
        GameState::WaitingForDiscards,
        GameState::WaitingForRobChoosePlayer,
        GameState::WaitingForDiscovery,
        GameState::WaitingForMonopoly,
        GameState::Over,
    ];

    pub fn tag(self) -> i32 {
        match self {
            GameState::New                       => 0,
            GameState::Ready                     => 1,
            GameState::Loading                   => 3,
            GameState::ReadyResetWaitRobotDismiss => 4,
            GameState::Start1A                   => 5,
            GameState::Start1B                   => 6,
            GameState::Start2A                   => 10,
            GameState::Start2B                   => 11,
            GameState::Start3A                   => 12,
            GameState::Start3B                   => 13,
            GameState::RollOrCard                => 15,
            GameState::Play1                     => 20,
            GameState::PlacingRoad               => 30,
            GameState::PlacingSettlement         => 31,
            GameState::PlacingCity               => 32,
            GameState::PlacingRobber             => 33,
            GameState::PlacingPirate             => 34,
            GameState::PlacingShip               => 35,
            GameState::PlacingFreeRoad1          => 40,
            GameState::PlacingFreeRoad2          => 41,
            GameState::WaitingForDiscards        => 50,
            GameState::WaitingForRobChoosePlayer => 51,
            GameState::WaitingForDiscovery       => 52,
            GameState::WaitingForMonopoly        => 53,
            GameState::Over                      => 1000,
        }
    }

    pub fn from_tag(tag: i32) -> Option<GameState> {
        Self::ALL.iter().copied().find(|s| s.tag() == tag)
    }

    /// True once initial placement is over and the game can be saved.
    pub fn is_saveable(self) -> bool {
        self >= Self::MIN_SAVEABLE
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::New
    }
}

impl TryFrom<i32> for GameState {
    type Error = PersistError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        GameState::from_tag(tag).ok_or(PersistError::UnknownGameState(tag))
    }
}

impl From<GameState> for i32 {
    fn from(state: GameState) -> i32 {
        state.tag()
    }
}
