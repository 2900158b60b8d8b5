//! Conditions a loaded game must meet before play resumes.
//!
//! The persistence layer registers none by default. Server code or an
//! operator adds them to a `SavedGameModel` before calling `resume_play`.

use crate::{
    game::GameView,
    saved_game::{PlayerInfo, SavedGameData},
    types::SeatNumber,
};
use std::fmt;

pub trait Constraint: Send {
    /// Stable identity, reported in `ConstraintViolation` when this fails.
    fn id(&self) -> String;

    /// True if the loaded game may resume.
    fn evaluate(&self, data: &SavedGameData, game: &dyn GameView) -> bool;
}

/// Registered constraints, evaluated in registration order.
#[derive(Default)]
pub struct ConstraintSet {
    constraints: Vec<Box<dyn Constraint>>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, constraint: Box<dyn Constraint>) {
        self.constraints.push(constraint);
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Identity of the first constraint that rejects, if any.
    pub fn first_failure(&self, data: &SavedGameData, game: &dyn GameView) -> Option<String> {
        self.constraints
            .iter()
            .find(|c| !c.evaluate(data, game))
            .map(|c| c.id())
    }
}

impl fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.constraints.iter().map(|c| c.id()))
            .finish()
    }
}

/// Who must occupy a seat when the game resumes.
///
/// Checked against the seat data in the saved record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatRequirement {
    Vacant(SeatNumber),
    Human(SeatNumber),
    BuiltInRobot(SeatNumber),
    ThirdPartyRobot(SeatNumber),
}

impl SeatRequirement {
    pub fn seat(&self) -> SeatNumber {
        match *self {
            SeatRequirement::Vacant(pn)
            | SeatRequirement::Human(pn)
            | SeatRequirement::BuiltInRobot(pn)
            | SeatRequirement::ThirdPartyRobot(pn) => pn,
        }
    }
}

fn is_occupied_by(seat: &PlayerInfo, robot: bool, built_in: bool) -> bool {
    !seat.is_seat_vacant && seat.is_robot == robot && (!robot || seat.is_built_in_robot == built_in)
}

impl Constraint for SeatRequirement {
    fn id(&self) -> String {
        match self {
            SeatRequirement::Vacant(pn)          => format!("seat {pn} must be vacant"),
            SeatRequirement::Human(pn)           => format!("seat {pn} must be a human player"),
            SeatRequirement::BuiltInRobot(pn)    => format!("seat {pn} must be a built-in robot"),
            SeatRequirement::ThirdPartyRobot(pn) => format!("seat {pn} must be a third-party robot"),
        }
    }

    fn evaluate(&self, data: &SavedGameData, _game: &dyn GameView) -> bool {
        let Some(seat) = data.player_seats.get(self.seat()) else {
            return false;
        };
        match self {
            SeatRequirement::Vacant(_)          => seat.is_seat_vacant,
            SeatRequirement::Human(_)           => is_occupied_by(seat, false, false),
            SeatRequirement::BuiltInRobot(_)    => is_occupied_by(seat, true, true),
            SeatRequirement::ThirdPartyRobot(_) => is_occupied_by(seat, true, false),
        }
    }
}
