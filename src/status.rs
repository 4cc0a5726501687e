use std::fmt;

use serde::Serialize;

use crate::board::Side;

/// Who came out ahead once the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    Winner(Side),
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Winner(side) => write!(f, "{} wins", side),
            Outcome::Draw => f.write_str("draw"),
        }
    }
}

/// Which end-of-game rule fired, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EndReason {
    ThresholdReached,
    EvenSplit,
    InsufficientSeeds,
    NoLegalMoves,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            EndReason::ThresholdReached => "threshold reached",
            EndReason::EvenSplit => "seeds evenly split",
            EndReason::InsufficientSeeds => "insufficient seeds remain",
            EndReason::NoLegalMoves => "no legal moves",
        })
    }
}

/// Derived termination result; recomputed from the board, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameStatus {
    pub is_over: bool,
    pub winner: Option<Outcome>,
    pub reason: Option<EndReason>,
}

impl GameStatus {
    pub fn ongoing() -> Self {
        Self { is_over: false, winner: None, reason: None }
    }

    pub fn over(outcome: Outcome, reason: EndReason) -> Self {
        Self { is_over: true, winner: Some(outcome), reason: Some(reason) }
    }

    pub fn is_over(&self) -> bool {
        self.is_over
    }

    /// The winning side, `None` while running or on a draw.
    pub fn winning_side(&self) -> Option<Side> {
        match self.winner {
            Some(Outcome::Winner(side)) => Some(side),
            _ => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.winner, self.reason) {
            (Some(outcome), Some(reason)) => write!(f, "game over: {} ({})", outcome, reason),
            _ => f.write_str("in progress"),
        }
    }
}
