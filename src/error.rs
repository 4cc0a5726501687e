use thiserror::Error;

use crate::board::{SeedColor, Side, TOTAL_SEEDS};

/// Reasons `Board::sow_seeds` refuses a move. The board is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMove {
    #[error("hole {hole} is off the board")]
    HoleOutOfRange { hole: usize },

    #[error("hole {hole} does not belong to {side}")]
    NotOwned { hole: usize, side: Side },

    #[error("hole {hole} holds no {color} seeds")]
    NoSeeds { hole: usize, color: SeedColor },
}

/// Rejected synthetic board layouts.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("board holds {found} seeds including captures, expected {}", TOTAL_SEEDS)]
    SeedCount { found: u32 },
}

/// Bad human move notation, e.g. anything other than `3B` or `11r`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseMoveError {
    #[error("expected a hole number followed by B or R, got '{0}'")]
    Format(String),

    #[error("hole number {0} is not between 1 and 16")]
    HoleNumber(usize),
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error(transparent)]
    InvalidMove(#[from] InvalidMove),

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Parse(#[from] ParseMoveError),

    #[error("move source for {0} disconnected")]
    Disconnected(Side),

    #[error("game is already over")]
    GameOver,

    #[error("{0} has no legal moves")]
    NoLegalMoves(Side),

    #[error("search engine is unavailable")]
    EngineUnavailable,

    #[error("turn stalled in state {0}")]
    Stalled(String),

    #[error("bad message: {0}")]
    Protocol(String),

    #[error("search task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("logger error: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
