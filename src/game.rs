//! Turn orchestration.
//!
//! A game owns the one live board and both players. It waits for the player
//! whose turn it is, applies the move, hands the turn over and checks the
//! end-of-game rules:
//!
//! ```text
//! WaitingForMove(side) -> Applying(move) -> CheckingStatus -> WaitingForMove(other)
//!                                                          -> GameOver(status)
//! ```
//!
//! A refused move leaves the game in `WaitingForMove` and is reported back to
//! the player that sent it. Every applied move is published as a
//! [`Snapshot`] on a watch channel.

use std::fmt;

use log::{info, warn};
use serde::Serialize;
use tokio::sync::watch;

use crate::board::{Board, Move, Side};
use crate::error::GameError;
use crate::player::Player;
use crate::status::GameStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    WaitingForMove(Side),
    Applying(Move),
    CheckingStatus,
    GameOver(GameStatus),
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TurnState::WaitingForMove(side) => write!(f, "waiting for {}", side),
            TurnState::Applying(mv) => write!(f, "applying {}", mv),
            TurnState::CheckingStatus => f.write_str("checking status"),
            TurnState::GameOver(status) => write!(f, "{}", status),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayedMove {
    pub side: Side,
    #[serde(rename = "move")]
    pub mv: Move,
    pub captured: u32,
}

/// What the game looks like after a turn, for renderers and relays.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub board: Board,
    pub last_move: Option<PlayedMove>,
    pub status: GameStatus,
}

pub struct Game {
    board: Board,
    players: [Player; 2],
    state: TurnState,
    snapshots: watch::Sender<Snapshot>,
}

impl Game {
    pub fn new(board: Board, player_one: Player, player_two: Player) -> Self {
        let mut board = board;
        let status = board.check_game_status();
        let state = if status.is_over() {
            TurnState::GameOver(status)
        } else {
            TurnState::WaitingForMove(board.current_player())
        };
        let (snapshots, _) = watch::channel(Snapshot { board: board.clone(), last_move: None, status });
        Self { board, players: [player_one, player_two], state, snapshots }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn player(&self, side: Side) -> &Player {
        &self.players[side.index()]
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Apply `mv` for the side whose turn it is. An illegal move is returned
    /// as `GameError::InvalidMove` and changes nothing.
    pub fn submit_move(&mut self, mv: Move) -> Result<TurnState, GameError> {
        let side = match self.state {
            TurnState::WaitingForMove(side) => side,
            TurnState::GameOver(_) => return Err(GameError::GameOver),
            other => return Err(GameError::Stalled(other.to_string())),
        };
        self.board.validate(mv)?;

        self.state = TurnState::Applying(mv);
        let captured = match self.board.play(mv) {
            Ok(captured) => captured,
            Err(err) => {
                self.state = TurnState::WaitingForMove(side);
                return Err(err.into());
            }
        };
        self.board.switch_player();
        info!("{} played {}, capturing {}", side, mv, captured);

        self.state = TurnState::CheckingStatus;
        let status = self.board.check_game_status();
        self.state = if status.is_over() {
            info!("{}", status);
            TurnState::GameOver(status)
        } else {
            TurnState::WaitingForMove(self.board.current_player())
        };

        self.snapshots.send_replace(Snapshot {
            board: self.board.clone(),
            last_move: Some(PlayedMove { side, mv, captured }),
            status,
        });
        Ok(self.state)
    }

    /// Drive the game to its end, waiting on each player in turn.
    pub async fn run(&mut self) -> Result<GameStatus, GameError> {
        loop {
            let side = match self.state {
                TurnState::GameOver(status) => return Ok(status),
                TurnState::WaitingForMove(side) => side,
                other => return Err(GameError::Stalled(other.to_string())),
            };

            let player = &mut self.players[side.index()];
            let mv = player.make_move(&self.board).await?;
            match self.submit_move(mv) {
                Ok(_) => {}
                Err(GameError::InvalidMove(err)) => {
                    warn!("{} ({}) tried {}: {}", side, self.players[side.index()].kind(), mv, err);
                    self.players[side.index()].reject(err)?;
                }
                Err(other) => return Err(other),
            }
        }
    }
}
