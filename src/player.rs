//! The three kinds of move source a game can be wired with.
//!
//! Human and remote players only wait on a channel; whatever fills that
//! channel (a console reader, the websocket relay, a test) lives outside
//! the core. The AI player runs the search on a blocking thread so the
//! runtime keeps serving the other side while it thinks.

use log::{info, warn};
use tokio::sync::mpsc;

use crate::board::{Board, Move};
use crate::error::{GameError, InvalidMove};
use crate::search::SearchEngine;

pub enum Player {
    Human(HumanPlayer),
    Ai(AiPlayer),
    Remote(RemoteOpponent),
}

impl Player {
    /// Wait for this player's next move on `board`. The move may still be
    /// illegal; the game checks it and calls [`Player::reject`] if so.
    pub async fn make_move(&mut self, board: &Board) -> Result<Move, GameError> {
        match self {
            Player::Human(human) => human.make_move(board).await,
            Player::Ai(ai) => ai.make_move(board).await,
            Player::Remote(remote) => remote.make_move(board).await,
        }
    }

    /// Report a refused move back to its source.
    pub fn reject(&mut self, err: InvalidMove) -> Result<(), GameError> {
        match self {
            Player::Human(_) => {
                warn!("invalid move: {}, try again", err);
                Ok(())
            }
            Player::Remote(remote) => remote.reject(err),
            // the search only offers legal moves, so this is an engine bug
            Player::Ai(_) => Err(err.into()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Player::Human(_) => "human",
            Player::Ai(_) => "ai",
            Player::Remote(_) => "remote",
        }
    }
}

/// Reads moves in the one-based notation (`3B`, `11R`) from a line channel.
pub struct HumanPlayer {
    lines: mpsc::Receiver<String>,
}

impl HumanPlayer {
    pub fn new(lines: mpsc::Receiver<String>) -> Self {
        Self { lines }
    }

    async fn make_move(&mut self, board: &Board) -> Result<Move, GameError> {
        let side = board.current_player();
        loop {
            info!("{}, enter your move (e.g. '3B' or '11R'):", side);
            let line = self.lines.recv().await.ok_or(GameError::Disconnected(side))?;
            match line.parse::<Move>() {
                Ok(mv) => return Ok(mv),
                Err(err) => warn!("{}", err),
            }
        }
    }
}

pub struct AiPlayer {
    // taken while a search runs on the blocking pool
    engine: Option<SearchEngine>,
}

impl AiPlayer {
    pub fn new(engine: SearchEngine) -> Self {
        Self { engine: Some(engine) }
    }

    async fn make_move(&mut self, board: &Board) -> Result<Move, GameError> {
        let side = board.current_player();
        let engine = self.engine.take().ok_or(GameError::EngineUnavailable)?;
        let snapshot = board.clone();
        let (engine, result) = tokio::task::spawn_blocking(move || {
            let mut engine = engine;
            let result = engine.search(&snapshot);
            (engine, result)
        })
        .await?;
        self.engine = Some(engine);

        let mv = result.best_move.ok_or(GameError::NoLegalMoves(side))?;
        info!(
            "{} chose {} ({} plies, {} nodes, {} ms{})",
            side,
            mv,
            result.depth,
            result.nodes,
            result.elapsed.as_millis(),
            if result.timed_out { ", out of time" } else { "" }
        );
        Ok(mv)
    }
}

/// A player on the other end of the relay. Moves arrive already decoded;
/// refusals are sent back as text.
pub struct RemoteOpponent {
    moves: mpsc::Receiver<Move>,
    rejections: mpsc::UnboundedSender<String>,
}

impl RemoteOpponent {
    pub fn new(moves: mpsc::Receiver<Move>, rejections: mpsc::UnboundedSender<String>) -> Self {
        Self { moves, rejections }
    }

    async fn make_move(&mut self, board: &Board) -> Result<Move, GameError> {
        let side = board.current_player();
        info!("waiting for the remote move of {}", side);
        self.moves.recv().await.ok_or(GameError::Disconnected(side))
    }

    fn reject(&mut self, err: InvalidMove) -> Result<(), GameError> {
        warn!("remote sent an invalid move: {}", err);
        if self.rejections.send(err.to_string()).is_err() {
            warn!("relay is gone, could not report the refused move");
        }
        Ok(())
    }
}
