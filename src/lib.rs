//! Two-color Awalé engine.
//!
//! Sixteen holes in a ring, each holding blue and red seeds. Even holes
//! belong to player 1 and odd holes to player 2. Blue seeds are sown into
//! every following hole, red seeds only into the opponent's holes, and a
//! sowing that leaves 2 or 3 seeds in the landing hole captures backwards.
//!
//! - [`board`]: board state, sowing, capture and end-of-game rules
//! - [`moves`]: ordered legal move generation
//! - [`eval`]: pluggable static evaluation
//! - [`search`]: minimax with alpha-beta, adaptive depth and a time budget
//! - [`player`]: human, AI and remote move sources
//! - [`game`]: the turn loop
//! - [`remote`]: websocket relay for a remote opponent
//!
//! ```
//! use awale::{Board, Move, SeedColor, Side};
//!
//! let mut board = Board::with_first_player(Side::One);
//! board.play(Move::new(0, SeedColor::Blue)).unwrap();
//! assert_eq!(board.seeds(0, SeedColor::Blue), 0);
//! assert_eq!(board.seeds_on_board(), 64);
//! ```

pub mod board;
pub mod error;
pub mod eval;
pub mod game;
pub mod moves;
pub mod player;
pub mod remote;
pub mod search;
pub mod status;

pub use board::{Board, Hole, Move, SeedColor, Side, StartPolicy};
pub use error::{GameError, InvalidMove};
pub use game::{Game, TurnState};
pub use moves::legal_moves;
pub use search::{SearchConfig, SearchEngine};
pub use status::{EndReason, GameStatus, Outcome};
