//! Minimax search with alpha-beta pruning.
//!
//! Scores are always from player 1's point of view: player 1 maximizes and
//! player 2 minimizes at every node, whichever side is to move at the root.
//! A finished game scores `WIN_SCORE` for a player 1 win, `-WIN_SCORE` for a
//! player 2 win and zero for a draw, less one point per ply between the root
//! and the end so that a quicker win (or a slower loss) is preferred.
//! Anything else goes through the configured [`Evaluator`].
//!
//! # Depth and time
//!
//! Every top-level call picks its depth from the number of legal moves (a
//! narrow position can afford a deeper look) and records a deadline. Once
//! the deadline passes, the node that notices returns
//! `Err(SearchTimeExceeded)` and `?` carries it up to the root. The root
//! then keeps the best move among the branches it has fully searched.
//!
//! # Example
//!
//! ```
//! use awale::board::{Board, Side};
//! use awale::search::{DepthPolicy, SearchConfig, SearchEngine};
//!
//! let config = SearchConfig { time_budget: None, depth: DepthPolicy { floor: 2, max: 3 } };
//! let mut engine = SearchEngine::seeded(config, 42);
//! let board = Board::with_first_player(Side::One);
//!
//! let mv = engine.select_move(&board).expect("fresh board has moves");
//! assert_eq!(mv.hole % 2, 0);
//! ```

use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::board::{Board, Move, Side};
use crate::eval::{Evaluator, WeightedEvaluator};
use crate::moves::legal_moves;
use crate::status::{GameStatus, Outcome};

/// Score of a decided game, from player 1's point of view.
pub const WIN_SCORE: i32 = 1_000_000;

/// Alpha-beta bound, wider than any reachable score.
const INF: i32 = i32::MAX;

pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_millis(2000);
pub const DEFAULT_DEPTH_FLOOR: u32 = 5;
pub const DEFAULT_MAX_DEPTH: u32 = 12;

/// Search depth, in plies counting the root move, as a function of how many
/// moves are on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthPolicy {
    pub floor: u32,
    pub max: u32,
}

impl Default for DepthPolicy {
    fn default() -> Self {
        Self { floor: DEFAULT_DEPTH_FLOOR, max: DEFAULT_MAX_DEPTH }
    }
}

impl DepthPolicy {
    pub fn depth_for(&self, legal_moves: usize) -> u32 {
        let extra = match legal_moves {
            n if n > 8 => 0,
            n if n > 6 => 2,
            n if n > 4 => 3,
            n if n > 3 => 4,
            n if n > 2 => 5,
            _ => 6,
        };
        (self.floor + extra).min(self.max).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Wall-clock allowance per top-level call, `None` for unlimited.
    pub time_budget: Option<Duration>,
    pub depth: DepthPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { time_budget: Some(DEFAULT_TIME_BUDGET), depth: DepthPolicy::default() }
    }
}

/// Outcome of one top-level search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Chosen move, `None` only when the side to move has no legal move
    pub best_move: Option<Move>,
    /// Score of the chosen move, player 1 positive
    pub score: i32,
    /// Plies searched below and including the root move
    pub depth: u32,
    pub nodes: u64,
    pub elapsed: Duration,
    /// The deadline cut the root loop short
    pub timed_out: bool,
    /// No branch finished, so the move was drawn at random
    pub fallback: bool,
}

/// Raised by any node past the deadline; never leaves this module.
#[derive(Debug, Clone, Copy)]
struct SearchTimeExceeded;

pub struct SearchEngine {
    config: SearchConfig,
    evaluator: Box<dyn Evaluator>,
    rng: StdRng,
    deadline: Option<Instant>,
    nodes: u64,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self::with_evaluator(config, Box::new(WeightedEvaluator::default()), StdRng::from_entropy())
    }

    /// Engine whose random fallback is reproducible.
    pub fn seeded(config: SearchConfig, seed: u64) -> Self {
        Self::with_evaluator(config, Box::new(WeightedEvaluator::default()), StdRng::seed_from_u64(seed))
    }

    pub fn with_evaluator(config: SearchConfig, evaluator: Box<dyn Evaluator>, rng: StdRng) -> Self {
        Self { config, evaluator, rng, deadline: None, nodes: 0 }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Pick a move for the side to move. Returns `Some` whenever that side
    /// has a legal move; `board` itself is never modified.
    pub fn select_move(&mut self, board: &Board) -> Option<Move> {
        self.search(board).best_move
    }

    /// Search with the depth the policy picks for this position.
    pub fn search(&mut self, board: &Board) -> SearchResult {
        let available = legal_moves(board, board.current_player()).len();
        let depth = self.config.depth.depth_for(available);
        self.search_to_depth(board, depth)
    }

    pub fn search_to_depth(&mut self, board: &Board, depth: u32) -> SearchResult {
        let start = Instant::now();
        self.deadline = self.config.time_budget.map(|budget| start + budget);
        self.nodes = 0;

        let side = board.current_player();
        let maximizing = side == Side::One;
        let moves = legal_moves(board, side);

        let mut best: Option<(Move, i32)> = None;
        let mut alpha = -INF;
        let mut beta = INF;
        let mut timed_out = false;

        for &mv in &moves {
            let Some(child) = child_after(board, mv) else { continue };
            let score = match self.minimax(child, depth.saturating_sub(1), 1, alpha, beta, !maximizing) {
                Ok(score) => score,
                Err(SearchTimeExceeded) => {
                    warn!("search hit the time budget after {} nodes, keeping best move so far", self.nodes);
                    timed_out = true;
                    break;
                }
            };

            let improves = match best {
                Some((_, best_score)) if maximizing => score > best_score,
                Some((_, best_score)) => score < best_score,
                None if maximizing => score > -INF,
                None => score < INF,
            };
            if improves {
                best = Some((mv, score));
            }
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
        }

        let fallback = best.is_none() && !moves.is_empty();
        let (best_move, score) = match best {
            Some((mv, score)) => (Some(mv), score),
            None => (moves.choose(&mut self.rng).copied(), 0),
        };

        let elapsed = start.elapsed();
        debug!(
            "{} searched {} plies over {} moves: {} nodes in {} ms, score {}",
            side,
            depth,
            moves.len(),
            self.nodes,
            elapsed.as_millis(),
            score
        );

        SearchResult { best_move, score, depth, nodes: self.nodes, elapsed, timed_out, fallback }
    }

    fn minimax(
        &mut self,
        mut board: Board,
        depth: u32,
        ply: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> Result<i32, SearchTimeExceeded> {
        self.nodes += 1;
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(SearchTimeExceeded);
            }
        }

        let status = board.check_game_status();
        if status.is_over() {
            return Ok(terminal_score(&status, ply));
        }
        if depth == 0 {
            return Ok(self.evaluator.evaluate(&board));
        }

        let side = board.current_player();
        debug_assert_eq!(side == Side::One, maximizing);

        let mut best = if maximizing { -INF } else { INF };
        for mv in legal_moves(&board, side) {
            let Some(child) = child_after(&board, mv) else { continue };
            let score = self.minimax(child, depth - 1, ply + 1, alpha, beta, !maximizing)?;
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if alpha >= beta {
                break;
            }
        }
        Ok(best)
    }
}

/// Copy of `board` after `mv`, with the turn handed over.
fn child_after(board: &Board, mv: Move) -> Option<Board> {
    let mut child = board.clone();
    if let Err(err) = child.play(mv) {
        warn!("skipping unplayable move {}: {}", mv, err);
        return None;
    }
    child.switch_player();
    Some(child)
}

/// Score of a finished game reached `ply` moves below the root.
fn terminal_score(status: &GameStatus, ply: u32) -> i32 {
    let distance = ply as i32;
    match status.winner {
        Some(Outcome::Winner(Side::One)) => WIN_SCORE - distance,
        Some(Outcome::Winner(Side::Two)) => -WIN_SCORE + distance,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::board_with;
    use crate::board::SeedColor;
    use crate::status::EndReason;

    fn quick(floor: u32, max: u32) -> SearchConfig {
        SearchConfig { time_budget: None, depth: DepthPolicy { floor, max } }
    }

    // player 1 sits on 31 seeds and 1B takes three more
    fn one_to_win() -> Board {
        board_with(
            &[(0, 1, 0), (1, 1, 1), (3, 2, 2), (4, 4, 4), (5, 2, 2), (7, 2, 2), (9, 2, 2), (11, 2, 2)],
            31,
            Side::One,
        )
    }

    #[test]
    fn test_depth_policy_table() {
        let policy = DepthPolicy::default();
        assert_eq!(policy.depth_for(16), 5);
        assert_eq!(policy.depth_for(9), 5);
        assert_eq!(policy.depth_for(8), 7);
        assert_eq!(policy.depth_for(5), 8);
        assert_eq!(policy.depth_for(4), 9);
        assert_eq!(policy.depth_for(3), 10);
        assert_eq!(policy.depth_for(1), 11);

        let capped = DepthPolicy { floor: 5, max: 8 };
        assert_eq!(capped.depth_for(2), 8);
    }

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.time_budget, Some(Duration::from_millis(2000)));
        assert_eq!(config.depth.floor, 5);
    }

    #[test]
    fn test_select_move_is_legal() {
        let mut engine = SearchEngine::seeded(quick(2, 3), 1);
        for side in Side::BOTH {
            let board = Board::with_first_player(side);
            let mv = engine.select_move(&board).unwrap();
            assert!(legal_moves(&board, side).contains(&mv));
        }
    }

    #[test]
    fn test_search_leaves_board_alone() {
        let mut engine = SearchEngine::seeded(quick(3, 3), 1);
        let board = one_to_win();
        let before = board.clone();
        let _ = engine.search(&board);
        assert_eq!(board, before);
    }

    #[test]
    fn test_finds_winning_capture_for_player_one() {
        let mut engine = SearchEngine::seeded(quick(2, 3), 1);
        let result = engine.search(&one_to_win());
        assert_eq!(result.best_move, Some(Move::new(0, SeedColor::Blue)));
        assert_eq!(result.score, WIN_SCORE - 1);
        assert!(!result.timed_out);
        assert!(!result.fallback);
    }

    #[test]
    fn test_finds_winning_capture_for_player_two() {
        let board = board_with(
            &[(1, 1, 0), (2, 1, 1), (4, 2, 2), (5, 4, 4), (6, 2, 2), (8, 2, 2), (10, 2, 2)],
            6,
            Side::Two,
        );
        assert_eq!(board.captured(Side::Two), 31);

        let mut engine = SearchEngine::seeded(quick(2, 3), 1);
        let result = engine.search(&board);
        assert_eq!(result.best_move, Some(Move::new(1, SeedColor::Blue)));
        assert_eq!(result.score, -WIN_SCORE + 1);
    }

    #[test]
    fn test_win_in_one_scores_the_same_at_every_depth() {
        let board = one_to_win();
        let mut engine = SearchEngine::seeded(quick(1, 1), 1);
        for depth in 1..=4 {
            let result = engine.search_to_depth(&board, depth);
            assert_eq!(result.score, WIN_SCORE - 1, "depth {}", depth);
            assert_eq!(result.best_move, Some(Move::new(0, SeedColor::Blue)));
        }
    }

    #[test]
    fn test_sooner_wins_score_higher() {
        let one = GameStatus::over(Outcome::Winner(Side::One), EndReason::ThresholdReached);
        let two = GameStatus::over(Outcome::Winner(Side::Two), EndReason::ThresholdReached);
        let draw = GameStatus::over(Outcome::Draw, EndReason::EvenSplit);

        assert!(terminal_score(&one, 1) > terminal_score(&one, 5));
        assert!(terminal_score(&two, 1) < terminal_score(&two, 5));
        assert_eq!(terminal_score(&draw, 3), 0);
        // still far outside anything an evaluator produces
        assert!(terminal_score(&one, DEFAULT_MAX_DEPTH) > WIN_SCORE / 2);
    }

    #[test]
    fn test_no_moves_means_no_move() {
        let odd: Vec<(usize, u8, u8)> = (1..16).step_by(2).map(|h| (h, 2, 2)).collect();
        let board = board_with(&odd, 16, Side::One);
        let mut engine = SearchEngine::seeded(quick(2, 2), 1);
        let result = engine.search(&board);
        assert_eq!(result.best_move, None);
        assert!(!result.fallback);
    }

    #[test]
    fn test_exhausted_budget_falls_back_to_random_legal_move() {
        let config = SearchConfig { time_budget: Some(Duration::ZERO), depth: DepthPolicy::default() };
        let board = Board::with_first_player(Side::Two);

        let mut first = SearchEngine::seeded(config, 9);
        let mut second = SearchEngine::seeded(config, 9);
        let a = first.search(&board);
        let b = second.search(&board);

        assert!(a.timed_out);
        assert!(a.fallback);
        let mv = a.best_move.unwrap();
        assert!(legal_moves(&board, Side::Two).contains(&mv));
        // same seed, same pick
        assert_eq!(a.best_move, b.best_move);
    }

    struct EmptyFirstHole;

    impl Evaluator for EmptyFirstHole {
        fn evaluate(&self, board: &Board) -> i32 {
            -(board.hole_total(0) as i32)
        }
    }

    #[test]
    fn test_evaluator_is_pluggable() {
        let mut engine = SearchEngine::with_evaluator(
            quick(1, 1),
            Box::new(EmptyFirstHole),
            StdRng::seed_from_u64(3),
        );
        let board = Board::with_first_player(Side::One);
        let result = engine.search(&board);
        assert_eq!(result.best_move, Some(Move::new(0, SeedColor::Blue)));
        assert_eq!(result.score, -2);
    }
}
