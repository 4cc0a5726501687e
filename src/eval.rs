//! Static position evaluation.
//!
//! Scores are always from player 1's point of view: positive favours
//! player 1, negative favours player 2. The search treats the evaluator as a
//! replaceable strategy so different weightings can be tried side by side.

use crate::board::{Board, Side};

pub trait Evaluator: Send {
    fn evaluate(&self, board: &Board) -> i32;
}

/// Captured seeds of player 1 minus captured seeds of player 2.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureDifference;

impl Evaluator for CaptureDifference {
    fn evaluate(&self, board: &Board) -> i32 {
        capture_difference(board)
    }
}

/// Capture difference refined by board shape.
///
/// Holes with one to three seeds are one sowing away from being taken, so
/// each of them costs its owner `vulnerability_weight`. Seeds still on a
/// player's own row are worth `board_weight` each.
#[derive(Debug, Clone, Copy)]
pub struct WeightedEvaluator {
    pub capture_weight: i32,
    pub vulnerability_weight: i32,
    pub board_weight: i32,
}

impl Default for WeightedEvaluator {
    fn default() -> Self {
        Self { capture_weight: 10, vulnerability_weight: 2, board_weight: 1 }
    }
}

impl Evaluator for WeightedEvaluator {
    fn evaluate(&self, board: &Board) -> i32 {
        let vulnerable = |side: Side| {
            side.owned_holes()
                .iter_ones()
                .filter(|&hole| (1..=3).contains(&board.hole_total(hole)))
                .count() as i32
        };
        let row = |side: Side| board.seeds_in_row(side) as i32;

        self.capture_weight * capture_difference(board)
            - self.vulnerability_weight * (vulnerable(Side::One) - vulnerable(Side::Two))
            + self.board_weight * (row(Side::One) - row(Side::Two))
    }
}

fn capture_difference(board: &Board) -> i32 {
    board.captured(Side::One) as i32 - board.captured(Side::Two) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::board_with;

    #[test]
    fn test_fresh_board_is_level() {
        let board = Board::with_first_player(Side::One);
        assert_eq!(CaptureDifference.evaluate(&board), 0);
        assert_eq!(WeightedEvaluator::default().evaluate(&board), 0);
    }

    #[test]
    fn test_capture_difference_sign() {
        let board = board_with(&[(0, 4, 4), (1, 4, 4)], 30, Side::One);
        assert_eq!(CaptureDifference.evaluate(&board), 30 - 18);
    }

    #[test]
    fn test_vulnerable_holes_cost_their_owner() {
        // same stores and row sizes, but player 1's seeds sit in exposed holes
        let exposed = board_with(&[(0, 2, 0), (2, 2, 0), (1, 4, 0)], 20, Side::One);
        let safe = board_with(&[(0, 4, 0), (1, 4, 0)], 20, Side::One);
        let weights = WeightedEvaluator { capture_weight: 0, vulnerability_weight: 5, board_weight: 0 };
        assert_eq!(weights.evaluate(&exposed), -10);
        assert_eq!(weights.evaluate(&safe), 0);
    }

    #[test]
    fn test_row_weight() {
        let board = board_with(&[(0, 6, 6), (1, 2, 2)], 20, Side::One);
        let weights = WeightedEvaluator { capture_weight: 0, vulnerability_weight: 0, board_weight: 1 };
        assert_eq!(weights.evaluate(&board), 8);
    }
}
