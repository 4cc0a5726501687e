//! Legal move enumeration with capture-first ordering.

use crate::board::{Board, Move, SeedColor, Side, TOTAL_HOLES};

/// Every legal move for `side`, best-looking first.
///
/// Moves are ranked by how many seeds they capture right away (most first),
/// then by how many seeds of that color the origin hole holds (fewest
/// first). The sort is stable, so remaining ties keep hole order with blue
/// before red. The order only speeds up pruning, it never changes which
/// moves are legal.
pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
    let mut ranked: Vec<(Move, u32, u8)> = candidate_moves(board, side)
        .map(|mv| {
            let seeds = board.seeds(mv.hole, mv.color);
            (mv, immediate_capture(board, side, mv), seeds)
        })
        .collect();
    ranked.sort_by(|(_, captured_a, seeds_a), (_, captured_b, seeds_b)| {
        captured_b.cmp(captured_a).then(seeds_a.cmp(seeds_b))
    });
    ranked.into_iter().map(|(mv, _, _)| mv).collect()
}

/// Legal moves in plain hole order, without simulating anything.
pub fn candidate_moves(board: &Board, side: Side) -> impl Iterator<Item = Move> + '_ {
    (0..TOTAL_HOLES)
        .filter(move |&hole| side.owns(hole))
        .flat_map(|hole| SeedColor::ALL.into_iter().map(move |color| Move::new(hole, color)))
        .filter(move |mv| board.has_seeds(mv.hole, mv.color))
}

/// Seeds `side` would capture by playing `mv` on a scratch copy.
pub fn immediate_capture(board: &Board, side: Side, mv: Move) -> u32 {
    let mut scratch = board.clone();
    scratch.set_current_player(side);
    scratch.play(mv).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::board_with;

    #[test]
    fn test_fresh_board_has_sixteen_moves() {
        let board = Board::with_first_player(Side::One);
        let moves = legal_moves(&board, Side::One);
        assert_eq!(moves.len(), 16);
        assert!(moves.iter().all(|mv| mv.hole % 2 == 0));
        // nothing captures and every hole holds two of each, so hole order stands
        assert_eq!(moves[0], Move::new(0, SeedColor::Blue));
        assert_eq!(moves[1], Move::new(0, SeedColor::Red));
    }

    #[test]
    fn test_moves_for_the_side_not_to_move() {
        let board = Board::with_first_player(Side::One);
        let moves = legal_moves(&board, Side::Two);
        assert_eq!(moves.len(), 16);
        assert!(moves.iter().all(|mv| mv.hole % 2 == 1));
    }

    #[test]
    fn test_only_colors_present_are_offered() {
        let board = board_with(&[(0, 0, 3), (2, 5, 0), (3, 4, 4)], 0, Side::One);
        let moves = legal_moves(&board, Side::One);
        assert_eq!(moves.len(), 2);
        assert!(moves.contains(&Move::new(0, SeedColor::Red)));
        assert!(moves.contains(&Move::new(2, SeedColor::Blue)));
    }

    #[test]
    fn test_capturing_moves_come_first() {
        // 4B drops its single seed on hole 5, taking it to three seeds
        let board = board_with(&[(0, 2, 0), (2, 2, 0), (4, 1, 0), (5, 1, 1), (6, 4, 4)], 0, Side::One);
        let moves = legal_moves(&board, Side::One);
        assert_eq!(moves[0], Move::new(4, SeedColor::Blue));
        assert_eq!(immediate_capture(&board, Side::One, moves[0]), 3);
    }

    #[test]
    fn test_smaller_origins_first_on_equal_captures() {
        let board = board_with(&[(0, 5, 0), (2, 3, 0), (8, 4, 1)], 0, Side::One);
        let moves = legal_moves(&board, Side::One);
        let seeds: Vec<u8> = moves.iter().map(|mv| board.seeds(mv.hole, mv.color)).collect();
        assert_eq!(seeds, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_ordering_leaves_board_alone() {
        let board = Board::with_first_player(Side::Two);
        let before = board.clone();
        let _ = legal_moves(&board, Side::One);
        assert_eq!(board, before);
    }

    #[test]
    fn test_empty_row_has_no_moves() {
        let odd: Vec<(usize, u8, u8)> = (1..TOTAL_HOLES).step_by(2).map(|h| (h, 1, 1)).collect();
        let board = board_with(&odd, 0, Side::One);
        assert!(legal_moves(&board, Side::One).is_empty());
        assert_eq!(candidate_moves(&board, Side::Two).count(), 16);
    }
}
