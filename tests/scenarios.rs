use awale::board::{TOTAL_HOLES, TOTAL_SEEDS};
use awale::{Board, EndReason, Hole, Move, Outcome, SeedColor, Side};

#[test]
fn opening_blue_sow_from_first_hole() {
    let mut board = Board::with_first_player(Side::One);
    assert_eq!(board.seeds_on_board(), TOTAL_SEEDS);

    let captured = board.play(Move::new(0, SeedColor::Blue)).unwrap();

    assert_eq!(captured, 0);
    assert_eq!(board.seeds(0, SeedColor::Blue), 0);
    assert_eq!(board.hole_total(1), 5);
    assert_eq!(board.hole_total(2), 5);
    for hole in 3..TOTAL_HOLES {
        assert_eq!(board.hole_total(hole), 4);
    }
    assert_eq!(board.captured(Side::One), 0);
    assert_eq!(board.captured(Side::Two), 0);
    assert_eq!(board.seeds_on_board(), TOTAL_SEEDS);
}

#[test]
fn stuck_player_one_loses_the_rest_of_the_board() {
    let mut holes = [Hole::default(); TOTAL_HOLES];
    for hole in (1..TOTAL_HOLES).step_by(2) {
        holes[hole] = Hole::new(1, 2);
    }
    let mut board = Board::from_parts(holes, [20, 20], Side::One).unwrap();

    let status = board.check_game_status();

    assert!(status.is_over());
    assert_eq!(status.winner, Some(Outcome::Winner(Side::Two)));
    assert_eq!(status.reason, Some(EndReason::NoLegalMoves));
    assert_eq!(board.seeds_on_board(), 0);
    assert_eq!(board.captured(Side::Two), 44);
    assert_eq!(board.captured(Side::One), 20);
}

#[test]
fn refused_move_changes_nothing() {
    let mut board = Board::with_first_player(Side::Two);
    let before = board.clone();
    assert!(board.play(Move::new(0, SeedColor::Red)).is_err());
    assert!(board.play(Move::new(20, SeedColor::Red)).is_err());
    assert_eq!(board, before);
}
