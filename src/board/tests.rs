use super::*;

#[test]
fn test_stone_opponent() {
    assert_eq!(Stone::Black.opponent(), Stone::White);
    assert_eq!(Stone::White.opponent(), Stone::Black);
    assert_eq!(Stone::Empty.opponent(), Stone::Empty);
}

#[test]
fn test_stone_index_mapping() {
    assert_eq!(Stone::Black.index(), Some(0));
    assert_eq!(Stone::White.index(), Some(1));
    assert_eq!(Stone::Empty.index(), None);
    assert_eq!(Stone::from_index(0), Some(Stone::Black));
    assert_eq!(Stone::from_index(1), Some(Stone::White));
    assert_eq!(Stone::from_index(2), None);
}

#[test]
fn test_stone_for_ply() {
    assert_eq!(Stone::for_ply(0), Stone::Black);
    assert_eq!(Stone::for_ply(1), Stone::White);
    assert_eq!(Stone::for_ply(6), Stone::Black);
}

#[test]
fn test_pos_new() {
    let pos = Pos::new(7, 3);
    assert_eq!(pos.x, 7);
    assert_eq!(pos.y, 3);
}

#[test]
fn test_pos_conversion() {
    let pos = Pos::new(7, 7); // Center
    assert_eq!(pos.to_index(), 7 * 15 + 7);
    assert_eq!(pos.to_index(), 112);

    let pos2 = Pos::from_index(112);
    assert_eq!(pos2, Pos::new(7, 7));

    // x is the column, y the row
    assert_eq!(Pos::from_index(16), Pos::new(1, 1));
    assert_eq!(Pos::new(3, 0).to_index(), 3);
}

#[test]
fn test_pos_validity() {
    assert!(Pos::is_valid(0, 0));
    assert!(Pos::is_valid(14, 14));
    assert!(!Pos::is_valid(-1, 0));
    assert!(!Pos::is_valid(0, -1));
    assert!(!Pos::is_valid(15, 0));
    assert!(!Pos::is_valid(0, 15));
    assert_eq!(Pos::try_new(15, 2), None);
    assert_eq!(Pos::try_new(2, 14), Some(Pos::new(2, 14)));
}

#[test]
fn test_pos_offset() {
    let pos = Pos::new(1, 1);
    assert_eq!(pos.offset(1, 0, 2), Some(Pos::new(3, 1)));
    assert_eq!(pos.offset(-1, -1, 1), Some(Pos::new(0, 0)));
    assert_eq!(pos.offset(-1, 0, 2), None);
}

#[test]
fn test_board_constants() {
    assert_eq!(BOARD_SIZE, 15);
    assert_eq!(TOTAL_CELLS, 225);
    assert_eq!(Pos::all().count(), TOTAL_CELLS);
}

#[test]
fn test_pos_ordering() {
    let pos1 = Pos::new(0, 0);
    let pos2 = Pos::new(1, 0);
    let pos3 = Pos::new(0, 1);

    assert!(pos1 < pos2);
    assert!(pos2 < pos3);
}

#[test]
fn test_board_place_and_remove() {
    let mut board = Board::new();
    let pos = Pos::new(4, 9);
    assert!(board.is_empty(pos));
    board.place_stone(pos, Stone::White);
    assert_eq!(board.get(pos), Stone::White);
    assert_eq!(board.stone_count(), 1);
    assert_eq!(board.empty_cells().count(), TOTAL_CELLS - 1);

    board.remove_stone(pos);
    assert!(board.is_board_empty());
}

#[test]
fn test_board_place_empty_is_noop() {
    let mut board = Board::new();
    board.place_stone(Pos::new(0, 0), Stone::Empty);
    assert!(board.is_board_empty());
}
