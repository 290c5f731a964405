//! Win condition checking for Gobang
//!
//! A player wins by making a contiguous run of five or more stones along any
//! of the four axes. Overlines count; gaps break a run.

use crate::board::{Board, Pos, Stone};

/// Stones needed in a row to win
pub const WIN_LENGTH: usize = 5;

/// Direction vectors for line checking (4 directions)
pub const DIRECTIONS: [(i32, i32); 4] = [
    (1, 0),  // Horizontal
    (0, 1),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal NE
];

/// Count same-colored stones from `pos` (exclusive) along `(dx, dy)`.
#[inline]
fn count_direction(board: &Board, pos: Pos, dx: i32, dy: i32, color: Stone) -> usize {
    let mut count = 0;
    let mut step = 1;
    while let Some(next) = pos.offset(dx, dy, step) {
        if board.get(next) != color {
            break;
        }
        count += 1;
        step += 1;
    }
    count
}

/// Length of the contiguous run of `color` through `pos` along one axis.
///
/// `pos` itself is counted whether or not it is occupied, which lets callers
/// ask "what run would a stone here make".
#[inline]
pub fn run_length(board: &Board, pos: Pos, dx: i32, dy: i32, color: Stone) -> usize {
    1 + count_direction(board, pos, dx, dy, color) + count_direction(board, pos, -dx, -dy, color)
}

/// Longest run through `pos` over the four axes, using the stone at `pos`.
/// An empty cell has run length 0.
pub fn max_run_at(board: &Board, pos: Pos) -> usize {
    let color = board.get(pos);
    if color == Stone::Empty {
        return 0;
    }
    DIRECTIONS
        .iter()
        .map(|&(dx, dy)| run_length(board, pos, dx, dy, color))
        .max()
        .unwrap_or(0)
}

/// Five-in-a-row check at a specific position.
///
/// Only checks the 4 axes through `pos`, for the color occupying it.
#[inline]
pub fn has_five_at_pos(board: &Board, pos: Pos) -> bool {
    max_run_at(board, pos) >= WIN_LENGTH
}

/// Find the winning run through `pos`, if any.
///
/// Returns the full run (five or more stones) ordered from one end to the
/// other.
pub fn find_five_line_at_pos(board: &Board, pos: Pos) -> Option<Vec<Pos>> {
    let color = board.get(pos);
    if color == Stone::Empty {
        return None;
    }

    for &(dx, dy) in &DIRECTIONS {
        let back = count_direction(board, pos, -dx, -dy, color) as i32;
        let forward = count_direction(board, pos, dx, dy, color) as i32;
        if (back + forward + 1) as usize >= WIN_LENGTH {
            let line = (-back..=forward)
                .filter_map(|n| pos.offset(dx, dy, n))
                .collect();
            return Some(line);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(stones: &[(u8, u8)], color: Stone) -> Board {
        let mut board = Board::new();
        for &(x, y) in stones {
            board.place_stone(Pos::new(x, y), color);
        }
        board
    }

    #[test]
    fn test_five_in_row_horizontal() {
        let board = board_with(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)], Stone::Black);
        assert!(has_five_at_pos(&board, Pos::new(4, 0)));
        assert!(has_five_at_pos(&board, Pos::new(2, 0)));
    }

    #[test]
    fn test_five_in_row_vertical() {
        let board = board_with(&[(9, 3), (9, 4), (9, 5), (9, 6), (9, 7)], Stone::White);
        assert!(has_five_at_pos(&board, Pos::new(9, 5)));
    }

    #[test]
    fn test_five_in_row_diagonals() {
        let se: Vec<(u8, u8)> = (0..5).map(|i| (i, i)).collect();
        let board = board_with(&se, Stone::White);
        assert!(has_five_at_pos(&board, Pos::new(0, 0)));

        let ne: Vec<(u8, u8)> = (0..5).map(|i| (4 + i, 8 - i)).collect();
        let board = board_with(&ne, Stone::Black);
        assert!(has_five_at_pos(&board, Pos::new(6, 6)));
    }

    #[test]
    fn test_six_in_row_also_wins() {
        let board = board_with(&[(3, 9), (4, 9), (5, 9), (6, 9), (7, 9), (8, 9)], Stone::Black);
        assert!(has_five_at_pos(&board, Pos::new(8, 9)));
        assert_eq!(max_run_at(&board, Pos::new(5, 9)), 6);
    }

    #[test]
    fn test_four_in_row_not_win() {
        let board = board_with(&[(0, 9), (1, 9), (2, 9), (3, 9)], Stone::Black);
        assert!(!has_five_at_pos(&board, Pos::new(3, 9)));
        assert_eq!(max_run_at(&board, Pos::new(0, 9)), 4);
    }

    #[test]
    fn test_gap_breaks_run() {
        let board = board_with(&[(0, 2), (1, 2), (3, 2), (4, 2), (5, 2)], Stone::Black);
        assert!(!has_five_at_pos(&board, Pos::new(3, 2)));
        assert_eq!(max_run_at(&board, Pos::new(4, 2)), 3);
    }

    #[test]
    fn test_opponent_stone_breaks_run() {
        let mut board = board_with(&[(0, 0), (1, 0), (2, 0), (3, 0), (5, 0)], Stone::Black);
        board.place_stone(Pos::new(4, 0), Stone::White);
        assert!(!has_five_at_pos(&board, Pos::new(3, 0)));
        assert_eq!(max_run_at(&board, Pos::new(4, 0)), 1);
    }

    #[test]
    fn test_five_at_corner() {
        let line: Vec<(u8, u8)> = (0..5).map(|i| (10 + i, 10 + i)).collect();
        let board = board_with(&line, Stone::White);
        assert!(has_five_at_pos(&board, Pos::new(14, 14)));
    }

    #[test]
    fn test_empty_cell_never_wins() {
        let board = board_with(&[(0, 0), (1, 0), (3, 0), (4, 0)], Stone::Black);
        assert!(!has_five_at_pos(&board, Pos::new(2, 0)));
        assert_eq!(max_run_at(&board, Pos::new(2, 0)), 0);
        assert!(find_five_line_at_pos(&board, Pos::new(2, 0)).is_none());
    }

    #[test]
    fn test_run_length_for_hypothetical_stone() {
        let board = board_with(&[(0, 0), (1, 0), (3, 0), (4, 0)], Stone::Black);
        assert_eq!(run_length(&board, Pos::new(2, 0), 1, 0, Stone::Black), 5);
    }

    #[test]
    fn test_find_five_line_ordered() {
        let board = board_with(&[(6, 2), (6, 3), (6, 4), (6, 5), (6, 6)], Stone::Black);
        let line = find_five_line_at_pos(&board, Pos::new(6, 4)).unwrap();
        assert_eq!(
            line,
            vec![
                Pos::new(6, 2),
                Pos::new(6, 3),
                Pos::new(6, 4),
                Pos::new(6, 5),
                Pos::new(6, 6)
            ]
        );
    }
}
