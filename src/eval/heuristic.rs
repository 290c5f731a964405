//! One-ply heuristic move evaluation
//!
//! Every empty cell is scored by sliding a five-cell window through it along
//! each axis and summing the window scores from [`super::patterns`]. The
//! cell score adds the views of both stone colors, so a cell that both
//! extends our line and blocks theirs rises to the top.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Board, Pos, Stone};
use crate::rules::{DIRECTIONS, WIN_LENGTH};

use super::patterns::window_score;

/// First of the two fixed identities summed by [`total_score`]
pub const OFFENSE: Stone = Stone::White;
/// Second of the two fixed identities summed by [`total_score`]
pub const DEFENSE: Stone = Stone::Black;

/// Score a candidate cell from the perspective of `color`.
///
/// For each axis, every window of five cells that contains `pos` and lies
/// fully on the board is scored by its stone counts. Windows that run off
/// the board are skipped.
#[must_use]
pub fn score(board: &Board, pos: Pos, color: Stone) -> i32 {
    let opponent = color.opponent();
    let mut total = 0;

    for &(dx, dy) in &DIRECTIONS {
        for start in -(WIN_LENGTH as i32 - 1)..=0 {
            let mut own = 0;
            let mut opp = 0;
            let mut cells = 0;

            for i in 0..WIN_LENGTH as i32 {
                let Some(cell) = pos.offset(dx, dy, start + i) else {
                    break;
                };
                match board.get(cell) {
                    s if s == color => own += 1,
                    s if s == opponent => opp += 1,
                    _ => {}
                }
                cells += 1;
            }

            if cells == WIN_LENGTH {
                total += window_score(own, opp);
            }
        }
    }

    total
}

/// Combined score of a cell: the offense view plus the defense view.
///
/// The two colors are fixed regardless of who is to move.
#[must_use]
pub fn total_score(board: &Board, pos: Pos) -> i32 {
    score(board, pos, OFFENSE) + score(board, pos, DEFENSE)
}

/// All empty cells sharing the highest [`total_score`], with that score.
///
/// Returns an empty list on a full board.
pub fn best_moves(board: &Board) -> (Vec<Pos>, i32) {
    let mut best_score = i32::MIN;
    let mut moves = Vec::new();

    for pos in board.empty_cells() {
        let s = total_score(board, pos);
        if s > best_score {
            best_score = s;
            moves.clear();
            moves.push(pos);
        } else if s == best_score {
            moves.push(pos);
        }
    }

    if moves.is_empty() {
        best_score = 0;
    }
    (moves, best_score)
}

/// Pick one of the best cells uniformly at random.
pub fn best_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Pos> {
    let (moves, _) = best_moves(board);
    moves.choose(rng).copied()
}
