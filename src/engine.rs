//! AI engine wrapping the one-ply evaluator
//!
//! The engine owns its random source so ties between equally scored cells
//! are broken differently from game to game, while tests can seed it for
//! reproducible picks.
//!
//! # Example
//!
//! ```
//! use gobang::{AIEngine, Board, Pos, Stone};
//!
//! let mut engine = AIEngine::with_seed(42);
//! let mut board = Board::new();
//! board.place_stone(Pos::new(7, 7), Stone::Black);
//!
//! let result = engine.get_move_with_stats(&board);
//! let pos = result.best_move.expect("board has empty cells");
//! assert!(board.is_empty(pos));
//! ```

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::board::{Board, Pos};
use crate::eval;

/// Result of a move search with statistics for the debug panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    /// Chosen move, if the board had an empty cell
    pub best_move: Option<Pos>,
    /// Total score of the chosen cell
    pub score: i32,
    /// How many cells shared that score
    pub ties: usize,
    /// Time taken in milliseconds
    pub time_ms: u64,
}

/// Heuristic AI opponent.
pub struct AIEngine {
    rng: StdRng,
}

impl Default for AIEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AIEngine {
    /// Engine seeded from OS entropy
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Engine with a fixed seed, for reproducible games
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Get the best move for the given position.
    #[must_use]
    pub fn get_move(&mut self, board: &Board) -> Option<Pos> {
        self.get_move_with_stats(board).best_move
    }

    /// Score every empty cell and pick uniformly among the best.
    #[must_use]
    pub fn get_move_with_stats(&mut self, board: &Board) -> MoveResult {
        let start = Instant::now();
        let (moves, score) = eval::best_moves(board);
        let best_move = moves.choose(&mut self.rng).copied();

        tracing::debug!(?best_move, score, ties = moves.len(), "AI move selected");

        MoveResult {
            best_move,
            score,
            ties: moves.len(),
            time_ms: start.elapsed().as_millis() as u64,
        }
    }
}
