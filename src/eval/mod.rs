//! Move evaluation for the AI opponent
//!
//! - [`patterns`]: window score table
//! - [`heuristic`]: per-cell scoring and best-move selection

pub mod heuristic;
pub mod patterns;

pub use heuristic::{best_move, best_moves, score, total_score, DEFENSE, OFFENSE};
pub use patterns::{window_score, WindowScore};
