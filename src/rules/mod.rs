//! Game rules for Gobang
//!
//! Plain five-in-a-row: no captures, no forbidden moves, overlines win.

pub mod win;

// Re-exports for convenient access
pub use win::{
    find_five_line_at_pos, has_five_at_pos, max_run_at, run_length, DIRECTIONS, WIN_LENGTH,
};
