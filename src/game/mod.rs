//! Game state machine
//!
//! [`GameState`] owns the board, move history, redo stack, turn and winner.
//! It is pure and synchronous; the network layer only ever reaches it
//! through [`crate::sync::Coordinator`] on the foreground thread.

mod snapshot;
mod state;

pub use snapshot::SyncState;
pub use state::GameState;

use crate::board::{Pos, Stone};

/// Names shown before players pick their own
pub const DEFAULT_NAMES: [&str; 2] = ["Player 1", "Player 2"];

/// Longest player name accepted from a peer, in characters
pub const MAX_NAME_CHARS: usize = 32;

/// Game mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    /// Two humans on one machine
    #[default]
    Hotseat,
    /// Human against the heuristic AI
    VersusAi,
    /// Two humans over the LAN
    Lan,
}

impl GameMode {
    pub fn label(self) -> &'static str {
        match self {
            GameMode::Hotseat => "PvP - Hotseat",
            GameMode::VersusAi => "PvC",
            GameMode::Lan => "LAN",
        }
    }
}

/// A stone placed on the board. Ordering of moves in the history matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub pos: Pos,
    pub stone: Stone,
}

impl Move {
    pub fn new(pos: Pos, stone: Stone) -> Self {
        Self { pos, stone }
    }
}
