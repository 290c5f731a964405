//! Full-state snapshot exchanged between LAN peers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Serialized game state, sent by the host after every change.
///
/// Moves are bare coordinates; colors are implied by position in the
/// game (even plies are Black, odd plies White).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Placed moves as `[x, y]`, oldest first
    pub history: Vec<(i32, i32)>,
    /// Redo stack as `[x, y]`; the last entry is the next to be redone
    #[serde(default)]
    pub undone_history: Vec<(i32, i32)>,
    /// 0 = Black, 1 = White
    pub current_turn: u8,
    pub winner: Option<u8>,
    /// Keyed by player index as a string, `"0"` or `"1"`
    #[serde(default)]
    pub player_names: BTreeMap<String, String>,
}

impl SyncState {
    /// History index each redo entry will occupy once redone.
    ///
    /// The bottom of the redo stack was undone first, so it sits furthest
    /// from the current end of the history.
    pub fn redo_ply(&self, redo_index: usize) -> usize {
        self.history.len() + (self.undone_history.len() - 1 - redo_index)
    }
}
