//! Gobang (five in a row) with hotseat, AI and LAN play
//!
//! Rules:
//! - 15x15 board, Black moves first
//! - A run of five or more in any direction wins
//! - No captures, no forbidden moves
//!
//! # Architecture
//!
//! - [`board`]: Board representation with bitboards
//! - [`rules`]: Win detection
//! - [`game`]: Game state, undo/redo and the sync payload
//! - [`eval`]: Window scoring heuristic
//! - [`engine`]: AI engine picking among the best-scored cells
//! - [`net`]: LAN discovery, TCP transport and the wire protocol
//! - [`sync`]: Host-authoritative synchronization
//! - [`session`]: Screen flow between the front end and the core
//! - [`ui`]: egui/eframe front end
//!
//! # Quick Start
//!
//! ```
//! use gobang::{GameMode, GameState, Pos, Stone};
//!
//! let mut game = GameState::new(GameMode::Hotseat);
//! for x in 0..5 {
//!     assert!(game.place_stone(Pos::new(x, 0)));
//!     if x < 4 {
//!         assert!(game.place_stone(Pos::new(x, 1)));
//!     }
//! }
//! assert_eq!(game.winner(), Some(Stone::Black));
//! ```

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod game;
pub mod net;
pub mod rules;
pub mod session;
pub mod sync;
pub mod ui;

// Re-export commonly used types for convenience
pub use board::{Board, Pos, Stone, BOARD_SIZE};
pub use config::Config;
pub use engine::{AIEngine, MoveResult};
pub use game::{GameMode, GameState};
pub use session::Session;
pub use sync::Coordinator;
