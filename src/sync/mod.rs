//! Host-authoritative game synchronization
//!
//! - [`state`]: connection lifecycle state machine
//! - [`coordinator`]: applies peer messages to the game and answers them

pub mod coordinator;
pub mod state;

pub use coordinator::{Coordinator, Role, SyncNotice};
pub use state::{LinkEvent, LinkState};
