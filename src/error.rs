//! Error types for Gobang.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Errors raised while validating a received state snapshot.
///
/// A snapshot that fails validation is dropped as a whole; the local state
/// is never partially overwritten.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("coordinate ({x}, {y}) is off the board")]
    OutOfBounds { x: i32, y: i32 },

    #[error("cell ({x}, {y}) appears more than once in the snapshot")]
    DuplicateCell { x: i32, y: i32 },

    #[error("invalid turn index {0}")]
    InvalidTurn(u8),

    #[error("invalid winner index {0}")]
    InvalidWinner(u8),

    #[error("invalid player key {0:?}")]
    InvalidPlayer(String),

    #[error("player name longer than {limit} characters")]
    NameTooLong { limit: usize },
}

/// Errors from the network layer (discovery and transport).
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("frame exceeds {limit} bytes")]
    FrameTooLarge { limit: usize },

    #[error("not connected")]
    NotConnected,

    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_display() {
        let err = SyncError::OutOfBounds { x: 15, y: -1 };
        assert_eq!(err.to_string(), "coordinate (15, -1) is off the board");
    }

    #[test]
    fn test_net_error_display() {
        let err = NetError::InvalidState {
            action: "host",
            state: "connected",
        };
        assert_eq!(err.to_string(), "cannot host while connected");
        assert_eq!(NetError::NotConnected.to_string(), "not connected");
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncError>();
        assert_send_sync::<NetError>();
        assert_send_sync::<ConfigError>();
    }
}
