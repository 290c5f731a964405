//! Wire protocol: newline-delimited JSON messages
//!
//! ```text
//! {"type":"move","x":7,"y":7}
//! {"type":"sync_state","state":{...}}
//! {"type":"name_update","player_index":0,"name":"Stella"}
//! ```
//!
//! Compact JSON never contains a raw newline (newlines inside strings are
//! escaped), so `\n` is a safe frame terminator.

use serde::{Deserialize, Serialize};

use crate::error::NetError;
use crate::game::SyncState;

/// Every message two peers can exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetworkMessage {
    /// Client asks the host to place a stone for the side to move
    Move { x: i32, y: i32 },
    /// Host replaces the client's whole game state
    SyncState { state: SyncState },
    /// A peer announces the name for its slot (0 = Black, 1 = White)
    NameUpdate { player_index: u8, name: String },
}

impl NetworkMessage {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            NetworkMessage::Move { .. } => "move",
            NetworkMessage::SyncState { .. } => "sync_state",
            NetworkMessage::NameUpdate { .. } => "name_update",
        }
    }
}

/// Encode a message as one frame, terminator included.
pub fn encode_frame(message: &NetworkMessage) -> Result<Vec<u8>, NetError> {
    let mut frame = serde_json::to_vec(message).map_err(NetError::Encode)?;
    frame.push(b'\n');
    Ok(frame)
}

/// Like [`encode_frame`], but refuses a frame the peer's [`FrameDecoder`]
/// would drop. The limit excludes the terminator.
pub fn encode_frame_limited(message: &NetworkMessage, max_frame_bytes: usize) -> Result<Vec<u8>, NetError> {
    let frame = encode_frame(message)?;
    if frame.len() - 1 > max_frame_bytes {
        return Err(NetError::FrameTooLarge {
            limit: max_frame_bytes,
        });
    }
    Ok(frame)
}

/// Decode one frame. A trailing terminator is tolerated.
pub fn decode_frame(frame: &[u8]) -> Result<NetworkMessage, NetError> {
    let frame = frame.strip_suffix(b"\n").unwrap_or(frame);
    let frame = frame.strip_suffix(b"\r").unwrap_or(frame);
    serde_json::from_slice(frame).map_err(NetError::Decode)
}

/// Reassembles frames from arbitrary stream chunks.
///
/// A frame longer than the limit is reported once and then skipped up to
/// its terminator; the frames after it decode normally.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    max_frame_bytes: usize,
    discarding: bool,
}

impl FrameDecoder {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_frame_bytes,
            discarding: false,
        }
    }

    /// Bytes of an incomplete frame held so far
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Feed a chunk; returns one result per frame it completed.
    pub fn push(&mut self, mut data: &[u8]) -> Vec<Result<NetworkMessage, NetError>> {
        let mut out = Vec::new();

        while !data.is_empty() {
            let Some(end) = data.iter().position(|&b| b == b'\n') else {
                if !self.discarding {
                    if self.buf.len() + data.len() > self.max_frame_bytes {
                        self.buf.clear();
                        self.discarding = true;
                        out.push(Err(self.too_large()));
                    } else {
                        self.buf.extend_from_slice(data);
                    }
                }
                break;
            };

            let line = &data[..end];
            data = &data[end + 1..];

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if self.buf.len() + line.len() > self.max_frame_bytes {
                self.buf.clear();
                out.push(Err(self.too_large()));
                continue;
            }

            self.buf.extend_from_slice(line);
            let frame = std::mem::take(&mut self.buf);
            if frame.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            out.push(decode_frame(&frame));
        }

        out
    }

    fn too_large(&self) -> NetError {
        NetError::FrameTooLarge {
            limit: self.max_frame_bytes,
        }
    }
}
