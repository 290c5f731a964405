//! LAN networking: peer discovery, framed TCP transport, wire protocol
//!
//! Background threads in this module never touch game state. Everything
//! they observe is pushed as a [`NetEvent`] into an `mpsc` channel that the
//! foreground drains once per frame.

pub mod discovery;
pub mod protocol;
pub mod transport;

pub use discovery::Discovery;
pub use protocol::{decode_frame, encode_frame, encode_frame_limited, FrameDecoder, NetworkMessage};
pub use transport::{NetEvent, Transport};

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use crate::error::NetError;

/// Outbound half of a peer connection.
///
/// [`Transport`] is the real implementation; tests substitute a recorder.
pub trait PeerLink: Send {
    /// Send one message to the peer.
    fn send(&mut self, message: &NetworkMessage) -> Result<(), NetError>;

    /// Tear the connection down. Must be idempotent.
    fn stop(&mut self);
}

/// This machine's LAN address, or 127.0.0.1 if it cannot be determined.
///
/// Connecting a UDP socket sends nothing; it only makes the OS pick the
/// outbound interface.
pub fn local_ip() -> IpAddr {
    let probe = || -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80))?;
        Ok(socket.local_addr()?.ip())
    };
    probe().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
