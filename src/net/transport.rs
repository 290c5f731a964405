//! TCP transport between exactly two peers
//!
//! One background thread per connection. On the host it first polls a
//! non-blocking listener for the single peer, then becomes the receive loop.
//! A client connects synchronously and spawns the receive loop.
//!
//! The worker reports through [`NetEvent`]s and never touches game state.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::NetConfig;
use crate::error::NetError;

use super::protocol::{encode_frame_limited, FrameDecoder, NetworkMessage};
use super::PeerLink;

const READ_CHUNK: usize = 4096;

/// What the transport thread reports to the foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    /// The peer is connected
    Established(SocketAddr),
    /// A decoded message from the peer
    Message(NetworkMessage),
    /// The connection ended while it was in use
    Lost(String),
}

/// One side of a two-peer TCP connection.
pub struct Transport {
    running: Arc<AtomicBool>,
    stream: Arc<Mutex<Option<TcpStream>>>,
    local_addr: SocketAddr,
    max_frame_bytes: usize,
    worker: Option<JoinHandle<()>>,
}

impl Transport {
    /// Bind `bind` and wait in the background for one peer.
    pub fn host(bind: SocketAddr, config: &NetConfig, events: Sender<NetEvent>) -> Result<Self, NetError> {
        let listener = TcpListener::bind(bind).map_err(|source| NetError::Bind { addr: bind, source })?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        let running = Arc::new(AtomicBool::new(true));
        let stream: Arc<Mutex<Option<TcpStream>>> = Arc::default();
        let poll = config.accept_poll();
        let max_frame = config.max_frame_bytes;

        let worker = {
            let running = running.clone();
            let shared = stream.clone();
            thread::spawn(move || {
                let Some((peer, reader)) = accept_one(&listener, &running, &shared, poll, &events) else {
                    return;
                };
                drop(listener);
                tracing::info!(%peer, "peer connected");
                if events.send(NetEvent::Established(peer)).is_err() {
                    return;
                }
                receive_loop(reader, &running, &events, max_frame);
            })
        };

        tracing::info!(%local_addr, "hosting, waiting for a peer");
        Ok(Self {
            running,
            stream,
            local_addr,
            max_frame_bytes: max_frame,
            worker: Some(worker),
        })
    }

    /// Connect to a host and start receiving.
    pub fn connect(addr: SocketAddr, config: &NetConfig, events: Sender<NetEvent>) -> Result<Self, NetError> {
        let reader = TcpStream::connect_timeout(&addr, config.connect_timeout())
            .map_err(|source| NetError::Connect { addr, source })?;
        reader.set_nodelay(true)?;
        let local_addr = reader.local_addr()?;
        let writer = reader.try_clone()?;

        let running = Arc::new(AtomicBool::new(true));
        let stream = Arc::new(Mutex::new(Some(writer)));
        let max_frame = config.max_frame_bytes;

        tracing::info!(%addr, "connected to host");
        // Queued before the worker can report anything else
        let _ = events.send(NetEvent::Established(addr));

        let worker = {
            let running = running.clone();
            thread::spawn(move || receive_loop(reader, &running, &events, max_frame))
        };

        Ok(Self {
            running,
            stream,
            local_addr,
            max_frame_bytes: max_frame,
            worker: Some(worker),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// True until stopped, or until the connection fails.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Write one framed message.
    pub fn send(&self, message: &NetworkMessage) -> Result<(), NetError> {
        if !self.is_running() {
            return Err(NetError::NotConnected);
        }
        // The peer drops frames over its limit; refuse them here instead
        let frame = encode_frame_limited(message, self.max_frame_bytes)?;

        let mut guard = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(stream) = guard.as_mut() else {
            return Err(NetError::NotConnected);
        };
        if let Err(e) = stream.write_all(&frame).and_then(|()| stream.flush()) {
            self.running.store(false, Ordering::SeqCst);
            return Err(NetError::Io(e));
        }
        tracing::debug!(kind = message.kind(), bytes = frame.len(), "sent message");
        Ok(())
    }

    /// Close the socket and join the worker. Safe to call more than once.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(stream) = self.stream.lock().unwrap_or_else(PoisonError::into_inner).take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("transport worker panicked");
            }
            tracing::info!("transport stopped");
        }
    }
}

impl PeerLink for Transport {
    fn send(&mut self, message: &NetworkMessage) -> Result<(), NetError> {
        Transport::send(self, message)
    }

    fn stop(&mut self) {
        Transport::stop(self);
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Poll for the single peer. Returns the reading half, after publishing the
/// writing half in `shared`.
fn accept_one(
    listener: &TcpListener,
    running: &AtomicBool,
    shared: &Mutex<Option<TcpStream>>,
    poll: Duration,
    events: &Sender<NetEvent>,
) -> Option<(SocketAddr, TcpStream)> {
    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                let setup = stream
                    .set_nonblocking(false)
                    .and_then(|()| stream.set_nodelay(true))
                    .and_then(|()| stream.try_clone());
                let writer = match setup {
                    Ok(writer) => writer,
                    Err(e) => {
                        tracing::warn!(%peer, error = %e, "failed to set up accepted connection");
                        continue;
                    }
                };

                let mut slot = shared.lock().unwrap_or_else(PoisonError::into_inner);
                // A stop that raced the accept must still close this socket
                if !running.load(Ordering::SeqCst) {
                    let _ = stream.shutdown(Shutdown::Both);
                    return None;
                }
                *slot = Some(writer);
                return Some((peer, stream));
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(poll),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                if running.swap(false, Ordering::SeqCst) {
                    tracing::warn!(error = %e, "accept failed");
                    let _ = events.send(NetEvent::Lost(e.to_string()));
                }
                return None;
            }
        }
    }
    None
}

/// Read frames until the peer closes or the socket fails.
///
/// `Lost` is only reported if nobody asked us to stop.
fn receive_loop(mut stream: TcpStream, running: &AtomicBool, events: &Sender<NetEvent>, max_frame: usize) {
    let mut decoder = FrameDecoder::new(max_frame);
    let mut buf = [0u8; READ_CHUNK];

    let reason = loop {
        match stream.read(&mut buf) {
            Ok(0) => break "connection closed by peer".to_string(),
            Ok(n) => {
                for result in decoder.push(&buf[..n]) {
                    match result {
                        Ok(message) => {
                            tracing::debug!(kind = message.kind(), "received message");
                            if events.send(NetEvent::Message(message)).is_err() {
                                return;
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "dropping malformed frame"),
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => break e.to_string(),
        }
    };

    if running.swap(false, Ordering::SeqCst) {
        tracing::info!(%reason, "connection lost");
        let _ = events.send(NetEvent::Lost(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::mpsc::{self, Receiver};

    fn test_config() -> NetConfig {
        NetConfig {
            accept_poll_ms: 5,
            max_frame_bytes: 1024,
            ..NetConfig::default()
        }
    }

    fn loopback() -> SocketAddr {
        (Ipv4Addr::LOCALHOST, 0).into()
    }

    fn next(rx: &Receiver<NetEvent>) -> NetEvent {
        rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    fn pair() -> (Transport, Receiver<NetEvent>, Transport, Receiver<NetEvent>) {
        let (host_tx, host_rx) = mpsc::channel();
        let (client_tx, client_rx) = mpsc::channel();
        let host = Transport::host(loopback(), &test_config(), host_tx).unwrap();
        let client = Transport::connect(host.local_addr(), &test_config(), client_tx).unwrap();
        assert!(matches!(next(&host_rx), NetEvent::Established(_)));
        assert_eq!(next(&client_rx), NetEvent::Established(host.local_addr()));
        (host, host_rx, client, client_rx)
    }

    #[test]
    fn test_exchange_both_ways() {
        let (host, host_rx, client, client_rx) = pair();

        client.send(&NetworkMessage::Move { x: 7, y: 7 }).unwrap();
        assert_eq!(next(&host_rx), NetEvent::Message(NetworkMessage::Move { x: 7, y: 7 }));

        let name = NetworkMessage::NameUpdate {
            player_index: 0,
            name: "Stella".into(),
        };
        host.send(&name).unwrap();
        assert_eq!(next(&client_rx), NetEvent::Message(name));
    }

    #[test]
    fn test_host_send_before_peer_fails() {
        let (tx, _rx) = mpsc::channel();
        let host = Transport::host(loopback(), &test_config(), tx).unwrap();
        assert!(matches!(
            host.send(&NetworkMessage::Move { x: 0, y: 0 }),
            Err(NetError::NotConnected)
        ));
    }

    #[test]
    fn test_split_and_malformed_frames() {
        let (tx, rx) = mpsc::channel();
        let host = Transport::host(loopback(), &test_config(), tx).unwrap();
        let mut raw = TcpStream::connect(host.local_addr()).unwrap();
        assert!(matches!(next(&rx), NetEvent::Established(_)));

        raw.write_all(b"{\"type\":\"move\",").unwrap();
        raw.flush().unwrap();
        thread::sleep(Duration::from_millis(50));
        raw.write_all(b"\"x\":3,\"y\":4}\n{garbage}\n").unwrap();
        raw.write_all(b"{\"type\":\"move\",\"x\":5,\"y\":6}\n").unwrap();

        assert_eq!(next(&rx), NetEvent::Message(NetworkMessage::Move { x: 3, y: 4 }));
        // The garbage frame is dropped, the stream keeps going
        assert_eq!(next(&rx), NetEvent::Message(NetworkMessage::Move { x: 5, y: 6 }));
    }

    #[test]
    fn test_oversized_frame_skipped() {
        let (tx, rx) = mpsc::channel();
        let host = Transport::host(loopback(), &test_config(), tx).unwrap();
        let mut raw = TcpStream::connect(host.local_addr()).unwrap();
        assert!(matches!(next(&rx), NetEvent::Established(_)));

        let mut bytes = vec![b'a'; 3000];
        bytes.push(b'\n');
        bytes.extend(b"{\"type\":\"move\",\"x\":1,\"y\":1}\n");
        raw.write_all(&bytes).unwrap();

        assert_eq!(next(&rx), NetEvent::Message(NetworkMessage::Move { x: 1, y: 1 }));
    }

    #[test]
    fn test_send_refuses_frame_over_limit() {
        let (host, _host_rx, _client, client_rx) = pair();

        let huge = NetworkMessage::NameUpdate {
            player_index: 0,
            name: "x".repeat(2000),
        };
        assert!(matches!(host.send(&huge), Err(NetError::FrameTooLarge { limit: 1024 })));
        assert!(host.is_running());

        host.send(&NetworkMessage::Move { x: 3, y: 4 }).unwrap();
        assert_eq!(next(&client_rx), NetEvent::Message(NetworkMessage::Move { x: 3, y: 4 }));
    }

    #[test]
    fn test_peer_close_reports_lost() {
        let (mut host, host_rx, mut client, client_rx) = pair();

        client.stop();
        assert!(matches!(next(&host_rx), NetEvent::Lost(_)));
        assert!(!host.is_running());
        // Local stop is not a loss
        assert!(client_rx.recv_timeout(Duration::from_millis(200)).is_err());
        host.stop();
    }

    #[test]
    fn test_stop_idempotent_without_peer() {
        let (tx, rx) = mpsc::channel();
        let mut host = Transport::host(loopback(), &test_config(), tx).unwrap();
        host.stop();
        host.stop();
        assert!(!host.is_running());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_connect_refused() {
        // Grab a free port, then close it
        let addr = TcpListener::bind(loopback()).unwrap().local_addr().unwrap();
        let (tx, _rx) = mpsc::channel();
        let result = Transport::connect(addr, &test_config(), tx);
        assert!(matches!(result, Err(NetError::Connect { .. })));
    }

    #[test]
    fn test_send_after_stop_fails() {
        let (_host, _host_rx, mut client, _client_rx) = pair();
        client.stop();
        assert!(matches!(
            client.send(&NetworkMessage::Move { x: 0, y: 0 }),
            Err(NetError::NotConnected)
        ));
    }
}
