//! UDP host discovery
//!
//! A host runs a beacon that broadcasts a fixed tag once per interval. A
//! joining player runs a listener that records the sender address of every
//! datagram carrying exactly that tag.

use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::NetError;

/// Listener read timeout; bounds how long a stop can go unnoticed.
pub const LISTEN_READ_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Beacon,
    Listener,
}

/// A running beacon or listener thread.
pub struct Discovery {
    kind: Kind,
    running: Arc<AtomicBool>,
    hosts: Arc<Mutex<BTreeSet<IpAddr>>>,
    local_addr: SocketAddr,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Discovery {
    /// Broadcast `tag` to `target` every `interval` until stopped.
    pub fn beacon(target: SocketAddr, interval: Duration, tag: &str) -> Result<Self, NetError> {
        let bind: SocketAddr = (Ipv4Addr::UNSPECIFIED, 0).into();
        let socket = UdpSocket::bind(bind).map_err(|source| NetError::Bind { addr: bind, source })?;
        socket.set_broadcast(true)?;
        let local_addr = socket.local_addr()?;

        let running = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let payload = tag.as_bytes().to_vec();
        let flag = running.clone();

        let handle = thread::spawn(move || {
            while flag.load(Ordering::SeqCst) {
                if let Err(e) = socket.send_to(&payload, target) {
                    tracing::warn!(%target, error = %e, "discovery beacon send failed");
                    flag.store(false, Ordering::SeqCst);
                    break;
                }
                match shutdown_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        tracing::info!(%target, "discovery beacon started");
        Ok(Self {
            kind: Kind::Beacon,
            running,
            hosts: Arc::default(),
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Listen on `bind` for datagrams equal to `tag` until stopped.
    pub fn listen(bind: SocketAddr, tag: &str) -> Result<Self, NetError> {
        let socket = UdpSocket::bind(bind).map_err(|source| NetError::Bind { addr: bind, source })?;
        socket.set_read_timeout(Some(LISTEN_READ_TIMEOUT))?;
        let local_addr = socket.local_addr()?;

        let running = Arc::new(AtomicBool::new(true));
        let hosts: Arc<Mutex<BTreeSet<IpAddr>>> = Arc::default();
        let expected = tag.as_bytes().to_vec();
        let flag = running.clone();
        let found = hosts.clone();

        let handle = thread::spawn(move || {
            let mut buf = [0u8; 1024];
            while flag.load(Ordering::SeqCst) {
                match socket.recv_from(&mut buf) {
                    Ok((n, from)) if buf[..n] == expected[..] => {
                        let mut hosts = found.lock().unwrap_or_else(PoisonError::into_inner);
                        if hosts.insert(from.ip()) {
                            tracing::info!(host = %from.ip(), "discovered host");
                        }
                    }
                    Ok((n, from)) => {
                        tracing::debug!(%from, len = n, "ignoring unrecognized datagram");
                    }
                    Err(e)
                        if matches!(
                            e.kind(),
                            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                        ) => {}
                    Err(e) => {
                        if flag.load(Ordering::SeqCst) {
                            tracing::warn!(error = %e, "discovery listener failed");
                        }
                        break;
                    }
                }
            }
        });

        tracing::info!(%local_addr, "discovery listener started");
        Ok(Self {
            kind: Kind::Listener,
            running,
            hosts,
            local_addr,
            shutdown_tx: None,
            handle: Some(handle),
        })
    }

    /// Hosts seen so far, in address order.
    pub fn hosts(&self) -> Vec<IpAddr> {
        self.hosts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the thread and wait for it. Safe to call more than once.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.running.store(false, Ordering::SeqCst);
        // Dropping the sender wakes a sleeping beacon
        self.shutdown_tx = None;
        if self.kind == Kind::Listener {
            self.wake_listener();
        }
        if handle.join().is_err() {
            tracing::error!(kind = ?self.kind, "discovery thread panicked");
        }
        tracing::info!(kind = ?self.kind, "discovery stopped");
    }

    /// Unblock a pending `recv_from` with an empty datagram.
    fn wake_listener(&self) {
        let ip = match self.local_addr.ip() {
            ip if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            ip => ip,
        };
        let target = SocketAddr::new(ip, self.local_addr.port());
        if let Ok(socket) = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)) {
            let _ = socket.send_to(&[], target);
        }
    }
}

impl Drop for Discovery {
    fn drop(&mut self) {
        self.stop();
    }
}
