//! Synchronization coordinator
//!
//! Owns the connection for one LAN match and is the only code that applies
//! peer messages to a [`GameState`]. The host is authoritative: it applies
//! moves and answers every change with a full [`SyncState`] snapshot, which
//! the client adopts wholesale.
//!
//! [`SyncState`]: crate::game::SyncState

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use crate::board::{Pos, Stone};
use crate::config::NetConfig;
use crate::error::NetError;
use crate::game::{GameState, MAX_NAME_CHARS};
use crate::net::{Discovery, NetEvent, NetworkMessage, PeerLink, Transport};

use super::state::{LinkEvent, LinkState};

/// Which end of the connection we are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Client,
}

/// What [`Coordinator::poll`] observed, for the screen layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncNotice {
    /// The peer connected
    Established(SocketAddr),
    /// The client adopted a snapshot from the host
    Synced,
    /// The host applied a move sent by the client
    RemoteMove(Pos),
    /// A player's name changed
    NameChanged(Stone),
    /// The connection dropped and the game was reset
    Lost(String),
}

/// LAN session driver. Lives on the foreground thread.
pub struct Coordinator {
    config: NetConfig,
    link_state: LinkState,
    role: Option<Role>,
    link: Option<Box<dyn PeerLink>>,
    scanner: Option<Discovery>,
    /// Set when a scan starts, even if the listener could not bind
    scan_started: Option<Instant>,
    beacon: Option<Discovery>,
    pending_name: Option<NetworkMessage>,
    events_tx: Sender<NetEvent>,
    events_rx: Receiver<NetEvent>,
}

impl Coordinator {
    pub fn new(config: NetConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            config,
            link_state: LinkState::Idle,
            role: None,
            link: None,
            scanner: None,
            scan_started: None,
            beacon: None,
            pending_name: None,
            events_tx,
            events_rx,
        }
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    pub fn link_state(&self) -> LinkState {
        self.link_state
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_host(&self) -> bool {
        self.role == Some(Role::Host)
    }

    pub fn is_connected(&self) -> bool {
        self.link_state == LinkState::Connected
    }

    /// Producer end of the event queue drained by [`Coordinator::poll`].
    pub fn event_sender(&self) -> Sender<NetEvent> {
        self.events_tx.clone()
    }

    // Discovery

    /// Start listening for host beacons, replacing any running scan.
    pub fn start_scan(&mut self) -> Result<(), NetError> {
        self.stop_scan();
        self.scan_started = Some(Instant::now());
        let bind = SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.config.discovery_port));
        self.scanner = Some(Discovery::listen(bind, &self.config.discovery_tag)?);
        Ok(())
    }

    pub fn stop_scan(&mut self) {
        self.scan_started = None;
        if let Some(mut scanner) = self.scanner.take() {
            scanner.stop();
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanner.is_some()
    }

    pub fn found_hosts(&self) -> Vec<IpAddr> {
        self.scanner.as_ref().map(Discovery::hosts).unwrap_or_default()
    }

    /// The scan ran for the full timeout and found nobody. The clock runs
    /// even when the listener failed to bind, so hosting stays reachable.
    pub fn scan_exhausted(&self) -> bool {
        self.scan_started
            .is_some_and(|t| t.elapsed() >= self.config.scan_timeout())
            && self.found_hosts().is_empty()
    }

    // Connection lifecycle

    /// Host a game: listen for one peer and announce ourselves.
    ///
    /// Returns the bound TCP address.
    pub fn host(&mut self) -> Result<SocketAddr, NetError> {
        self.link_state = self.next_state(LinkEvent::HostRequested, "host")?;
        self.stop_scan();
        self.drain_events();

        let bind = SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.config.tcp_port));
        let started = Transport::host(bind, &self.config, self.events_tx.clone()).and_then(|transport| {
            let target = SocketAddr::new(self.config.broadcast_addr, self.config.discovery_port);
            let beacon = Discovery::beacon(
                target,
                self.config.discovery_interval(),
                &self.config.discovery_tag,
            )?;
            Ok((transport, beacon))
        });

        match started {
            Ok((transport, beacon)) => {
                let addr = transport.local_addr();
                self.link = Some(Box::new(transport));
                self.beacon = Some(beacon);
                self.role = Some(Role::Host);
                tracing::info!(%addr, "hosting LAN game");
                Ok(addr)
            }
            Err(e) => {
                self.start_failed();
                tracing::warn!(error = %e, "failed to host");
                Err(e)
            }
        }
    }

    /// Join the host at `addr`.
    pub fn join(&mut self, addr: SocketAddr) -> Result<(), NetError> {
        self.link_state = self.next_state(LinkEvent::JoinRequested, "join")?;
        self.stop_scan();
        self.drain_events();

        match Transport::connect(addr, &self.config, self.events_tx.clone()) {
            Ok(transport) => {
                self.link = Some(Box::new(transport));
                self.role = Some(Role::Client);
                tracing::info!(%addr, "joining LAN game");
                Ok(())
            }
            Err(e) => {
                self.start_failed();
                tracing::warn!(%addr, error = %e, "failed to join");
                Err(e)
            }
        }
    }

    /// Join a discovered host on the configured TCP port.
    pub fn join_host(&mut self, ip: IpAddr) -> Result<(), NetError> {
        self.join(SocketAddr::new(ip, self.config.tcp_port))
    }

    /// Use an already running link. The link's events must go to
    /// [`Coordinator::event_sender`].
    pub fn attach(&mut self, role: Role, link: Box<dyn PeerLink>) -> Result<(), NetError> {
        let event = match role {
            Role::Host => LinkEvent::HostRequested,
            Role::Client => LinkEvent::JoinRequested,
        };
        self.link_state = self.next_state(event, "attach")?;
        self.link = Some(link);
        self.role = Some(role);
        Ok(())
    }

    /// Stop networking and return to idle. Safe to call more than once.
    pub fn stop(&mut self) {
        self.teardown();
        self.stop_scan();
        self.role = None;
        if let Some(idle) = self.link_state.on_event(LinkEvent::StopRequested) {
            self.link_state = idle;
        }
    }

    // Foreground tick

    /// Apply everything the network threads reported since the last call.
    pub fn poll(&mut self, game: &mut GameState) -> Vec<SyncNotice> {
        let mut notices = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                NetEvent::Established(peer) => self.on_established(game, peer, &mut notices),
                NetEvent::Message(message) => self.on_message(game, message, &mut notices),
                NetEvent::Lost(reason) => self.on_lost(game, reason, &mut notices),
            }
        }
        notices
    }

    // Outbound

    /// Place a stone for the local player and tell the peer.
    ///
    /// A client places optimistically and sends the move; the host's next
    /// snapshot settles it either way.
    pub fn place_local(&mut self, game: &mut GameState, pos: Pos) -> bool {
        if !game.place_stone(pos) {
            return false;
        }
        if self.is_connected() {
            match self.role {
                Some(Role::Host) => self.broadcast_state(game),
                Some(Role::Client) => {
                    self.send(&NetworkMessage::Move {
                        x: i32::from(pos.x),
                        y: i32::from(pos.y),
                    });
                }
                None => {}
            }
        }
        true
    }

    /// Set a name locally and announce it. Held until the peer connects.
    pub fn send_name(&mut self, game: &mut GameState, color: Stone, name: impl Into<String>) {
        let name = name.into();
        if name.chars().count() > MAX_NAME_CHARS {
            tracing::warn!(len = name.len(), "name too long, not sent");
            return;
        }
        game.set_name(color, name.clone());
        let Some(player_index) = color.index() else {
            return;
        };

        let message = NetworkMessage::NameUpdate { player_index, name };
        if self.is_connected() {
            self.send(&message);
        } else if self.link_state.is_active() {
            self.pending_name = Some(message);
        }
    }

    /// Restart the match. Only the host may; returns whether it did.
    pub fn restart(&mut self, game: &mut GameState) -> bool {
        match self.role {
            Some(Role::Host) => {
                game.reset();
                if self.is_connected() {
                    self.broadcast_state(game);
                }
                tracing::info!("host restarted the game");
                true
            }
            Some(Role::Client) => {
                tracing::info!("only the host can restart a LAN game");
                false
            }
            None => false,
        }
    }

    // Event handlers

    fn on_established(&mut self, game: &GameState, peer: SocketAddr, notices: &mut Vec<SyncNotice>) {
        let Some(next) = self.link_state.on_event(LinkEvent::Established) else {
            tracing::warn!(%peer, state = self.link_state.label(), "unexpected connection, ignoring");
            return;
        };
        self.link_state = next;
        tracing::info!(%peer, role = ?self.role, "peer connected");

        if self.is_host() {
            if let Some(mut beacon) = self.beacon.take() {
                beacon.stop();
            }
            self.broadcast_state(game);
        }
        if let Some(message) = self.pending_name.take() {
            self.send(&message);
        }
        notices.push(SyncNotice::Established(peer));
    }

    fn on_message(&mut self, game: &mut GameState, message: NetworkMessage, notices: &mut Vec<SyncNotice>) {
        if !self.is_connected() {
            tracing::warn!(kind = message.kind(), "message outside a connection, ignoring");
            return;
        }

        match (self.role, message) {
            (Some(Role::Host), NetworkMessage::Move { x, y }) => match Pos::try_new(x, y) {
                Some(pos) if game.place_stone(pos) => {
                    tracing::debug!(x, y, "applied peer move");
                    self.broadcast_state(game);
                    notices.push(SyncNotice::RemoteMove(pos));
                }
                _ => {
                    tracing::warn!(x, y, "rejected peer move");
                    // Undo the client's optimistic stone
                    self.broadcast_state(game);
                }
            },
            (Some(Role::Client), NetworkMessage::SyncState { state }) => {
                match game.apply_sync_state(&state) {
                    Ok(()) => notices.push(SyncNotice::Synced),
                    Err(e) => tracing::warn!(error = %e, "rejected snapshot from host"),
                }
            }
            (role, NetworkMessage::NameUpdate { player_index, name }) => {
                let Some(color) = Stone::from_index(player_index) else {
                    tracing::warn!(player_index, "name update for unknown player");
                    return;
                };
                if name.chars().count() > MAX_NAME_CHARS {
                    tracing::warn!(player_index, len = name.len(), "peer name too long, ignoring");
                    return;
                }
                tracing::debug!(player_index, %name, "peer renamed");
                game.set_name(color, name);
                notices.push(SyncNotice::NameChanged(color));
                if role == Some(Role::Host) {
                    self.broadcast_state(game);
                }
            }
            (role, message) => {
                tracing::warn!(?role, kind = message.kind(), "unexpected message for role, ignoring");
            }
        }
    }

    fn on_lost(&mut self, game: &mut GameState, reason: String, notices: &mut Vec<SyncNotice>) {
        let Some(lost) = self.link_state.on_event(LinkEvent::Dropped) else {
            tracing::debug!(%reason, "stale loss event ignored");
            return;
        };
        tracing::warn!(%reason, "connection lost");
        self.teardown();
        self.link_state = lost;
        self.role = None;
        game.reset();
        notices.push(SyncNotice::Lost(reason));
    }

    // Helpers

    fn next_state(&self, event: LinkEvent, action: &'static str) -> Result<LinkState, NetError> {
        self.link_state.on_event(event).ok_or(NetError::InvalidState {
            action,
            state: self.link_state.label(),
        })
    }

    fn start_failed(&mut self) {
        self.link_state = self
            .link_state
            .on_event(LinkEvent::StartFailed)
            .unwrap_or(LinkState::Idle);
        self.role = None;
    }

    fn broadcast_state(&mut self, game: &GameState) {
        let message = NetworkMessage::SyncState {
            state: game.to_sync_state(),
        };
        self.send(&message);
    }

    /// Send to the peer. A failure is turned into a loss event for the
    /// next poll.
    fn send(&mut self, message: &NetworkMessage) -> bool {
        let Some(link) = self.link.as_mut() else {
            return false;
        };
        match link.send(message) {
            Ok(()) => true,
            // Refused before writing; the stream is still good
            Err(e @ NetError::FrameTooLarge { .. }) => {
                tracing::error!(kind = message.kind(), error = %e, "message not sent");
                false
            }
            Err(e) => {
                tracing::error!(kind = message.kind(), error = %e, "send failed");
                let _ = self.events_tx.send(NetEvent::Lost(e.to_string()));
                false
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.stop();
        }
        if let Some(mut beacon) = self.beacon.take() {
            beacon.stop();
        }
        self.pending_name = None;
        self.drain_events();
    }

    fn drain_events(&mut self) {
        while self.events_rx.try_recv().is_ok() {}
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}
