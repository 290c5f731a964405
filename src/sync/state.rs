//! Connection lifecycle as a pure state machine
//!
//! No I/O happens here. The coordinator feeds in what happened and acts on
//! the state it gets back, so the lifecycle can be tested without sockets.

/// Where the LAN connection stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No connection, nothing pending
    #[default]
    Idle,
    /// Hosting, waiting for a peer
    Listening,
    /// Connected to a host, waiting for the worker to confirm
    Connecting,
    /// Peer connected; messages flow
    Connected,
    /// The connection dropped; torn down until the next host or join
    Lost,
}

/// Inputs to [`LinkState::on_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    HostRequested,
    JoinRequested,
    StartFailed,
    Established,
    Dropped,
    StopRequested,
}

impl LinkState {
    /// Next state, or `None` if the event is not valid here.
    pub fn on_event(self, event: LinkEvent) -> Option<LinkState> {
        use LinkEvent::*;
        use LinkState::*;

        match (self, event) {
            (Idle | Lost, HostRequested) => Some(Listening),
            (Idle | Lost, JoinRequested) => Some(Connecting),
            (Listening | Connecting, StartFailed) => Some(Idle),
            (Listening | Connecting, Established) => Some(Connected),
            (Listening | Connecting | Connected, Dropped) => Some(Lost),
            (_, StopRequested) => Some(Idle),
            _ => None,
        }
    }

    /// A transport exists in this state.
    pub fn is_active(self) -> bool {
        matches!(self, LinkState::Listening | LinkState::Connecting | LinkState::Connected)
    }

    pub fn label(self) -> &'static str {
        match self {
            LinkState::Idle => "idle",
            LinkState::Listening => "listening",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
            LinkState::Lost => "lost",
        }
    }
}
