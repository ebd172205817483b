use meshsync_shared::{DesyncReason, PeerId};

/// Session lifecycle notifications, drained with
/// [`Dispatcher::take_events`](crate::Dispatcher::take_events)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeerEvent {
    Connected(PeerId),
    /// The host answered our Join
    Joined(PeerId),
    Disconnected(PeerId),
    /// The session fell out of sync and was dropped. Reconnecting is up to
    /// the application.
    Desynced(PeerId, DesyncReason),
}

impl PeerEvent {
    pub fn peer(&self) -> PeerId {
        match self {
            PeerEvent::Connected(peer)
            | PeerEvent::Joined(peer)
            | PeerEvent::Disconnected(peer)
            | PeerEvent::Desynced(peer, _) => *peer,
        }
    }
}
