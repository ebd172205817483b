use meshsync_shared::{ClockSync, EventSyncState, PeerId, ReplicationConfig, SyncState};

use super::inbox::Inbox;

/// Everything this peer tracks about one remote peer
pub struct PeerSession {
    peer_id: PeerId,
    pub sync: SyncState,
    pub events: EventSyncState,
    pub clock: ClockSync,
    pub inbox: Inbox,
    joined: bool,
}

impl PeerSession {
    pub fn new(peer_id: PeerId, config: &ReplicationConfig) -> Self {
        Self {
            peer_id,
            sync: SyncState::new(),
            events: EventSyncState::new(config.event_resend_interval),
            clock: ClockSync::new(config.clock_smoothing),
            inbox: Inbox::new(),
            joined: false,
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// Whether the Join handshake with this peer has completed
    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// A (re)joining peer starts its event replication from scratch
    pub fn reset_events(&mut self, config: &ReplicationConfig) {
        self.events = EventSyncState::new(config.event_resend_interval);
        self.joined = true;
    }

    pub fn mark_joined(&mut self) {
        self.joined = true;
    }
}
