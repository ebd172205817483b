/// Identifies a peer in the mesh. Lower ids win exact authority ties.
pub type PeerId = u8;
/// Process-wide unique entity identifier
pub type EntityId = u32;
pub type ComponentId = u32;
pub type EntityTypeId = u8;
/// Per (sender, receiver) counter stamped on every state update message
pub type UpdateSeq = u32;
/// Requester-local event request id
pub type EventId = u32;
/// Host-assigned position in the committed event log
pub type EventSeq = u32;

/// Whether this process owns the committed event log
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    Host,
    Guest,
}

impl HostType {
    pub fn is_host(self) -> bool {
        self == HostType::Host
    }
}
