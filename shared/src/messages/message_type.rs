// The leading byte of every message on the wire

use meshsync_serde::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum MessageType {
    // A non-host announcing itself to the host
    Join,
    // The host accepting a Join
    JoinResponse,
    // A segment of the committed event log, host to peer
    Events,
    // Peer acknowledging the event log up to a watermark
    AckEvents,
    // A batch of proposed events, peer to host
    EventRequests,
    // Host acknowledging event requests up to a watermark
    AckEventRequests,
    // Entity state, sent unreliably by entity owners
    StateUpdate,
    // Acknowledges one StateUpdate by its update seq
    StateUpdateResponse,
    // Clock sync probe. Must be responded to with a Pong
    Ping,
    // Response to a Ping, carrying the responder's clock
    Pong,
    // Reserved, not used by the core protocol
    ReserveIds,
    // Reserved, not used by the core protocol
    ReserveIdsResponse,
}

impl MessageType {
    pub const ALL: [MessageType; 12] = [
        MessageType::Join,
        MessageType::JoinResponse,
        MessageType::Events,
        MessageType::AckEvents,
        MessageType::EventRequests,
        MessageType::AckEventRequests,
        MessageType::StateUpdate,
        MessageType::StateUpdateResponse,
        MessageType::Ping,
        MessageType::Pong,
        MessageType::ReserveIds,
        MessageType::ReserveIdsResponse,
    ];

    pub fn to_u8(self) -> u8 {
        match self {
            MessageType::Join => 0,
            MessageType::JoinResponse => 1,
            MessageType::Events => 2,
            MessageType::AckEvents => 3,
            MessageType::EventRequests => 4,
            MessageType::AckEventRequests => 5,
            MessageType::StateUpdate => 6,
            MessageType::StateUpdateResponse => 7,
            MessageType::Ping => 8,
            MessageType::Pong => 9,
            MessageType::ReserveIds => 10,
            MessageType::ReserveIdsResponse => 11,
        }
    }

    pub fn from_u8(tag: u8) -> Option<Self> {
        Self::ALL.get(usize::from(tag)).copied()
    }

    /// Whether messages of this type travel on the reliable, ordered channel
    pub fn is_reliable(self) -> bool {
        !matches!(
            self,
            MessageType::StateUpdate
                | MessageType::StateUpdateResponse
                | MessageType::Ping
                | MessageType::Pong
        )
    }
}

impl Serde for MessageType {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write(&self.to_u8())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let tag = reader.read::<u8>()?;
        // Malformed or hostile packets can carry any tag, never panic on it
        Self::from_u8(tag).ok_or(SerdeErr::InvalidValue {
            what: "message type",
            value: u32::from(tag),
        })
    }

    fn byte_length(&self) -> usize {
        1
    }
}

impl ConstByteLength for MessageType {
    fn const_byte_length() -> usize {
        1
    }
}
