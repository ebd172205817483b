use std::collections::{HashMap, VecDeque};

use meshsync_shared::{ByteReader, DesyncReason, MessageType};

/// Messages received from one peer since the last tick, classified by
/// their leading tag. Payloads are stored without the tag byte.
pub struct Inbox {
    queues: HashMap<MessageType, VecDeque<Box<[u8]>>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self {
            queues: HashMap::new(),
        }
    }

    /// Classify one incoming message. An empty message or an unrecognized
    /// tag means the sender speaks a different protocol.
    pub fn receive(&mut self, bytes: &[u8]) -> Result<MessageType, DesyncReason> {
        let mut reader = ByteReader::new(bytes);
        let tag = reader
            .read::<u8>()
            .map_err(DesyncReason::MalformedPayload)?;
        let message_type = MessageType::from_u8(tag).ok_or(DesyncReason::UnknownMessageType(tag))?;

        let payload: Box<[u8]> = bytes[reader.position()..].into();
        self.queues.entry(message_type).or_default().push_back(payload);
        Ok(message_type)
    }

    /// Take every queued payload of one type, oldest first
    pub fn drain(&mut self, message_type: MessageType) -> VecDeque<Box<[u8]>> {
        self.queues.remove(&message_type).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}
