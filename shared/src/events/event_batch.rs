use log::warn;
use meshsync_serde::{ByteReader, ByteWriter, SerdeErr};

use super::event::Event;
use crate::messages::MessageType;

/// Payload of Events and EventRequests: the seq (or request id) of the first
/// event, then as many consecutive events as fit
#[derive(Clone, Debug, PartialEq)]
pub struct EventBatch {
    pub first: u32,
    pub events: Vec<Event>,
}

impl EventBatch {
    pub fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let first = reader.read()?;
        let count = reader.read::<u8>()?;
        let mut events = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            events.push(reader.read()?);
        }
        Ok(Self { first, events })
    }

    /// Encode a complete message holding events starting at `first`,
    /// oldest first, stopping at the byte budget. Returns the message and how
    /// many events it holds, or `None` if not even the first event fits.
    pub fn write_message<'e>(
        message_type: MessageType,
        first: u32,
        events: impl Iterator<Item = &'e Event>,
        max_bytes: usize,
    ) -> Result<Option<(Box<[u8]>, usize)>, SerdeErr> {
        let mut writer = ByteWriter::with_capacity(max_bytes);
        writer.write(&message_type)?;
        writer.write(&first)?;
        let count_offset = writer.reserve::<u8>()?;

        let mut count: u8 = 0;
        for event in events {
            if count == u8::MAX {
                break;
            }
            match writer.write(event) {
                Ok(()) => count += 1,
                Err(error) if error.is_capacity_exceeded() => break,
                Err(error) => {
                    // an unencodable event would block everything behind it
                    warn!("cannot encode event {:?}: {}", event.kind, error);
                    break;
                }
            }
        }

        if count == 0 {
            return Ok(None);
        }
        writer.write_at(count_offset, &count)?;
        Ok(Some((writer.to_bytes(), usize::from(count))))
    }
}
