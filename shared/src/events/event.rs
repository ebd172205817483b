use meshsync_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

use crate::{EntityId, Vec3};

/// Stable 32-bit identifier of an event type, sent on the wire as its hash
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKind(pub u32);

impl EventKind {
    /// FNV-1a hash of the event type's name
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash: u32 = 0x811c_9dc5;
        let mut index = 0;
        while index < bytes.len() {
            hash ^= bytes[index] as u32;
            hash = hash.wrapping_mul(0x0100_0193);
            index += 1;
        }
        EventKind(hash)
    }
}

/// A game-affecting event. Immutable once committed to the event log.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub entities: Vec<EntityId>,
    pub location: Option<Vec3>,
}

impl Event {
    pub fn new(kind: EventKind, entities: Vec<EntityId>) -> Self {
        Self {
            kind,
            entities,
            location: None,
        }
    }

    pub fn with_location(mut self, location: Vec3) -> Self {
        self.location = Some(location);
        self
    }
}

impl Serde for Event {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        let entity_count = u8::try_from(self.entities.len()).map_err(|_| SerdeErr::InvalidValue {
            what: "event entity count",
            value: u32::try_from(self.entities.len()).unwrap_or(u32::MAX),
        })?;

        writer.write_atomic(|writer| {
            writer.write(&self.kind.0)?;
            writer.write(&entity_count)?;
            for entity in &self.entities {
                writer.write(entity)?;
            }
            writer.write(&self.location.is_some())?;
            if let Some(location) = &self.location {
                writer.write(location)?;
            }
            Ok(())
        })
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let kind = EventKind(reader.read()?);
        let entity_count = reader.read::<u8>()?;
        let mut entities = Vec::with_capacity(usize::from(entity_count));
        for _ in 0..entity_count {
            entities.push(reader.read()?);
        }
        let location = if reader.read::<bool>()? {
            Some(reader.read()?)
        } else {
            None
        };
        Ok(Self {
            kind,
            entities,
            location,
        })
    }

    fn byte_length(&self) -> usize {
        let location = if self.location.is_some() { 12 } else { 0 };
        4 + 1 + 4 * self.entities.len() + 1 + location
    }
}
