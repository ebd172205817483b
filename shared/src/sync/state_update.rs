use meshsync_serde::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

use crate::{EntityId, EntityTypeId, PeerId, UpdateSeq};

/// Whether an entity record carries every replicated component or only the
/// frequently changing ones
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateType {
    Full,
    Dynamic,
}

impl Serde for UpdateType {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        let tag: u8 = match self {
            UpdateType::Full => 0,
            UpdateType::Dynamic => 1,
        };
        writer.write(&tag)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read::<u8>()? {
            0 => Ok(UpdateType::Full),
            1 => Ok(UpdateType::Dynamic),
            value => Err(SerdeErr::InvalidValue {
                what: "update type",
                value: u32::from(value),
            }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}

/// `updateSeq:u32, timestamp:f32`, followed on the wire by the entity count
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateUpdateHeader {
    pub update_seq: UpdateSeq,
    pub timestamp: f32,
}

impl Serde for StateUpdateHeader {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_atomic(|writer| {
            writer.write(&self.update_seq)?;
            writer.write(&self.timestamp)
        })
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let update_seq = reader.read()?;
        let timestamp = reader.read()?;
        Ok(Self {
            update_seq,
            timestamp,
        })
    }

    fn byte_length(&self) -> usize {
        Self::const_byte_length()
    }
}

impl ConstByteLength for StateUpdateHeader {
    fn const_byte_length() -> usize {
        8
    }
}

/// Fixed part of one entity record, up to (not including) the component
/// count
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityRecordHeader {
    pub entity: EntityId,
    pub update_type: UpdateType,
    pub owner: PeerId,
    pub authority_seq: u32,
    /// `(type_id, creator)`, present exactly when `update_type` is Full
    pub full: Option<(EntityTypeId, PeerId)>,
}

impl Serde for EntityRecordHeader {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_atomic(|writer| {
            writer.write(&self.entity)?;
            writer.write(&self.update_type)?;
            writer.write(&self.owner)?;
            writer.write(&self.authority_seq)?;
            if let Some((type_id, creator)) = &self.full {
                writer.write(type_id)?;
                writer.write(creator)?;
            }
            Ok(())
        })
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let entity = reader.read()?;
        let update_type = reader.read::<UpdateType>()?;
        let owner = reader.read()?;
        let authority_seq = reader.read()?;
        let full = match update_type {
            UpdateType::Full => {
                let type_id = reader.read()?;
                let creator = reader.read()?;
                Some((type_id, creator))
            }
            UpdateType::Dynamic => None,
        };
        Ok(Self {
            entity,
            update_type,
            owner,
            authority_seq,
            full,
        })
    }

    fn byte_length(&self) -> usize {
        let base = 4 + 1 + 1 + 4;
        match self.full {
            Some(_) => base + 2,
            None => base,
        }
    }
}
