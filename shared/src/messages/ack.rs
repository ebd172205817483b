use meshsync_serde::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

/// Shared payload of every acknowledgement: AckEvents, AckEventRequests and
/// StateUpdateResponse. For the event acks it is a watermark, for state
/// updates it is the acknowledged update seq.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ack {
    pub watermark: u32,
}

impl Ack {
    pub fn new(watermark: u32) -> Self {
        Self { watermark }
    }
}

impl Serde for Ack {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write(&self.watermark)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            watermark: reader.read()?,
        })
    }

    fn byte_length(&self) -> usize {
        Self::const_byte_length()
    }
}

impl ConstByteLength for Ack {
    fn const_byte_length() -> usize {
        4
    }
}
