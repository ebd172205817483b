use meshsync_serde::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

use crate::PeerId;

/// Sent by the host in answer to a Join
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JoinResponse {
    pub host: PeerId,
}

impl Serde for JoinResponse {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write(&self.host)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            host: reader.read()?,
        })
    }

    fn byte_length(&self) -> usize {
        Self::const_byte_length()
    }
}

impl ConstByteLength for JoinResponse {
    fn const_byte_length() -> usize {
        1
    }
}
