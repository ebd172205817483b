use meshsync_serde::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ping {
    pub seq: u32,
}

impl Serde for Ping {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write(&self.seq)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self { seq: reader.read()? })
    }

    fn byte_length(&self) -> usize {
        Self::const_byte_length()
    }
}

impl ConstByteLength for Ping {
    fn const_byte_length() -> usize {
        4
    }
}

/// Echoes a Ping's seq along with the responder's local time in
/// milliseconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pong {
    pub seq: u32,
    pub remote_time: f32,
}

impl Serde for Pong {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_atomic(|writer| {
            writer.write(&self.seq)?;
            writer.write(&self.remote_time)
        })
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let seq = reader.read()?;
        let remote_time = reader.read()?;
        Ok(Self { seq, remote_time })
    }

    fn byte_length(&self) -> usize {
        Self::const_byte_length()
    }
}

impl ConstByteLength for Pong {
    fn const_byte_length() -> usize {
        8
    }
}
