pub mod ack;
pub mod join;
pub mod message_type;
pub mod ping;

use meshsync_serde::{ByteWriter, Serde, SerdeErr};

pub use message_type::MessageType;

/// Encode a complete message with a fixed-layout payload: tag byte first,
/// then the payload.
pub fn encode_message<T: Serde>(
    message_type: MessageType,
    payload: &T,
    max_bytes: usize,
) -> Result<Box<[u8]>, SerdeErr> {
    let mut writer = ByteWriter::with_capacity(max_bytes);
    writer.write(&message_type)?;
    writer.write(payload)?;
    Ok(writer.to_bytes())
}

/// Encode a message that carries nothing beyond its tag
pub fn encode_empty(message_type: MessageType) -> Result<Box<[u8]>, SerdeErr> {
    let mut writer = ByteWriter::with_capacity(1);
    writer.write(&message_type)?;
    Ok(writer.to_bytes())
}
