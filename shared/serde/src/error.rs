use thiserror::Error;

/// Errors raised by the byte codec.
///
/// `CapacityExceeded` is the expected signal producers catch to stop packing;
/// it never leaves bytes that were written before it in a corrupted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// A write would grow the message past its fixed capacity
    #[error("Write of {needed} bytes exceeds remaining capacity of {free} bytes")]
    CapacityExceeded { needed: usize, free: usize },

    /// A read ran off the end of the received buffer
    #[error("Read of {needed} bytes past end of buffer ({remaining} bytes remaining)")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A decoded value is outside the range its type allows
    #[error("Invalid value {value} decoded for {what}")]
    InvalidValue { what: &'static str, value: u32 },

    /// A patch targeted bytes that were never reserved
    #[error("Patch at offset {offset} is outside the {len} bytes written so far")]
    OffsetOutOfBounds { offset: usize, len: usize },
}

impl SerdeErr {
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, SerdeErr::CapacityExceeded { .. })
    }
}
