use crate::{ConstByteLength, Serde, SerdeErr, MAX_MESSAGE_BYTES};

/// A byte writer with a fixed capacity.
///
/// Every write either fits entirely or fails with
/// [`SerdeErr::CapacityExceeded`] without touching the buffer, so a producer
/// can catch the error and finalize the message with whatever was written
/// before it. Fixed-width slots can be reserved up front and patched once
/// their value is known (e.g. an element count).
pub struct ByteWriter {
    buffer: Vec<u8>,
    capacity: usize,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::with_capacity(MAX_MESSAGE_BYTES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn bytes_written(&self) -> usize {
        self.buffer.len()
    }

    pub fn bytes_free(&self) -> usize {
        self.capacity - self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a value at the cursor
    pub fn write<T: Serde>(&mut self, value: &T) -> Result<(), SerdeErr> {
        let needed = value.byte_length();
        if needed > self.bytes_free() {
            return Err(SerdeErr::CapacityExceeded {
                needed,
                free: self.bytes_free(),
            });
        }
        value.ser(self)
    }

    /// Overwrite a previously written or reserved fixed-width slot. The
    /// cursor does not move.
    pub fn write_at<T: Serde + ConstByteLength>(
        &mut self,
        offset: usize,
        value: &T,
    ) -> Result<(), SerdeErr> {
        let len = T::const_byte_length();
        if offset + len > self.buffer.len() {
            return Err(SerdeErr::OffsetOutOfBounds {
                offset,
                len: self.buffer.len(),
            });
        }

        let mut scratch = ByteWriter::with_capacity(len);
        value.ser(&mut scratch)?;
        self.buffer[offset..offset + len].copy_from_slice(&scratch.buffer);
        Ok(())
    }

    /// Reserve a zeroed slot for a `T` to be patched later with
    /// [`ByteWriter::write_at`]. Returns the slot's offset.
    pub fn reserve<T: ConstByteLength>(&mut self) -> Result<usize, SerdeErr> {
        let offset = self.buffer.len();
        let zeroes = vec![0; T::const_byte_length()];
        self.write_bytes(&zeroes)?;
        Ok(offset)
    }

    /// Append raw bytes, all or nothing
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SerdeErr> {
        if bytes.len() > self.bytes_free() {
            return Err(SerdeErr::CapacityExceeded {
                needed: bytes.len(),
                free: self.bytes_free(),
            });
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// Run a multi-value write as one unit. If any inner write fails the
    /// cursor is rolled back to where it was, leaving earlier records intact.
    pub fn write_atomic<F>(&mut self, write_fn: F) -> Result<(), SerdeErr>
    where
        F: FnOnce(&mut ByteWriter) -> Result<(), SerdeErr>,
    {
        let start = self.buffer.len();
        let result = write_fn(self);
        if result.is_err() {
            self.buffer.truncate(start);
        }
        result
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn to_bytes(self) -> Box<[u8]> {
        self.buffer.into_boxed_slice()
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}
