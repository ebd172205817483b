use crate::{ByteReader, ByteWriter, SerdeErr};

/// A type that can be written to a [`ByteWriter`] and read back from a
/// [`ByteReader`] with an identical layout.
pub trait Serde: Sized {
    /// Append the value at the writer's cursor
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr>;

    /// Decode a value, always advancing the reader past it. Callers that
    /// want to discard a record still call this and drop the result.
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;

    /// Number of bytes `ser` will write for this value
    fn byte_length(&self) -> usize;
}

/// Implemented by types whose encoding always has the same width, which is
/// what makes them patchable after the fact.
pub trait ConstByteLength {
    fn const_byte_length() -> usize;
}
