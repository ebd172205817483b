//! # Meshsync Serde
//! Fixed-capacity byte writer and matching reader used to encode every
//! meshsync wire message. All multi-byte values are big-endian.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod byte_reader;
mod byte_writer;
mod constants;
mod error;
mod impls;
mod serde;

pub use byte_reader::ByteReader;
pub use byte_writer::ByteWriter;
pub use constants::MAX_MESSAGE_BYTES;
pub use error::SerdeErr;
pub use serde::{ConstByteLength, Serde};
