/// Upper bound on the size of a single encoded message, tag byte included.
/// Producers stop packing optional records rather than exceed it.
pub const MAX_MESSAGE_BYTES: usize = 1024;
