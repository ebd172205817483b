use crate::PeerId;

/// Outbound half of the transport the mesh runs on. Sends are fire and
/// forget; inbound bytes are handed to the dispatcher by the transport's
/// own callback.
pub trait Transport {
    /// Queue `payload` for `peer`. Reliable sends are ordered and eventually
    /// delivered; unreliable sends may be dropped or reordered.
    fn send(&mut self, peer: &PeerId, payload: Box<[u8]>, reliable: bool);
}
