//! # Meshsync Peer
//! One participant in a small peer-to-peer mesh. Owns a session per
//! connected peer and, once per simulation tick, drains their inboxes and
//! runs authority arbitration, delta synchronization, event replication,
//! clock sync and prediction in a fixed order.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use meshsync_shared::{
        ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr, MAX_MESSAGE_BYTES,
    };
}

mod connection;
mod dispatcher;
mod events;

pub use connection::{inbox::Inbox, peer_session::PeerSession};
pub use dispatcher::Dispatcher;
pub use events::PeerEvent;
