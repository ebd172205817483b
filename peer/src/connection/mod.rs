pub mod inbox;
pub mod peer_session;
