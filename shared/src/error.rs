use meshsync_serde::SerdeErr;
use thiserror::Error;

use crate::{EntityId, EntityTypeId, EventSeq, PeerId};

/// Why a peer session can no longer be trusted to be in sync. Any of these
/// ends that peer's session; other sessions continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesyncReason {
    /// Leading tag byte did not name a known message type
    #[error("unrecognized message type tag {0}")]
    UnknownMessageType(u8),

    /// Event log segment starts past the end of the local log
    #[error("event segment starts at seq {first} but local log has only {local_len} entries")]
    EventSegmentGap { first: EventSeq, local_len: u32 },

    /// A decoded event landed at a different position than it claims
    #[error("event seq mismatch: expected {expected}, got {actual}")]
    EventSeqMismatch { expected: EventSeq, actual: EventSeq },

    /// Dynamic updates kept arriving for an entity that was never fully synced
    #[error("dynamic update for unknown entity {entity} exceeded the deferral limit")]
    UnknownDynamicEntity { entity: EntityId },

    /// A committed event waited too long on entities that never arrived
    #[error("event log application stalled at seq {seq}")]
    ApplyStalled { seq: EventSeq },

    /// Payload could not be decoded
    #[error("malformed payload: {0}")]
    MalformedPayload(SerdeErr),
}

/// Errors surfaced by the replication protocol
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationError {
    /// The session with `peer` is out of sync and must be dropped
    #[error("Protocol desync with peer {peer}: {reason}")]
    Desync { peer: PeerId, reason: DesyncReason },

    /// Codec failure outside a capacity-bounded packing loop
    #[error("Serialization error: {0}")]
    Serde(#[from] SerdeErr),

    /// Entity type id has no registered sync descriptor
    #[error("Entity type {type_id} is not registered in the protocol")]
    UnknownEntityType { type_id: EntityTypeId },

    /// Operation addressed an entity that is not replicated
    #[error("Entity {entity} is not replicated")]
    UnknownEntity { entity: EntityId },
}

impl ReplicationError {
    pub fn desync(peer: PeerId, reason: DesyncReason) -> Self {
        ReplicationError::Desync { peer, reason }
    }

    /// Maps a decode failure on `peer`'s message into a desync
    pub fn malformed(peer: PeerId, error: SerdeErr) -> Self {
        ReplicationError::Desync {
            peer,
            reason: DesyncReason::MalformedPayload(error),
        }
    }

    pub fn is_desync(&self) -> bool {
        matches!(self, ReplicationError::Desync { .. })
    }
}
