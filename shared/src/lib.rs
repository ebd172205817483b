//! # Meshsync Shared
//! Entity authority arbitration, priority-driven delta synchronization, the
//! host-authoritative replicated event log, clock-skew estimation and
//! dead-reckoning compensation, shared by every meshsync peer.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

pub use meshsync_serde::{
    ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr, MAX_MESSAGE_BYTES,
};

mod authority;
mod backends;
mod clock;
mod config;
mod error;
mod events;
mod math;
mod messages;
mod prediction;
mod protocol;
mod sync;
mod transport;
mod types;
mod world_type;

pub use authority::{
    authority_ledger::AuthorityLedger,
    authority_record::{AuthorityRecord, ClaimOutcome},
};
pub use backends::{Instant, Timer};
pub use clock::ClockSync;
pub use config::ReplicationConfig;
pub use error::{DesyncReason, ReplicationError};
pub use events::{
    event::{Event, EventKind},
    event_batch::EventBatch,
    event_log::EventLog,
    event_replicator::{EventReplicator, SubmitOutcome},
    event_sender::EventSender,
    event_sync_state::EventSyncState,
    game_rules::GameRules,
    request_queue::RequestQueue,
};
pub use math::{Quat, Vec3};
pub use messages::{
    ack::Ack,
    encode_empty, encode_message,
    join::JoinResponse,
    message_type::MessageType,
    ping::{Ping, Pong},
};
pub use prediction::Predictor;
pub use protocol::{Protocol, ProtocolError, ProtocolPlugin};
pub use sync::{
    entity_types::{EntityTypeSettings, EntityTypes},
    replicated_entities::{ReplicatedEntities, ReplicatedEntity},
    state_update::{EntityRecordHeader, StateUpdateHeader, UpdateType},
    state_update_reader::{StateUpdateReader, StateUpdateTarget},
    state_update_writer::{PackOutcome, PackedStateUpdate, StateUpdateWriter},
    sync_state::SyncState,
};
pub use transport::Transport;
pub use types::{
    ComponentId, EntityId, EntityTypeId, EventId, EventSeq, HostType, PeerId, UpdateSeq,
};
pub use world_type::{Motion, WorldMutType, WorldRefType};
