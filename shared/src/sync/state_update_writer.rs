use std::collections::HashSet;

use log::{trace, warn};
use meshsync_serde::{ByteWriter, SerdeErr};

use super::{
    entity_types::EntityTypes,
    replicated_entities::ReplicatedEntities,
    state_update::{EntityRecordHeader, StateUpdateHeader, UpdateType},
    sync_state::SyncState,
};
use crate::{
    messages::MessageType, AuthorityLedger, EntityId, Instant, PeerId, ReplicationConfig,
    UpdateSeq, WorldRefType,
};

/// How much of the prioritized candidate list made it into a message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackOutcome {
    /// Every candidate was written
    Complete(usize),
    /// Packing stopped at the byte budget after this many entities
    Truncated(usize),
}

impl PackOutcome {
    pub fn packed(&self) -> usize {
        match self {
            PackOutcome::Complete(count) | PackOutcome::Truncated(count) => *count,
        }
    }
}

/// A packed StateUpdate ready for the unreliable channel
pub struct PackedStateUpdate {
    pub update_seq: UpdateSeq,
    pub payload: Box<[u8]>,
    pub outcome: PackOutcome,
}

pub struct StateUpdateWriter;

impl StateUpdateWriter {
    /// Run one tick of delta synchronization toward `peer`: accumulate
    /// priorities for every locally owned live entity, then greedily pack
    /// them in priority order under the message byte budget.
    ///
    /// Returns `None` when there is nothing to send.
    #[allow(clippy::too_many_arguments)]
    pub fn write_state_update<W: WorldRefType>(
        peer: PeerId,
        sync_state: &mut SyncState,
        ledger: &AuthorityLedger,
        replicated: &ReplicatedEntities,
        entity_types: &EntityTypes,
        world: &W,
        now: &Instant,
        config: &ReplicationConfig,
    ) -> Result<Option<PackedStateUpdate>, SerdeErr> {
        let candidates: Vec<EntityId> = ledger
            .locally_owned()
            .into_iter()
            .filter(|entity| replicated.contains(entity) && world.has_entity(entity))
            .collect();
        if candidates.is_empty() {
            return Ok(None);
        }

        let ordered = sync_state.prioritize(&candidates, config);
        let update_seq = sync_state.take_update_seq();

        let mut writer = ByteWriter::with_capacity(config.max_message_bytes);
        writer.write(&MessageType::StateUpdate)?;
        writer.write(&StateUpdateHeader {
            update_seq,
            timestamp: now.to_wire(),
        })?;
        let count_offset = writer.reserve::<u8>()?;

        let mut packed = Vec::new();
        let mut full_synced = HashSet::new();
        let mut truncated = false;

        for entity in &ordered {
            if packed.len() == usize::from(u8::MAX) {
                truncated = true;
                break;
            }

            let full = !sync_state.is_known(entity);
            match Self::write_entity(&mut writer, entity, full, ledger, replicated, entity_types, world)
            {
                Ok(()) => {
                    packed.push(*entity);
                    if full {
                        full_synced.insert(*entity);
                    }
                }
                Err(error) if error.is_capacity_exceeded() => {
                    if packed.is_empty() {
                        warn!(
                            "entity {} does not fit in an empty state update to peer {}: {}",
                            entity, peer, error
                        );
                    }
                    truncated = true;
                    break;
                }
                Err(error) => {
                    warn!("skipping entity {} in state update: {}", entity, error);
                }
            }
        }

        if packed.is_empty() {
            return Ok(None);
        }

        let count = u8::try_from(packed.len()).unwrap_or(u8::MAX);
        writer.write_at(count_offset, &count)?;
        sync_state.record_packed(update_seq, &packed, full_synced);

        let outcome = if truncated {
            PackOutcome::Truncated(packed.len())
        } else {
            PackOutcome::Complete(packed.len())
        };
        trace!(
            "state update {} to peer {}: {:?} of {} candidates",
            update_seq,
            peer,
            outcome,
            ordered.len()
        );

        Ok(Some(PackedStateUpdate {
            update_seq,
            payload: writer.to_bytes(),
            outcome,
        }))
    }

    fn write_entity<W: WorldRefType>(
        writer: &mut ByteWriter,
        entity: &EntityId,
        full: bool,
        ledger: &AuthorityLedger,
        replicated: &ReplicatedEntities,
        entity_types: &EntityTypes,
        world: &W,
    ) -> Result<(), SerdeErr> {
        let (Some(record), Some(metadata)) = (ledger.get(entity), replicated.get(entity)) else {
            return Err(SerdeErr::InvalidValue {
                what: "unregistered entity",
                value: *entity,
            });
        };
        let Some(settings) = entity_types.get(&metadata.type_id) else {
            return Err(SerdeErr::InvalidValue {
                what: "entity type",
                value: u32::from(metadata.type_id),
            });
        };

        let components: Vec<_> = if full {
            settings.all_components().copied().collect()
        } else {
            settings.dynamic_components.clone()
        };
        let component_count = u8::try_from(components.len()).map_err(|_| SerdeErr::InvalidValue {
            what: "component count",
            value: components.len() as u32,
        })?;

        let header = EntityRecordHeader {
            entity: *entity,
            update_type: if full {
                UpdateType::Full
            } else {
                UpdateType::Dynamic
            },
            owner: record.owner,
            authority_seq: record.seq,
            full: full.then_some((metadata.type_id, metadata.creator)),
        };

        writer.write_atomic(|writer| {
            writer.write(&header)?;
            writer.write(&component_count)?;
            for component in &components {
                writer.write(component)?;
                world.write_component(entity, component, writer)?;
            }
            Ok(())
        })
    }
}
