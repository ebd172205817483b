use log::{debug, warn};
use meshsync_serde::ByteReader;

use super::{
    entity_types::EntityTypes,
    replicated_entities::ReplicatedEntities,
    state_update::{EntityRecordHeader, StateUpdateHeader, UpdateType},
    sync_state::SyncState,
};
use crate::{
    AuthorityLedger, ComponentId, DesyncReason, Instant, PeerId, Predictor, ReplicationConfig,
    ReplicationError, UpdateSeq, WorldMutType,
};

/// Everything on this peer a received StateUpdate may touch
pub struct StateUpdateTarget<'a, W: WorldMutType> {
    pub world: &'a mut W,
    pub ledger: &'a mut AuthorityLedger,
    pub replicated: &'a mut ReplicatedEntities,
    pub entity_types: &'a EntityTypes,
    pub predictor: &'a mut Predictor,
}

pub struct StateUpdateReader;

impl StateUpdateReader {
    /// Decode a StateUpdate payload from `peer` (tag byte already consumed)
    /// and apply every record whose authority claim is accepted. Records
    /// whose claim is rejected are still fully decoded so the rest of the
    /// message stays aligned; their values are dropped.
    ///
    /// Returns the message's update seq, to be acknowledged.
    #[allow(clippy::too_many_arguments)]
    pub fn read_state_update<W: WorldMutType>(
        peer: PeerId,
        reader: &mut ByteReader,
        sync_state: &mut SyncState,
        target: &mut StateUpdateTarget<W>,
        skew_estimate: f64,
        now: &Instant,
        config: &ReplicationConfig,
    ) -> Result<UpdateSeq, ReplicationError> {
        let malformed = |error| ReplicationError::malformed(peer, error);

        let header = reader.read::<StateUpdateHeader>().map_err(malformed)?;
        let entity_count = reader.read::<u8>().map_err(malformed)?;

        for _ in 0..entity_count {
            let record = reader.read::<EntityRecordHeader>().map_err(malformed)?;
            let apply = Self::admit_record(peer, &record, header.update_seq, sync_state, target, now, config)?;

            let component_count = reader.read::<u8>().map_err(malformed)?;
            for _ in 0..component_count {
                let component = reader.read::<ComponentId>().map_err(malformed)?;
                let value = target
                    .world
                    .read_component(&component, reader)
                    .map_err(malformed)?;
                if apply {
                    target
                        .world
                        .insert_component(&record.entity, &component, value);
                }
            }

            if apply {
                Self::note_applied(&record, header.timestamp, skew_estimate, target, now);
            }
        }

        Ok(header.update_seq)
    }

    // Decides whether a record's values get applied, spawning the replica
    // first if this is the first Full sync of the entity
    fn admit_record<W: WorldMutType>(
        peer: PeerId,
        record: &EntityRecordHeader,
        update_seq: UpdateSeq,
        sync_state: &mut SyncState,
        target: &mut StateUpdateTarget<W>,
        now: &Instant,
        config: &ReplicationConfig,
    ) -> Result<bool, ReplicationError> {
        let entity = record.entity;
        let known =
            target.replicated.contains(&entity) && target.world.has_entity(&entity);

        if record.update_type == UpdateType::Dynamic && !known {
            let waited = sync_state.defer_unknown(entity, now);
            if waited > config.max_deferral_millis() {
                return Err(ReplicationError::desync(
                    peer,
                    DesyncReason::UnknownDynamicEntity { entity },
                ));
            }
            debug!(
                "deferring dynamic update for unknown entity {} from peer {}",
                entity, peer
            );
            return Ok(false);
        }

        let outcome = target
            .ledger
            .claim(entity, record.owner, record.authority_seq, update_seq);
        if !outcome.is_accepted() {
            debug!(
                "rejected stale claim on entity {} (owner {}, seq {}) from peer {}",
                entity, record.owner, record.authority_seq, peer
            );
            return Ok(false);
        }

        if let Some((type_id, creator)) = record.full {
            if !target.entity_types.contains(&type_id) {
                warn!(
                    "entity {} from peer {} has unregistered type {}",
                    entity, peer, type_id
                );
            }
            if !target.world.has_entity(&entity) {
                target.world.spawn_entity(&entity, type_id, creator);
            }
            if !target.replicated.contains(&entity) {
                target.replicated.insert(entity, type_id, creator);
            }
            sync_state.clear_unknown(&entity);
        }

        Ok(true)
    }

    fn note_applied<W: WorldMutType>(
        record: &EntityRecordHeader,
        remote_timestamp: f32,
        skew_estimate: f64,
        target: &mut StateUpdateTarget<W>,
        now: &Instant,
    ) {
        let predicted = target
            .replicated
            .get(&record.entity)
            .and_then(|metadata| target.entity_types.get(&metadata.type_id))
            .is_some_and(|settings| settings.predicted);
        if predicted {
            target
                .predictor
                .record_update(record.entity, now, remote_timestamp, skew_estimate);
        }
    }
}
