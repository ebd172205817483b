use std::collections::HashMap;

use log::debug;

use super::authority_record::{AuthorityRecord, ClaimOutcome};
use crate::{EntityId, PeerId, UpdateSeq};

/// The one authority record per replicated entity held by this peer.
/// Records change only through [`AuthorityRecord::claim`] or through a
/// fresh local claim.
pub struct AuthorityLedger {
    local_peer: PeerId,
    records: HashMap<EntityId, AuthorityRecord>,
}

impl AuthorityLedger {
    pub fn new(local_peer: PeerId) -> Self {
        Self {
            local_peer,
            records: HashMap::new(),
        }
    }

    pub fn local_peer(&self) -> PeerId {
        self.local_peer
    }

    /// Register an entity created on this peer, with its first claim
    pub fn insert_local(&mut self, entity: EntityId) -> AuthorityRecord {
        let record = AuthorityRecord::new(self.local_peer, 1, 0);
        self.records.insert(entity, record);
        record
    }

    /// Issue a fresh claim on an entity, taking ownership from whoever holds
    /// it. Returns the new claim seq, or `None` if the entity is unknown.
    pub fn take_authority(&mut self, entity: &EntityId) -> Option<u32> {
        let record = self.records.get_mut(entity)?;
        record.seq += 1;
        record.owner = self.local_peer;
        record.update_seq = 0;
        debug!("peer {} claims entity {} with seq {}", self.local_peer, entity, record.seq);
        Some(record.seq)
    }

    /// Arbitrate a claim received in an update message. The first claim
    /// seen for an entity is always accepted.
    pub fn claim(
        &mut self,
        entity: EntityId,
        claimed_owner: PeerId,
        claimed_seq: u32,
        message_update_seq: UpdateSeq,
    ) -> ClaimOutcome {
        match self.records.get_mut(&entity) {
            Some(record) => record.claim(claimed_owner, claimed_seq, message_update_seq),
            None => {
                self.records.insert(
                    entity,
                    AuthorityRecord::new(claimed_owner, claimed_seq, message_update_seq),
                );
                ClaimOutcome::Accepted
            }
        }
    }

    pub fn get(&self, entity: &EntityId) -> Option<&AuthorityRecord> {
        self.records.get(entity)
    }

    pub fn contains(&self, entity: &EntityId) -> bool {
        self.records.contains_key(entity)
    }

    pub fn owner_of(&self, entity: &EntityId) -> Option<PeerId> {
        self.records.get(entity).map(|record| record.owner)
    }

    pub fn is_locally_owned(&self, entity: &EntityId) -> bool {
        self.owner_of(entity) == Some(self.local_peer)
    }

    /// Entities this peer currently owns, in ascending id order
    pub fn locally_owned(&self) -> Vec<EntityId> {
        let mut output: Vec<EntityId> = self
            .records
            .iter()
            .filter(|(_, record)| record.owner == self.local_peer)
            .map(|(entity, _)| *entity)
            .collect();
        output.sort_unstable();
        output
    }

    pub fn remove(&mut self, entity: &EntityId) -> Option<AuthorityRecord> {
        self.records.remove(entity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
