use std::collections::{HashMap, HashSet};

use log::trace;

use crate::{EntityId, Instant, ReplicationConfig, UpdateSeq};

// Pending full-sync sets older than this many messages are assumed lost
const PENDING_FULL_SYNC_WINDOW: u32 = 256;

/// Per-peer bookkeeping of what the remote side is known to know.
///
/// The sending half tracks priorities and which Full syncs are waiting on an
/// ack; the receiving half tracks how long Dynamic updates have been
/// arriving for entities this side never saw.
pub struct SyncState {
    entities_known: HashSet<EntityId>,
    entity_priority: HashMap<EntityId, f32>,
    pending_full_syncs: HashMap<UpdateSeq, HashSet<EntityId>>,
    next_update_seq: UpdateSeq,
    unknown_since: HashMap<EntityId, Instant>,
}

impl SyncState {
    pub fn new() -> Self {
        Self {
            entities_known: HashSet::new(),
            entity_priority: HashMap::new(),
            pending_full_syncs: HashMap::new(),
            next_update_seq: 0,
            unknown_since: HashMap::new(),
        }
    }

    // Sending

    pub fn is_known(&self, entity: &EntityId) -> bool {
        self.entities_known.contains(entity)
    }

    pub fn entities_known(&self) -> &HashSet<EntityId> {
        &self.entities_known
    }

    pub fn priority(&self, entity: &EntityId) -> f32 {
        self.entity_priority.get(entity).copied().unwrap_or(0.0)
    }

    pub fn next_update_seq(&self) -> UpdateSeq {
        self.next_update_seq
    }

    /// Add this tick's increment to every candidate and return the
    /// candidates ordered by accumulated priority, highest first. Entities
    /// that are no longer candidates lose their leftover priority.
    pub fn prioritize(
        &mut self,
        candidates: &[EntityId],
        config: &ReplicationConfig,
    ) -> Vec<EntityId> {
        let candidate_set: HashSet<EntityId> = candidates.iter().copied().collect();
        self.entity_priority
            .retain(|entity, _| candidate_set.contains(entity));

        for entity in candidates {
            let increment = if self.entities_known.contains(entity) {
                config.keep_fresh_priority
            } else {
                config.first_sync_priority
            };
            *self.entity_priority.entry(*entity).or_insert(0.0) += increment;
        }

        let mut ordered = candidates.to_vec();
        ordered.sort_by(|a, b| {
            let priority_a = self.priority(a);
            let priority_b = self.priority(b);
            priority_b.total_cmp(&priority_a).then(a.cmp(b))
        });
        ordered
    }

    /// Claim the update seq for the next outgoing message
    pub fn take_update_seq(&mut self) -> UpdateSeq {
        let update_seq = self.next_update_seq;
        self.next_update_seq = self.next_update_seq.wrapping_add(1);
        update_seq
    }

    /// Record the outcome of packing message `update_seq`
    pub fn record_packed(
        &mut self,
        update_seq: UpdateSeq,
        packed: &[EntityId],
        full_synced: HashSet<EntityId>,
    ) {
        for entity in packed {
            self.entity_priority.insert(*entity, 0.0);
        }
        if !full_synced.is_empty() {
            self.pending_full_syncs.insert(update_seq, full_synced);
        }
        let oldest_kept = update_seq.saturating_sub(PENDING_FULL_SYNC_WINDOW);
        self.pending_full_syncs
            .retain(|pending_seq, _| *pending_seq >= oldest_kept);
    }

    /// The peer received message `update_seq`: every entity sent Full in it
    /// is now known. Duplicate or unknown acks are no-ops.
    pub fn process_ack(&mut self, update_seq: UpdateSeq) {
        let Some(full_synced) = self.pending_full_syncs.remove(&update_seq) else {
            return;
        };
        trace!(
            "update {} acked, {} entities now known",
            update_seq,
            full_synced.len()
        );
        self.entities_known.extend(full_synced);
    }

    /// Drop every trace of a retired entity, on both halves
    pub fn forget(&mut self, entity: &EntityId) {
        self.entities_known.remove(entity);
        self.entity_priority.remove(entity);
        self.unknown_since.remove(entity);
        for full_synced in self.pending_full_syncs.values_mut() {
            full_synced.remove(entity);
        }
        self.pending_full_syncs
            .retain(|_, full_synced| !full_synced.is_empty());
    }

    // Receiving

    /// Note a Dynamic update for an entity this side does not know. Returns
    /// how long that entity has been arriving unknown, in milliseconds.
    pub fn defer_unknown(&mut self, entity: EntityId, now: &Instant) -> f64 {
        let since = self.unknown_since.entry(entity).or_insert(*now);
        since.elapsed_millis(now)
    }

    pub fn clear_unknown(&mut self, entity: &EntityId) {
        self.unknown_since.remove(entity);
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}
