use std::collections::HashMap;

use crate::{EntityId, EntityTypeId, PeerId};

/// Replication metadata attached to an entity. The entity itself lives in
/// the world; this only records what is needed to describe it on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplicatedEntity {
    pub type_id: EntityTypeId,
    pub creator: PeerId,
}

#[derive(Default)]
pub struct ReplicatedEntities {
    entities: HashMap<EntityId, ReplicatedEntity>,
}

impl ReplicatedEntities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: EntityId, type_id: EntityTypeId, creator: PeerId) {
        self.entities
            .insert(entity, ReplicatedEntity { type_id, creator });
    }

    pub fn get(&self, entity: &EntityId) -> Option<&ReplicatedEntity> {
        self.entities.get(entity)
    }

    pub fn contains(&self, entity: &EntityId) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn remove(&mut self, entity: &EntityId) -> Option<ReplicatedEntity> {
        self.entities.remove(entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
