use std::collections::HashMap;

use crate::{ComponentId, EntityTypeId, ProtocolError};

/// Sync descriptor of an entity type: which components go out on the first
/// sync to a peer, and which on every sync. Immutable once registered.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EntityTypeSettings {
    pub full_components: Vec<ComponentId>,
    pub dynamic_components: Vec<ComponentId>,
    /// Whether replicas of this type are dead-reckoned on receipt
    pub predicted: bool,
}

impl EntityTypeSettings {
    pub fn new(full_components: Vec<ComponentId>, dynamic_components: Vec<ComponentId>) -> Self {
        Self {
            full_components,
            dynamic_components,
            predicted: false,
        }
    }

    pub fn predicted(mut self) -> Self {
        self.predicted = true;
        self
    }

    /// Components written by a Full update: full first, then dynamic
    pub fn all_components(&self) -> impl Iterator<Item = &ComponentId> {
        self.full_components
            .iter()
            .chain(self.dynamic_components.iter())
    }
}

pub struct EntityTypes {
    settings: HashMap<EntityTypeId, EntityTypeSettings>,
}

impl EntityTypes {
    pub fn new() -> Self {
        Self {
            settings: HashMap::new(),
        }
    }

    pub fn add(
        &mut self,
        type_id: EntityTypeId,
        settings: EntityTypeSettings,
    ) -> Result<(), ProtocolError> {
        if self.settings.contains_key(&type_id) {
            return Err(ProtocolError::DuplicateEntityType { type_id });
        }
        self.settings.insert(type_id, settings);
        Ok(())
    }

    pub fn get(&self, type_id: &EntityTypeId) -> Option<&EntityTypeSettings> {
        self.settings.get(type_id)
    }

    pub fn contains(&self, type_id: &EntityTypeId) -> bool {
        self.settings.contains_key(type_id)
    }
}

impl Default for EntityTypes {
    fn default() -> Self {
        Self::new()
    }
}
