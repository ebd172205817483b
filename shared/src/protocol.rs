use crate::{
    sync::entity_types::{EntityTypeSettings, EntityTypes},
    EntityTypeId, ReplicationConfig,
};

pub mod error;
pub use error::ProtocolError;

// Protocol Plugin
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut Protocol);
}

// Protocol
pub struct Protocol {
    pub entity_types: EntityTypes,
    pub config: ReplicationConfig,
    locked: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            entity_types: EntityTypes::new(),
            config: ReplicationConfig::default(),
            locked: false,
        }
    }
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    pub fn config(&mut self, config: ReplicationConfig) -> &mut Self {
        self.check_lock();
        self.config = config;
        self
    }

    pub fn add_entity_type(
        &mut self,
        type_id: EntityTypeId,
        settings: EntityTypeSettings,
    ) -> &mut Self {
        self.check_lock();
        if let Err(error) = self.entity_types.add(type_id, settings) {
            panic!("{}", error);
        }
        self
    }

    // Non-panicking builder methods

    pub fn try_add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        plugin.build(self);
        Ok(self)
    }

    pub fn try_config(&mut self, config: ReplicationConfig) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.config = config;
        Ok(self)
    }

    pub fn try_add_entity_type(
        &mut self,
        type_id: EntityTypeId,
        settings: EntityTypeSettings,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.entity_types.add(type_id, settings)?;
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    /// Checks if protocol is locked without panicking
    /// Returns Err if protocol is locked
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
