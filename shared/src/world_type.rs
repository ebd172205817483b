use meshsync_serde::{ByteReader, ByteWriter, SerdeErr};

use crate::{ComponentId, EntityId, EntityTypeId, PeerId, Quat, Vec3};

/// Kinematic snapshot used for dead reckoning. Rotation and angular
/// velocity are optional since not every predicted entity rotates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub position: Vec3,
    pub linear_velocity: Vec3,
    pub rotation: Option<Quat>,
    pub angular_velocity: Option<Vec3>,
}

/// Read access to the entity/component store the protocol replicates from
pub trait WorldRefType {
    /// A decoded component value, detached from any entity until inserted
    type Component;

    fn has_entity(&self, entity: &EntityId) -> bool;

    fn has_entities(&self, entities: &[EntityId]) -> bool {
        entities.iter().all(|entity| self.has_entity(entity))
    }

    /// Encode the current value of `component` on `entity`
    fn write_component(
        &self,
        entity: &EntityId,
        component: &ComponentId,
        writer: &mut ByteWriter,
    ) -> Result<(), SerdeErr>;

    /// Decode one value of `component`. Must always consume exactly the
    /// bytes `write_component` produced, so a caller can drop the value and
    /// keep reading.
    fn read_component(
        &self,
        component: &ComponentId,
        reader: &mut ByteReader,
    ) -> Result<Self::Component, SerdeErr>;

    fn motion(&self, entity: &EntityId) -> Option<Motion>;
}

/// Write access to the entity/component store
pub trait WorldMutType: WorldRefType {
    /// Create a local replica of a remotely created entity
    fn spawn_entity(&mut self, entity: &EntityId, type_id: EntityTypeId, creator: PeerId);

    fn insert_component(
        &mut self,
        entity: &EntityId,
        component: &ComponentId,
        value: Self::Component,
    );

    fn set_pose(&mut self, entity: &EntityId, position: Vec3, rotation: Option<Quat>);
}
