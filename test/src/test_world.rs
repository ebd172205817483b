//! Simple world implementation for replication tests: entities are plain
//! maps from component id to value.

use std::collections::{BTreeMap, HashMap};

use meshsync_serde::{ByteReader, ByteWriter, SerdeErr};
use meshsync_shared::{
    ComponentId, EntityId, EntityTypeId, Motion, PeerId, Quat, Vec3, WorldMutType, WorldRefType,
};

use crate::test_protocol::{ANGULAR_VELOCITY, COLOR, POSITION, ROTATION, VELOCITY};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComponentValue {
    Color(u32),
    Position(Vec3),
    Velocity(Vec3),
    Rotation(Quat),
    AngularVelocity(Vec3),
}

impl ComponentValue {
    pub fn component_id(&self) -> ComponentId {
        match self {
            ComponentValue::Color(_) => COLOR,
            ComponentValue::Position(_) => POSITION,
            ComponentValue::Velocity(_) => VELOCITY,
            ComponentValue::Rotation(_) => ROTATION,
            ComponentValue::AngularVelocity(_) => ANGULAR_VELOCITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TestEntity {
    pub type_id: EntityTypeId,
    pub creator: PeerId,
    pub components: HashMap<ComponentId, ComponentValue>,
}

#[derive(Default)]
pub struct TestWorld {
    pub entities: BTreeMap<EntityId, TestEntity>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity with the given components
    pub fn spawn(
        &mut self,
        entity: EntityId,
        type_id: EntityTypeId,
        creator: PeerId,
        components: &[ComponentValue],
    ) {
        self.spawn_entity(&entity, type_id, creator);
        for value in components {
            self.insert(entity, *value);
        }
    }

    pub fn insert(&mut self, entity: EntityId, value: ComponentValue) {
        if let Some(test_entity) = self.entities.get_mut(&entity) {
            test_entity.components.insert(value.component_id(), value);
        }
    }

    pub fn despawn(&mut self, entity: &EntityId) -> Option<TestEntity> {
        self.entities.remove(entity)
    }

    pub fn get(&self, entity: &EntityId, component: &ComponentId) -> Option<ComponentValue> {
        self.entities
            .get(entity)
            .and_then(|test_entity| test_entity.components.get(component))
            .copied()
    }

    pub fn position(&self, entity: &EntityId) -> Option<Vec3> {
        match self.get(entity, &POSITION)? {
            ComponentValue::Position(position) => Some(position),
            _ => None,
        }
    }

    pub fn rotation(&self, entity: &EntityId) -> Option<Quat> {
        match self.get(entity, &ROTATION)? {
            ComponentValue::Rotation(rotation) => Some(rotation),
            _ => None,
        }
    }

    pub fn color(&self, entity: &EntityId) -> Option<u32> {
        match self.get(entity, &COLOR)? {
            ComponentValue::Color(color) => Some(color),
            _ => None,
        }
    }

    fn vec3(&self, entity: &EntityId, component: &ComponentId) -> Option<Vec3> {
        match self.get(entity, component)? {
            ComponentValue::Position(value)
            | ComponentValue::Velocity(value)
            | ComponentValue::AngularVelocity(value) => Some(value),
            _ => None,
        }
    }
}

impl WorldRefType for TestWorld {
    type Component = ComponentValue;

    fn has_entity(&self, entity: &EntityId) -> bool {
        self.entities.contains_key(entity)
    }

    fn write_component(
        &self,
        entity: &EntityId,
        component: &ComponentId,
        writer: &mut ByteWriter,
    ) -> Result<(), SerdeErr> {
        let Some(value) = self.get(entity, component) else {
            return Err(SerdeErr::InvalidValue {
                what: "missing component",
                value: *component,
            });
        };
        match value {
            ComponentValue::Color(color) => writer.write(&color),
            ComponentValue::Position(value)
            | ComponentValue::Velocity(value)
            | ComponentValue::AngularVelocity(value) => writer.write(&value),
            ComponentValue::Rotation(rotation) => writer.write_atomic(|writer| {
                writer.write(&rotation.x)?;
                writer.write(&rotation.y)?;
                writer.write(&rotation.z)?;
                writer.write(&rotation.w)
            }),
        }
    }

    fn read_component(
        &self,
        component: &ComponentId,
        reader: &mut ByteReader,
    ) -> Result<ComponentValue, SerdeErr> {
        Ok(match *component {
            COLOR => ComponentValue::Color(reader.read()?),
            POSITION => ComponentValue::Position(reader.read()?),
            VELOCITY => ComponentValue::Velocity(reader.read()?),
            ANGULAR_VELOCITY => ComponentValue::AngularVelocity(reader.read()?),
            ROTATION => {
                let x = reader.read()?;
                let y = reader.read()?;
                let z = reader.read()?;
                let w = reader.read()?;
                ComponentValue::Rotation(Quat::new(x, y, z, w))
            }
            other => {
                return Err(SerdeErr::InvalidValue {
                    what: "component id",
                    value: other,
                })
            }
        })
    }

    fn motion(&self, entity: &EntityId) -> Option<Motion> {
        Some(Motion {
            position: self.vec3(entity, &POSITION)?,
            linear_velocity: self.vec3(entity, &VELOCITY)?,
            rotation: self.rotation(entity),
            angular_velocity: self.vec3(entity, &ANGULAR_VELOCITY),
        })
    }
}

impl WorldMutType for TestWorld {
    fn spawn_entity(&mut self, entity: &EntityId, type_id: EntityTypeId, creator: PeerId) {
        self.entities.entry(*entity).or_insert_with(|| TestEntity {
            type_id,
            creator,
            components: HashMap::new(),
        });
    }

    fn insert_component(
        &mut self,
        entity: &EntityId,
        component: &ComponentId,
        value: ComponentValue,
    ) {
        if value.component_id() != *component {
            return;
        }
        self.insert(*entity, value);
    }

    fn set_pose(&mut self, entity: &EntityId, position: Vec3, rotation: Option<Quat>) {
        self.insert(*entity, ComponentValue::Position(position));
        if let Some(rotation) = rotation {
            self.insert(*entity, ComponentValue::Rotation(rotation));
        }
    }
}
