pub mod test_protocol;
pub mod test_rules;
pub mod test_world;

pub use local_mesh::{Delivery, LocalMesh, MeshNode, MeshTransport};
pub use test_protocol::{
    protocol, ANGULAR_VELOCITY, CHEAT, COLOR, CRATE, HIT, POSITION, ROTATION, SHIP, VELOCITY,
};
pub use test_rules::TestRules;
pub use test_world::{ComponentValue, TestEntity, TestWorld};
