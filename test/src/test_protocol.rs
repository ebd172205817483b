//! Minimal protocol shared by every peer in the test mesh

use meshsync_shared::{ComponentId, EntityTypeId, EntityTypeSettings, EventKind, Protocol};

// Components
pub const COLOR: ComponentId = 1;
pub const POSITION: ComponentId = 2;
pub const VELOCITY: ComponentId = 3;
pub const ROTATION: ComponentId = 4;
pub const ANGULAR_VELOCITY: ComponentId = 5;

// Entity types
/// Moving, rotating and dead-reckoned
pub const SHIP: EntityTypeId = 1;
/// Static, never predicted
pub const CRATE: EntityTypeId = 2;

// Events
pub const HIT: EventKind = EventKind::from_name("hit");
/// Always illegal under [`TestRules`](crate::TestRules)
pub const CHEAT: EventKind = EventKind::from_name("cheat");

pub fn protocol() -> Protocol {
    Protocol::builder()
        .add_entity_type(
            SHIP,
            EntityTypeSettings::new(
                vec![COLOR],
                vec![POSITION, VELOCITY, ROTATION, ANGULAR_VELOCITY],
            )
            .predicted(),
        )
        .add_entity_type(CRATE, EntityTypeSettings::new(vec![COLOR], vec![POSITION]))
        .build()
}
