use super::event::Event;
use crate::{EntityId, EventSeq};

/// Game-specific side of event replication
pub trait GameRules<W> {
    /// The entity whose owner is entitled to originate `event`. Defaults to
    /// the first referenced entity.
    fn authority_entity(&self, event: &Event) -> Option<EntityId> {
        event.entities.first().copied()
    }

    /// Whether `event` may happen given the current world. Checked by the
    /// originator and again by the host, whose answer is final.
    fn is_legal(&self, world: &W, event: &Event) -> bool;

    /// Execute a committed event. Called exactly once per log entry, in seq
    /// order, once all referenced entities exist locally.
    fn apply(&mut self, world: &mut W, seq: EventSeq, event: &Event);
}
