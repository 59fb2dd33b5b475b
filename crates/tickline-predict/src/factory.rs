//! Event factories - the motion model for "no input known"

use tickline_core::{EntityId, Event, TickId, Vector3};

/// Builds the event used when no real input exists for an entity
pub trait EventFactory {
    fn make(&self, tick_id: TickId, entity_id: EntityId) -> Event;
}

/// Every fabricated event carries the same velocity (zero by default)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstantVelocity(pub Vector3);

impl EventFactory for ConstantVelocity {
    fn make(&self, tick_id: TickId, entity_id: EntityId) -> Event {
        Event::new(tick_id, entity_id, self.0)
    }
}

impl<F> EventFactory for F
where
    F: Fn(TickId, EntityId) -> Event,
{
    fn make(&self, tick_id: TickId, entity_id: EntityId) -> Event {
        self(tick_id, entity_id)
    }
}
