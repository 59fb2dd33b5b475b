//! Input/command events

use std::fmt;

use crate::{EntityId, TickId, Vector3};

/// A per-entity command valid at a tick
///
/// The only command carried today is a velocity, used to extrapolate motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Tick at which the command applies
    pub tick_id: TickId,
    /// Target entity
    pub entity_id: EntityId,
    /// Commanded velocity
    pub velocity: Vector3,
}

impl Event {
    pub fn new(tick_id: TickId, entity_id: EntityId, velocity: Vector3) -> Self {
        Self {
            tick_id,
            entity_id,
            velocity,
        }
    }

    /// Event with zero velocity ("no input known")
    pub fn idle(tick_id: TickId, entity_id: EntityId) -> Self {
        Self::new(tick_id, entity_id, Vector3::ZERO)
    }

    pub fn tick_id(&self) -> TickId {
        self.tick_id
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event #{} {}", self.tick_id, self.velocity)
    }
}
