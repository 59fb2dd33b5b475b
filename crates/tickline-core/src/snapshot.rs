//! Entity and world snapshots
//!
//! A `Snapshot` is the state of one entity at one tick, a `WorldSnapshot`
//! the state of every known entity at one tick. Both are values: interpolation
//! and extrapolation always build new instances.

use std::collections::BTreeMap;
use std::fmt;

use crate::{EntityId, Event, TickId, Vector3};

/// How an event's velocity moves a position over `dt` seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionModel {
    /// `position + velocity / dt`
    ///
    /// This is the motion model the wire data was produced with. At a 20Hz
    /// tick it moves an entity `20 * velocity` per tick.
    #[default]
    InverseTime,
    /// `position + velocity * dt`
    Integrate,
}

impl MotionModel {
    /// Displacement produced by `velocity` over `dt` seconds
    pub fn displacement(self, velocity: Vector3, dt: f64) -> Vector3 {
        match self {
            MotionModel::InverseTime => velocity / dt,
            MotionModel::Integrate => velocity * dt,
        }
    }
}

/// State of one entity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Snapshot {
    entity_id: EntityId,
    position: Vector3,
}

impl Snapshot {
    pub fn new(entity_id: EntityId, position: Vector3) -> Self {
        Self {
            entity_id,
            position,
        }
    }

    /// Entity at the origin
    pub fn at_origin(entity_id: EntityId) -> Self {
        Self::new(entity_id, Vector3::ZERO)
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Snapshot between this one and `other`; keeps this entity id
    pub fn interpolate(&self, other: &Snapshot, factor: f64) -> Snapshot {
        Snapshot {
            entity_id: self.entity_id,
            position: self.position.lerp(&other.position, factor),
        }
    }

    /// Project forward by `event` over `dt` seconds with the default motion model
    pub fn extrapolate(&self, event: &Event, dt: f64) -> Snapshot {
        self.extrapolate_with(event, dt, MotionModel::default())
    }

    /// Project forward by `event` over `dt` seconds
    ///
    /// A zero `dt` leaves the position untouched whatever the model.
    pub fn extrapolate_with(&self, event: &Event, dt: f64, model: MotionModel) -> Snapshot {
        let position = if dt != 0.0 {
            self.position + model.displacement(event.velocity, dt)
        } else {
            self.position
        };

        Snapshot {
            entity_id: self.entity_id,
            position,
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Snapshot #{} {}", self.entity_id, self.position)
    }
}

/// State of the whole world at one tick
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorldSnapshot {
    tick_id: TickId,
    snapshots: BTreeMap<EntityId, Snapshot>,
}

impl WorldSnapshot {
    /// Empty world at `tick_id`
    pub fn new(tick_id: TickId) -> Self {
        Self {
            tick_id,
            snapshots: BTreeMap::new(),
        }
    }

    /// World built from entity snapshots; a later entry wins on a repeated entity id
    pub fn with_snapshots<I>(tick_id: TickId, snapshots: I) -> Self
    where
        I: IntoIterator<Item = Snapshot>,
    {
        Self {
            tick_id,
            snapshots: snapshots
                .into_iter()
                .map(|s| (s.entity_id(), s))
                .collect(),
        }
    }

    /// World holding a single entity
    pub fn single(tick_id: TickId, snapshot: Snapshot) -> Self {
        Self::with_snapshots(tick_id, [snapshot])
    }

    pub fn tick_id(&self) -> TickId {
        self.tick_id
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.snapshots.keys().copied()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.values()
    }

    pub fn get_snapshot(&self, entity_id: EntityId) -> Option<&Snapshot> {
        self.snapshots.get(&entity_id)
    }

    pub fn contains(&self, entity_id: EntityId) -> bool {
        self.snapshots.contains_key(&entity_id)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Insert or replace one entity
    ///
    /// Only meant for merging locally predicted state into a world that has
    /// not been published yet.
    pub fn add_snapshot(&mut self, entity_id: EntityId, snapshot: Snapshot) {
        self.snapshots.insert(entity_id, snapshot);
    }

    /// World between this one and `other`
    ///
    /// Only entities present in both worlds survive. The result keeps this
    /// world's tick id.
    pub fn interpolate(&self, other: &WorldSnapshot, factor: f64) -> WorldSnapshot {
        let snapshots = self
            .snapshots
            .iter()
            .filter_map(|(id, a)| {
                other
                    .snapshots
                    .get(id)
                    .map(|b| (*id, a.interpolate(b, factor)))
            })
            .collect();

        WorldSnapshot {
            tick_id: self.tick_id,
            snapshots,
        }
    }

    /// Project entities forward with the default motion model
    pub fn extrapolate(&self, events: &[Event], dt: f64, tick_id: Option<TickId>) -> WorldSnapshot {
        self.extrapolate_with(events, dt, tick_id, MotionModel::default())
    }

    /// Project entities forward by their events
    ///
    /// Only entities with both an event and an existing snapshot appear in the
    /// result. The tick id is `tick_id` when given, this world's otherwise.
    pub fn extrapolate_with(
        &self,
        events: &[Event],
        dt: f64,
        tick_id: Option<TickId>,
        model: MotionModel,
    ) -> WorldSnapshot {
        let snapshots = events
            .iter()
            .filter_map(|event| {
                self.snapshots
                    .get(&event.entity_id)
                    .map(|s| (s.entity_id(), s.extrapolate_with(event, dt, model)))
            })
            .collect();

        WorldSnapshot {
            tick_id: tick_id.unwrap_or(self.tick_id),
            snapshots,
        }
    }
}

impl fmt::Display for WorldSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorldSnapshot #{} ({})", self.tick_id, self.snapshots.len())
    }
}
