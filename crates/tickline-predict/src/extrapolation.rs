//! Remote entity extrapolation
//!
//! When the tick after `next` has not arrived, remote entities are assumed to
//! keep following their last known state: each one is moved by a fabricated
//! event for one tick duration, and the result is tagged with the following
//! tick id.

use std::sync::Arc;

use tickline_core::{EntityId, Event, MotionModel, TickId, WorldSnapshot};
use tickline_time::{SnapshotSource, StepContext};

use crate::{ConstantVelocity, EventFactory, ExtrapolationConfig};

/// Synthesize the world following `next`
///
/// Every entity of `next` except `skip` gets a factory event at `tick_id` and
/// is extrapolated over `dt` seconds. The result carries `tick_id + 1`.
pub fn extrapolate_remote(
    next: &WorldSnapshot,
    factory: &dyn EventFactory,
    skip: Option<EntityId>,
    tick_id: TickId,
    dt: f64,
    model: MotionModel,
) -> WorldSnapshot {
    let events: Vec<Event> = next
        .entity_ids()
        .filter(|id| Some(*id) != skip)
        .map(|id| factory.make(tick_id, id))
        .collect();

    next.extrapolate_with(&events, dt, Some(tick_id.next()), model)
}

/// Plays back queued snapshots and extrapolates remote entities across gaps
///
/// Nothing is fabricated before the first authoritative snapshot: until then
/// steps fail and the clock stalls like plain playback. The configured local
/// entity, if any, is left out of synthesized worlds.
pub struct ExtrapolationSource {
    factory: Box<dyn EventFactory + Send>,
    local_entity: Option<EntityId>,
    motion_model: MotionModel,
    extrapolated: u64,
}

impl ExtrapolationSource {
    pub fn new(config: &ExtrapolationConfig) -> Self {
        Self::with_event_factory(config, ConstantVelocity::default())
    }

    pub fn with_event_factory<F>(config: &ExtrapolationConfig, factory: F) -> Self
    where
        F: EventFactory + Send + 'static,
    {
        Self {
            factory: Box::new(factory),
            local_entity: config.local_entity,
            motion_model: config.motion_model,
            extrapolated: 0,
        }
    }

    /// Ticks synthesized so far
    pub fn extrapolated_ticks(&self) -> u64 {
        self.extrapolated
    }
}

impl SnapshotSource for ExtrapolationSource {
    fn produce(&mut self, step: StepContext<'_>) -> Option<Arc<WorldSnapshot>> {
        let dt = step.tick_dt();
        if let Some(pulled) = step.pulled {
            return Some(Arc::new(pulled));
        }

        let next = step.next?;
        self.extrapolated += 1;
        tracing::trace!(tick = step.tick_id.value(), "extrapolating missing tick");

        Some(Arc::new(extrapolate_remote(
            next,
            self.factory.as_ref(),
            self.local_entity,
            step.tick_id,
            dt,
            self.motion_model,
        )))
    }
}
