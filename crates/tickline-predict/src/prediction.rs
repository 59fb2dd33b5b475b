//! Client-side prediction source
//!
//! Every step produces a world, authoritative or not:
//! 1. the queued authoritative world for the tick, if it arrived
//! 2. otherwise remote entities extrapolated from `next`
//! 3. the local entity predicted from the latest local input, merged in
//!
//! Each produced world is recorded in the prediction history together with the
//! event used to predict the local entity.

use std::sync::Arc;

use tickline_core::{EntityId, Event, MotionModel, Snapshot, TickId, WorldSnapshot};
use tickline_time::{FeedOutcome, SnapshotSource, StepContext};

use crate::{
    extrapolate_remote, ConstantVelocity, EventFactory, EventQueue, PredictionConfig,
    PredictionHistory,
};

pub struct PredictionSource {
    local_entity: EntityId,
    initial: Arc<WorldSnapshot>,
    motion_model: MotionModel,
    max_buffered_events: usize,
    factory: Box<dyn EventFactory + Send>,
    events: EventQueue,
    history: PredictionHistory,
    stale_events: u64,
}

impl PredictionSource {
    pub fn new(config: &PredictionConfig) -> Self {
        Self::with_event_factory(config, ConstantVelocity::default())
    }

    pub fn with_event_factory<F>(config: &PredictionConfig, factory: F) -> Self
    where
        F: EventFactory + Send + 'static,
    {
        Self {
            local_entity: config.local_entity,
            initial: Arc::new(config.initial_snapshot.clone()),
            motion_model: config.motion_model,
            max_buffered_events: config.max_buffered_events,
            factory: Box::new(factory),
            events: EventQueue::new(),
            history: PredictionHistory::new(config.history_capacity),
            stale_events: 0,
        }
    }

    /// Queue local input; events for ticks at or below `current` are stale
    pub fn feed_event(&mut self, event: Event, current: TickId) -> FeedOutcome {
        if event.tick_id <= current {
            self.stale_events += 1;
            tracing::trace!(
                tick = event.tick_id.value(),
                current = current.value(),
                "dropping stale event"
            );
            return FeedOutcome::Stale;
        }

        self.events.feed(event);
        FeedOutcome::Queued
    }

    pub fn local_entity(&self) -> EntityId {
        self.local_entity
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn history(&self) -> &PredictionHistory {
        &self.history
    }

    pub fn stale_events(&self) -> u64 {
        self.stale_events
    }

    /// Predict the local entity one tick ahead
    ///
    /// Starts from the last predicted state when there is one, so prediction
    /// keeps running ahead of authoritative data. An entity never seen before
    /// starts at the origin.
    fn predict_local(&self, next: &WorldSnapshot, tick_id: TickId, dt: f64) -> (Event, Snapshot) {
        let event = self
            .events
            .latest()
            .copied()
            .unwrap_or_else(|| self.factory.make(tick_id, self.local_entity));

        let base = self
            .history
            .last()
            .and_then(|(_, world)| world.get_snapshot(self.local_entity))
            .or_else(|| next.get_snapshot(self.local_entity))
            .copied()
            .unwrap_or_else(|| Snapshot::at_origin(self.local_entity));

        (event, base.extrapolate_with(&event, dt, self.motion_model))
    }
}

impl SnapshotSource for PredictionSource {
    fn produce(&mut self, step: StepContext<'_>) -> Option<Arc<WorldSnapshot>> {
        let dt = step.tick_dt();
        let tick_id = step.tick_id;
        let next = step
            .next
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.initial));

        let mut world = match step.pulled {
            Some(world) => world,
            None => {
                tracing::trace!(tick = tick_id.value(), "extrapolating missing tick");
                extrapolate_remote(
                    &next,
                    self.factory.as_ref(),
                    Some(self.local_entity),
                    tick_id,
                    dt,
                    self.motion_model,
                )
            }
        };

        let (event, predicted) = self.predict_local(&next, tick_id, dt);
        world.add_snapshot(self.local_entity, predicted);

        let world = Arc::new(world);
        self.history.push(event, Arc::clone(&world));
        Some(world)
    }

    fn baseline(&self) -> Option<Arc<WorldSnapshot>> {
        Some(Arc::clone(&self.initial))
    }

    fn finish_update(&mut self) {
        self.events.trim(self.max_buffered_events);
    }
}
