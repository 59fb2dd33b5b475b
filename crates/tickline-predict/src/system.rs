//! Prediction and extrapolation systems
//!
//! Thin owners of a `TickScheduler` wired to the matching source, exposing
//! the scheduler's driver and observer surface plus local input.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tickline_core::{EntityId, Event, TickId, TicklineResult, WorldSnapshot};
use tickline_time::{FeedOutcome, PlaybackState, PlaybackStats, TickScheduler};

use crate::{
    EventFactory, ExtrapolationConfig, ExtrapolationSource, PredictionConfig, PredictionHistory,
    PredictionSource,
};

/// Playback with remote extrapolation and client-side prediction
///
/// Never stalls: a missing tick is always synthesized.
pub struct PredictionSystem {
    scheduler: TickScheduler<PredictionSource>,
}

impl PredictionSystem {
    /// Default prediction at `tick_rate` Hz
    pub fn new(tick_rate: u32) -> TicklineResult<Self> {
        Self::with_config(PredictionConfig::with_tick_rate(tick_rate))
    }

    pub fn with_config(config: PredictionConfig) -> TicklineResult<Self> {
        config.validate()?;
        let source = PredictionSource::new(&config);
        Ok(Self {
            scheduler: TickScheduler::with_source(config.playback, source)?,
        })
    }

    /// Prediction fabricating "no input" events through `factory`
    pub fn with_event_factory<F>(config: PredictionConfig, factory: F) -> TicklineResult<Self>
    where
        F: EventFactory + Send + 'static,
    {
        config.validate()?;
        let source = PredictionSource::with_event_factory(&config, factory);
        Ok(Self {
            scheduler: TickScheduler::with_source(config.playback, source)?,
        })
    }

    pub fn feed_snapshot(&mut self, snapshot: WorldSnapshot) -> FeedOutcome {
        self.scheduler.feed_snapshot(snapshot)
    }

    /// Queue local input for the local entity
    pub fn feed_event(&mut self, event: Event) -> FeedOutcome {
        let current = self.scheduler.tick_id();
        self.scheduler.source_mut().feed_event(event, current)
    }

    /// Advance time by `dt` seconds
    pub fn update(&mut self, dt: f64) {
        self.scheduler.update(dt);
    }

    pub fn advance(&mut self, dt: Duration) {
        self.scheduler.advance(dt);
    }

    pub fn tick_id(&self) -> TickId {
        self.scheduler.tick_id()
    }

    pub fn tick_time(&self) -> f64 {
        self.scheduler.tick_time()
    }

    pub fn real_time(&self) -> f64 {
        self.scheduler.real_time()
    }

    pub fn interpolation_factor(&self) -> f64 {
        self.scheduler.interpolation_factor()
    }

    pub fn clamped_interpolation_factor(&self) -> f64 {
        self.scheduler.clamped_interpolation_factor()
    }

    pub fn interpolated_snapshot(&self) -> Option<&WorldSnapshot> {
        self.scheduler.interpolated_snapshot()
    }

    pub fn interpolated_shared(&self) -> Option<Arc<WorldSnapshot>> {
        self.scheduler.interpolated_shared()
    }

    pub fn snapshot_queue_size(&self) -> usize {
        self.scheduler.snapshot_queue_size()
    }

    pub fn event_queue_size(&self) -> usize {
        self.scheduler.source().events().len()
    }

    pub fn local_entity(&self) -> EntityId {
        self.scheduler.source().local_entity()
    }

    pub fn history(&self) -> &PredictionHistory {
        self.scheduler.source().history()
    }

    pub fn state(&self) -> PlaybackState {
        self.scheduler.state()
    }

    pub fn stats(&self) -> &PlaybackStats {
        self.scheduler.stats()
    }

    /// Underlying scheduler, for the rest of the observer surface
    pub fn scheduler(&self) -> &TickScheduler<PredictionSource> {
        &self.scheduler
    }
}

impl fmt::Display for PredictionSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<PredictionSystem {}Hz>", self.scheduler.tick_rate())
    }
}

/// Playback that extrapolates every entity across missing ticks
pub struct ExtrapolationSystem {
    scheduler: TickScheduler<ExtrapolationSource>,
}

impl ExtrapolationSystem {
    pub fn new(tick_rate: u32) -> TicklineResult<Self> {
        Self::with_config(ExtrapolationConfig::with_tick_rate(tick_rate))
    }

    pub fn with_config(config: ExtrapolationConfig) -> TicklineResult<Self> {
        let source = ExtrapolationSource::new(&config);
        Ok(Self {
            scheduler: TickScheduler::with_source(config.playback, source)?,
        })
    }

    pub fn with_event_factory<F>(config: ExtrapolationConfig, factory: F) -> TicklineResult<Self>
    where
        F: EventFactory + Send + 'static,
    {
        let source = ExtrapolationSource::with_event_factory(&config, factory);
        Ok(Self {
            scheduler: TickScheduler::with_source(config.playback, source)?,
        })
    }

    pub fn feed_snapshot(&mut self, snapshot: WorldSnapshot) -> FeedOutcome {
        self.scheduler.feed_snapshot(snapshot)
    }

    pub fn update(&mut self, dt: f64) {
        self.scheduler.update(dt);
    }

    pub fn advance(&mut self, dt: Duration) {
        self.scheduler.advance(dt);
    }

    pub fn tick_id(&self) -> TickId {
        self.scheduler.tick_id()
    }

    pub fn tick_time(&self) -> f64 {
        self.scheduler.tick_time()
    }

    pub fn real_time(&self) -> f64 {
        self.scheduler.real_time()
    }

    pub fn interpolation_factor(&self) -> f64 {
        self.scheduler.interpolation_factor()
    }

    pub fn interpolated_snapshot(&self) -> Option<&WorldSnapshot> {
        self.scheduler.interpolated_snapshot()
    }

    pub fn snapshot_queue_size(&self) -> usize {
        self.scheduler.snapshot_queue_size()
    }

    pub fn stats(&self) -> &PlaybackStats {
        self.scheduler.stats()
    }

    /// Ticks synthesized so far
    pub fn extrapolated_ticks(&self) -> u64 {
        self.scheduler.source().extrapolated_ticks()
    }

    pub fn state(&self) -> PlaybackState {
        self.scheduler.state()
    }

    pub fn scheduler(&self) -> &TickScheduler<ExtrapolationSource> {
        &self.scheduler
    }
}
