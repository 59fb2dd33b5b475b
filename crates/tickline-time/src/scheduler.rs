//! Tick Scheduler - fixed-step playback paced by wall-clock deltas
//!
//! The scheduler keeps two clocks in logical milliseconds:
//! - `tick_time`: time of the tick currently stepped into (`next`)
//! - `real_time`: wall-clock time accumulated from `update` deltas
//!
//! `tick_time` only advances by whole ticks, and only when a snapshot is
//! available. When none is, the clock stalls and `real_time` stays pinned
//! below the requested target until data arrives.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tickline_core::{TickId, TicklineResult, WorldSnapshot};

use crate::{FeedOutcome, PlaybackConfig, QueueSource, SnapshotQueue, SnapshotSource, StepContext};

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing stepped into yet
    Unstarted,
    /// Last step attempt succeeded
    Running,
    /// Last step attempt failed; the clock is frozen
    Stalled,
}

/// Counters for dropped input and clock behavior
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    pub steps: u64,
    pub stalls: u64,
    pub stale_dropped: u64,
    pub duplicate_dropped: u64,
    pub overflow_dropped: u64,
}

/// Plain snapshot playback
pub type PlaybackSystem = TickScheduler<QueueSource>;

/// Fixed-step scheduler over a snapshot source
pub struct TickScheduler<S: SnapshotSource> {
    config: PlaybackConfig,
    /// Tick duration in ms
    tick_duration: f64,
    queue: SnapshotQueue,
    source: S,

    next: Option<Arc<WorldSnapshot>>,
    previous: Option<Arc<WorldSnapshot>>,
    interpolated: Option<Arc<WorldSnapshot>>,

    /// Time of the next tick in ms
    tick_time: f64,
    /// Real time in ms
    real_time: f64,

    stalled: bool,
    stats: PlaybackStats,
}

impl TickScheduler<QueueSource> {
    /// Plain playback at `tick_rate` Hz
    pub fn new(tick_rate: u32) -> TicklineResult<Self> {
        Self::with_config(PlaybackConfig::with_tick_rate(tick_rate))
    }

    /// Plain playback with custom configuration
    pub fn with_config(config: PlaybackConfig) -> TicklineResult<Self> {
        Self::with_source(config, QueueSource)
    }
}

impl<S: SnapshotSource> TickScheduler<S> {
    /// Scheduler stepping through `source`
    pub fn with_source(config: PlaybackConfig, source: S) -> TicklineResult<Self> {
        config.validate()?;
        Ok(TickScheduler {
            tick_duration: config.tick_duration_ms(),
            config,
            queue: SnapshotQueue::new(),
            source,
            next: None,
            previous: None,
            interpolated: None,
            tick_time: 0.0,
            real_time: 0.0,
            stalled: false,
            stats: PlaybackStats::default(),
        })
    }

    /// Queue an authoritative snapshot
    ///
    /// Ticks at or below the current one are stale; a tick that is already
    /// queued keeps its first arrival.
    pub fn feed_snapshot(&mut self, snapshot: WorldSnapshot) -> FeedOutcome {
        let tick_id = snapshot.tick_id();
        if tick_id <= self.tick_id() {
            self.stats.stale_dropped += 1;
            tracing::trace!(
                tick = tick_id.value(),
                current = self.tick_id().value(),
                "dropping stale snapshot"
            );
            return FeedOutcome::Stale;
        }

        let outcome = self.queue.insert(snapshot);
        if outcome == FeedOutcome::Duplicate {
            self.stats.duplicate_dropped += 1;
            tracing::trace!(tick = tick_id.value(), "dropping duplicate snapshot");
        }
        outcome
    }

    /// Advance time by `dt` seconds
    pub fn update(&mut self, dt: f64) {
        let target = self.real_time + dt * 1000.0;

        let mut stalled = false;
        while self.tick_time < target {
            if self.do_step() {
                self.tick_time += self.tick_duration;
                self.real_time = self.real_time.max(self.tick_time);
            } else {
                // Step failed - stop time
                stalled = true;
                break;
            }
        }
        if !stalled {
            self.real_time = target;
        }

        self.interpolate();

        let dropped = self.queue.trim(self.config.max_buffered_snapshots);
        if dropped > 0 {
            self.stats.overflow_dropped += dropped as u64;
            tracing::trace!(dropped, "trimmed snapshot queue");
        }

        self.source.finish_update();
    }

    /// Advance time by a `Duration`
    pub fn advance(&mut self, dt: Duration) {
        self.update(dt.as_secs_f64());
    }

    /// Tick id of the snapshot currently stepped into, zero before the first step
    pub fn tick_id(&self) -> TickId {
        self.next
            .as_ref()
            .map(|s| s.tick_id())
            .unwrap_or(TickId::ZERO)
    }

    /// Time of the current tick in seconds
    pub fn tick_time(&self) -> f64 {
        self.tick_time / 1000.0
    }

    /// Real time in seconds
    pub fn real_time(&self) -> f64 {
        self.real_time / 1000.0
    }

    /// Blend factor between the previous and next snapshot
    ///
    /// One when there is nothing to blend from. Not clamped; use
    /// [`Self::clamped_interpolation_factor`] when [0, 1] is required.
    pub fn interpolation_factor(&self) -> f64 {
        if self.previous.is_none() {
            return 1.0;
        }

        let time_remaining = self.tick_time - self.real_time;
        1.0 - time_remaining / self.tick_duration
    }

    pub fn clamped_interpolation_factor(&self) -> f64 {
        self.interpolation_factor().clamp(0.0, 1.0)
    }

    /// Snapshot to render, `None` until the first step
    pub fn interpolated_snapshot(&self) -> Option<&WorldSnapshot> {
        self.interpolated.as_deref()
    }

    pub fn interpolated_shared(&self) -> Option<Arc<WorldSnapshot>> {
        self.interpolated.clone()
    }

    pub fn next_snapshot(&self) -> Option<&WorldSnapshot> {
        self.next.as_deref()
    }

    pub fn previous_snapshot(&self) -> Option<&WorldSnapshot> {
        self.previous.as_deref()
    }

    pub fn snapshot_queue_size(&self) -> usize {
        self.queue.len()
    }

    pub fn tick_rate(&self) -> u32 {
        self.config.tick_rate
    }

    /// Tick duration
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(self.tick_duration / 1000.0)
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        if self.next.is_none() {
            PlaybackState::Unstarted
        } else if self.stalled {
            PlaybackState::Stalled
        } else {
            PlaybackState::Running
        }
    }

    pub fn stats(&self) -> &PlaybackStats {
        &self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Do a single tick: try to switch to the next snapshot
    fn do_step(&mut self) -> bool {
        if self.next.is_none() {
            self.next = self.source.baseline();
        }

        let step = StepContext {
            pulled: self.queue.pop_lowest(),
            next: self.next.as_ref(),
            tick_id: self.tick_id(),
            tick_duration_ms: self.tick_duration,
        };

        let Some(snapshot) = self.source.produce(step) else {
            if !self.stalled {
                self.stats.stalls += 1;
                tracing::debug!(tick = self.tick_id().value(), "playback stalled");
            }
            self.stalled = true;
            return false;
        };

        self.stalled = false;
        self.stats.steps += 1;
        self.previous = self.next.replace(snapshot);
        true
    }

    fn interpolate(&mut self) {
        let factor = self.interpolation_factor();
        self.interpolated = match (&self.previous, &self.next) {
            (Some(previous), Some(next)) if factor != 1.0 => {
                Some(Arc::new(previous.interpolate(next, factor)))
            }
            _ => self.next.clone(),
        };
    }
}

impl<S: SnapshotSource> fmt::Display for TickScheduler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<TickScheduler {}Hz>", self.config.tick_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tickline_core::{EntityId, Snapshot, Vector3};

    const EPS: f64 = 1e-9;

    fn world(tick: u64) -> WorldSnapshot {
        WorldSnapshot::new(TickId::new(tick))
    }

    fn world_at(tick: u64, x: f64) -> WorldSnapshot {
        WorldSnapshot::single(
            TickId::new(tick),
            Snapshot::new(EntityId::ZERO, Vector3::new(x, 0.0, 0.0)),
        )
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn interpolated_x(system: &PlaybackSystem) -> f64 {
        system
            .interpolated_snapshot()
            .and_then(|w| w.get_snapshot(EntityId::ZERO))
            .map(|s| s.position().x)
            .unwrap()
    }

    #[test]
    fn test_update_50ms() {
        let mut system = PlaybackSystem::new(20).unwrap();
        system.feed_snapshot(world(1));
        system.feed_snapshot(world(2));
        system.update(0.050);
        system.update(0.050);

        assert_eq!(system.tick_id(), TickId::new(2));
        assert_close(system.tick_time(), 0.100);
        assert_close(system.real_time(), 0.100);
        assert_eq!(system.interpolation_factor(), 1.0);
        assert_eq!(system.interpolated_snapshot().unwrap().tick_id(), TickId::new(2));
    }

    #[test]
    fn test_update_120ms() {
        let mut system = PlaybackSystem::new(20).unwrap();
        system.feed_snapshot(world(1));
        system.feed_snapshot(world(2));
        system.feed_snapshot(world(3));
        system.update(0.120);

        assert_eq!(system.tick_id(), TickId::new(3));
        assert_close(system.tick_time(), 0.150);
        assert_close(system.real_time(), 0.120);
        assert_close(system.interpolation_factor(), 0.4);
    }

    #[test]
    fn test_update_49ms() {
        let mut system = PlaybackSystem::new(20).unwrap();
        system.feed_snapshot(world(1));
        system.feed_snapshot(world(2));
        system.update(0.050);
        system.update(0.049);

        assert_eq!(system.tick_id(), TickId::new(2));
        assert_close(system.tick_time(), 0.100);
        assert_close(system.real_time(), 0.099);
        assert_close(system.interpolation_factor(), 0.98);
    }

    #[test]
    fn test_feed_order() {
        let mut system = PlaybackSystem::new(20).unwrap();
        for tick in [4, 2, 10, 3, 7, 1, 6, 8, 5, 9] {
            assert_eq!(system.feed_snapshot(world(tick)), FeedOutcome::Queued);
        }

        for tick in 1..=10 {
            assert!(system.do_step());
            assert_eq!(system.tick_id(), TickId::new(tick));
        }
        assert!(!system.do_step());
    }

    #[test]
    fn test_feed_stale_and_duplicate() {
        let mut system = PlaybackSystem::new(20).unwrap();
        assert_eq!(system.feed_snapshot(world_at(1, 1.0)), FeedOutcome::Queued);
        assert_eq!(system.feed_snapshot(world_at(2, 2.0)), FeedOutcome::Queued);
        assert_eq!(system.feed_snapshot(world_at(2, 9.0)), FeedOutcome::Duplicate);
        system.update(0.050);

        assert_eq!(system.feed_snapshot(world(1)), FeedOutcome::Stale);
        assert_eq!(system.feed_snapshot(world(0)), FeedOutcome::Stale);

        system.update(0.050);
        assert_eq!(system.tick_id(), TickId::new(2));
        // First arrival wins
        assert_eq!(interpolated_x(&system), 2.0);

        let stats = system.stats();
        assert_eq!(stats.stale_dropped, 2);
        assert_eq!(stats.duplicate_dropped, 1);
        assert_eq!(stats.steps, 2);
    }

    #[test]
    fn test_lag() {
        let mut system = PlaybackSystem::new(20).unwrap();
        system.update(0.010); // time stopped
        assert_close(system.tick_time(), 0.000);
        assert_close(system.real_time(), 0.000);
        assert_eq!(system.state(), PlaybackState::Unstarted);
        assert!(system.interpolated_snapshot().is_none());

        system.feed_snapshot(world(1));
        system.update(0.010);
        assert_eq!(system.tick_id(), TickId::new(1));
        assert_close(system.tick_time(), 0.050);
        assert_close(system.real_time(), 0.010);
        assert_eq!(system.state(), PlaybackState::Running);

        system.update(0.010);
        assert_eq!(system.tick_id(), TickId::new(1));
        assert_close(system.tick_time(), 0.050);
        assert_close(system.real_time(), 0.020);

        system.update(0.050); // time stopped
        assert_eq!(system.tick_id(), TickId::new(1));
        assert_close(system.tick_time(), 0.050);
        assert_close(system.real_time(), 0.020);
        assert_eq!(system.state(), PlaybackState::Stalled);

        system.update(0.010);
        assert_eq!(system.tick_id(), TickId::new(1));
        assert_close(system.tick_time(), 0.050);
        assert_close(system.real_time(), 0.030);

        system.feed_snapshot(world(2));
        system.update(0.090); // advances only +70ms
        assert_eq!(system.tick_id(), TickId::new(2));
        assert_close(system.tick_time(), 0.100);
        assert_close(system.real_time(), 0.100);
    }

    #[test]
    fn test_interpolate() {
        let mut system = PlaybackSystem::new(20).unwrap();
        system.feed_snapshot(world_at(1, 1.0));
        system.feed_snapshot(world_at(2, 2.0));
        system.feed_snapshot(world_at(3, 3.0));

        system.update(0.075);
        assert_eq!(system.tick_id(), TickId::new(2));
        assert_close(system.tick_time(), 0.100);
        assert_close(system.real_time(), 0.075);
        assert_close(system.interpolation_factor(), 0.5);
        assert_close(interpolated_x(&system), 1.5);

        system.update(0.015);
        assert_eq!(system.tick_id(), TickId::new(2));
        assert_close(system.real_time(), 0.090);
        assert_close(system.interpolation_factor(), 0.8);
        assert_close(interpolated_x(&system), 1.8);

        system.update(0.035);
        assert_eq!(system.tick_id(), TickId::new(3));
        assert_close(system.tick_time(), 0.150);
        assert_close(system.real_time(), 0.125);
        assert_close(system.interpolation_factor(), 0.5);
        assert_close(interpolated_x(&system), 2.5);
    }

    #[test]
    fn test_overflow() {
        let mut system = PlaybackSystem::new(20).unwrap();
        for tick in 1..=4 {
            system.feed_snapshot(world(tick));
        }
        assert_eq!(system.snapshot_queue_size(), 4);

        system.update(0.010);
        assert_eq!(system.snapshot_queue_size(), 1);
        system.update(0.020);
        assert_eq!(system.snapshot_queue_size(), 1);
        system.update(0.040);
        assert_eq!(system.snapshot_queue_size(), 0);
        assert_eq!(system.tick_id(), TickId::new(4));
        assert_eq!(system.stats().overflow_dropped, 2);
    }

    #[test]
    fn test_deeper_buffer() {
        let config = PlaybackConfig::with_tick_rate(20).buffered(3);
        let mut system = PlaybackSystem::with_config(config).unwrap();
        for tick in 1..=5 {
            system.feed_snapshot(world(tick));
        }

        system.update(0.010);
        assert_eq!(system.snapshot_queue_size(), 3);
        assert_eq!(system.stats().overflow_dropped, 1);
    }

    #[test]
    fn test_factor_sub_tick() {
        let mut system = PlaybackSystem::new(20).unwrap();
        system.feed_snapshot(world(1));
        system.feed_snapshot(world(2));
        system.update(0.050);
        system.feed_snapshot(world(3));
        system.update(0.001);
        // tick 2 at 100ms, real time 51ms
        assert_close(system.interpolation_factor(), 0.02);

        system.feed_snapshot(world(4));
        system.update(0.050);
        // tick 3 at 150ms, real time 101ms
        assert_close(system.interpolation_factor(), 0.02);
        assert_eq!(system.clamped_interpolation_factor(), system.interpolation_factor());
    }

    #[test]
    fn test_advance_duration() {
        let mut system = PlaybackSystem::new(10).unwrap();
        system.feed_snapshot(world(1));
        system.advance(Duration::from_millis(30));

        assert_eq!(system.tick_id(), TickId::new(1));
        assert_close(system.tick_time(), 0.100);
        assert_close(system.real_time(), 0.030);
        assert_eq!(system.tick_duration(), Duration::from_millis(100));
        assert_eq!(system.to_string(), "<TickScheduler 10Hz>");
    }

    #[test]
    fn test_invalid_tick_rate() {
        assert!(PlaybackSystem::new(0).is_err());
    }

    proptest! {
        #[test]
        fn prop_lookahead_bounded(
            ticks in proptest::collection::vec(1u64..32, 0..24),
            frames in proptest::collection::vec(0u32..120, 1..12),
        ) {
            let mut system = PlaybackSystem::new(20).unwrap();
            for tick in ticks {
                system.feed_snapshot(world(tick));
            }

            let mut last_tick = system.tick_id();
            let mut last_tick_time = system.tick_time();
            for ms in frames {
                system.update(ms as f64 / 1000.0);
                prop_assert!(system.snapshot_queue_size() <= 1);
                prop_assert!(system.tick_id() >= last_tick);
                prop_assert!(system.tick_time() >= last_tick_time);
                prop_assert!(system.real_time() <= system.tick_time() + EPS);
                last_tick = system.tick_id();
                last_tick_time = system.tick_time();
            }
        }
    }
}
