//! Playback simulator
//!
//! Drives a scheduler frame by frame against a simulated server:
//! - The server emits one world per tick on its own clock
//! - Worlds travel through a `ChaosLink`
//! - Whatever arrives is fed before the frame's `update`
//!
//! Every frame is recorded so tests can check clock invariants over the
//! whole run.

use std::time::Duration;

use tickline_core::{EntityId, Snapshot, TickId, Vector3, WorldSnapshot};
use tickline_time::{FeedOutcome, PlaybackState, SnapshotSource, TickScheduler};

use crate::chaos::{ChaosConfig, ChaosLink};

/// Scheduler observation after one frame
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRecord {
    pub frame: u64,
    pub tick_id: TickId,
    /// Seconds
    pub tick_time: f64,
    /// Seconds
    pub real_time: f64,
    pub interpolation_factor: f64,
    pub state: PlaybackState,
    pub queue_len: usize,
    /// Snapshots fed this frame
    pub fed: usize,
}

/// Server-side world generator
pub type WorldFn = Box<dyn FnMut(TickId) -> WorldSnapshot + Send>;

/// One entity moving one unit along x per tick
pub fn linear_world(entity_id: EntityId) -> WorldFn {
    Box::new(move |tick_id: TickId| {
        let x = tick_id.value() as f64;
        WorldSnapshot::single(tick_id, Snapshot::new(entity_id, Vector3::new(x, 0.0, 0.0)))
    })
}

/// Frame-driven scheduler harness
pub struct PlaybackSimulator<S: SnapshotSource> {
    scheduler: TickScheduler<S>,
    link: ChaosLink<WorldSnapshot>,
    world: WorldFn,
    frame_duration: Duration,
    /// Server clock
    server_time: Duration,
    server_tick: u64,
    frame: u64,
    rejected: u64,
    timeline: Vec<FrameRecord>,
}

impl<S: SnapshotSource> PlaybackSimulator<S> {
    pub fn new(scheduler: TickScheduler<S>, chaos: ChaosConfig, seed: u64) -> Self {
        PlaybackSimulator {
            scheduler,
            link: ChaosLink::new(chaos, seed),
            world: linear_world(EntityId::new(1)),
            frame_duration: Duration::from_millis(16),
            server_time: Duration::ZERO,
            server_tick: 0,
            frame: 0,
            rejected: 0,
            timeline: Vec::new(),
        }
    }

    /// Client frame length (default 16ms)
    pub fn frame_duration(mut self, frame: Duration) -> Self {
        self.frame_duration = frame;
        self
    }

    pub fn world_fn(mut self, world: WorldFn) -> Self {
        self.world = world;
        self
    }

    /// Run one client frame
    pub fn step_frame(&mut self) -> &FrameRecord {
        self.server_time += self.frame_duration;
        let tick_duration = self.scheduler.tick_duration();
        while tick_duration * (self.server_tick as u32 + 1) <= self.server_time {
            self.server_tick += 1;
            let world = (self.world)(TickId::new(self.server_tick));
            self.link.send(world);
        }

        let arrived = self.link.advance(self.frame_duration);
        let fed = arrived.len();
        for world in arrived {
            if self.scheduler.feed_snapshot(world) != FeedOutcome::Queued {
                self.rejected += 1;
            }
        }

        self.scheduler.advance(self.frame_duration);
        self.frame += 1;

        let record = FrameRecord {
            frame: self.frame,
            tick_id: self.scheduler.tick_id(),
            tick_time: self.scheduler.tick_time(),
            real_time: self.scheduler.real_time(),
            interpolation_factor: self.scheduler.interpolation_factor(),
            state: self.scheduler.state(),
            queue_len: self.scheduler.snapshot_queue_size(),
            fed,
        };
        tracing::trace!(
            frame = record.frame,
            tick = record.tick_id.value(),
            fed,
            "simulated frame"
        );
        self.timeline.push(record);
        &self.timeline[self.timeline.len() - 1]
    }

    /// Run `frames` client frames
    pub fn run(&mut self, frames: usize) -> &[FrameRecord] {
        let start = self.timeline.len();
        for _ in 0..frames {
            self.step_frame();
        }
        &self.timeline[start..]
    }

    pub fn timeline(&self) -> &[FrameRecord] {
        &self.timeline
    }

    /// Frames that ended stalled
    pub fn stalled_frames(&self) -> usize {
        self.timeline
            .iter()
            .filter(|r| r.state == PlaybackState::Stalled)
            .count()
    }

    /// Arrivals the scheduler refused (stale or duplicate)
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Latest tick the server has emitted
    pub fn server_tick(&self) -> TickId {
        TickId::new(self.server_tick)
    }

    pub fn scheduler(&self) -> &TickScheduler<S> {
        &self.scheduler
    }

    pub fn link(&self) -> &ChaosLink<WorldSnapshot> {
        &self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tickline_predict::{PredictionConfig, PredictionSource};
    use tickline_time::{PlaybackConfig, PlaybackSystem};

    const EPS: f64 = 1e-9;

    fn check_invariants(timeline: &[FrameRecord], max_queue: usize) {
        for pair in timeline.windows(2) {
            assert!(pair[1].tick_id >= pair[0].tick_id);
            assert!(pair[1].tick_time >= pair[0].tick_time);
            assert!(pair[1].real_time >= pair[0].real_time);
        }
        for record in timeline {
            assert!(record.real_time <= record.tick_time + EPS);
            assert!(record.queue_len <= max_queue);
        }
    }

    fn prediction_scheduler(tick_rate: u32) -> TickScheduler<PredictionSource> {
        let config = PredictionConfig::with_tick_rate(tick_rate);
        let source = PredictionSource::new(&config);
        TickScheduler::with_source(config.playback, source).unwrap()
    }

    #[test]
    fn test_perfect_link_never_stalls_after_start() {
        let scheduler = PlaybackSystem::new(20).unwrap();
        let mut sim = PlaybackSimulator::new(scheduler, ChaosConfig::perfect(), 1)
            .frame_duration(Duration::from_millis(10));

        sim.run(100);

        // Only the wait for the very first tick
        assert_eq!(sim.scheduler().stats().stalls, 1);
        assert_eq!(sim.stalled_frames(), 0);
        assert_eq!(sim.server_tick(), TickId::new(20));
        assert_eq!(sim.scheduler().tick_id(), TickId::new(20));
        assert_eq!(sim.rejected(), 0);
        check_invariants(sim.timeline(), 1);
    }

    #[test]
    fn test_interpolated_position_follows_server() {
        let scheduler = PlaybackSystem::new(20).unwrap();
        let mut sim = PlaybackSimulator::new(scheduler, ChaosConfig::perfect(), 1)
            .frame_duration(Duration::from_millis(25));

        sim.run(8);

        // Tick 4 stepped on the last frame at real time 175ms, halfway from tick 3
        let world = sim.scheduler().interpolated_snapshot().unwrap();
        let x = world.get_snapshot(EntityId::new(1)).unwrap().position().x;
        assert!((x - 3.5).abs() < EPS, "x = {x}");
    }

    #[test]
    fn test_playback_under_poor_link() {
        let scheduler = PlaybackSystem::new(20).unwrap();
        let mut sim = PlaybackSimulator::new(scheduler, ChaosConfig::poor(), 42);

        sim.run(600);

        assert!(sim.scheduler().tick_id() > TickId::new(80));
        assert!(sim.link().stats().lost > 0);
        check_invariants(sim.timeline(), 1);
    }

    #[test]
    fn test_deeper_buffer_under_hostile_link() {
        let config = PlaybackConfig::with_tick_rate(30).buffered(4);
        let scheduler = PlaybackSystem::with_config(config).unwrap();
        let mut sim = PlaybackSimulator::new(scheduler, ChaosConfig::hostile(), 7);

        sim.run(600);

        assert!(sim.scheduler().tick_id() > TickId::ZERO);
        check_invariants(sim.timeline(), 4);
    }

    #[test]
    fn test_prediction_never_stalls() {
        let mut sim = PlaybackSimulator::new(prediction_scheduler(20), ChaosConfig::hostile(), 7);

        sim.run(300);

        assert_eq!(sim.scheduler().stats().stalls, 0);
        assert_eq!(sim.stalled_frames(), 0);
        // Every frame advanced the full frame duration
        let last = &sim.timeline()[299];
        assert!((last.real_time - 300.0 * 0.016).abs() < 1e-6);
        check_invariants(sim.timeline(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_invariants_hold_for_any_seed(
            seed in any::<u64>(),
            frame_ms in 1u64..80,
            tick_rate in 5u32..60,
        ) {
            let scheduler = PlaybackSystem::new(tick_rate).unwrap();
            let mut sim = PlaybackSimulator::new(scheduler, ChaosConfig::default(), seed)
                .frame_duration(Duration::from_millis(frame_ms));

            let timeline = sim.run(200).to_vec();
            for pair in timeline.windows(2) {
                prop_assert!(pair[1].tick_id >= pair[0].tick_id);
                prop_assert!(pair[1].tick_time >= pair[0].tick_time);
            }
            for record in &timeline {
                prop_assert!(record.real_time <= record.tick_time + EPS);
                prop_assert!(record.queue_len <= 1);
            }
        }
    }
}
