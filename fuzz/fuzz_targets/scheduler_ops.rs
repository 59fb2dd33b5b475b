//! Drives playback and prediction with arbitrary feed/update sequences and
//! checks the clock invariants after every update.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use tickline_core::{EntityId, Event, Snapshot, TickId, Vector3, WorldSnapshot};
use tickline_predict::PredictionSystem;
use tickline_time::{FeedOutcome, PlaybackConfig, PlaybackSystem};

#[derive(Arbitrary, Debug)]
enum Op {
    Feed { tick: u8, x: i16 },
    Input { tick: u8, vx: i8 },
    Update { ms: u8 },
}

#[derive(Arbitrary, Debug)]
struct Input {
    tick_rate: u8,
    depth: u8,
    ops: Vec<Op>,
}

const EPS: f64 = 1e-6;

fn world(tick: u8, x: i16) -> WorldSnapshot {
    WorldSnapshot::single(
        TickId::new(tick as u64),
        Snapshot::new(EntityId::new(1), Vector3::new(x as f64, 0.0, 0.0)),
    )
}

fuzz_target!(|input: Input| {
    let tick_rate = (input.tick_rate as u32 % 120) + 1;
    let depth = (input.depth as usize % 8) + 1;
    let config = PlaybackConfig::with_tick_rate(tick_rate).buffered(depth);

    let Ok(mut playback) = PlaybackSystem::with_config(config) else {
        return;
    };
    let Ok(mut prediction) = PredictionSystem::new(tick_rate) else {
        return;
    };

    for op in input.ops {
        match op {
            Op::Feed { tick, x } => {
                let current = playback.tick_id();
                let outcome = playback.feed_snapshot(world(tick, x));
                if TickId::new(tick as u64) <= current {
                    assert_eq!(outcome, FeedOutcome::Stale);
                }
                prediction.feed_snapshot(world(tick, x));
            }
            Op::Input { tick, vx } => {
                let velocity = Vector3::new(vx as f64, 0.0, 0.0);
                let event = Event::new(TickId::new(tick as u64), EntityId::ZERO, velocity);
                prediction.feed_event(event);
            }
            Op::Update { ms } => {
                let dt = ms as f64 / 1000.0;

                let before = (playback.tick_id(), playback.tick_time(), playback.real_time());
                playback.update(dt);
                assert!(playback.tick_id() >= before.0);
                assert!(playback.tick_time() >= before.1);
                assert!(playback.real_time() >= before.2);
                assert!(playback.real_time() <= playback.tick_time() + EPS);
                assert!(playback.snapshot_queue_size() <= depth);

                let before = prediction.real_time();
                prediction.update(dt);
                // Prediction never stalls
                assert!((prediction.real_time() - before - dt).abs() < EPS);
                assert!(prediction.interpolated_snapshot().is_some() || ms == 0);
                assert!(prediction.event_queue_size() <= 1);
            }
        }
    }
});
