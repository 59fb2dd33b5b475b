//! Shared scheduler handle
//!
//! The scheduler itself is single-threaded. When snapshots arrive on a
//! network thread while the frame loop drives `update`, both sides go through
//! this handle, which serializes every call behind one mutex.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tickline_core::{TickId, WorldSnapshot};

use crate::{FeedOutcome, SnapshotSource, TickScheduler};

/// Cloneable, lock-protected scheduler
pub struct SharedScheduler<S: SnapshotSource> {
    inner: Arc<Mutex<TickScheduler<S>>>,
}

impl<S: SnapshotSource> SharedScheduler<S> {
    pub fn new(scheduler: TickScheduler<S>) -> Self {
        SharedScheduler {
            inner: Arc::new(Mutex::new(scheduler)),
        }
    }

    /// Queue an authoritative snapshot (producer side)
    pub fn feed_snapshot(&self, snapshot: WorldSnapshot) -> FeedOutcome {
        self.inner.lock().feed_snapshot(snapshot)
    }

    /// Advance time by `dt` seconds (driver side)
    pub fn update(&self, dt: f64) {
        self.inner.lock().update(dt);
    }

    /// Render snapshot at the end of the last update
    pub fn interpolated_snapshot(&self) -> Option<Arc<WorldSnapshot>> {
        self.inner.lock().interpolated_shared()
    }

    pub fn tick_id(&self) -> TickId {
        self.inner.lock().tick_id()
    }

    /// Lock for several calls in a row
    pub fn lock(&self) -> MutexGuard<'_, TickScheduler<S>> {
        self.inner.lock()
    }
}

impl<S: SnapshotSource> Clone for SharedScheduler<S> {
    fn clone(&self) -> Self {
        SharedScheduler {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlaybackSystem;

    #[test]
    fn test_feed_from_another_thread() {
        let shared = SharedScheduler::new(PlaybackSystem::new(20).unwrap());

        let producer = shared.clone();
        let handle = std::thread::spawn(move || {
            for tick in (1..=3).rev() {
                producer.feed_snapshot(WorldSnapshot::new(TickId::new(tick)));
            }
        });
        handle.join().unwrap();

        assert_eq!(shared.lock().snapshot_queue_size(), 3);
        shared.update(0.120);
        assert_eq!(shared.tick_id(), TickId::new(3));
        assert!(shared.interpolated_snapshot().is_some());
    }
}
