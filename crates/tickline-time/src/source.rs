//! Snapshot sources - what the scheduler steps into

use std::sync::Arc;

use tickline_core::{TickId, WorldSnapshot};

/// Everything a source may look at while filling one step
pub struct StepContext<'a> {
    /// Authoritative snapshot popped from the queue, if any
    pub pulled: Option<WorldSnapshot>,
    /// Snapshot the scheduler is currently at
    pub next: Option<&'a Arc<WorldSnapshot>>,
    /// Tick id of `next` (zero before the first step)
    pub tick_id: TickId,
    /// Tick duration in milliseconds
    pub tick_duration_ms: f64,
}

impl StepContext<'_> {
    /// Tick duration in seconds, the `dt` used for extrapolation
    pub fn tick_dt(&self) -> f64 {
        self.tick_duration_ms / 1000.0
    }
}

/// Fills scheduler steps
///
/// Plain playback only ever forwards queued snapshots. Prediction layers plug
/// in here to fabricate state for ticks that have not arrived.
pub trait SnapshotSource {
    /// Snapshot to step into, or `None` to stall the clock
    fn produce(&mut self, step: StepContext<'_>) -> Option<Arc<WorldSnapshot>>;

    /// Baseline used as `next` before anything has been stepped into
    fn baseline(&self) -> Option<Arc<WorldSnapshot>> {
        None
    }

    /// Called once at the end of every scheduler update
    fn finish_update(&mut self) {}
}

/// Plays back exactly what was queued
#[derive(Debug, Default, Clone, Copy)]
pub struct QueueSource;

impl SnapshotSource for QueueSource {
    fn produce(&mut self, step: StepContext<'_>) -> Option<Arc<WorldSnapshot>> {
        step.pulled.map(Arc::new)
    }
}
