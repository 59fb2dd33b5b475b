//! Playback configuration

use tickline_core::{TicklineError, TicklineResult};

/// Tick scheduler configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Logical tick rate in Hz
    pub tick_rate: u32,
    /// Snapshots kept queued after each update
    pub max_buffered_snapshots: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            tick_rate: 20,
            max_buffered_snapshots: 1,
        }
    }
}

impl PlaybackConfig {
    /// Default configuration at a given tick rate
    pub fn with_tick_rate(tick_rate: u32) -> Self {
        PlaybackConfig {
            tick_rate,
            ..Self::default()
        }
    }

    /// Keep up to `depth` snapshots of lookahead between updates.
    /// Deeper buffers absorb producer bursts at the cost of render latency.
    pub fn buffered(mut self, depth: usize) -> Self {
        self.max_buffered_snapshots = depth;
        self
    }

    /// Tick duration in milliseconds
    pub fn tick_duration_ms(&self) -> f64 {
        1000.0 / self.tick_rate as f64
    }

    pub fn validate(&self) -> TicklineResult<()> {
        if self.tick_rate == 0 {
            return Err(TicklineError::InvalidTickRate(self.tick_rate));
        }
        if self.max_buffered_snapshots == 0 {
            return Err(TicklineError::InvalidBufferDepth {
                name: "max_buffered_snapshots",
            });
        }
        Ok(())
    }
}
