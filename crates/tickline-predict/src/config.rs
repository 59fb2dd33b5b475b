//! Prediction configuration

use tickline_core::{EntityId, MotionModel, TickId, TicklineError, TicklineResult, WorldSnapshot};
use tickline_time::PlaybackConfig;

/// Prediction system configuration
#[derive(Debug, Clone)]
pub struct PredictionConfig {
    /// Underlying playback configuration
    pub playback: PlaybackConfig,

    /// Entity driven by local input
    pub local_entity: EntityId,

    /// World used as baseline before the first step
    pub initial_snapshot: WorldSnapshot,

    /// How event velocities move entities
    pub motion_model: MotionModel,

    /// Local events kept queued after each update
    pub max_buffered_events: usize,

    /// Predicted ticks remembered, oldest dropped first
    pub history_capacity: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            local_entity: EntityId::ZERO,
            initial_snapshot: WorldSnapshot::new(TickId::ZERO),
            motion_model: MotionModel::default(),
            max_buffered_events: 1,
            history_capacity: 256,
        }
    }
}

impl PredictionConfig {
    pub fn with_tick_rate(tick_rate: u32) -> Self {
        Self {
            playback: PlaybackConfig::with_tick_rate(tick_rate),
            ..Self::default()
        }
    }

    pub fn local_entity(mut self, entity_id: EntityId) -> Self {
        self.local_entity = entity_id;
        self
    }

    pub fn initial_snapshot(mut self, snapshot: WorldSnapshot) -> Self {
        self.initial_snapshot = snapshot;
        self
    }

    pub fn motion_model(mut self, model: MotionModel) -> Self {
        self.motion_model = model;
        self
    }

    pub fn validate(&self) -> TicklineResult<()> {
        self.playback.validate()?;
        if self.history_capacity == 0 {
            return Err(TicklineError::InvalidHistoryCapacity);
        }
        Ok(())
    }
}

/// Extrapolation-only configuration
#[derive(Debug, Clone, Default)]
pub struct ExtrapolationConfig {
    /// Underlying playback configuration
    pub playback: PlaybackConfig,

    /// Entity excluded from extrapolation, if any
    pub local_entity: Option<EntityId>,

    /// How event velocities move entities
    pub motion_model: MotionModel,
}

impl ExtrapolationConfig {
    pub fn with_tick_rate(tick_rate: u32) -> Self {
        Self {
            playback: PlaybackConfig::with_tick_rate(tick_rate),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prediction_config() {
        let config = PredictionConfig::default();
        assert_eq!(config.playback.tick_rate, 20);
        assert_eq!(config.local_entity, EntityId::ZERO);
        assert_eq!(config.initial_snapshot.tick_id(), TickId::ZERO);
        assert!(config.initial_snapshot.is_empty());
        assert_eq!(config.motion_model, MotionModel::InverseTime);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_prediction_config() {
        let mut config = PredictionConfig::with_tick_rate(0);
        assert_eq!(config.validate(), Err(TicklineError::InvalidTickRate(0)));

        config.playback.tick_rate = 30;
        config.history_capacity = 0;
        assert_eq!(config.validate(), Err(TicklineError::InvalidHistoryCapacity));
    }
}
