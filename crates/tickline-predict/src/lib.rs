//! Tickline Prediction - Continuity when authoritative ticks are missing
//!
//! When a tick has not arrived we do not freeze: remote entities are
//! extrapolated from their last known state, and the local entity is
//! predicted from pending input ahead of server confirmation.
//!
//! Both behaviors are snapshot sources plugged into the tick scheduler:
//! - `ExtrapolationSource` / `ExtrapolationSystem`: remote extrapolation only
//! - `PredictionSource` / `PredictionSystem`: extrapolation plus client-side prediction

pub mod config;
pub mod extrapolation;
pub mod factory;
pub mod history;
pub mod input;
pub mod prediction;
pub mod system;

pub use config::*;
pub use extrapolation::*;
pub use factory::*;
pub use history::*;
pub use input::*;
pub use prediction::*;
pub use system::*;
