//! Tickline Time - Fixed-step playback of buffered world snapshots
//!
//! This crate implements the tick scheduler:
//! - Logical clock advancing in fixed ticks, paced by wall-clock deltas
//! - Snapshot queue tolerant to reordering and duplicates
//! - Render interpolation between the previous and next tick
//! - Pluggable snapshot sources for prediction layers
//! - Shared handle for feeding from another thread

pub mod config;
pub mod queue;
pub mod scheduler;
pub mod shared;
pub mod source;

pub use config::*;
pub use queue::*;
pub use scheduler::*;
pub use shared::*;
pub use source::*;
