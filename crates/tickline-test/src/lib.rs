//! Tickline Test Harness - Playback under hostile network conditions
//!
//! This crate provides:
//! - A seeded chaos link (latency, jitter, loss, reordering, duplication)
//! - A frame-driven simulator feeding a scheduler through that link

pub mod chaos;
pub mod simulator;

pub use chaos::*;
pub use simulator::*;
