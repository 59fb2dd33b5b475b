//! Tickline Core - Fundamental types and primitives
//!
//! This crate defines the data model shared by the playback and prediction layers:
//! - Identifiers (EntityId, TickId)
//! - Vector math (Vector3, lerp)
//! - Input events
//! - Entity and world snapshots
//! - Error types

pub mod error;
pub mod event;
pub mod id;
pub mod math;
pub mod snapshot;

pub use error::*;
pub use event::*;
pub use id::*;
pub use math::*;
pub use snapshot::*;
