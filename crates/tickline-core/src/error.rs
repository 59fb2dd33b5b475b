//! Error types for Tickline
//!
//! Nominal operation never fails: stale input is dropped and missing data
//! stalls the clock. Errors only come out of configuration validation.

use thiserror::Error;

/// Core Tickline errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicklineError {
    #[error("Invalid tick rate: {0}Hz (must be greater than zero)")]
    InvalidTickRate(u32),

    #[error("Invalid buffer depth: {name} must hold at least one entry")]
    InvalidBufferDepth { name: &'static str },

    #[error("Invalid history capacity: must hold at least one entry")]
    InvalidHistoryCapacity,
}

/// Result type for Tickline operations
pub type TicklineResult<T> = Result<T, TicklineError>;
