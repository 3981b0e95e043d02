//! Error types for screen-health
//!
//! The scoring core never fails. These errors only surface at the edges:
//! parsing store snapshots, loading configuration and serializing output.

use thiserror::Error;

/// Errors that can occur at the boundaries of the engine
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse store snapshot: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid UTC offset: {0} minutes")]
    InvalidTimezone(i32),
}
