//! services/station/src/error.rs
//!
//! Defines the primary error type for the station service.

use crate::config::ConfigError;
use laundry_core::ports::PortError;

/// The primary error type for the `station` service.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., reading the terminal).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
