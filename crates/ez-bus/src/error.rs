//! Error types for the message bus

use thiserror::Error;

/// Errors that can occur when configuring or feeding the bus
#[derive(Debug, Error)]
pub enum BusError {
    #[error("Invalid queue capacity: {capacity} (must be at least 1)")]
    InvalidCapacity { capacity: usize },

    #[error("Record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
