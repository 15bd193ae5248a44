use common::AggregateId;
use thiserror::Error;

use crate::Version;

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;

/// Errors that can occur in the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The stream advanced since the caller's last read; the whole command
    /// must be retried against fresh state.
    #[error(
        "Concurrency conflict on aggregate {aggregate_id}: expected version {expected}, actual {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// The event batch handed to append was malformed.
    #[error("Invalid append: {0}")]
    InvalidAppend(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
