//! Domain error types.

use event_store::EventStoreError;
use thiserror::Error;

use crate::bundle::BundleError;
use crate::result::ResultError;

/// Errors that can occur during domain operations.
///
/// Two kinds matter to callers: validation errors (`Result`/`Bundle`) are
/// recoverable by fixing the input and retrying against fresh state, and are
/// always raised before any event is created; `UnrecognizedEvent` is a fatal
/// replay-time defect indicating a deployed-code/event-schema mismatch.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// A validation error from a counting-circle result aggregate.
    #[error("Result error: {0}")]
    Result(#[from] ResultError),

    /// A validation error from a ballot bundle aggregate.
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// Replay encountered an event the aggregate cannot fold.
    #[error("Unrecognized event '{event_type}' while replaying {aggregate_type}: {source}")]
    UnrecognizedEvent {
        aggregate_type: &'static str,
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// Events were raised before the owning contest became known.
    #[error("No contest id available to stamp events of {aggregate_type}")]
    MissingContest { aggregate_type: &'static str },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Returns true if the error is a caller-recoverable validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Result(_) | DomainError::Bundle(_))
    }
}
