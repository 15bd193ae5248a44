//! Core aggregate and domain event traits.

use common::{AggregateId, ContestId};
use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    ///
    /// This is used for serialization and event store filtering.
    fn event_type(&self) -> &'static str;
}

/// Trait for aggregates in an event-sourced system.
///
/// An aggregate is rebuilt by replaying its ordered event history. Command
/// methods validate against current state and then [`raise`](Self::raise)
/// new events: raising appends the event to an in-memory pending buffer and
/// immediately folds it into local state, so reads after a raise see
/// up-to-date state without a round trip to storage.
///
/// `apply` must be pure and deterministic: folding the same event list onto
/// a fresh aggregate always yields identical state. All randomness (review
/// sampling) is resolved before the event is raised and recorded inside the
/// event, never re-drawn during replay.
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of validation errors this aggregate can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name.
    ///
    /// Used for event store organization and routing.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's unique identifier.
    ///
    /// Returns None for a new, uninitialized aggregate.
    fn id(&self) -> Option<AggregateId>;

    /// Returns the contest owning this aggregate.
    ///
    /// Set by the first event; every raised event is stamped with it for
    /// the audit signature pipeline.
    fn contest_id(&self) -> Option<ContestId>;

    /// Returns the current version of the aggregate.
    ///
    /// Version starts at 0 for a new aggregate and increments with each event.
    fn version(&self) -> Version;

    /// Sets the aggregate version.
    ///
    /// Called by the command handler after loading or appending events.
    fn set_version(&mut self, version: Version);

    /// Applies an event to the aggregate, updating its state.
    ///
    /// Must be pure, deterministic and side-effect free; events represent
    /// facts that have happened and cannot fail to fold.
    fn apply(&mut self, event: Self::Event);

    /// Returns the buffer of events raised but not yet persisted.
    fn pending_events(&mut self) -> &mut Vec<Self::Event>;

    /// Raises an event: buffers it for persistence and folds it into state.
    fn raise(&mut self, event: Self::Event) {
        self.pending_events().push(event.clone());
        self.apply(event);
    }

    /// Drains the pending event buffer.
    fn take_pending(&mut self) -> Vec<Self::Event> {
        std::mem::take(self.pending_events())
    }

    /// Applies multiple events in sequence without buffering them.
    ///
    /// Used when replaying history.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}
