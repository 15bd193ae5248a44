//! Command handling infrastructure.

use std::marker::PhantomData;

use common::AggregateId;
use event_store::{AppendOptions, EventEnvelope, EventSignatureMetadata, EventStore, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were raised and persisted.
    pub events: Vec<A::Event>,

    /// The new version of the aggregate after the command.
    pub new_version: Version,
}

/// Handler for executing commands against aggregates.
///
/// A command is handled by replaying the full event history to build
/// current state, running the command against that state (which validates
/// and raises events), and appending the raised events with optimistic
/// concurrency. A conflicting append surfaces to the caller, who retries
/// the whole command from a fresh replay.
pub struct CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    /// Creates a new command handler with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads an aggregate by replaying its event history.
    ///
    /// If the aggregate doesn't exist, returns a default instance. A stored
    /// event the aggregate's event type cannot decode is a fatal schema
    /// mismatch and surfaces as [`DomainError::UnrecognizedEvent`].
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        let envelopes = self.store.get_events_for_aggregate(aggregate_id).await?;

        let mut aggregate = A::default();
        for envelope in envelopes {
            let event: A::Event = serde_json::from_value(envelope.payload).map_err(|source| {
                DomainError::UnrecognizedEvent {
                    aggregate_type: A::aggregate_type(),
                    event_type: envelope.event_type.clone(),
                    source,
                }
            })?;
            aggregate.apply(event);
            aggregate.set_version(envelope.version);
        }

        Ok(aggregate)
    }

    /// Loads an aggregate, returning None if it doesn't exist.
    pub async fn load_existing(&self, aggregate_id: AggregateId) -> Result<Option<A>, DomainError> {
        let aggregate = self.load(aggregate_id).await?;
        if aggregate.id().is_some() {
            Ok(Some(aggregate))
        } else {
            Ok(None)
        }
    }

    /// Executes a command and persists the raised events.
    ///
    /// The command function receives the replayed aggregate and either
    /// raises events on it or returns a validation error. Validation errors
    /// are returned before any event is created, so the stream is never
    /// corrupted by a rejected command.
    pub async fn execute<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&mut A) -> Result<(), A::Error>,
        DomainError: From<A::Error>,
    {
        let mut aggregate = self.load(aggregate_id).await?;
        let current_version = aggregate.version();

        command_fn(&mut aggregate)?;
        let events = aggregate.take_pending();

        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events: vec![],
                new_version: current_version,
            });
        }

        let envelopes = build_envelopes(&aggregate, aggregate_id, current_version, &events)?;

        // Persist with optimistic concurrency; a conflict means the stream
        // advanced since our replay and the whole command must be retried.
        let options = if current_version == Version::initial() {
            AppendOptions::expect_new()
        } else {
            AppendOptions::expect_version(current_version)
        };

        let new_version = self.store.append(envelopes, options).await?;
        aggregate.set_version(new_version);

        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }
}

/// Builds event envelopes from raised events, stamping each with the
/// contest-scoped audit metadata.
fn build_envelopes<A: Aggregate>(
    aggregate: &A,
    aggregate_id: AggregateId,
    current_version: Version,
    events: &[A::Event],
) -> Result<Vec<EventEnvelope>, DomainError> {
    let contest_id = aggregate
        .contest_id()
        .ok_or(DomainError::MissingContest {
            aggregate_type: A::aggregate_type(),
        })?;

    let mut envelopes = Vec::with_capacity(events.len());
    let mut version = current_version;

    for event in events {
        version = version.next();
        let envelope = EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type(A::aggregate_type())
            .event_type(event.event_type())
            .version(version)
            .payload(event)?
            .signature(EventSignatureMetadata::new(contest_id))
            .build();
        envelopes.push(envelope);
    }

    Ok(envelopes)
}
