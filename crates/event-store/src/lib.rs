//! Event store collaborator surface for the tabulation core.
//!
//! The aggregate layer only consumes two semantics from its store:
//! append with optimistic concurrency, and "load all events for id" in
//! version order. This crate defines that surface plus an in-memory
//! implementation used by tests.

pub mod error;
pub mod event;
pub mod memory;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, EventSignatureMetadata, Version};
pub use memory::InMemoryEventStore;
pub use store::{AppendOptions, EventStore};
