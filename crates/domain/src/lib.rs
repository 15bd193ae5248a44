//! Domain layer for counting-circle result tabulation.
//!
//! This crate implements the two coupled, event-sourced state machines of
//! the audit workflow:
//! - the per-counting-circle [`result::CountingCircleResult`] submission
//!   lifecycle (submission, correction, tentative audit, plausibilisation),
//! - the [`bundle::BallotBundle`] review lifecycle for detailed result
//!   entry, including sequential ballot numbering and review sampling.
//!
//! Both machines are generic over an opaque business payload; the three
//! political business types (vote, majority election, proportional
//! election) plug in via [`business`].

pub mod aggregate;
pub mod bundle;
pub mod business;
pub mod command;
pub mod error;
pub mod identity;
pub mod result;

pub use aggregate::{Aggregate, DomainEvent};
pub use command::{CommandHandler, CommandResult};
pub use error::DomainError;
pub use identity::result_id;
