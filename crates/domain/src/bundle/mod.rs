//! Ballot bundle aggregate and related types.

mod aggregate;
mod events;
mod sampling;
mod service;
mod state;

pub use aggregate::{BallotBundle, BundleResultEntryParams};
pub use events::{
    BallotData, BallotDeletedData, BundleCreatedData, BundleEvent, ReviewClosedData,
    ReviewDecisionData,
};
pub use sampling::{BallotSampler, RandomBallotSampler};
pub use service::BundleService;
pub use state::BundleState;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Business payload plugged into the generic bundle state machine.
///
/// The review lifecycle is identical across votes, majority elections and
/// proportional elections; a business supplies only its ballot payload and
/// its validator.
pub trait BundleBusiness:
    Clone + Copy + Default + std::fmt::Debug + Send + Sync + 'static
{
    /// A single entered ballot.
    type Ballot: Clone + std::fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    /// Aggregate type name used for event store routing.
    fn bundle_aggregate_type() -> &'static str;

    /// Validates a ballot payload before it is entered.
    fn validate_ballot(ballot: &Self::Ballot) -> Result<(), BundleError>;
}

/// Validation errors of the ballot bundle aggregate.
///
/// Always raised before any event is created.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BundleError {
    /// The bundle is not in a state that permits the operation.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: BundleState,
        action: &'static str,
    },

    /// The bundle was already created.
    #[error("Bundle already created")]
    AlreadyCreated,

    /// The bundle does not exist yet.
    #[error("Bundle has not been created")]
    NotCreated,

    /// Bundle numbers start at 1.
    #[error("Invalid bundle number: {number} (must be at least 1)")]
    InvalidBundleNumber { number: u32 },

    /// Continuous ballot numbering cannot represent this bundle's range.
    #[error("Bundle number {number} is too large for the configured ballot numbering")]
    BundleNumberTooLarge { number: u32 },

    /// The entry parameter snapshot is malformed.
    #[error("Invalid bundle entry parameters: {0}")]
    InvalidEntryParams(&'static str),

    /// The bundle already holds the configured number of ballots.
    #[error("Bundle size of {size} ballots already reached")]
    BundleSizeReached { size: u32 },

    /// The referenced ballot number does not exist in the bundle.
    #[error("Unknown ballot number: {number}")]
    UnknownBallotNumber { number: u32 },

    /// Only the most recently added ballot may be deleted.
    #[error("Only the current ballot {current} can be deleted, not {number}")]
    NotCurrentBallot { number: u32, current: u32 },

    /// A bundle cannot be closed without ballots.
    #[error("Bundle has no ballots")]
    NoBallots,

    /// The ballot payload is malformed.
    #[error("Invalid ballot: {0}")]
    InvalidBallot(&'static str),
}
