//! Counting-circle result aggregate and related types.

mod aggregate;
mod count_of_voters;
mod entry;
mod events;
mod pool;
mod service;
mod state;

pub use aggregate::CountingCircleResult;
pub use count_of_voters::CountOfVoters;
pub use entry::{
    BallotNumberGeneration, MAX_BALLOT_BUNDLE_SIZE, ResultEntry, ResultEntryParams,
    ReviewProcedure, ReviewSampling,
};
pub use events::{
    AuditCommentData, BundleNumberData, CountOfVotersEnteredData, EntryDefinedData, ResetData,
    ResultEvent, ResultsEnteredData, SubmissionStartedData,
};
pub use pool::BundleNumberPool;
pub use service::ResultService;
pub use state::ResultState;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Business payload plugged into the generic result state machine.
///
/// The machine itself is identical for votes, majority elections and
/// proportional elections; a business supplies only its payload types, its
/// entry validators and the bundle-number pool keying (votes number bundles
/// per ballot, elections have a single pool).
pub trait ResultBusiness:
    Clone + Copy + Default + std::fmt::Debug + Send + Sync + 'static
{
    /// Count-of-voters payload entered by the counting circle.
    type CountOfVoters: Clone + std::fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    /// Business-specific result payload (question or candidate results).
    type Results: Clone + std::fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    /// Key of a bundle-number pool. `()` for elections; votes key their
    /// pools per ballot.
    type PoolKey: Clone + Ord + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync;

    /// Whether the business supports the full rewind to `SubmissionOngoing`
    /// during the testing phase (vote only).
    const ALLOWS_FULL_RESET: bool = false;

    /// Aggregate type name used for event store routing.
    fn aggregate_type() -> &'static str;

    /// Validates a count-of-voters payload before it is entered.
    fn validate_count_of_voters(count: &Self::CountOfVoters) -> Result<(), ResultError>;

    /// Validates a results payload before it is entered.
    fn validate_results(results: &Self::Results) -> Result<(), ResultError>;
}

/// Validation errors of the counting-circle result aggregate.
///
/// Always raised before any event is created; the caller can re-fetch
/// state, correct the input and retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResultError {
    /// The result is not in a state that permits the operation.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: ResultState,
        action: &'static str,
    },

    /// Submission was already started for this result.
    #[error("Submission already started")]
    AlreadyStarted,

    /// Detailed entry parameters failed validation.
    #[error("Invalid result entry parameters: {0}")]
    InvalidEntryParams(&'static str),

    /// Detailed entry requires parameters.
    #[error("Result entry parameters are required for detailed entry")]
    EntryParamsRequired,

    /// Final-results entry must not carry parameters.
    #[error("Result entry parameters are not allowed for final-results entry")]
    EntryParamsNotAllowed,

    /// The operation requires the detailed entry mode.
    #[error("Detailed result entry is required for this operation")]
    DetailedEntryRequired,

    /// Bundle numbers of this result are entered manually.
    #[error("Bundle numbers are entered manually for this result")]
    AutomaticNumberingDisabled,

    /// Bundle numbers of this result are generated automatically.
    #[error("Bundle numbers are generated automatically for this result")]
    ManualNumberingDisabled,

    /// Bundle numbers start at 1.
    #[error("Invalid bundle number: {number} (must be at least 1)")]
    InvalidBundleNumber { number: u32 },

    /// The bundle number is taken by an existing bundle.
    #[error("Bundle number {number} is already in use")]
    BundleNumberAlreadyInUse { number: u32 },

    /// The bundle number was never allocated or is already freed.
    #[error("Unknown bundle number: {number}")]
    UnknownBundleNumber { number: u32 },

    /// The count-of-voters payload is inconsistent.
    #[error("Invalid count of voters: {0}")]
    InvalidCountOfVoters(&'static str),

    /// The results payload is malformed.
    #[error("Invalid results: {0}")]
    InvalidResults(&'static str),

    /// The business type does not support a full reset.
    #[error("Full reset is not supported for this business type")]
    FullResetNotSupported,

    /// Full resets are forbidden once the contest left its testing phase.
    #[error("Full reset is only allowed during the testing phase")]
    TestingPhaseEnded,
}
