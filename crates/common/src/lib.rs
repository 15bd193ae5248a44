//! Shared identifier types used across the tabulation workspace.

mod ids;

pub use ids::{
    AggregateId, BallotId, CandidateId, ContestId, CountingCircleId, ListId, PoliticalBusinessId,
    UserId,
};
