//! The three political business types plugged into the generic machines.
//!
//! Each business is a zero-sized marker implementing
//! [`crate::result::ResultBusiness`] and [`crate::bundle::BundleBusiness`],
//! carrying its payload types and validators. The state machines themselves
//! are identical across businesses.

mod majority;
mod proportional;
mod vote;

pub use majority::{
    CandidateVoteCount, MajorityElection, MajorityElectionBallot, MajorityElectionResults,
};
pub use proportional::{
    BallotPosition, ListVoteCount, ProportionalElection, ProportionalElectionBallot,
    ProportionalElectionResults,
};
pub use vote::{
    BallotAnswer, BallotCountOfVoters, BallotQuestionAnswer, BallotQuestionResult, Vote,
    VoteBallot, VoteBallotResults, VoteResults,
};

use crate::bundle::BundleService;
use crate::result::ResultService;

pub type VoteResultService<S> = ResultService<S, Vote>;
pub type MajorityElectionResultService<S> = ResultService<S, MajorityElection>;
pub type ProportionalElectionResultService<S> = ResultService<S, ProportionalElection>;

pub type VoteBundleService<S> = BundleService<S, Vote>;
pub type MajorityElectionBundleService<S> = BundleService<S, MajorityElection>;
pub type ProportionalElectionBundleService<S> = BundleService<S, ProportionalElection>;
