//! Proportional election business type.

use std::collections::BTreeSet;

use common::{CandidateId, ListId};
use serde::{Deserialize, Serialize};

use crate::bundle::{BundleBusiness, BundleError};
use crate::result::{CountOfVoters, ResultBusiness, ResultError};

/// Marker for the proportional election business.
///
/// Like the majority election it uses a single bundle-number pool and
/// fixed-size review samples; its ballots carry ordered candidate
/// positions instead of a flat candidate set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProportionalElection;

/// Vote count of one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListVoteCount {
    pub list_id: ListId,
    pub vote_count: u32,
}

/// Entered results of a proportional election in one counting circle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProportionalElectionResults {
    /// Votes per list.
    pub list_results: Vec<ListVoteCount>,

    /// Ballots without a list (blank list votes).
    pub empty_vote_count: u32,

    /// Invalid votes.
    pub invalid_vote_count: u32,
}

/// One candidate position on a proportional election ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotPosition {
    /// Position on the ballot, starting at 1.
    pub position: u32,

    /// The candidate at that position, or None for an empty line.
    pub candidate_id: Option<CandidateId>,
}

/// One entered proportional election ballot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProportionalElectionBallot {
    /// The list the ballot was cast for, if any.
    pub list_id: Option<ListId>,

    /// The ballot's candidate positions.
    pub positions: Vec<BallotPosition>,
}

impl ResultBusiness for ProportionalElection {
    type CountOfVoters = CountOfVoters;
    type Results = ProportionalElectionResults;
    type PoolKey = ();

    fn aggregate_type() -> &'static str {
        "ProportionalElectionResult"
    }

    fn validate_count_of_voters(count: &Self::CountOfVoters) -> Result<(), ResultError> {
        count.validate()
    }

    fn validate_results(results: &Self::Results) -> Result<(), ResultError> {
        let distinct: BTreeSet<_> = results.list_results.iter().map(|l| l.list_id).collect();
        if distinct.len() != results.list_results.len() {
            return Err(ResultError::InvalidResults("duplicate list in list results"));
        }
        Ok(())
    }
}

impl BundleBusiness for ProportionalElection {
    type Ballot = ProportionalElectionBallot;

    fn bundle_aggregate_type() -> &'static str {
        "ProportionalElectionBallotBundle"
    }

    fn validate_ballot(ballot: &Self::Ballot) -> Result<(), BundleError> {
        let mut positions = BTreeSet::new();
        for entry in &ballot.positions {
            if entry.position < 1 {
                return Err(BundleError::InvalidBallot(
                    "ballot positions start at 1",
                ));
            }
            if !positions.insert(entry.position) {
                return Err(BundleError::InvalidBallot(
                    "a ballot position cannot be assigned twice",
                ));
            }
        }
        Ok(())
    }
}
