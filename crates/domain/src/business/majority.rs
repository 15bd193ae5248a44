//! Majority election business type.

use std::collections::BTreeSet;

use common::CandidateId;
use serde::{Deserialize, Serialize};

use crate::bundle::{BundleBusiness, BundleError};
use crate::result::{CountOfVoters, ResultBusiness, ResultError};

/// Marker for the majority election business.
///
/// Uses a single bundle-number pool per result and fixed-size review
/// samples; full resets are not available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MajorityElection;

/// Vote count of one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateVoteCount {
    pub candidate_id: CandidateId,
    pub vote_count: u32,
}

/// Entered results of a majority election in one counting circle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorityElectionResults {
    /// Votes per candidate.
    pub candidate_results: Vec<CandidateVoteCount>,

    /// Empty candidate votes.
    pub empty_vote_count: u32,

    /// Invalid candidate votes.
    pub invalid_vote_count: u32,

    /// Votes for persons not on the candidate list, where permitted.
    pub individual_vote_count: u32,
}

/// One entered majority election ballot.
///
/// An empty candidate list is a valid ballot; the unused positions count
/// as empty votes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorityElectionBallot {
    /// The selected candidates.
    pub candidate_ids: Vec<CandidateId>,

    /// Empty positions on the ballot.
    pub empty_vote_count: u32,

    /// Individual (write-in) votes on the ballot.
    pub individual_vote_count: u32,
}

impl ResultBusiness for MajorityElection {
    type CountOfVoters = CountOfVoters;
    type Results = MajorityElectionResults;
    type PoolKey = ();

    fn aggregate_type() -> &'static str {
        "MajorityElectionResult"
    }

    fn validate_count_of_voters(count: &Self::CountOfVoters) -> Result<(), ResultError> {
        count.validate()
    }

    fn validate_results(results: &Self::Results) -> Result<(), ResultError> {
        let distinct: BTreeSet<_> = results
            .candidate_results
            .iter()
            .map(|c| c.candidate_id)
            .collect();
        if distinct.len() != results.candidate_results.len() {
            return Err(ResultError::InvalidResults(
                "duplicate candidate in candidate results",
            ));
        }
        Ok(())
    }
}

impl BundleBusiness for MajorityElection {
    type Ballot = MajorityElectionBallot;

    fn bundle_aggregate_type() -> &'static str {
        "MajorityElectionBallotBundle"
    }

    fn validate_ballot(ballot: &Self::Ballot) -> Result<(), BundleError> {
        let distinct: BTreeSet<_> = ballot.candidate_ids.iter().collect();
        if distinct.len() != ballot.candidate_ids.len() {
            return Err(BundleError::InvalidBallot(
                "a candidate cannot appear twice on a majority election ballot",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_with_distinct_candidates_pass() {
        let results = MajorityElectionResults {
            candidate_results: vec![
                CandidateVoteCount {
                    candidate_id: CandidateId::new(),
                    vote_count: 120,
                },
                CandidateVoteCount {
                    candidate_id: CandidateId::new(),
                    vote_count: 87,
                },
            ],
            empty_vote_count: 4,
            invalid_vote_count: 1,
            individual_vote_count: 2,
        };
        assert!(MajorityElection::validate_results(&results).is_ok());
    }

    #[test]
    fn duplicate_candidate_in_results_rejected() {
        let candidate_id = CandidateId::new();
        let results = MajorityElectionResults {
            candidate_results: vec![
                CandidateVoteCount {
                    candidate_id,
                    vote_count: 1,
                },
                CandidateVoteCount {
                    candidate_id,
                    vote_count: 2,
                },
            ],
            ..Default::default()
        };
        assert!(matches!(
            MajorityElection::validate_results(&results),
            Err(ResultError::InvalidResults(_))
        ));
    }

    #[test]
    fn empty_ballot_is_valid() {
        assert!(MajorityElection::validate_ballot(&MajorityElectionBallot::default()).is_ok());
    }

    #[test]
    fn duplicate_candidate_on_ballot_rejected() {
        let candidate_id = CandidateId::new();
        let ballot = MajorityElectionBallot {
            candidate_ids: vec![candidate_id, candidate_id],
            ..Default::default()
        };
        assert!(matches!(
            MajorityElection::validate_ballot(&ballot),
            Err(BundleError::InvalidBallot(_))
        ));
    }
}
