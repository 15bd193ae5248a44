//! Vote (referendum) business type.

use std::collections::BTreeSet;

use common::BallotId;
use serde::{Deserialize, Serialize};

use crate::bundle::{BundleBusiness, BundleError};
use crate::result::{CountOfVoters, ResultBusiness, ResultError};

/// Marker for the vote business.
///
/// A vote may put several ballots (question sheets) before the electorate,
/// so counts, results and bundle numbering are all keyed per ballot.
/// Review samples are percentage based, and the full testing-phase reset is
/// available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vote;

/// Count of voters for one ballot of the vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotCountOfVoters {
    pub ballot_id: BallotId,
    pub count_of_voters: CountOfVoters,
}

/// Answer counts of one question on a ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotQuestionResult {
    /// Question number on the ballot, starting at 1.
    pub question_number: u32,

    pub yes_count: u32,
    pub no_count: u32,
    pub unspecified_count: u32,
}

/// Entered results of one ballot of the vote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteBallotResults {
    pub ballot_id: BallotId,
    pub question_results: Vec<BallotQuestionResult>,
}

/// Entered results of a vote in one counting circle, one entry per ballot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResults {
    pub ballot_results: Vec<VoteBallotResults>,
}

/// The answer given to one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotAnswer {
    Yes,
    No,
    Unspecified,
}

/// One answered question on an entered vote ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotQuestionAnswer {
    /// Question number on the ballot, starting at 1.
    pub question_number: u32,

    pub answer: BallotAnswer,
}

/// One entered vote ballot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteBallot {
    pub answers: Vec<BallotQuestionAnswer>,
}

impl ResultBusiness for Vote {
    type CountOfVoters = Vec<BallotCountOfVoters>;
    type Results = VoteResults;
    type PoolKey = BallotId;

    const ALLOWS_FULL_RESET: bool = true;

    fn aggregate_type() -> &'static str {
        "VoteResult"
    }

    fn validate_count_of_voters(counts: &Self::CountOfVoters) -> Result<(), ResultError> {
        let distinct: BTreeSet<_> = counts.iter().map(|c| c.ballot_id).collect();
        if distinct.len() != counts.len() {
            return Err(ResultError::InvalidCountOfVoters(
                "duplicate ballot in count of voters",
            ));
        }
        for entry in counts {
            entry.count_of_voters.validate()?;
        }
        Ok(())
    }

    fn validate_results(results: &Self::Results) -> Result<(), ResultError> {
        let distinct: BTreeSet<_> = results.ballot_results.iter().map(|b| b.ballot_id).collect();
        if distinct.len() != results.ballot_results.len() {
            return Err(ResultError::InvalidResults(
                "duplicate ballot in ballot results",
            ));
        }

        for ballot in &results.ballot_results {
            let questions: BTreeSet<_> = ballot
                .question_results
                .iter()
                .map(|q| q.question_number)
                .collect();
            if questions.len() != ballot.question_results.len() {
                return Err(ResultError::InvalidResults(
                    "duplicate question in ballot results",
                ));
            }
        }
        Ok(())
    }
}

impl BundleBusiness for Vote {
    type Ballot = VoteBallot;

    fn bundle_aggregate_type() -> &'static str {
        "VoteBallotBundle"
    }

    fn validate_ballot(ballot: &Self::Ballot) -> Result<(), BundleError> {
        if ballot.answers.is_empty() {
            return Err(BundleError::InvalidBallot(
                "a vote ballot must answer at least one question",
            ));
        }

        let questions: BTreeSet<_> = ballot.answers.iter().map(|a| a.question_number).collect();
        if questions.len() != ballot.answers.len() {
            return Err(BundleError::InvalidBallot(
                "a question cannot be answered twice on one ballot",
            ));
        }
        Ok(())
    }
}
