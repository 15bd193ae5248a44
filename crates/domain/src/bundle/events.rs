//! Ballot bundle domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, ContestId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{BundleBusiness, BundleResultEntryParams};

/// Events that can occur on a ballot bundle aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", bound = "")]
pub enum BundleEvent<B: BundleBusiness> {
    /// The bundle was created under a result.
    Created(BundleCreatedData),

    /// A ballot was entered.
    BallotCreated(BallotData<B>),

    /// An existing ballot was replaced.
    BallotUpdated(BallotData<B>),

    /// The current ballot was removed.
    BallotDeleted(BallotDeletedData),

    /// Ballot entry was finished and the review sample drawn.
    SubmissionFinished(ReviewClosedData),

    /// The correction was finished and a fresh review sample drawn.
    CorrectionFinished(ReviewClosedData),

    /// The reviewer rejected the bundle.
    ReviewRejected(ReviewDecisionData),

    /// The reviewer accepted the bundle.
    ReviewSucceeded(ReviewDecisionData),

    /// The bundle was soft-deleted.
    Deleted(ReviewDecisionData),
}

impl<B: BundleBusiness> DomainEvent for BundleEvent<B> {
    fn event_type(&self) -> &'static str {
        match self {
            BundleEvent::Created(_) => "BundleCreated",
            BundleEvent::BallotCreated(_) => "BallotCreated",
            BundleEvent::BallotUpdated(_) => "BallotUpdated",
            BundleEvent::BallotDeleted(_) => "BallotDeleted",
            BundleEvent::SubmissionFinished(_) => "BundleSubmissionFinished",
            BundleEvent::CorrectionFinished(_) => "BundleCorrectionFinished",
            BundleEvent::ReviewRejected(_) => "BundleReviewRejected",
            BundleEvent::ReviewSucceeded(_) => "BundleReviewSucceeded",
            BundleEvent::Deleted(_) => "BundleDeleted",
        }
    }
}

/// Data for the Created event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleCreatedData {
    /// The bundle identifier.
    pub bundle_id: AggregateId,

    /// The counting-circle result this bundle belongs to.
    pub result_id: AggregateId,

    /// The owning contest.
    pub contest_id: ContestId,

    /// The bundle number claimed from the result's pool.
    pub bundle_number: u32,

    /// The user who created the bundle. Captured from the creating actor;
    /// not re-derivable from any other event.
    pub created_by: UserId,

    /// Snapshot of the result's entry parameters at creation time.
    pub params: BundleResultEntryParams,

    /// When the bundle was created.
    pub created_at: DateTime<Utc>,
}

/// Data for the BallotCreated and BallotUpdated events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct BallotData<B: BundleBusiness> {
    /// The ballot number within the bundle's numbering scheme.
    pub ballot_number: u32,

    /// The ballot payload.
    pub ballot: B::Ballot,
}

/// Data for the BallotDeleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallotDeletedData {
    /// The removed ballot number.
    pub ballot_number: u32,
}

/// Data for the SubmissionFinished and CorrectionFinished events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewClosedData {
    /// The ballot numbers drawn for the spot review, ascending.
    ///
    /// Drawn once at closure time; replay reads this recorded sample and
    /// never re-draws.
    pub sample_ballot_numbers: Vec<u32>,

    /// When the bundle was closed.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the review decision and deletion events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDecisionData {
    /// When the decision was made.
    pub occurred_at: DateTime<Utc>,
}

// Convenience constructors for events
impl<B: BundleBusiness> BundleEvent<B> {
    pub(super) fn created(
        bundle_id: AggregateId,
        result_id: AggregateId,
        contest_id: ContestId,
        bundle_number: u32,
        created_by: UserId,
        params: BundleResultEntryParams,
    ) -> Self {
        BundleEvent::Created(BundleCreatedData {
            bundle_id,
            result_id,
            contest_id,
            bundle_number,
            created_by,
            params,
            created_at: Utc::now(),
        })
    }

    pub(super) fn ballot_created(ballot_number: u32, ballot: B::Ballot) -> Self {
        BundleEvent::BallotCreated(BallotData {
            ballot_number,
            ballot,
        })
    }

    pub(super) fn ballot_updated(ballot_number: u32, ballot: B::Ballot) -> Self {
        BundleEvent::BallotUpdated(BallotData {
            ballot_number,
            ballot,
        })
    }

    pub(super) fn ballot_deleted(ballot_number: u32) -> Self {
        BundleEvent::BallotDeleted(BallotDeletedData { ballot_number })
    }

    pub(super) fn review_closed(
        build: fn(ReviewClosedData) -> Self,
        sample_ballot_numbers: Vec<u32>,
    ) -> Self {
        build(ReviewClosedData {
            sample_ballot_numbers,
            occurred_at: Utc::now(),
        })
    }

    pub(super) fn review_decision(build: fn(ReviewDecisionData) -> Self) -> Self {
        build(ReviewDecisionData {
            occurred_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::business::MajorityElection;
    use crate::result::{BallotNumberGeneration, ReviewSampling};

    use super::*;

    fn created_event() -> BundleEvent<MajorityElection> {
        BundleEvent::created(
            AggregateId::new(),
            AggregateId::new(),
            ContestId::new(),
            1,
            UserId::new(),
            BundleResultEntryParams {
                ballot_bundle_size: 25,
                review_sampling: ReviewSampling::FixedSize(3),
                ballot_number_generation: BallotNumberGeneration::RestartForEachBundle,
            },
        )
    }

    #[test]
    fn event_type_names() {
        assert_eq!(created_event().event_type(), "BundleCreated");

        let event: BundleEvent<MajorityElection> =
            BundleEvent::review_closed(BundleEvent::SubmissionFinished, vec![2, 5, 9]);
        assert_eq!(event.event_type(), "BundleSubmissionFinished");

        let event: BundleEvent<MajorityElection> =
            BundleEvent::review_decision(BundleEvent::ReviewRejected);
        assert_eq!(event.event_type(), "BundleReviewRejected");
    }

    #[test]
    fn created_event_roundtrip() {
        let event = created_event();
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: BundleEvent<MajorityElection> = serde_json::from_str(&json).unwrap();

        if let BundleEvent::Created(data) = deserialized {
            assert_eq!(data.bundle_number, 1);
            assert_eq!(data.params.ballot_bundle_size, 25);
        } else {
            panic!("Expected Created event");
        }
    }

    #[test]
    fn sample_survives_roundtrip() {
        let event: BundleEvent<MajorityElection> =
            BundleEvent::review_closed(BundleEvent::CorrectionFinished, vec![1, 7, 13]);
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: BundleEvent<MajorityElection> = serde_json::from_str(&json).unwrap();

        if let BundleEvent::CorrectionFinished(data) = deserialized {
            assert_eq!(data.sample_ballot_numbers, vec![1, 7, 13]);
        } else {
            panic!("Expected CorrectionFinished event");
        }
    }
}
