//! Counting-circle result domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, ContestId, CountingCircleId, PoliticalBusinessId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{ResultBusiness, ResultEntry, ResultEntryParams};

/// Events that can occur on a counting-circle result aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", bound = "")]
pub enum ResultEvent<B: ResultBusiness> {
    /// Submission was started for the counting circle.
    SubmissionStarted(SubmissionStartedData),

    /// The result entry mode was defined.
    EntryDefined(EntryDefinedData),

    /// The count of voters was entered.
    CountOfVotersEntered(CountOfVotersEnteredData<B>),

    /// Business results were entered during submission.
    ResultsEntered(ResultsEnteredData<B>),

    /// Business results were entered during correction.
    CorrectionResultsEntered(ResultsEnteredData<B>),

    /// A bundle number was generated automatically.
    BundleNumberGenerated(BundleNumberData<B>),

    /// A bundle number was entered manually.
    BundleNumberEntered(BundleNumberData<B>),

    /// A bundle number was freed for reuse.
    BundleNumberFreed(BundleNumberData<B>),

    /// The submission was finished.
    SubmissionFinished(AuditCommentData),

    /// The monitoring authority flagged the result for correction.
    FlaggedForCorrection(AuditCommentData),

    /// The correction was finished.
    CorrectionFinished(AuditCommentData),

    /// The result passed the tentative audit.
    AuditedTentatively(AuditCommentData),

    /// The result was plausibilised.
    Plausibilised(AuditCommentData),

    /// The tentative audit was undone.
    ResetToSubmissionFinished(ResetData),

    /// The plausibilisation was undone.
    ResetToAuditedTentatively(ResetData),

    /// The result was fully rewound to submission (vote, testing phase).
    Resetted(ResetData),
}

impl<B: ResultBusiness> DomainEvent for ResultEvent<B> {
    fn event_type(&self) -> &'static str {
        match self {
            ResultEvent::SubmissionStarted(_) => "SubmissionStarted",
            ResultEvent::EntryDefined(_) => "EntryDefined",
            ResultEvent::CountOfVotersEntered(_) => "CountOfVotersEntered",
            ResultEvent::ResultsEntered(_) => "ResultsEntered",
            ResultEvent::CorrectionResultsEntered(_) => "CorrectionResultsEntered",
            ResultEvent::BundleNumberGenerated(_) => "BundleNumberGenerated",
            ResultEvent::BundleNumberEntered(_) => "BundleNumberEntered",
            ResultEvent::BundleNumberFreed(_) => "BundleNumberFreed",
            ResultEvent::SubmissionFinished(_) => "SubmissionFinished",
            ResultEvent::FlaggedForCorrection(_) => "FlaggedForCorrection",
            ResultEvent::CorrectionFinished(_) => "CorrectionFinished",
            ResultEvent::AuditedTentatively(_) => "AuditedTentatively",
            ResultEvent::Plausibilised(_) => "Plausibilised",
            ResultEvent::ResetToSubmissionFinished(_) => "ResetToSubmissionFinished",
            ResultEvent::ResetToAuditedTentatively(_) => "ResetToAuditedTentatively",
            ResultEvent::Resetted(_) => "Resetted",
        }
    }
}

/// Data for the SubmissionStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionStartedData {
    /// The deterministic result identifier.
    pub result_id: AggregateId,

    /// The political business being tabulated.
    pub political_business_id: PoliticalBusinessId,

    /// The counting circle reporting the result.
    pub counting_circle_id: CountingCircleId,

    /// The owning contest.
    pub contest_id: ContestId,

    /// Whether the contest's testing phase had already ended.
    pub testing_phase_ended: bool,

    /// When the submission was started.
    pub started_at: DateTime<Utc>,
}

/// Data for the EntryDefined event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryDefinedData {
    /// The chosen entry mode.
    pub entry: ResultEntry,

    /// Detailed-entry parameters; present iff the mode is detailed.
    pub params: Option<ResultEntryParams>,

    /// When the entry was defined.
    pub defined_at: DateTime<Utc>,
}

/// Data for the CountOfVotersEntered event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CountOfVotersEnteredData<B: ResultBusiness> {
    /// The entered count of voters.
    pub count_of_voters: B::CountOfVoters,

    /// When the count was entered.
    pub entered_at: DateTime<Utc>,
}

/// Data for the ResultsEntered and CorrectionResultsEntered events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ResultsEnteredData<B: ResultBusiness> {
    /// The entered business results.
    pub results: B::Results,

    /// When the results were entered.
    pub entered_at: DateTime<Utc>,
}

/// Data for the bundle number events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct BundleNumberData<B: ResultBusiness> {
    /// The numbering scope the number belongs to.
    pub pool_key: B::PoolKey,

    /// The affected bundle number.
    pub bundle_number: u32,
}

/// Data for the audit workflow events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditCommentData {
    /// Optional comment from the acting authority.
    pub comment: Option<String>,

    /// When the transition happened.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the reset events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetData {
    /// When the reset happened.
    pub occurred_at: DateTime<Utc>,
}

// Convenience constructors for events
impl<B: ResultBusiness> ResultEvent<B> {
    pub(super) fn submission_started(
        result_id: AggregateId,
        political_business_id: PoliticalBusinessId,
        counting_circle_id: CountingCircleId,
        contest_id: ContestId,
        testing_phase_ended: bool,
    ) -> Self {
        ResultEvent::SubmissionStarted(SubmissionStartedData {
            result_id,
            political_business_id,
            counting_circle_id,
            contest_id,
            testing_phase_ended,
            started_at: Utc::now(),
        })
    }

    pub(super) fn entry_defined(entry: ResultEntry, params: Option<ResultEntryParams>) -> Self {
        ResultEvent::EntryDefined(EntryDefinedData {
            entry,
            params,
            defined_at: Utc::now(),
        })
    }

    pub(super) fn count_of_voters_entered(count_of_voters: B::CountOfVoters) -> Self {
        ResultEvent::CountOfVotersEntered(CountOfVotersEnteredData {
            count_of_voters,
            entered_at: Utc::now(),
        })
    }

    pub(super) fn results_entered(results: B::Results) -> Self {
        ResultEvent::ResultsEntered(ResultsEnteredData {
            results,
            entered_at: Utc::now(),
        })
    }

    pub(super) fn correction_results_entered(results: B::Results) -> Self {
        ResultEvent::CorrectionResultsEntered(ResultsEnteredData {
            results,
            entered_at: Utc::now(),
        })
    }

    pub(super) fn bundle_number_generated(pool_key: B::PoolKey, bundle_number: u32) -> Self {
        ResultEvent::BundleNumberGenerated(BundleNumberData {
            pool_key,
            bundle_number,
        })
    }

    pub(super) fn bundle_number_entered(pool_key: B::PoolKey, bundle_number: u32) -> Self {
        ResultEvent::BundleNumberEntered(BundleNumberData {
            pool_key,
            bundle_number,
        })
    }

    pub(super) fn bundle_number_freed(pool_key: B::PoolKey, bundle_number: u32) -> Self {
        ResultEvent::BundleNumberFreed(BundleNumberData {
            pool_key,
            bundle_number,
        })
    }

    pub(super) fn comment_event(
        build: fn(AuditCommentData) -> Self,
        comment: Option<String>,
    ) -> Self {
        build(AuditCommentData {
            comment,
            occurred_at: Utc::now(),
        })
    }

    pub(super) fn reset_event(build: fn(ResetData) -> Self) -> Self {
        build(ResetData {
            occurred_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::business::MajorityElection;

    use super::*;

    #[test]
    fn event_type_names() {
        let event: ResultEvent<MajorityElection> =
            ResultEvent::entry_defined(ResultEntry::FinalResults, None);
        assert_eq!(event.event_type(), "EntryDefined");

        let event: ResultEvent<MajorityElection> = ResultEvent::bundle_number_generated((), 1);
        assert_eq!(event.event_type(), "BundleNumberGenerated");

        let event: ResultEvent<MajorityElection> =
            ResultEvent::comment_event(ResultEvent::FlaggedForCorrection, Some("x".to_string()));
        assert_eq!(event.event_type(), "FlaggedForCorrection");
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event: ResultEvent<MajorityElection> = ResultEvent::submission_started(
            AggregateId::new(),
            PoliticalBusinessId::new(),
            CountingCircleId::new(),
            ContestId::new(),
            false,
        );

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("SubmissionStarted"));

        let deserialized: ResultEvent<MajorityElection> = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.event_type(), "SubmissionStarted");
    }

    #[test]
    fn bundle_number_event_roundtrip() {
        let event: ResultEvent<MajorityElection> = ResultEvent::bundle_number_entered((), 7);
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: ResultEvent<MajorityElection> = serde_json::from_str(&json).unwrap();

        if let ResultEvent::BundleNumberEntered(data) = deserialized {
            assert_eq!(data.bundle_number, 7);
        } else {
            panic!("Expected BundleNumberEntered event");
        }
    }
}
