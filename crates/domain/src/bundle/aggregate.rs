//! Ballot bundle aggregate.

use std::collections::BTreeMap;

use common::{AggregateId, ContestId, UserId};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::result::{
    BallotNumberGeneration, MAX_BALLOT_BUNDLE_SIZE, ResultEntryParams, ReviewSampling,
};

use super::{
    BallotSampler, BundleBusiness, BundleError, BundleEvent, BundleState,
    events::{BallotData, BundleCreatedData},
};

/// Snapshot of the result's entry parameters taken when a bundle is
/// created.
///
/// Frozen for the life of the bundle: redefining the result's entry mode
/// never changes the sizing, sampling or numbering of an existing bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleResultEntryParams {
    /// Maximum number of ballots in the bundle.
    pub ballot_bundle_size: u32,

    /// Spot-review sample drawn when the bundle is closed.
    pub review_sampling: ReviewSampling,

    /// Ballot numbering strategy.
    pub ballot_number_generation: BallotNumberGeneration,
}

impl BundleResultEntryParams {
    /// Validates the snapshot shape, mirroring the checks applied when the
    /// result's entry is defined. Guards against callers assembling a
    /// snapshot by hand instead of deriving it from a defined entry.
    pub fn validate(&self) -> Result<(), BundleError> {
        if self.ballot_bundle_size == 0 || self.ballot_bundle_size > MAX_BALLOT_BUNDLE_SIZE {
            return Err(BundleError::InvalidEntryParams(
                "ballot bundle size must be between 1 and the allowed maximum",
            ));
        }

        match self.review_sampling {
            ReviewSampling::FixedSize(size) => {
                if size == 0 || size > self.ballot_bundle_size {
                    return Err(BundleError::InvalidEntryParams(
                        "review sample size must be between 1 and the bundle size",
                    ));
                }
            }
            ReviewSampling::Percent(percent) => {
                if percent == 0 || percent > 100 {
                    return Err(BundleError::InvalidEntryParams(
                        "review sample percentage must be between 1 and 100",
                    ));
                }
            }
        }

        Ok(())
    }
}

impl From<ResultEntryParams> for BundleResultEntryParams {
    fn from(params: ResultEntryParams) -> Self {
        Self {
            ballot_bundle_size: params.ballot_bundle_size,
            review_sampling: params.review_sampling,
            ballot_number_generation: params.ballot_number_generation,
        }
    }
}

/// One bundle of entered ballots under a counting-circle result.
///
/// Owns the ballot-entry and review state machine, the gap-free sequential
/// ballot numbering inside the bundle, and the spot-review sample drawn at
/// closure. Correlated with its result only by `result_id`; the two streams
/// share no transaction.
#[derive(Debug)]
pub struct BallotBundle<B: BundleBusiness> {
    /// The bundle identifier.
    id: Option<AggregateId>,

    /// Current version for optimistic concurrency.
    version: Version,

    /// Events raised but not yet persisted.
    pending: Vec<BundleEvent<B>>,

    /// The counting-circle result this bundle belongs to.
    result_id: Option<AggregateId>,

    /// The owning contest.
    contest_id: Option<ContestId>,

    /// The bundle number claimed from the result's pool.
    bundle_number: u32,

    /// The user who created the bundle.
    created_by: Option<UserId>,

    /// Current state of the review workflow.
    state: BundleState,

    /// Entry parameters frozen at creation.
    params: Option<BundleResultEntryParams>,

    /// Ballot numbers start at `offset + 1`.
    ballot_offset: u32,

    /// Entered ballots, keyed by ballot number.
    ballots: BTreeMap<u32, B::Ballot>,

    /// The spot-review sample recorded by the last closure.
    review_sample: Vec<u32>,
}

// Derived Default would require the ballot type to be Default, which the
// business trait does not demand. A fresh aggregate is always empty.
impl<B: BundleBusiness> Default for BallotBundle<B> {
    fn default() -> Self {
        Self {
            id: None,
            version: Version::default(),
            pending: Vec::new(),
            result_id: None,
            contest_id: None,
            bundle_number: 0,
            created_by: None,
            state: BundleState::default(),
            params: None,
            ballot_offset: 0,
            ballots: BTreeMap::new(),
            review_sample: Vec::new(),
        }
    }
}

impl<B: BundleBusiness> Aggregate for BallotBundle<B> {
    type Event = BundleEvent<B>;
    type Error = BundleError;

    fn aggregate_type() -> &'static str {
        B::bundle_aggregate_type()
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn contest_id(&self) -> Option<ContestId> {
        self.contest_id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            BundleEvent::Created(data) => self.apply_created(data),
            BundleEvent::BallotCreated(data) | BundleEvent::BallotUpdated(data) => {
                self.apply_ballot(data);
            }
            BundleEvent::BallotDeleted(data) => {
                self.ballots.remove(&data.ballot_number);
            }
            BundleEvent::SubmissionFinished(data) | BundleEvent::CorrectionFinished(data) => {
                self.review_sample = data.sample_ballot_numbers;
                self.state = BundleState::ReadyForReview;
            }
            BundleEvent::ReviewRejected(_) => {
                self.state = BundleState::InCorrection;
            }
            BundleEvent::ReviewSucceeded(_) => {
                self.state = BundleState::Reviewed;
            }
            BundleEvent::Deleted(_) => {
                self.state = BundleState::Deleted;
            }
        }
    }

    fn pending_events(&mut self) -> &mut Vec<Self::Event> {
        &mut self.pending
    }
}

// Query methods
impl<B: BundleBusiness> BallotBundle<B> {
    /// Returns the current state.
    pub fn state(&self) -> BundleState {
        self.state
    }

    /// Returns the result this bundle belongs to.
    pub fn result_id(&self) -> Option<AggregateId> {
        self.result_id
    }

    /// Returns the bundle number.
    pub fn bundle_number(&self) -> u32 {
        self.bundle_number
    }

    /// Returns the creating user.
    pub fn created_by(&self) -> Option<UserId> {
        self.created_by
    }

    /// Returns the frozen entry parameters.
    pub fn params(&self) -> Option<&BundleResultEntryParams> {
        self.params.as_ref()
    }

    /// Returns the number of entered ballots.
    pub fn ballot_count(&self) -> u32 {
        self.ballots.len() as u32
    }

    /// Returns the highest assigned ballot number, or the offset if the
    /// bundle is empty.
    pub fn current_ballot_number(&self) -> u32 {
        self.ballots
            .last_key_value()
            .map_or(self.ballot_offset, |(number, _)| *number)
    }

    /// Returns the ballot with the given number.
    pub fn ballot(&self, ballot_number: u32) -> Option<&B::Ballot> {
        self.ballots.get(&ballot_number)
    }

    /// Returns all ballot numbers, ascending.
    pub fn ballot_numbers(&self) -> Vec<u32> {
        self.ballots.keys().copied().collect()
    }

    /// Returns the spot-review sample of the last closure, ascending.
    pub fn review_sample(&self) -> &[u32] {
        &self.review_sample
    }

    fn ensure_created(&self) -> Result<&BundleResultEntryParams, BundleError> {
        if self.id.is_none() {
            return Err(BundleError::NotCreated);
        }
        self.params.as_ref().ok_or(BundleError::NotCreated)
    }
}

// Command methods (validate, then raise)
impl<B: BundleBusiness> BallotBundle<B> {
    /// Creates the bundle under a result, freezing the entry parameters.
    ///
    /// The ballot offset follows the numbering strategy: restart-per-bundle
    /// numbering starts every bundle at 1, continuous numbering offsets the
    /// bundle by `(bundle_number - 1) * bundle_size`.
    pub fn create(
        &mut self,
        bundle_id: AggregateId,
        result_id: AggregateId,
        contest_id: ContestId,
        bundle_number: u32,
        created_by: UserId,
        params: BundleResultEntryParams,
    ) -> Result<(), BundleError> {
        if self.id.is_some() {
            return Err(BundleError::AlreadyCreated);
        }
        if bundle_number < 1 {
            return Err(BundleError::InvalidBundleNumber {
                number: bundle_number,
            });
        }
        params.validate()?;

        // Manual numbering has no upper bound on the result side, so the
        // continuous offset must be proven representable before the event
        // is raised; apply must never overflow on replay.
        if params.ballot_number_generation == BallotNumberGeneration::ContinuousForAllBundles {
            let last_ballot = (bundle_number - 1)
                .checked_mul(params.ballot_bundle_size)
                .and_then(|offset| offset.checked_add(params.ballot_bundle_size));
            if last_ballot.is_none() {
                return Err(BundleError::BundleNumberTooLarge {
                    number: bundle_number,
                });
            }
        }

        self.raise(BundleEvent::created(
            bundle_id,
            result_id,
            contest_id,
            bundle_number,
            created_by,
            params,
        ));
        Ok(())
    }

    /// Enters the next ballot and returns its number.
    pub fn create_ballot(&mut self, ballot: B::Ballot) -> Result<u32, BundleError> {
        let params = self.ensure_created()?;
        let size = params.ballot_bundle_size;
        if !self.state.is_open_for_ballots() {
            return Err(BundleError::InvalidStateTransition {
                current_state: self.state,
                action: "create ballot",
            });
        }
        if self.ballot_count() >= size {
            return Err(BundleError::BundleSizeReached { size });
        }
        B::validate_ballot(&ballot)?;

        let ballot_number = self.current_ballot_number() + 1;
        self.raise(BundleEvent::ballot_created(ballot_number, ballot));
        Ok(ballot_number)
    }

    /// Replaces an existing ballot.
    pub fn update_ballot(
        &mut self,
        ballot_number: u32,
        ballot: B::Ballot,
    ) -> Result<(), BundleError> {
        self.ensure_created()?;
        if !self.state.allows_ballot_update() {
            return Err(BundleError::InvalidStateTransition {
                current_state: self.state,
                action: "update ballot",
            });
        }
        if !self.ballots.contains_key(&ballot_number) {
            return Err(BundleError::UnknownBallotNumber {
                number: ballot_number,
            });
        }
        B::validate_ballot(&ballot)?;

        self.raise(BundleEvent::ballot_updated(ballot_number, ballot));
        Ok(())
    }

    /// Removes a ballot. Only the current (highest) number may be removed,
    /// so the sequence never develops gaps.
    pub fn delete_ballot(&mut self, ballot_number: u32) -> Result<(), BundleError> {
        self.ensure_created()?;
        if !self.state.is_open_for_ballots() {
            return Err(BundleError::InvalidStateTransition {
                current_state: self.state,
                action: "delete ballot",
            });
        }
        if !self.ballots.contains_key(&ballot_number) {
            return Err(BundleError::UnknownBallotNumber {
                number: ballot_number,
            });
        }
        let current = self.current_ballot_number();
        if ballot_number != current {
            return Err(BundleError::NotCurrentBallot {
                number: ballot_number,
                current,
            });
        }

        self.raise(BundleEvent::ballot_deleted(ballot_number));
        Ok(())
    }

    /// Closes ballot entry, draws the review sample and moves the bundle
    /// to review.
    pub fn finish_submission(
        &mut self,
        sampler: &mut dyn BallotSampler,
    ) -> Result<(), BundleError> {
        if self.state != BundleState::InProcess {
            return Err(BundleError::InvalidStateTransition {
                current_state: self.state,
                action: "finish submission",
            });
        }
        let sample = self.draw_sample(sampler)?;

        self.raise(BundleEvent::review_closed(
            BundleEvent::SubmissionFinished,
            sample,
        ));
        Ok(())
    }

    /// Closes the correction, draws a fresh review sample and moves the
    /// bundle back to review.
    pub fn finish_correction(
        &mut self,
        sampler: &mut dyn BallotSampler,
    ) -> Result<(), BundleError> {
        if self.state != BundleState::InCorrection {
            return Err(BundleError::InvalidStateTransition {
                current_state: self.state,
                action: "finish correction",
            });
        }
        let sample = self.draw_sample(sampler)?;

        self.raise(BundleEvent::review_closed(
            BundleEvent::CorrectionFinished,
            sample,
        ));
        Ok(())
    }

    /// Rejects the review, sending the bundle back for correction.
    pub fn reject_review(&mut self) -> Result<(), BundleError> {
        if !self.state.is_in_review() {
            return Err(BundleError::InvalidStateTransition {
                current_state: self.state,
                action: "reject review",
            });
        }

        self.raise(BundleEvent::review_decision(BundleEvent::ReviewRejected));
        Ok(())
    }

    /// Accepts the review.
    pub fn succeed_review(&mut self) -> Result<(), BundleError> {
        if !self.state.is_in_review() {
            return Err(BundleError::InvalidStateTransition {
                current_state: self.state,
                action: "succeed review",
            });
        }

        self.raise(BundleEvent::review_decision(BundleEvent::ReviewSucceeded));
        Ok(())
    }

    /// Soft-deletes the bundle. Allowed from any state except `Deleted`,
    /// even mid-review.
    pub fn delete(&mut self) -> Result<(), BundleError> {
        self.ensure_created()?;
        if !self.state.can_delete() {
            return Err(BundleError::InvalidStateTransition {
                current_state: self.state,
                action: "delete",
            });
        }

        self.raise(BundleEvent::review_decision(BundleEvent::Deleted));
        Ok(())
    }

    fn draw_sample(&self, sampler: &mut dyn BallotSampler) -> Result<Vec<u32>, BundleError> {
        let params = self.ensure_created()?;
        if self.ballots.is_empty() {
            return Err(BundleError::NoBallots);
        }

        let numbers = self.ballot_numbers();
        let sample_size = params.review_sampling.sample_count(self.ballot_count());
        Ok(sampler.draw(&numbers, sample_size as usize))
    }
}

// Apply event helpers
impl<B: BundleBusiness> BallotBundle<B> {
    fn apply_created(&mut self, data: BundleCreatedData) {
        self.id = Some(data.bundle_id);
        self.result_id = Some(data.result_id);
        self.contest_id = Some(data.contest_id);
        self.bundle_number = data.bundle_number;
        self.created_by = Some(data.created_by);
        self.ballot_offset = match data.params.ballot_number_generation {
            BallotNumberGeneration::RestartForEachBundle => 0,
            // create only raises numbers whose full range fits, so the
            // saturation can never trigger for events this code wrote.
            BallotNumberGeneration::ContinuousForAllBundles => (data.bundle_number - 1)
                .saturating_mul(data.params.ballot_bundle_size),
        };
        self.params = Some(data.params);
        self.state = BundleState::InProcess;
    }

    fn apply_ballot(&mut self, data: BallotData<B>) {
        self.ballots.insert(data.ballot_number, data.ballot);
    }
}

#[cfg(test)]
mod tests {
    use crate::business::{MajorityElection, MajorityElectionBallot};
    use crate::bundle::RandomBallotSampler;

    use super::*;

    fn params() -> BundleResultEntryParams {
        BundleResultEntryParams {
            ballot_bundle_size: 25,
            review_sampling: ReviewSampling::FixedSize(3),
            ballot_number_generation: BallotNumberGeneration::RestartForEachBundle,
        }
    }

    fn ballot() -> MajorityElectionBallot {
        MajorityElectionBallot::default()
    }

    fn created_with(params: BundleResultEntryParams) -> BallotBundle<MajorityElection> {
        let mut bundle = BallotBundle::default();
        bundle
            .create(
                AggregateId::new(),
                AggregateId::new(),
                ContestId::new(),
                1,
                UserId::new(),
                params,
            )
            .unwrap();
        bundle
    }

    fn created() -> BallotBundle<MajorityElection> {
        created_with(params())
    }

    fn sampler() -> RandomBallotSampler {
        RandomBallotSampler::from_seed(42)
    }

    #[test]
    fn create_freezes_params_and_captures_creator() {
        let creator = UserId::new();
        let mut bundle: BallotBundle<MajorityElection> = BallotBundle::default();
        bundle
            .create(
                AggregateId::new(),
                AggregateId::new(),
                ContestId::new(),
                4,
                creator,
                params(),
            )
            .unwrap();

        assert_eq!(bundle.state(), BundleState::InProcess);
        assert_eq!(bundle.bundle_number(), 4);
        assert_eq!(bundle.created_by(), Some(creator));
        assert_eq!(bundle.params().unwrap().ballot_bundle_size, 25);
    }

    #[test]
    fn create_twice_fails() {
        let mut bundle = created();
        let err = bundle
            .create(
                AggregateId::new(),
                AggregateId::new(),
                ContestId::new(),
                2,
                UserId::new(),
                params(),
            )
            .unwrap_err();
        assert_eq!(err, BundleError::AlreadyCreated);
    }

    #[test]
    fn create_rejects_zero_bundle_number() {
        let mut bundle: BallotBundle<MajorityElection> = BallotBundle::default();
        let err = bundle
            .create(
                AggregateId::new(),
                AggregateId::new(),
                ContestId::new(),
                0,
                UserId::new(),
                params(),
            )
            .unwrap_err();
        assert_eq!(err, BundleError::InvalidBundleNumber { number: 0 });
    }

    #[test]
    fn ballots_number_sequentially_from_one() {
        let mut bundle = created();
        assert_eq!(bundle.create_ballot(ballot()).unwrap(), 1);
        assert_eq!(bundle.create_ballot(ballot()).unwrap(), 2);
        assert_eq!(bundle.create_ballot(ballot()).unwrap(), 3);
        assert_eq!(bundle.current_ballot_number(), 3);
    }

    #[test]
    fn continuous_numbering_offsets_by_bundle_number() {
        let continuous = BundleResultEntryParams {
            ballot_number_generation: BallotNumberGeneration::ContinuousForAllBundles,
            ..params()
        };
        let mut bundle: BallotBundle<MajorityElection> = BallotBundle::default();
        bundle
            .create(
                AggregateId::new(),
                AggregateId::new(),
                ContestId::new(),
                3,
                UserId::new(),
                continuous,
            )
            .unwrap();

        // Bundle 3 with size 25 starts at ballot 51.
        assert_eq!(bundle.create_ballot(ballot()).unwrap(), 51);
        assert_eq!(bundle.create_ballot(ballot()).unwrap(), 52);
    }

    #[test]
    fn continuous_numbering_rejects_unrepresentable_bundle_number() {
        let continuous = BundleResultEntryParams {
            ballot_number_generation: BallotNumberGeneration::ContinuousForAllBundles,
            ..params()
        };
        let mut bundle: BallotBundle<MajorityElection> = BallotBundle::default();

        // 200 million bundles of 25 ballots would overflow the offset.
        let err = bundle
            .create(
                AggregateId::new(),
                AggregateId::new(),
                ContestId::new(),
                200_000_000,
                UserId::new(),
                continuous,
            )
            .unwrap_err();

        assert_eq!(
            err,
            BundleError::BundleNumberTooLarge {
                number: 200_000_000
            }
        );
        assert!(bundle.pending_events().is_empty());
    }

    #[test]
    fn large_bundle_numbers_fine_with_restart_numbering() {
        let mut bundle: BallotBundle<MajorityElection> = BallotBundle::default();
        bundle
            .create(
                AggregateId::new(),
                AggregateId::new(),
                ContestId::new(),
                200_000_000,
                UserId::new(),
                params(),
            )
            .unwrap();

        assert_eq!(bundle.create_ballot(ballot()).unwrap(), 1);
    }

    #[test]
    fn create_rejects_malformed_params() {
        let zero_size = BundleResultEntryParams {
            ballot_bundle_size: 0,
            ..params()
        };
        let mut bundle: BallotBundle<MajorityElection> = BallotBundle::default();
        let err = bundle
            .create(
                AggregateId::new(),
                AggregateId::new(),
                ContestId::new(),
                1,
                UserId::new(),
                zero_size,
            )
            .unwrap_err();
        assert!(matches!(err, BundleError::InvalidEntryParams(_)));

        let oversampled = BundleResultEntryParams {
            review_sampling: ReviewSampling::FixedSize(26),
            ..params()
        };
        let mut bundle: BallotBundle<MajorityElection> = BallotBundle::default();
        assert!(matches!(
            bundle
                .create(
                    AggregateId::new(),
                    AggregateId::new(),
                    ContestId::new(),
                    1,
                    UserId::new(),
                    oversampled,
                )
                .unwrap_err(),
            BundleError::InvalidEntryParams(_)
        ));
    }

    #[test]
    fn bundle_size_is_enforced() {
        let small = BundleResultEntryParams {
            ballot_bundle_size: 2,
            review_sampling: ReviewSampling::FixedSize(1),
            ..params()
        };
        let mut bundle = created_with(small);
        bundle.create_ballot(ballot()).unwrap();
        bundle.create_ballot(ballot()).unwrap();

        assert_eq!(
            bundle.create_ballot(ballot()).unwrap_err(),
            BundleError::BundleSizeReached { size: 2 }
        );
    }

    #[test]
    fn only_current_ballot_can_be_deleted() {
        let mut bundle = created();
        bundle.create_ballot(ballot()).unwrap();
        bundle.create_ballot(ballot()).unwrap();
        bundle.create_ballot(ballot()).unwrap();

        assert_eq!(
            bundle.delete_ballot(2).unwrap_err(),
            BundleError::NotCurrentBallot {
                number: 2,
                current: 3
            }
        );

        bundle.delete_ballot(3).unwrap();
        assert_eq!(bundle.current_ballot_number(), 2);
        // The freed position is reassigned next.
        assert_eq!(bundle.create_ballot(ballot()).unwrap(), 3);
    }

    #[test]
    fn delete_unknown_ballot_fails() {
        let mut bundle = created();
        assert_eq!(
            bundle.delete_ballot(1).unwrap_err(),
            BundleError::UnknownBallotNumber { number: 1 }
        );
    }

    #[test]
    fn finish_submission_requires_ballots() {
        let mut bundle = created();
        assert_eq!(
            bundle.finish_submission(&mut sampler()).unwrap_err(),
            BundleError::NoBallots
        );
    }

    #[test]
    fn finish_submission_draws_sorted_sample() {
        let mut bundle = created();
        for _ in 0..25 {
            bundle.create_ballot(ballot()).unwrap();
        }

        bundle.finish_submission(&mut sampler()).unwrap();

        assert_eq!(bundle.state(), BundleState::ReadyForReview);
        let sample = bundle.review_sample();
        assert_eq!(sample.len(), 3);
        assert!(sample.windows(2).all(|w| w[0] < w[1]));
        assert!(sample.iter().all(|n| (1..=25).contains(n)));
    }

    #[test]
    fn fixed_sample_is_clamped_to_ballot_count() {
        let mut bundle = created();
        bundle.create_ballot(ballot()).unwrap();
        bundle.create_ballot(ballot()).unwrap();

        bundle.finish_submission(&mut sampler()).unwrap();

        assert_eq!(bundle.review_sample(), &[1, 2]);
    }

    #[test]
    fn review_cycle_redraws_sample_on_correction() {
        let mut bundle = created();
        for _ in 0..10 {
            bundle.create_ballot(ballot()).unwrap();
        }
        let mut sampler = sampler();
        bundle.finish_submission(&mut sampler).unwrap();

        bundle.reject_review().unwrap();
        assert_eq!(bundle.state(), BundleState::InCorrection);

        // Correction allows fixing ballots before closing again.
        bundle.update_ballot(5, ballot()).unwrap();
        bundle.finish_correction(&mut sampler).unwrap();
        assert_eq!(bundle.state(), BundleState::ReadyForReview);
        assert_eq!(bundle.review_sample().len(), 3);

        bundle.succeed_review().unwrap();
        assert_eq!(bundle.state(), BundleState::Reviewed);
    }

    #[test]
    fn update_ballot_allowed_during_review() {
        let mut bundle = created();
        bundle.create_ballot(ballot()).unwrap();
        bundle.finish_submission(&mut sampler()).unwrap();

        bundle.update_ballot(1, ballot()).unwrap();
        // Adding or deleting remains forbidden mid-review.
        assert!(matches!(
            bundle.create_ballot(ballot()),
            Err(BundleError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            bundle.delete_ballot(1),
            Err(BundleError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn update_unknown_ballot_fails() {
        let mut bundle = created();
        bundle.create_ballot(ballot()).unwrap();
        assert_eq!(
            bundle.update_ballot(2, ballot()).unwrap_err(),
            BundleError::UnknownBallotNumber { number: 2 }
        );
    }

    #[test]
    fn review_decisions_require_review_state() {
        let mut bundle = created();
        assert!(matches!(
            bundle.reject_review(),
            Err(BundleError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            bundle.succeed_review(),
            Err(BundleError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn delete_is_terminal() {
        let mut bundle = created();
        bundle.create_ballot(ballot()).unwrap();
        bundle.finish_submission(&mut sampler()).unwrap();

        // Soft delete works even mid-review.
        bundle.delete().unwrap();
        assert_eq!(bundle.state(), BundleState::Deleted);

        assert!(matches!(
            bundle.delete(),
            Err(BundleError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            bundle.update_ballot(1, ballot()),
            Err(BundleError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn operations_before_create_fail() {
        let mut bundle: BallotBundle<MajorityElection> = BallotBundle::default();
        assert_eq!(
            bundle.create_ballot(ballot()).unwrap_err(),
            BundleError::NotCreated
        );
        assert_eq!(bundle.delete().unwrap_err(), BundleError::NotCreated);
        assert_eq!(
            bundle.finish_submission(&mut sampler()).unwrap_err(),
            BundleError::NotCreated
        );
    }

    #[test]
    fn replay_reads_recorded_sample() {
        let mut bundle = created();
        for _ in 0..25 {
            bundle.create_ballot(ballot()).unwrap();
        }
        bundle.finish_submission(&mut sampler()).unwrap();
        let events = bundle.take_pending();

        let mut replayed: BallotBundle<MajorityElection> = BallotBundle::default();
        replayed.apply_events(events);

        assert_eq!(replayed.state(), BundleState::ReadyForReview);
        assert_eq!(replayed.review_sample(), bundle.review_sample());
        assert_eq!(replayed.ballot_count(), 25);
        assert_eq!(replayed.current_ballot_number(), 25);
    }
}
