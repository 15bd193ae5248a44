//! Application service for ballot bundles.

use common::{AggregateId, ContestId, UserId};
use event_store::EventStore;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{
    BallotBundle, BallotSampler, BundleBusiness, BundleResultEntryParams, RandomBallotSampler,
};

/// Service coordinating bundle commands against the event store.
///
/// Carries the review sampler so the random draw happens exactly once per
/// closure, outside the aggregate; the aggregate only records the drawn
/// sample in its closing event.
pub struct BundleService<S, B>
where
    S: EventStore,
    B: BundleBusiness,
{
    handler: CommandHandler<S, BallotBundle<B>>,
    sampler: Mutex<Box<dyn BallotSampler>>,
}

impl<S, B> BundleService<S, B>
where
    S: EventStore,
    B: BundleBusiness,
{
    /// Creates a new bundle service with the production random sampler.
    pub fn new(store: S) -> Self {
        Self::with_sampler(store, Box::new(RandomBallotSampler::new()))
    }

    /// Creates a new bundle service with the given sampler.
    pub fn with_sampler(store: S, sampler: Box<dyn BallotSampler>) -> Self {
        Self {
            handler: CommandHandler::new(store),
            sampler: Mutex::new(sampler),
        }
    }

    /// Loads a bundle, or None if it was never created.
    pub async fn get(&self, bundle_id: AggregateId) -> Result<Option<BallotBundle<B>>, DomainError> {
        self.handler.load_existing(bundle_id).await
    }

    /// Creates a bundle under a result and returns its generated id.
    #[instrument(skip(self, params))]
    pub async fn create(
        &self,
        result_id: AggregateId,
        contest_id: ContestId,
        bundle_number: u32,
        created_by: UserId,
        params: BundleResultEntryParams,
    ) -> Result<CommandResult<BallotBundle<B>>, DomainError> {
        let bundle_id = AggregateId::new();
        self.handler
            .execute(bundle_id, |bundle| {
                bundle.create(
                    bundle_id,
                    result_id,
                    contest_id,
                    bundle_number,
                    created_by,
                    params,
                )
            })
            .await
    }

    /// Enters the next ballot and returns its assigned number.
    #[instrument(skip(self, ballot))]
    pub async fn create_ballot(
        &self,
        bundle_id: AggregateId,
        ballot: B::Ballot,
    ) -> Result<u32, DomainError> {
        let mut ballot_number = 0;
        self.handler
            .execute(bundle_id, |bundle| {
                ballot_number = bundle.create_ballot(ballot)?;
                Ok(())
            })
            .await?;
        Ok(ballot_number)
    }

    /// Replaces an existing ballot.
    #[instrument(skip(self, ballot))]
    pub async fn update_ballot(
        &self,
        bundle_id: AggregateId,
        ballot_number: u32,
        ballot: B::Ballot,
    ) -> Result<CommandResult<BallotBundle<B>>, DomainError> {
        self.handler
            .execute(bundle_id, |bundle| {
                bundle.update_ballot(ballot_number, ballot)
            })
            .await
    }

    /// Removes the current ballot.
    #[instrument(skip(self))]
    pub async fn delete_ballot(
        &self,
        bundle_id: AggregateId,
        ballot_number: u32,
    ) -> Result<CommandResult<BallotBundle<B>>, DomainError> {
        self.handler
            .execute(bundle_id, |bundle| bundle.delete_ballot(ballot_number))
            .await
    }

    /// Closes ballot entry and moves the bundle to review.
    #[instrument(skip(self))]
    pub async fn finish_submission(
        &self,
        bundle_id: AggregateId,
    ) -> Result<CommandResult<BallotBundle<B>>, DomainError> {
        let mut sampler = self.sampler.lock().await;
        self.handler
            .execute(bundle_id, |bundle| {
                bundle.finish_submission(sampler.as_mut())
            })
            .await
    }

    /// Closes the correction and moves the bundle back to review.
    #[instrument(skip(self))]
    pub async fn finish_correction(
        &self,
        bundle_id: AggregateId,
    ) -> Result<CommandResult<BallotBundle<B>>, DomainError> {
        let mut sampler = self.sampler.lock().await;
        self.handler
            .execute(bundle_id, |bundle| {
                bundle.finish_correction(sampler.as_mut())
            })
            .await
    }

    /// Rejects the review.
    #[instrument(skip(self))]
    pub async fn reject_review(
        &self,
        bundle_id: AggregateId,
    ) -> Result<CommandResult<BallotBundle<B>>, DomainError> {
        self.handler
            .execute(bundle_id, BallotBundle::reject_review)
            .await
    }

    /// Accepts the review.
    #[instrument(skip(self))]
    pub async fn succeed_review(
        &self,
        bundle_id: AggregateId,
    ) -> Result<CommandResult<BallotBundle<B>>, DomainError> {
        self.handler
            .execute(bundle_id, BallotBundle::succeed_review)
            .await
    }

    /// Soft-deletes the bundle.
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        bundle_id: AggregateId,
    ) -> Result<CommandResult<BallotBundle<B>>, DomainError> {
        self.handler.execute(bundle_id, BallotBundle::delete).await
    }
}

#[cfg(test)]
mod tests {
    use event_store::InMemoryEventStore;

    use crate::aggregate::Aggregate;
    use crate::business::{MajorityElection, MajorityElectionBallot};
    use crate::bundle::BundleState;
    use crate::result::{BallotNumberGeneration, ReviewSampling};

    use super::*;

    fn service() -> BundleService<InMemoryEventStore, MajorityElection> {
        BundleService::with_sampler(
            InMemoryEventStore::new(),
            Box::new(RandomBallotSampler::from_seed(42)),
        )
    }

    fn params() -> BundleResultEntryParams {
        BundleResultEntryParams {
            ballot_bundle_size: 25,
            review_sampling: ReviewSampling::FixedSize(3),
            ballot_number_generation: BallotNumberGeneration::RestartForEachBundle,
        }
    }

    async fn created(service: &BundleService<InMemoryEventStore, MajorityElection>) -> AggregateId {
        let result = service
            .create(
                AggregateId::new(),
                ContestId::new(),
                1,
                UserId::new(),
                params(),
            )
            .await
            .unwrap();
        result.aggregate.id().unwrap()
    }

    #[tokio::test]
    async fn create_persists_and_reloads() {
        let service = service();
        let bundle_id = created(&service).await;

        let loaded = service.get(bundle_id).await.unwrap().unwrap();
        assert_eq!(loaded.state(), BundleState::InProcess);
        assert_eq!(loaded.bundle_number(), 1);
    }

    #[tokio::test]
    async fn ballots_number_sequentially_across_commands() {
        let service = service();
        let bundle_id = created(&service).await;

        for expected in 1..=5 {
            let number = service
                .create_ballot(bundle_id, MajorityElectionBallot::default())
                .await
                .unwrap();
            assert_eq!(number, expected);
        }

        let loaded = service.get(bundle_id).await.unwrap().unwrap();
        assert_eq!(loaded.ballot_count(), 5);
    }

    #[tokio::test]
    async fn review_flow_persists_sample() {
        let service = service();
        let bundle_id = created(&service).await;
        for _ in 0..10 {
            service
                .create_ballot(bundle_id, MajorityElectionBallot::default())
                .await
                .unwrap();
        }

        service.finish_submission(bundle_id).await.unwrap();

        let loaded = service.get(bundle_id).await.unwrap().unwrap();
        assert_eq!(loaded.state(), BundleState::ReadyForReview);
        assert_eq!(loaded.review_sample().len(), 3);

        service.reject_review(bundle_id).await.unwrap();
        service.finish_correction(bundle_id).await.unwrap();
        let result = service.succeed_review(bundle_id).await.unwrap();
        assert_eq!(result.aggregate.state(), BundleState::Reviewed);
    }

    #[tokio::test]
    async fn validation_error_persists_nothing() {
        let service = service();
        let bundle_id = created(&service).await;

        let err = service.finish_submission(bundle_id).await.unwrap_err();
        assert!(err.is_validation());

        let loaded = service.get(bundle_id).await.unwrap().unwrap();
        assert_eq!(loaded.state(), BundleState::InProcess);
    }

    #[tokio::test]
    async fn create_rejects_malformed_params() {
        let service = service();
        let zero_size = BundleResultEntryParams {
            ballot_bundle_size: 0,
            ..params()
        };

        let err = service
            .create(
                AggregateId::new(),
                ContestId::new(),
                1,
                UserId::new(),
                zero_size,
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn delete_is_soft_and_terminal() {
        let service = service();
        let bundle_id = created(&service).await;

        service.delete(bundle_id).await.unwrap();
        let loaded = service.get(bundle_id).await.unwrap().unwrap();
        assert_eq!(loaded.state(), BundleState::Deleted);

        let err = service.delete(bundle_id).await.unwrap_err();
        assert!(err.is_validation());
    }
}
