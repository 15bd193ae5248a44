//! Application service for counting-circle results.

use common::{AggregateId, ContestId, CountingCircleId, PoliticalBusinessId};
use event_store::EventStore;
use tracing::instrument;

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;
use crate::identity::result_id;

use super::{CountingCircleResult, ResultBusiness, ResultEntry, ResultEntryParams};

/// Service coordinating result commands against the event store.
///
/// Each method replays the aggregate, runs one command and persists the
/// raised events. The result identity is derived from the business keys, so
/// callers address results by (business, circle, epoch) rather than by a
/// stored id.
pub struct ResultService<S, B>
where
    S: EventStore,
    B: ResultBusiness,
{
    handler: CommandHandler<S, CountingCircleResult<B>>,
}

impl<S, B> ResultService<S, B>
where
    S: EventStore,
    B: ResultBusiness,
{
    /// Creates a new result service backed by the given event store.
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    /// Returns the deterministic identifier of a result.
    pub fn result_id(
        political_business_id: PoliticalBusinessId,
        counting_circle_id: CountingCircleId,
        testing_phase_ended: bool,
    ) -> AggregateId {
        result_id(political_business_id, counting_circle_id, testing_phase_ended)
    }

    /// Loads a result, or None if its submission was never started.
    pub async fn get(
        &self,
        result_id: AggregateId,
    ) -> Result<Option<CountingCircleResult<B>>, DomainError> {
        self.handler.load_existing(result_id).await
    }

    /// Starts the submission for a counting circle.
    #[instrument(skip(self))]
    pub async fn start_submission(
        &self,
        political_business_id: PoliticalBusinessId,
        counting_circle_id: CountingCircleId,
        contest_id: ContestId,
        testing_phase_ended: bool,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        let id = result_id(political_business_id, counting_circle_id, testing_phase_ended);
        self.handler
            .execute(id, |result| {
                result.start_submission(
                    political_business_id,
                    counting_circle_id,
                    contest_id,
                    testing_phase_ended,
                )
            })
            .await
    }

    /// Defines the result entry mode.
    #[instrument(skip(self, params))]
    pub async fn define_entry(
        &self,
        result_id: AggregateId,
        entry: ResultEntry,
        params: Option<ResultEntryParams>,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, |result| result.define_entry(entry, params))
            .await
    }

    /// Enters the count of voters.
    #[instrument(skip(self, count_of_voters))]
    pub async fn enter_count_of_voters(
        &self,
        result_id: AggregateId,
        count_of_voters: B::CountOfVoters,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, |result| {
                result.enter_count_of_voters(count_of_voters)
            })
            .await
    }

    /// Enters business results during submission.
    #[instrument(skip(self, results))]
    pub async fn enter_results(
        &self,
        result_id: AggregateId,
        results: B::Results,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, |result| result.enter_results(results))
            .await
    }

    /// Enters corrected business results during correction.
    #[instrument(skip(self, results))]
    pub async fn enter_correction_results(
        &self,
        result_id: AggregateId,
        results: B::Results,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, |result| result.enter_correction_results(results))
            .await
    }

    /// Generates the next bundle number in the given scope.
    #[instrument(skip(self, pool_key))]
    pub async fn generate_bundle_number(
        &self,
        result_id: AggregateId,
        pool_key: B::PoolKey,
    ) -> Result<u32, DomainError> {
        let mut generated = 0;
        self.handler
            .execute(result_id, |result| {
                generated = result.generate_bundle_number(pool_key)?;
                Ok(())
            })
            .await?;
        Ok(generated)
    }

    /// Claims a manually entered bundle number.
    #[instrument(skip(self, pool_key))]
    pub async fn enter_bundle_number(
        &self,
        result_id: AggregateId,
        pool_key: B::PoolKey,
        number: u32,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, |result| {
                result.enter_bundle_number(pool_key, number)
            })
            .await
    }

    /// Frees an allocated bundle number for one reuse.
    #[instrument(skip(self, pool_key))]
    pub async fn free_bundle_number(
        &self,
        result_id: AggregateId,
        pool_key: B::PoolKey,
        number: u32,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, |result| {
                result.free_bundle_number(pool_key, number)
            })
            .await
    }

    /// Finishes the submission.
    #[instrument(skip(self))]
    pub async fn finish_submission(
        &self,
        result_id: AggregateId,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, CountingCircleResult::finish_submission)
            .await
    }

    /// Flags the result for correction.
    #[instrument(skip(self))]
    pub async fn flag_for_correction(
        &self,
        result_id: AggregateId,
        comment: Option<String>,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, |result| result.flag_for_correction(comment))
            .await
    }

    /// Finishes the correction.
    #[instrument(skip(self))]
    pub async fn finish_correction(
        &self,
        result_id: AggregateId,
        comment: Option<String>,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, |result| result.finish_correction(comment))
            .await
    }

    /// Marks the result as tentatively audited.
    #[instrument(skip(self))]
    pub async fn audit_tentatively(
        &self,
        result_id: AggregateId,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, CountingCircleResult::audit_tentatively)
            .await
    }

    /// Plausibilises the result.
    #[instrument(skip(self))]
    pub async fn plausibilise(
        &self,
        result_id: AggregateId,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, CountingCircleResult::plausibilise)
            .await
    }

    /// Undoes the tentative audit.
    #[instrument(skip(self))]
    pub async fn reset_to_submission_finished(
        &self,
        result_id: AggregateId,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, CountingCircleResult::reset_to_submission_finished)
            .await
    }

    /// Undoes the plausibilisation.
    #[instrument(skip(self))]
    pub async fn reset_to_audited_tentatively(
        &self,
        result_id: AggregateId,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, CountingCircleResult::reset_to_audited_tentatively)
            .await
    }

    /// Fully rewinds the result to submission, discarding entered data.
    #[instrument(skip(self))]
    pub async fn reset(
        &self,
        result_id: AggregateId,
    ) -> Result<CommandResult<CountingCircleResult<B>>, DomainError> {
        self.handler
            .execute(result_id, CountingCircleResult::reset)
            .await
    }
}

#[cfg(test)]
mod tests {
    use event_store::InMemoryEventStore;

    use crate::aggregate::Aggregate;
    use crate::business::MajorityElection;
    use crate::result::{
        BallotNumberGeneration, ResultState, ReviewProcedure, ReviewSampling,
    };

    use super::*;

    fn service() -> ResultService<InMemoryEventStore, MajorityElection> {
        ResultService::new(InMemoryEventStore::new())
    }

    fn detailed_params() -> ResultEntryParams {
        ResultEntryParams {
            ballot_bundle_size: 25,
            review_sampling: ReviewSampling::FixedSize(3),
            automatic_bundle_number_generation: true,
            ballot_number_generation: BallotNumberGeneration::RestartForEachBundle,
            review_procedure: ReviewProcedure::Electronically,
        }
    }

    #[tokio::test]
    async fn start_submission_persists_and_reloads() {
        let service = service();
        let business = PoliticalBusinessId::new();
        let circle = CountingCircleId::new();

        let result = service
            .start_submission(business, circle, ContestId::new(), false)
            .await
            .unwrap();

        let id = ResultService::<InMemoryEventStore, MajorityElection>::result_id(
            business, circle, false,
        );
        assert_eq!(result.aggregate.id(), Some(id));

        let loaded = service.get(id).await.unwrap().unwrap();
        assert_eq!(loaded.state(), ResultState::SubmissionOngoing);
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_result() {
        let service = service();
        assert!(service.get(AggregateId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn generated_numbers_survive_reload() {
        let service = service();
        let result = service
            .start_submission(
                PoliticalBusinessId::new(),
                CountingCircleId::new(),
                ContestId::new(),
                false,
            )
            .await
            .unwrap();
        let id = result.aggregate.id().unwrap();

        service
            .define_entry(id, ResultEntry::Detailed, Some(detailed_params()))
            .await
            .unwrap();

        assert_eq!(service.generate_bundle_number(id, ()).await.unwrap(), 1);
        assert_eq!(service.generate_bundle_number(id, ()).await.unwrap(), 2);

        let loaded = service.get(id).await.unwrap().unwrap();
        assert!(loaded.is_bundle_number_in_use(&(), 1));
        assert!(loaded.is_bundle_number_in_use(&(), 2));
    }

    #[tokio::test]
    async fn validation_error_persists_nothing() {
        let service = service();
        let result = service
            .start_submission(
                PoliticalBusinessId::new(),
                CountingCircleId::new(),
                ContestId::new(),
                false,
            )
            .await
            .unwrap();
        let id = result.aggregate.id().unwrap();
        let version = result.new_version;

        let err = service.plausibilise(id).await.unwrap_err();
        assert!(err.is_validation());

        let loaded = service.get(id).await.unwrap().unwrap();
        assert_eq!(loaded.version(), version);
    }

    #[tokio::test]
    async fn audit_workflow_round_trip() {
        let service = service();
        let result = service
            .start_submission(
                PoliticalBusinessId::new(),
                CountingCircleId::new(),
                ContestId::new(),
                false,
            )
            .await
            .unwrap();
        let id = result.aggregate.id().unwrap();

        service.finish_submission(id).await.unwrap();
        service
            .flag_for_correction(id, Some("recount".to_string()))
            .await
            .unwrap();
        service.finish_correction(id, None).await.unwrap();
        service.audit_tentatively(id).await.unwrap();
        let result = service.plausibilise(id).await.unwrap();

        assert_eq!(result.aggregate.state(), ResultState::Plausibilised);

        let result = service.reset_to_audited_tentatively(id).await.unwrap();
        assert_eq!(result.aggregate.state(), ResultState::AuditedTentatively);
    }
}
