//! Counting-circle result aggregate.

use std::collections::BTreeMap;

use common::{AggregateId, ContestId, CountingCircleId, PoliticalBusinessId};
use event_store::Version;

use crate::aggregate::Aggregate;
use crate::identity::result_id;

use super::{
    BundleNumberPool, ResultBusiness, ResultEntry, ResultEntryParams, ResultError, ResultEvent,
    ResultState,
    events::{BundleNumberData, EntryDefinedData, SubmissionStartedData},
};

/// Per-counting-circle result aggregate root.
///
/// One instance exists per (counting circle, political business,
/// testing-phase epoch) and owns the submission/audit state machine, the
/// entered payloads and the bundle-number allocation pools for detailed
/// entry. The business payload behavior is supplied by `B`.
#[derive(Debug)]
pub struct CountingCircleResult<B: ResultBusiness> {
    /// Deterministic result identifier (see [`crate::identity::result_id`]).
    id: Option<AggregateId>,

    /// Current version for optimistic concurrency.
    version: Version,

    /// Events raised but not yet persisted.
    pending: Vec<ResultEvent<B>>,

    /// The political business this result belongs to.
    political_business_id: Option<PoliticalBusinessId>,

    /// The reporting counting circle.
    counting_circle_id: Option<CountingCircleId>,

    /// The owning contest.
    contest_id: Option<ContestId>,

    /// Epoch flag captured at submission start.
    testing_phase_ended: bool,

    /// Current state of the audit workflow.
    state: ResultState,

    /// Result entry mode.
    entry: ResultEntry,

    /// Detailed-entry parameters; present iff the mode is detailed.
    entry_params: Option<ResultEntryParams>,

    /// The entered count of voters.
    count_of_voters: Option<B::CountOfVoters>,

    /// The entered business results.
    results: Option<B::Results>,

    /// Bundle-number pools, one per numbering scope.
    pools: BTreeMap<B::PoolKey, BundleNumberPool>,
}

// Derived Default would require the payload types to be Default, which the
// business trait does not demand. A fresh aggregate is always empty.
impl<B: ResultBusiness> Default for CountingCircleResult<B> {
    fn default() -> Self {
        Self {
            id: None,
            version: Version::default(),
            pending: Vec::new(),
            political_business_id: None,
            counting_circle_id: None,
            contest_id: None,
            testing_phase_ended: false,
            state: ResultState::default(),
            entry: ResultEntry::default(),
            entry_params: None,
            count_of_voters: None,
            results: None,
            pools: BTreeMap::new(),
        }
    }
}

impl<B: ResultBusiness> Aggregate for CountingCircleResult<B> {
    type Event = ResultEvent<B>;
    type Error = ResultError;

    fn aggregate_type() -> &'static str {
        B::aggregate_type()
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
            ResultEvent::SubmissionStarted(data) => self.apply_submission_started(data),
            ResultEvent::EntryDefined(data) => self.apply_entry_defined(data),
            ResultEvent::CountOfVotersEntered(data) => {
                self.count_of_voters = Some(data.count_of_voters);
            }
            ResultEvent::ResultsEntered(data) | ResultEvent::CorrectionResultsEntered(data) => {
                self.results = Some(data.results);
            }
            ResultEvent::BundleNumberGenerated(data) | ResultEvent::BundleNumberEntered(data) => {
                self.apply_bundle_number_claimed(data);
            }
            ResultEvent::BundleNumberFreed(data) => {
                self.pools.entry(data.pool_key).or_default().free(data.bundle_number);
            }
            ResultEvent::SubmissionFinished(_) => {
                self.state = ResultState::SubmissionDone;
            }
            ResultEvent::FlaggedForCorrection(_) => {
                self.state = ResultState::ReadyForCorrection;
            }
            ResultEvent::CorrectionFinished(_) => {
                self.state = ResultState::CorrectionDone;
            }
            ResultEvent::AuditedTentatively(_) => {
                self.state = ResultState::AuditedTentatively;
            }
            ResultEvent::Plausibilised(_) => {
                self.state = ResultState::Plausibilised;
            }
            ResultEvent::ResetToSubmissionFinished(_) => {
                self.state = ResultState::SubmissionDone;
            }
            ResultEvent::ResetToAuditedTentatively(_) => {
                self.state = ResultState::AuditedTentatively;
            }
            ResultEvent::Resetted(_) => self.apply_resetted(),
        }
    }

    fn pending_events(&mut self) -> &mut Vec<Self::Event> {
        &mut self.pending
    }
}

// Query methods
impl<B: ResultBusiness> CountingCircleResult<B> {
    /// Returns the current state.
    pub fn state(&self) -> ResultState {
        self.state
    }

    /// Returns the result entry mode.
    pub fn entry(&self) -> ResultEntry {
        self.entry
    }

    /// Returns the detailed-entry parameters, if defined.
    pub fn entry_params(&self) -> Option<&ResultEntryParams> {
        self.entry_params.as_ref()
    }

    /// Returns the entered count of voters.
    pub fn count_of_voters(&self) -> Option<&B::CountOfVoters> {
        self.count_of_voters.as_ref()
    }

    /// Returns the entered business results.
    pub fn results(&self) -> Option<&B::Results> {
        self.results.as_ref()
    }

    /// Returns the counting circle this result belongs to.
    pub fn counting_circle_id(&self) -> Option<CountingCircleId> {
        self.counting_circle_id
    }

    /// Returns the political business this result belongs to.
    pub fn political_business_id(&self) -> Option<PoliticalBusinessId> {
        self.political_business_id
    }

    /// Returns true if the bundle number is in use in the given scope.
    pub fn is_bundle_number_in_use(&self, pool_key: &B::PoolKey, number: u32) -> bool {
        self.pools
            .get(pool_key)
            .is_some_and(|pool| pool.is_in_use(number))
    }

    fn pool(&self, pool_key: &B::PoolKey) -> Option<&BundleNumberPool> {
        self.pools.get(pool_key)
    }

    fn detailed_params(&self) -> Result<&ResultEntryParams, ResultError> {
        if self.entry != ResultEntry::Detailed {
            return Err(ResultError::DetailedEntryRequired);
        }
        self.entry_params
            .as_ref()
            .ok_or(ResultError::DetailedEntryRequired)
    }

    fn guard_open_for_entry(&self, action: &'static str) -> Result<(), ResultError> {
        if !self.state.is_open_for_entry() {
            return Err(ResultError::InvalidStateTransition {
                current_state: self.state,
                action,
            });
        }
        Ok(())
    }
}

// Command methods (validate, then raise)
impl<B: ResultBusiness> CountingCircleResult<B> {
    /// Starts the submission for a counting circle.
    ///
    /// Assigns the deterministic identity derived from the business keys.
    pub fn start_submission(
        &mut self,
        political_business_id: PoliticalBusinessId,
        counting_circle_id: CountingCircleId,
        contest_id: ContestId,
        testing_phase_ended: bool,
    ) -> Result<(), ResultError> {
        if self.state != ResultState::Initial {
            return Err(ResultError::AlreadyStarted);
        }

        let id = result_id(political_business_id, counting_circle_id, testing_phase_ended);
        self.raise(ResultEvent::submission_started(
            id,
            political_business_id,
            counting_circle_id,
            contest_id,
            testing_phase_ended,
        ));
        Ok(())
    }

    /// Defines the result entry mode.
    ///
    /// Detailed entry requires valid parameters; final-results entry
    /// forbids them. Switching the entry definition invalidates all
    /// previously allocated bundle numbers.
    pub fn define_entry(
        &mut self,
        entry: ResultEntry,
        params: Option<ResultEntryParams>,
    ) -> Result<(), ResultError> {
        if !self.state.can_define_entry() {
            return Err(ResultError::InvalidStateTransition {
                current_state: self.state,
                action: "define entry",
            });
        }

        match entry {
            ResultEntry::Detailed => {
                let params = params.ok_or(ResultError::EntryParamsRequired)?;
                params.validate()?;
                self.raise(ResultEvent::entry_defined(entry, Some(params)));
            }
            ResultEntry::FinalResults => {
                if params.is_some() {
                    return Err(ResultError::EntryParamsNotAllowed);
                }
                self.raise(ResultEvent::entry_defined(entry, None));
            }
        }
        Ok(())
    }

    /// Enters the count of voters.
    pub fn enter_count_of_voters(
        &mut self,
        count_of_voters: B::CountOfVoters,
    ) -> Result<(), ResultError> {
        self.guard_open_for_entry("enter count of voters")?;
        B::validate_count_of_voters(&count_of_voters)?;

        self.raise(ResultEvent::count_of_voters_entered(count_of_voters));
        Ok(())
    }

    /// Enters business results during submission.
    pub fn enter_results(&mut self, results: B::Results) -> Result<(), ResultError> {
        if self.state != ResultState::SubmissionOngoing {
            return Err(ResultError::InvalidStateTransition {
                current_state: self.state,
                action: "enter results",
            });
        }
        B::validate_results(&results)?;

        self.raise(ResultEvent::results_entered(results));
        Ok(())
    }

    /// Enters corrected business results during correction.
    pub fn enter_correction_results(&mut self, results: B::Results) -> Result<(), ResultError> {
        if self.state != ResultState::ReadyForCorrection {
            return Err(ResultError::InvalidStateTransition {
                current_state: self.state,
                action: "enter correction results",
            });
        }
        B::validate_results(&results)?;

        self.raise(ResultEvent::correction_results_entered(results));
        Ok(())
    }

    /// Generates the next bundle number in the given scope.
    ///
    /// Only available when the entry definition uses automatic numbering.
    pub fn generate_bundle_number(&mut self, pool_key: B::PoolKey) -> Result<u32, ResultError> {
        self.guard_open_for_entry("generate bundle number")?;
        let params = self.detailed_params()?;
        if !params.automatic_bundle_number_generation {
            return Err(ResultError::AutomaticNumberingDisabled);
        }

        let number = self
            .pool(&pool_key)
            .map_or(1, BundleNumberPool::next_number);
        self.raise(ResultEvent::bundle_number_generated(pool_key, number));
        Ok(number)
    }

    /// Claims a manually entered bundle number in the given scope.
    ///
    /// Rejected if the number is in use, unless it was freed.
    pub fn enter_bundle_number(
        &mut self,
        pool_key: B::PoolKey,
        number: u32,
    ) -> Result<(), ResultError> {
        self.guard_open_for_entry("enter bundle number")?;
        let params = self.detailed_params()?;
        if params.automatic_bundle_number_generation {
            return Err(ResultError::ManualNumberingDisabled);
        }
        if number < 1 {
            return Err(ResultError::InvalidBundleNumber { number });
        }
        if !self.pool(&pool_key).is_none_or(|pool| pool.can_claim(number)) {
            return Err(ResultError::BundleNumberAlreadyInUse { number });
        }

        self.raise(ResultEvent::bundle_number_entered(pool_key, number));
        Ok(())
    }

    /// Frees an allocated bundle number for one reuse.
    pub fn free_bundle_number(
        &mut self,
        pool_key: B::PoolKey,
        number: u32,
    ) -> Result<(), ResultError> {
        self.guard_open_for_entry("free bundle number")?;
        self.detailed_params()?;
        if !self.pool(&pool_key).is_some_and(|pool| pool.can_free(number)) {
            return Err(ResultError::UnknownBundleNumber { number });
        }

        self.raise(ResultEvent::bundle_number_freed(pool_key, number));
        Ok(())
    }

    /// Finishes the submission.
    pub fn finish_submission(&mut self) -> Result<(), ResultError> {
        if !self.state.can_finish_submission() {
            return Err(ResultError::InvalidStateTransition {
                current_state: self.state,
                action: "finish submission",
            });
        }

        self.raise(ResultEvent::comment_event(
            ResultEvent::SubmissionFinished,
            None,
        ));
        Ok(())
    }

    /// Flags the result for correction.
    pub fn flag_for_correction(&mut self, comment: Option<String>) -> Result<(), ResultError> {
        if !self.state.can_flag_for_correction() {
            return Err(ResultError::InvalidStateTransition {
                current_state: self.state,
                action: "flag for correction",
            });
        }

        self.raise(ResultEvent::comment_event(
            ResultEvent::FlaggedForCorrection,
            comment,
        ));
        Ok(())
    }

    /// Finishes the correction.
    pub fn finish_correction(&mut self, comment: Option<String>) -> Result<(), ResultError> {
        if !self.state.can_finish_correction() {
            return Err(ResultError::InvalidStateTransition {
                current_state: self.state,
                action: "finish correction",
            });
        }

        self.raise(ResultEvent::comment_event(
            ResultEvent::CorrectionFinished,
            comment,
        ));
        Ok(())
    }

    /// Marks the result as tentatively audited.
    pub fn audit_tentatively(&mut self) -> Result<(), ResultError> {
        if !self.state.can_audit_tentatively() {
            return Err(ResultError::InvalidStateTransition {
                current_state: self.state,
                action: "audit tentatively",
            });
        }

        self.raise(ResultEvent::comment_event(
            ResultEvent::AuditedTentatively,
            None,
        ));
        Ok(())
    }

    /// Plausibilises the result.
    pub fn plausibilise(&mut self) -> Result<(), ResultError> {
        if !self.state.can_plausibilise() {
            return Err(ResultError::InvalidStateTransition {
                current_state: self.state,
                action: "plausibilise",
            });
        }

        self.raise(ResultEvent::comment_event(ResultEvent::Plausibilised, None));
        Ok(())
    }

    /// Undoes the tentative audit.
    ///
    /// Deliberately does not check the testing-phase epoch.
    pub fn reset_to_submission_finished(&mut self) -> Result<(), ResultError> {
        if self.state != ResultState::AuditedTentatively {
            return Err(ResultError::InvalidStateTransition {
                current_state: self.state,
                action: "reset to submission finished",
            });
        }

        self.raise(ResultEvent::reset_event(
            ResultEvent::ResetToSubmissionFinished,
        ));
        Ok(())
    }

    /// Undoes the plausibilisation.
    ///
    /// Deliberately does not check the testing-phase epoch.
    pub fn reset_to_audited_tentatively(&mut self) -> Result<(), ResultError> {
        if self.state != ResultState::Plausibilised {
            return Err(ResultError::InvalidStateTransition {
                current_state: self.state,
                action: "reset to audited tentatively",
            });
        }

        self.raise(ResultEvent::reset_event(
            ResultEvent::ResetToAuditedTentatively,
        ));
        Ok(())
    }

    /// Fully rewinds the result to `SubmissionOngoing`, discarding entered
    /// payloads and all allocated bundle numbers.
    ///
    /// Only supported by the vote business, and only while the aggregate
    /// still carries its testing-phase identity.
    pub fn reset(&mut self) -> Result<(), ResultError> {
        if !B::ALLOWS_FULL_RESET {
            return Err(ResultError::FullResetNotSupported);
        }
        if !self.state.can_reset() {
            return Err(ResultError::InvalidStateTransition {
                current_state: self.state,
                action: "reset",
            });
        }

        // A reset of this strength is forbidden once the contest left its
        // testing phase: the identity must still be the pre-deadline one.
        let testing_phase_id = match (self.political_business_id, self.counting_circle_id) {
            (Some(business), Some(circle)) => result_id(business, circle, false),
            _ => return Err(ResultError::TestingPhaseEnded),
        };
        if self.testing_phase_ended || self.id != Some(testing_phase_id) {
            return Err(ResultError::TestingPhaseEnded);
        }

        self.raise(ResultEvent::reset_event(ResultEvent::Resetted));
        Ok(())
    }
}

// Apply event helpers
impl<B: ResultBusiness> CountingCircleResult<B> {
    fn apply_submission_started(&mut self, data: SubmissionStartedData) {
        self.id = Some(data.result_id);
        self.political_business_id = Some(data.political_business_id);
        self.counting_circle_id = Some(data.counting_circle_id);
        self.contest_id = Some(data.contest_id);
        self.testing_phase_ended = data.testing_phase_ended;
        self.state = ResultState::SubmissionOngoing;
    }

    fn apply_entry_defined(&mut self, data: EntryDefinedData) {
        self.entry = data.entry;
        self.entry_params = data.params;
        // Switching the entry mode invalidates all allocated numbers.
        self.pools.clear();
    }

    fn apply_bundle_number_claimed(&mut self, data: BundleNumberData<B>) {
        self.pools
            .entry(data.pool_key)
            .or_default()
            .claim(data.bundle_number);
    }

    fn apply_resetted(&mut self) {
        self.state = ResultState::SubmissionOngoing;
        self.count_of_voters = None;
        self.results = None;
        self.pools.clear();
    }
}
