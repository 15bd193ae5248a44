//! Counting-circle result state machine.

use serde::{Deserialize, Serialize};

/// The state of a counting-circle result in its audit lifecycle.
///
/// State transitions:
/// ```text
/// Initial -> SubmissionOngoing -> SubmissionDone <-> ReadyForCorrection <-> CorrectionDone
///                                       |                                        |
///                                       +------> AuditedTentatively <------------+
///                                                       |
///                                                 Plausibilised
/// ```
/// The audit can be undone stepwise (`Plausibilised` back to
/// `AuditedTentatively`, `AuditedTentatively` back to `SubmissionDone`), and
/// the vote business can fully rewind to `SubmissionOngoing` while the
/// contest is still in its testing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ResultState {
    /// No submission has been started yet.
    #[default]
    Initial,

    /// The counting circle is entering result data.
    SubmissionOngoing,

    /// Submission was finished and awaits the audit decision.
    SubmissionDone,

    /// The monitoring authority flagged the result for correction.
    ReadyForCorrection,

    /// The correction was finished and awaits the audit decision.
    CorrectionDone,

    /// The result passed the tentative audit.
    AuditedTentatively,

    /// The result was plausibilised.
    Plausibilised,
}

impl ResultState {
    /// Returns true if result data may be entered or corrected.
    pub fn is_open_for_entry(&self) -> bool {
        matches!(
            self,
            ResultState::SubmissionOngoing | ResultState::ReadyForCorrection
        )
    }

    /// Returns true if the result entry mode may be defined.
    pub fn can_define_entry(&self) -> bool {
        matches!(self, ResultState::SubmissionOngoing)
    }

    /// Returns true if the submission can be finished.
    pub fn can_finish_submission(&self) -> bool {
        matches!(self, ResultState::SubmissionOngoing)
    }

    /// Returns true if the result can be flagged for correction.
    pub fn can_flag_for_correction(&self) -> bool {
        matches!(
            self,
            ResultState::SubmissionDone | ResultState::CorrectionDone
        )
    }

    /// Returns true if the correction can be finished.
    pub fn can_finish_correction(&self) -> bool {
        matches!(self, ResultState::ReadyForCorrection)
    }

    /// Returns true if the result can be audited tentatively.
    pub fn can_audit_tentatively(&self) -> bool {
        matches!(
            self,
            ResultState::SubmissionDone | ResultState::CorrectionDone
        )
    }

    /// Returns true if the result can be plausibilised.
    pub fn can_plausibilise(&self) -> bool {
        matches!(self, ResultState::AuditedTentatively)
    }

    /// Returns true if the result can be fully rewound to submission.
    ///
    /// Applies to the vote business during the testing phase only; the
    /// epoch guard itself lives on the aggregate.
    pub fn can_reset(&self) -> bool {
        !matches!(self, ResultState::Initial | ResultState::Plausibilised)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultState::Initial => "Initial",
            ResultState::SubmissionOngoing => "SubmissionOngoing",
            ResultState::SubmissionDone => "SubmissionDone",
            ResultState::ReadyForCorrection => "ReadyForCorrection",
            ResultState::CorrectionDone => "CorrectionDone",
            ResultState::AuditedTentatively => "AuditedTentatively",
            ResultState::Plausibilised => "Plausibilised",
        }
    }
}

impl std::fmt::Display for ResultState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ResultState; 7] = [
        ResultState::Initial,
        ResultState::SubmissionOngoing,
        ResultState::SubmissionDone,
        ResultState::ReadyForCorrection,
        ResultState::CorrectionDone,
        ResultState::AuditedTentatively,
        ResultState::Plausibilised,
    ];

    #[test]
    fn default_state_is_initial() {
        assert_eq!(ResultState::default(), ResultState::Initial);
    }

    #[test]
    fn entry_only_during_submission_or_correction() {
        for state in ALL {
            assert_eq!(
                state.is_open_for_entry(),
                matches!(
                    state,
                    ResultState::SubmissionOngoing | ResultState::ReadyForCorrection
                ),
                "{state}"
            );
        }
    }

    #[test]
    fn flag_for_correction_from_done_states_only() {
        for state in ALL {
            assert_eq!(
                state.can_flag_for_correction(),
                matches!(
                    state,
                    ResultState::SubmissionDone | ResultState::CorrectionDone
                ),
                "{state}"
            );
        }
    }

    #[test]
    fn audit_from_done_states_only() {
        for state in ALL {
            assert_eq!(state.can_audit_tentatively(), state.can_flag_for_correction());
        }
    }

    #[test]
    fn plausibilise_only_after_audit() {
        for state in ALL {
            assert_eq!(
                state.can_plausibilise(),
                state == ResultState::AuditedTentatively,
                "{state}"
            );
        }
    }

    #[test]
    fn reset_excludes_initial_and_plausibilised() {
        assert!(!ResultState::Initial.can_reset());
        assert!(!ResultState::Plausibilised.can_reset());
        assert!(ResultState::SubmissionOngoing.can_reset());
        assert!(ResultState::AuditedTentatively.can_reset());
    }

    #[test]
    fn display() {
        assert_eq!(ResultState::SubmissionOngoing.to_string(), "SubmissionOngoing");
        assert_eq!(ResultState::Plausibilised.to_string(), "Plausibilised");
    }

    #[test]
    fn serialization_roundtrip() {
        let state = ResultState::ReadyForCorrection;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: ResultState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
