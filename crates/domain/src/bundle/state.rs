//! Ballot bundle review state machine.

use serde::{Deserialize, Serialize};

/// States of the ballot bundle review workflow.
///
/// ```text
/// InProcess ----finish submission----> ReadyForReview --succeed--> Reviewed
///     ^                                   |    ^
///     |                              reject    finish correction
///     |                                   v    |
///     +---- (re-entry after reject) InCorrection
///
/// Delete -> Deleted is reachable from every non-Deleted state.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BundleState {
    /// Ballots are being entered into a freshly created bundle.
    #[default]
    InProcess,

    /// The review was rejected and the ballots are being corrected.
    InCorrection,

    /// The bundle is closed and awaits its spot review.
    ReadyForReview,

    /// The review succeeded; the bundle counts toward the result.
    Reviewed,

    /// The bundle was soft-deleted. Terminal.
    Deleted,
}

impl BundleState {
    /// Ballots may be added or deleted.
    pub fn is_open_for_ballots(self) -> bool {
        matches!(self, BundleState::InProcess | BundleState::InCorrection)
    }

    /// Ballots may be updated. Updating is additionally allowed during
    /// review, so a mistake found by the reviewer can be fixed without
    /// reopening the bundle.
    pub fn allows_ballot_update(self) -> bool {
        self.is_open_for_ballots() || self == BundleState::ReadyForReview
    }

    /// The bundle awaits a review decision.
    pub fn is_in_review(self) -> bool {
        self == BundleState::ReadyForReview
    }

    /// The bundle may still be soft-deleted.
    pub fn can_delete(self) -> bool {
        self != BundleState::Deleted
    }

    /// Returns the state name.
    pub fn as_str(self) -> &'static str {
        match self {
            BundleState::InProcess => "InProcess",
            BundleState::InCorrection => "InCorrection",
            BundleState::ReadyForReview => "ReadyForReview",
            BundleState::Reviewed => "Reviewed",
            BundleState::Deleted => "Deleted",
        }
    }
}

impl std::fmt::Display for BundleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
