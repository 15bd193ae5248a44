//! Result entry mode and its detailed-entry parameters.

use serde::{Deserialize, Serialize};

use super::ResultError;

/// How a counting circle enters its result data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ResultEntry {
    /// Only the final tallies are entered.
    #[default]
    FinalResults,

    /// Every submitted ballot is entered, grouped into numbered bundles
    /// that pass through the review workflow.
    Detailed,
}

/// How ballot numbers are assigned within the bundles of one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BallotNumberGeneration {
    /// Ballot numbering restarts at 1 inside every bundle.
    #[default]
    RestartForEachBundle,

    /// Ballots are numbered continuously across bundles: bundle `n` starts
    /// at `(n - 1) * bundle_size + 1`.
    ContinuousForAllBundles,
}

/// How a closed bundle is reviewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReviewProcedure {
    /// The sampled ballots are re-checked on screen.
    #[default]
    Electronically,

    /// The sampled ballots are pulled physically and compared.
    Physically,
}

/// Size of the spot-review sample drawn when a bundle is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewSampling {
    /// A fixed number of ballots per bundle (election businesses).
    FixedSize(u32),

    /// A percentage of the ballots in the bundle (vote business).
    Percent(u32),
}

impl ReviewSampling {
    /// Returns the number of ballots to draw from a bundle holding
    /// `ballot_count` ballots.
    ///
    /// A fixed size is clamped to the ballot count (the draw is without
    /// replacement); a percentage is rounded up.
    pub fn sample_count(&self, ballot_count: u32) -> u32 {
        match *self {
            ReviewSampling::FixedSize(size) => size.min(ballot_count),
            ReviewSampling::Percent(percent) => (percent * ballot_count).div_ceil(100),
        }
    }
}

/// Parameters governing detailed result entry.
///
/// Mandatory when the entry mode is [`ResultEntry::Detailed`], forbidden
/// otherwise. Bundles snapshot these values at creation time; later changes
/// to the result's entry definition never affect an existing bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntryParams {
    /// Maximum number of ballots per bundle.
    pub ballot_bundle_size: u32,

    /// Spot-review sample drawn when a bundle is closed.
    pub review_sampling: ReviewSampling,

    /// Whether bundle numbers are generated automatically or entered
    /// manually by the user.
    pub automatic_bundle_number_generation: bool,

    /// Ballot numbering strategy within bundles.
    pub ballot_number_generation: BallotNumberGeneration,

    /// Review procedure for closed bundles.
    pub review_procedure: ReviewProcedure,
}

/// Largest accepted bundle size.
pub const MAX_BALLOT_BUNDLE_SIZE: u32 = 500;

impl ResultEntryParams {
    /// Validates the parameter shape.
    ///
    /// Invoked before the entry definition event is raised; a failure here
    /// is a caller mistake and never touches aggregate state.
    pub fn validate(&self) -> Result<(), ResultError> {
        if self.ballot_bundle_size == 0 {
            return Err(ResultError::InvalidEntryParams(
                "ballot bundle size must be at least 1",
            ));
        }
        if self.ballot_bundle_size > MAX_BALLOT_BUNDLE_SIZE {
            return Err(ResultError::InvalidEntryParams(
                "ballot bundle size exceeds the allowed maximum",
            ));
        }

        match self.review_sampling {
            ReviewSampling::FixedSize(size) => {
                if size == 0 {
                    return Err(ResultError::InvalidEntryParams(
                        "review sample size must be at least 1",
                    ));
                }
                if size > self.ballot_bundle_size {
                    return Err(ResultError::InvalidEntryParams(
                        "review sample size cannot exceed the bundle size",
                    ));
                }
            }
            ReviewSampling::Percent(percent) => {
                if percent == 0 || percent > 100 {
                    return Err(ResultError::InvalidEntryParams(
                        "review sample percentage must be between 1 and 100",
                    ));
                }
            }
        }

        Ok(())
    }
}
