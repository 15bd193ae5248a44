//! Count-of-voters value object shared by all business types.

use serde::{Deserialize, Serialize};

use super::ResultError;

/// The conventional ballot counts reported by a counting circle.
///
/// All counts are unsigned, so the non-negativity invariant holds by
/// construction; the validator only checks internal consistency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountOfVoters {
    /// Ballots received by the counting circle.
    pub received_ballots: u32,

    /// Ballots declared invalid.
    pub invalid_ballots: u32,

    /// Ballots returned blank.
    pub blank_ballots: u32,

    /// Ballots counting toward the result.
    pub accounted_ballots: u32,
}

impl CountOfVoters {
    /// Validates that the counts add up.
    pub fn validate(&self) -> Result<(), ResultError> {
        let explained = self
            .accounted_ballots
            .checked_add(self.invalid_ballots)
            .and_then(|sum| sum.checked_add(self.blank_ballots));

        match explained {
            Some(total) if total == self.received_ballots => Ok(()),
            Some(_) => Err(ResultError::InvalidCountOfVoters(
                "accounted, invalid and blank ballots must add up to the received ballots",
            )),
            None => Err(ResultError::InvalidCountOfVoters("ballot counts overflow")),
        }
    }
}
