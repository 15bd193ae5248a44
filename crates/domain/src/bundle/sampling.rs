//! Ballot number sampling for the bundle spot review.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Draws the spot-review sample when a bundle is closed.
///
/// The draw happens exactly once, before the closing event is raised, and
/// the resulting sample is recorded in the event. Replay reconstructs state
/// from the recorded sample and never re-draws, so the aggregate itself
/// stays deterministic.
pub trait BallotSampler: Send {
    /// Draws `sample_size` ballot numbers without replacement, ascending.
    ///
    /// `sample_size` is already clamped to the ballot count by the caller.
    fn draw(&mut self, ballot_numbers: &[u32], sample_size: usize) -> Vec<u32>;
}

/// Uniform random sampler used in production.
#[derive(Debug)]
pub struct RandomBallotSampler {
    rng: StdRng,
}

impl RandomBallotSampler {
    /// Creates a sampler seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a sampler with a fixed seed, for reproducible tests.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomBallotSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl BallotSampler for RandomBallotSampler {
    fn draw(&mut self, ballot_numbers: &[u32], sample_size: usize) -> Vec<u32> {
        let mut sample: Vec<u32> = ballot_numbers
            .choose_multiple(&mut self.rng, sample_size)
            .copied()
            .collect();
        sample.sort_unstable();
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_requested_size_without_replacement() {
        let mut sampler = RandomBallotSampler::from_seed(42);
        let numbers: Vec<u32> = (1..=25).collect();

        let sample = sampler.draw(&numbers, 3);

        assert_eq!(sample.len(), 3);
        let mut deduped = sample.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), 3);
        assert!(sample.iter().all(|n| numbers.contains(n)));
    }

    #[test]
    fn sample_is_sorted_ascending() {
        let mut sampler = RandomBallotSampler::from_seed(7);
        let numbers: Vec<u32> = (1..=100).collect();

        let sample = sampler.draw(&numbers, 10);

        assert!(sample.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn full_sample_returns_every_number() {
        let mut sampler = RandomBallotSampler::from_seed(1);
        let numbers = vec![4, 7, 9];

        let sample = sampler.draw(&numbers, 3);

        assert_eq!(sample, vec![4, 7, 9]);
    }

    #[test]
    fn same_seed_same_sample() {
        let numbers: Vec<u32> = (1..=50).collect();
        let first = RandomBallotSampler::from_seed(99).draw(&numbers, 5);
        let second = RandomBallotSampler::from_seed(99).draw(&numbers, 5);
        assert_eq!(first, second);
    }
}
