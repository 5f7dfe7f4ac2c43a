//! Reshaping examples into mini-batches.

use nanozero_evaluator::{MiniBatch, ShapeMismatchError, TrainingExample};
use rand::{Rng, seq::SliceRandom as _};

use crate::{ConfigError, TrainingError};

/// Splits examples into mini-batches of at most `batch_size` examples.
///
/// Examples are shuffled as whole units (on by default), so a state always stays with
/// its own policy target and outcome.
#[derive(Debug, Clone)]
pub struct ExampleBatcher {
    batch_size: usize,
    action_space_size: usize,
    shuffle: bool,
}

impl ExampleBatcher {
    pub fn new(batch_size: usize, action_space_size: usize) -> Result<Self, ConfigError> {
        if batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(Self {
            batch_size,
            action_space_size,
            shuffle: true,
        })
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Batches `examples`, consuming them.
    ///
    /// Every example appears in exactly one batch; only the last batch may be short.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::ShapeMismatch`] if any policy target does not cover the
    /// action space. No batch is produced in that case.
    pub fn batch<S, R>(
        &self,
        mut examples: Vec<TrainingExample<S>>,
        rng: &mut R,
    ) -> Result<Vec<MiniBatch<S>>, TrainingError>
    where
        R: Rng + ?Sized,
    {
        if let Some(example) = examples
            .iter()
            .find(|e| e.policy.len() != self.action_space_size)
        {
            return Err(ShapeMismatchError {
                expected: self.action_space_size,
                found: example.policy.len(),
            }
            .into());
        }
        if self.shuffle {
            examples.shuffle(rng);
        }

        let mut batches = Vec::with_capacity(examples.len().div_ceil(self.batch_size));
        let mut examples = examples.into_iter();
        while examples.len() > 0 {
            let size = self.batch_size.min(examples.len());
            let mut batch = MiniBatch::with_capacity(self.action_space_size, size);
            for example in examples.by_ref().take(size) {
                batch.push(example)?;
            }
            batches.push(batch);
        }
        Ok(batches)
    }
}

#[cfg(test)]
mod tests {
    use nanozero_evaluator::PolicyTarget;
    use nanozero_game::Player;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn examples(count: usize) -> Vec<TrainingExample<u32>> {
        (0..count)
            .map(|i| {
                let i = u32::try_from(i).unwrap();
                let mut probs = vec![0.0; 3];
                probs[(i % 3) as usize] = 1.0;
                TrainingExample {
                    state: i,
                    player: if i % 2 == 0 {
                        Player::First
                    } else {
                        Player::Second
                    },
                    policy: PolicyTarget::new(probs).unwrap(),
                    outcome: if i % 2 == 0 { 1.0 } else { -1.0 },
                }
            })
            .collect()
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        assert!(matches!(
            ExampleBatcher::new(0, 3),
            Err(ConfigError::ZeroBatchSize)
        ));
    }

    #[test]
    fn test_preserves_examples() {
        let batcher = ExampleBatcher::new(4, 3).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        let batches = batcher.batch(examples(10), &mut rng).unwrap();

        let sizes = batches.iter().map(MiniBatch::len).collect::<Vec<_>>();
        assert_eq!(sizes, [4, 4, 2]);

        let mut states = vec![];
        for batch in &batches {
            assert_eq!(batch.policies().len(), batch.len() * 3);
            assert_eq!(batch.outcomes().len(), batch.len());
            assert_eq!(batch.players().len(), batch.len());
            // fields stay attached to their state
            for (state, player, policy, outcome) in batch.rows() {
                let expected = (state % 3) as usize;
                assert_eq!(policy[expected], 1.0);
                assert_eq!(player == Player::First, state % 2 == 0);
                assert_eq!(outcome > 0.0, state % 2 == 0);
                states.push(*state);
            }
        }
        states.sort_unstable();
        assert_eq!(states, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_without_shuffle_keeps_order() {
        let batcher = ExampleBatcher::new(3, 3).unwrap().with_shuffle(false);
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let batches = batcher.batch(examples(5), &mut rng).unwrap();
        assert_eq!(batches[0].states(), &[0, 1, 2]);
        assert_eq!(batches[1].states(), &[3, 4]);
    }

    #[test]
    fn test_empty_input() {
        let batcher = ExampleBatcher::new(8, 3).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let batches = batcher.batch(examples(0), &mut rng).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn test_shape_mismatch() {
        let batcher = ExampleBatcher::new(8, 4).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let result = batcher.batch(examples(3), &mut rng);
        assert!(matches!(
            result,
            Err(TrainingError::ShapeMismatch(ShapeMismatchError {
                expected: 4,
                found: 3
            }))
        ));
    }
}
