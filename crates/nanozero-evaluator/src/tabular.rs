//! Tabular softmax evaluator.
//!
//! Stores one row of policy logits and one value per `(position, player)` pair seen in
//! training. Unseen positions predict a uniform policy and a value of zero. Training is a
//! plain SGD step on the combined loss from [`crate::loss`]:
//!
//! - policy: `∂CE/∂logitᵢ = pᵢ - πᵢ` (softmax cross-entropy)
//! - value: `∂(v - z)²/∂v = 2(v - z)`, with `v` clamped to `[-1, 1]`
//!
//! Gradients of all rows in a batch are computed against the pre-step parameters and
//! applied together, so a batch is exactly one optimizer step.
//!
//! This evaluator only scales to games with small state spaces (tic-tac-toe, Nim), which
//! is all it is meant for.

use std::{collections::HashMap, fmt, hash::Hash};

use nanozero_game::{Game, Player};

use crate::{
    Evaluator, MiniBatch, Prediction,
    loss::{self, StepLoss},
};

#[derive(Debug, Clone)]
struct Row {
    logits: Vec<f32>,
    value: f32,
}

impl Row {
    fn new(action_space_size: usize) -> Self {
        Self {
            logits: vec![0.0; action_space_size],
            value: 0.0,
        }
    }
}

/// Lookup-table evaluator for small games.
#[derive(Debug, Clone)]
pub struct TabularEvaluator<S> {
    action_space_size: usize,
    learning_rate: f32,
    rows: HashMap<(S, Player), Row>,
}

impl<S> TabularEvaluator<S>
where
    S: Clone + Eq + Hash,
{
    /// Creates an empty table.
    ///
    /// # Panics
    ///
    /// Panics if `learning_rate` is not a positive finite number.
    #[must_use]
    pub fn new(action_space_size: usize, learning_rate: f32) -> Self {
        assert!(
            learning_rate.is_finite() && learning_rate > 0.0,
            "learning rate must be positive, got {learning_rate}"
        );
        Self {
            action_space_size,
            learning_rate,
            rows: HashMap::new(),
        }
    }

    /// Number of positions with trained parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[expect(clippy::cast_precision_loss)]
    fn lookup(&self, state: &S, player: Player) -> Prediction {
        match self.rows.get(&(state.clone(), player)) {
            Some(row) => Prediction {
                policy: loss::softmax(&row.logits),
                value: row.value,
            },
            None => Prediction {
                policy: vec![1.0 / self.action_space_size as f32; self.action_space_size],
                value: 0.0,
            },
        }
    }
}

impl<G, S> Evaluator<G> for TabularEvaluator<S>
where
    G: Game<State = S>,
    S: Clone + Eq + Hash + fmt::Debug + Send + Sync,
{
    fn predict(&self, state: &S, player: Player) -> Prediction {
        self.lookup(state, player)
    }

    #[expect(clippy::cast_precision_loss)]
    fn train_step(&mut self, batch: &MiniBatch<S>) -> StepLoss {
        if batch.is_empty() {
            return StepLoss::default();
        }
        assert_eq!(batch.policy_len(), self.action_space_size);

        let mut policy_loss = 0.0;
        let mut value_loss = 0.0;
        let mut gradients: HashMap<(S, Player), (Vec<f32>, f32)> = HashMap::new();
        for (state, player, target, outcome) in batch.rows() {
            let Prediction { policy, value } = self.lookup(state, player);
            policy_loss += loss::cross_entropy(target, &policy);
            value_loss += loss::squared_error(value, outcome);

            let (logit_grad, value_grad) = gradients
                .entry((state.clone(), player))
                .or_insert_with(|| (vec![0.0; self.action_space_size], 0.0));
            for (g, (p, t)) in logit_grad.iter_mut().zip(policy.iter().zip(target)) {
                *g += p - t;
            }
            *value_grad += 2.0 * (value - outcome);
        }

        let lr = self.learning_rate;
        let size = self.action_space_size;
        for (key, (logit_grad, value_grad)) in gradients {
            let row = self.rows.entry(key).or_insert_with(|| Row::new(size));
            for (logit, g) in row.logits.iter_mut().zip(logit_grad) {
                *logit -= lr * g;
            }
            row.value = (row.value - lr * value_grad).clamp(-1.0, 1.0);
        }

        let n = batch.len() as f32;
        StepLoss {
            policy: policy_loss / n,
            value: value_loss / n,
        }
    }
}

#[cfg(test)]
mod tests {
    use nanozero_game::nim::{Nim, NimState};

    use super::*;
    use crate::{PolicyTarget, TrainingExample};

    fn batch(examples: Vec<TrainingExample<NimState>>) -> MiniBatch<NimState> {
        let mut batch = MiniBatch::with_capacity(3, examples.len());
        for example in examples {
            batch.push(example).unwrap();
        }
        batch
    }

    fn example(stones: u32, target: Vec<f32>, outcome: f32) -> TrainingExample<NimState> {
        TrainingExample {
            state: NimState {
                stones,
                last_mover: None,
            },
            player: Player::First,
            policy: PolicyTarget::new(target).unwrap(),
            outcome,
        }
    }

    #[test]
    fn test_unseen_position_is_uniform() {
        let evaluator = TabularEvaluator::new(3, 0.5);
        let prediction = Evaluator::<Nim>::predict(
            &evaluator,
            &Nim::default().initial_state(),
            Player::First,
        );
        assert_eq!(prediction.value, 0.0);
        for p in prediction.policy {
            assert!((p - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_training_reduces_loss() {
        let mut evaluator = TabularEvaluator::new(3, 0.5);
        let batch = batch(vec![
            example(5, vec![1.0, 0.0, 0.0], 1.0),
            example(4, vec![0.0, 0.0, 1.0], -1.0),
        ]);

        let first = Evaluator::<Nim>::train_step(&mut evaluator, &batch);
        let mut last = first;
        for _ in 0..50 {
            last = Evaluator::<Nim>::train_step(&mut evaluator, &batch);
        }
        assert!(last.total() < first.total());
        assert_eq!(evaluator.len(), 2);

        let state = batch.states()[0];
        let prediction = Evaluator::<Nim>::predict(&evaluator, &state, Player::First);
        assert!(prediction.policy[0] > 0.9);
        assert!(prediction.value > 0.9);
    }

    #[test]
    fn test_players_have_separate_rows() {
        let mut evaluator = TabularEvaluator::new(3, 0.5);
        let batch = batch(vec![example(5, vec![1.0, 0.0, 0.0], 1.0)]);
        Evaluator::<Nim>::train_step(&mut evaluator, &batch);

        let state = batch.states()[0];
        let second = Evaluator::<Nim>::predict(&evaluator, &state, Player::Second);
        assert_eq!(second.value, 0.0);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut evaluator = TabularEvaluator::new(3, 0.5);
        let snapshot = evaluator.clone();
        let batch = batch(vec![example(5, vec![0.0, 1.0, 0.0], -1.0)]);
        Evaluator::<Nim>::train_step(&mut evaluator, &batch);

        let state = batch.states()[0];
        assert!(snapshot.is_empty());
        let before = Evaluator::<Nim>::predict(&snapshot, &state, Player::First);
        let after = Evaluator::<Nim>::predict(&evaluator, &state, Player::First);
        assert_eq!(before.value, 0.0);
        assert!(after.value < 0.0);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut evaluator = TabularEvaluator::<NimState>::new(3, 0.5);
        let loss = Evaluator::<Nim>::train_step(&mut evaluator, &MiniBatch::with_capacity(3, 0));
        assert_eq!(loss, StepLoss::default());
        assert!(evaluator.is_empty());
    }
}
