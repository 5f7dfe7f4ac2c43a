//! Training examples and the stacked mini-batches evaluators are retrained on.

use nanozero_game::Player;
use serde::{Deserialize, Serialize};

use crate::PolicyTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("policy target has {found} entries, expected {expected}")]
pub struct ShapeMismatchError {
    pub expected: usize,
    pub found: usize,
}

/// One `(s, π, z)` triple recorded during self-play.
///
/// `outcome` is the game's terminal result as seen by `player`, the player to move in
/// `state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample<S> {
    pub state: S,
    pub player: Player,
    pub policy: PolicyTarget,
    pub outcome: f32,
}

/// Examples stacked field by field.
///
/// Row `i` of every field belongs to the same example. Policies are stored row-major as
/// a `len × policy_len` matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct MiniBatch<S> {
    policy_len: usize,
    states: Vec<S>,
    players: Vec<Player>,
    policies: Vec<f32>,
    outcomes: Vec<f32>,
}

impl<S> MiniBatch<S> {
    /// Creates an empty batch whose policies have `policy_len` entries.
    #[must_use]
    pub fn with_capacity(policy_len: usize, capacity: usize) -> Self {
        Self {
            policy_len,
            states: Vec::with_capacity(capacity),
            players: Vec::with_capacity(capacity),
            policies: Vec::with_capacity(capacity * policy_len),
            outcomes: Vec::with_capacity(capacity),
        }
    }

    /// Appends an example, keeping its fields on the same row.
    pub fn push(&mut self, example: TrainingExample<S>) -> Result<(), ShapeMismatchError> {
        let TrainingExample {
            state,
            player,
            policy,
            outcome,
        } = example;
        if policy.len() != self.policy_len {
            return Err(ShapeMismatchError {
                expected: self.policy_len,
                found: policy.len(),
            });
        }
        self.states.push(state);
        self.players.push(player);
        self.policies.extend_from_slice(policy.probs());
        self.outcomes.push(outcome);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[must_use]
    pub fn policy_len(&self) -> usize {
        self.policy_len
    }

    #[must_use]
    pub fn states(&self) -> &[S] {
        &self.states
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// The stacked policy matrix.
    #[must_use]
    pub fn policies(&self) -> &[f32] {
        &self.policies
    }

    /// Policy target of row `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn policy(&self, index: usize) -> &[f32] {
        let start = index * self.policy_len;
        &self.policies[start..start + self.policy_len]
    }

    #[must_use]
    pub fn outcomes(&self) -> &[f32] {
        &self.outcomes
    }

    /// Iterates rows as `(state, player, policy, outcome)`.
    pub fn rows(&self) -> impl Iterator<Item = (&S, Player, &[f32], f32)> + '_ {
        (0..self.len()).map(|i| {
            (
                &self.states[i],
                self.players[i],
                self.policy(i),
                self.outcomes[i],
            )
        })
    }
}
