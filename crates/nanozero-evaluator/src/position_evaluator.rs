//! Position evaluation: the learned policy/value predictor.
//!
//! An [`Evaluator`] plays two roles in training:
//!
//! - **Prediction** - [`Evaluator::predict`] is called read-only, possibly from many
//!   self-play or arena workers at once (hence the `Send + Sync` bound).
//! - **Retraining** - [`Evaluator::train_step`] mutates the parameters, one optimizer step
//!   per mini-batch. It takes `&mut self`, so no prediction can run concurrently with it.
//!
//! Snapshots for arena comparison are plain [`Clone`]s; an implementation must make the
//! clone independent of later training on the original.

use std::fmt;

use nanozero_game::{Game, Player};

use crate::{MiniBatch, loss::StepLoss};

/// Output of an evaluator for one position.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Action probabilities over the full action space.
    pub policy: Vec<f32>,
    /// Expected outcome in `[-1, 1]` from the perspective of the player to move.
    pub value: f32,
}

/// Trainable policy/value predictor for positions of `G`.
pub trait Evaluator<G>: Clone + fmt::Debug + Send + Sync
where
    G: Game,
{
    /// Predicts the policy and value of `state` with `player` to move.
    fn predict(&self, state: &G::State, player: Player) -> Prediction;

    /// Performs one optimizer step on `batch` and reports its mean loss.
    fn train_step(&mut self, batch: &MiniBatch<G::State>) -> StepLoss;
}
