//! Self-play training loop with an arena promotion gate.
//!
//! This crate drives the iterative improvement of an [`Evaluator`]: a search guided by the
//! current evaluator plays games against itself, the recorded positions are labelled with
//! the final result and used to retrain the evaluator, and the retrained evaluator only
//! replaces its predecessor if it wins decisively in head-to-head games.
//!
//! # How Training Works
//!
//! 1. **Snapshot** - Clone the current evaluator as the incumbent
//! 2. **Self-Play** - Play episodes with search-derived, sampled moves ([`self_play`])
//! 3. **Labelling** - Attach the terminal outcome to every step, from the mover's side
//! 4. **Batching** - Shuffle and reshape examples into mini-batches ([`batcher`])
//! 5. **Retraining** - One optimizer step per mini-batch on the challenger
//! 6. **Arena** - Greedy games between challenger and incumbent ([`arena`])
//! 7. **Promotion** - Keep the challenger only if its win rate exceeds the threshold
//!
//! See [`orchestrator::TrainingOrchestrator`] for the epoch loop.
//!
//! # Architecture
//!
//! ```text
//! TrainingOrchestrator
//!     ↓ per epoch
//! SelfPlayGenerator ──→ Search / Evaluator / Game
//!     ↓ examples
//! ExampleBatcher
//!     ↓ mini-batches
//! Evaluator::train_step (challenger)
//!     ↓
//! Arena (challenger vs. incumbent)
//!     ↓ winner
//! next epoch
//! ```
//!
//! # Parallelization
//!
//! Self-play episodes and arena games are independent and run on scoped threads sharing
//! `&` references to the game, search and evaluator. Every self-play episode draws from its
//! own RNG seeded by the caller's RNG, so a seeded run gives the same result regardless of
//! the worker count.
//!
//! # Errors
//!
//! Every failure aborts the current epoch with a [`TrainingError`]; nothing is retried.
//! Arena draws are not failures.
//!
//! [`Evaluator`]: nanozero_evaluator::Evaluator

use nanozero_evaluator::{InvalidPolicyError, ShapeMismatchError};
use nanozero_game::{IllegalActionError, Player};

pub use self::config::{ConfigError, TrainingConfig};

pub mod arena;
pub mod batcher;
pub mod config;
pub mod orchestrator;
mod parallel;
pub mod play;
pub mod self_play;

#[cfg(test)]
mod test_games;

/// Failure of a training phase.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("invalid action: {_0}")]
    InvalidAction(IllegalActionError),
    #[display("policy shape mismatch: {_0}")]
    ShapeMismatch(ShapeMismatchError),
    #[display("invalid policy from search: {_0}")]
    InvalidPolicy(InvalidPolicyError),
    #[display("invalid configuration: {_0}")]
    Config(ConfigError),
    #[display("game did not terminate within {max_moves} moves")]
    #[from(skip)]
    NonTerminatingGame { max_moves: usize },
    #[display("no legal action for the {player} player in a non-terminal position")]
    #[from(skip)]
    NoLegalActions { player: Player },
}
