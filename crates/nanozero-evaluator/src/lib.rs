//! Evaluator and search interfaces for self-play training.
//!
//! This crate holds everything the training loop needs to know about the two learned /
//! searched collaborators, without tying it to a particular model:
//!
//! 1. **Position Evaluation** ([`position_evaluator`]) - The [`Evaluator`] trait: predict a
//!    policy/value pair for a position and retrain on a mini-batch.
//! 2. **Search** ([`search`]) - The [`Search`] trait: turn an evaluator into an improved
//!    policy target for one position.
//! 3. **Training Data** ([`policy`], [`example`]) - Validated policy targets, training
//!    examples and stacked mini-batches.
//!
//! # Architecture
//!
//! ```text
//! Search (policy target for one position)
//!     ↓ queries
//! Evaluator (policy/value prediction)
//!     ↑ retrained on
//! MiniBatch (stacked training examples)
//! ```
//!
//! # Reference Implementations
//!
//! - [`tabular::TabularEvaluator`] - one softmax row and value per visited position,
//!   trained with plain SGD on the combined loss from [`loss`]
//! - [`mcts::PuctSearch`] - PUCT Monte Carlo tree search with optional Dirichlet root noise
//!
//! Both are small enough to train toy games end to end; larger games plug in their own
//! implementations of the traits.

pub use self::{
    example::{MiniBatch, ShapeMismatchError, TrainingExample},
    policy::{InvalidPolicyError, PolicyTarget},
    position_evaluator::{Evaluator, Prediction},
    search::{Search, SearchParams},
};

pub mod example;
pub mod loss;
pub mod mcts;
pub mod policy;
pub mod position_evaluator;
pub mod search;
pub mod tabular;
