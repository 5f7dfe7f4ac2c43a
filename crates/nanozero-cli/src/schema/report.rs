use chrono::{DateTime, Utc};
use nanozero_training::{TrainingConfig, orchestrator::EpochReport};
use serde::{Deserialize, Serialize};

use crate::command::GameKind;

/// Outcome of a `train` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub game: GameKind,
    /// Timestamp when training finished (ISO 8601 format)
    pub trained_at: DateTime<Utc>,
    /// Seed of the run; passing it back via `--seed` reproduces the run
    pub seed: u64,
    pub learning_rate: f32,
    pub config: TrainingConfig,
    /// Positions with trained parameters in the final evaluator
    pub trained_positions: usize,
    pub promotions: usize,
    pub epochs: Vec<EpochReport>,
}
