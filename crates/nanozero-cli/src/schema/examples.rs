use chrono::{DateTime, Utc};
use nanozero_evaluator::TrainingExample;
use serde::{Deserialize, Serialize};

use crate::command::GameKind;

/// Examples written by the `self-play` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleSet<S> {
    pub game: GameKind,
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub episodes: usize,
    pub examples: Vec<TrainingExample<S>>,
}
