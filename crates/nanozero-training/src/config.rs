//! Training run configuration.
//!
//! Every field has a default, so a configuration file only needs the fields it changes:
//!
//! ```
//! use nanozero_training::TrainingConfig;
//!
//! let config: TrainingConfig = serde_json::from_str(r#"{ "num_epochs": 3 }"#).unwrap();
//! assert_eq!(config.num_epochs, 3);
//! assert_eq!(config.arena_games, 10);
//! assert!(config.validate().is_ok());
//! ```

use std::{num::NonZeroUsize, thread};

use nanozero_evaluator::SearchParams;
use serde::{Deserialize, Serialize};

use crate::arena::Seating;

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("train_batch_size must be positive")]
    ZeroBatchSize,
    #[display("max_moves must be positive")]
    ZeroMaxMoves,
    #[display("promotion_threshold must be within [0, 1], got {threshold}")]
    ThresholdOutOfRange { threshold: f32 },
    #[display("exploration_constant must be finite and non-negative, got {value}")]
    InvalidExplorationConstant { value: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// Number of self-play / retrain / arena iterations.
    pub num_epochs: usize,
    /// Self-play episodes generated per epoch.
    pub episodes_per_epoch: usize,
    /// Search simulations per self-play move.
    pub num_simulations: usize,
    /// Exploration weight passed to the search.
    pub exploration_constant: f32,
    /// Examples per mini-batch (the last batch of an epoch may be smaller).
    pub train_batch_size: usize,
    /// Games played between challenger and incumbent per epoch.
    pub arena_games: usize,
    /// Win rate the challenger must strictly exceed to be promoted.
    pub promotion_threshold: f32,
    /// Move bound after which a game is reported as non-terminating.
    pub max_moves: usize,
    /// Shuffle examples before batching.
    pub shuffle: bool,
    /// Worker threads for self-play and arena games; `0` uses the available parallelism.
    pub workers: usize,
    /// How the challenger is seated across arena games.
    pub seating: Seating,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_epochs: 10,
            episodes_per_epoch: 100,
            num_simulations: 25,
            exploration_constant: 1.0,
            train_batch_size: 64,
            arena_games: 10,
            promotion_threshold: 0.6,
            max_moves: 1000,
            shuffle: true,
            workers: 0,
            seating: Seating::Alternate,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.train_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.max_moves == 0 {
            return Err(ConfigError::ZeroMaxMoves);
        }
        if !(0.0..=1.0).contains(&self.promotion_threshold) {
            return Err(ConfigError::ThresholdOutOfRange {
                threshold: self.promotion_threshold,
            });
        }
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(ConfigError::InvalidExplorationConstant {
                value: self.exploration_constant,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            num_simulations: self.num_simulations,
            exploration_constant: self.exploration_constant,
        }
    }

    /// Resolves `workers`, mapping `0` to the available parallelism.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        thread::available_parallelism().map_or(1, NonZeroUsize::get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TrainingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.promotion_threshold, 0.6);
        assert_eq!(config.arena_games, 10);
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_rejects_invalid_fields() {
        let cases = [
            (
                TrainingConfig {
                    train_batch_size: 0,
                    ..TrainingConfig::default()
                },
                ConfigError::ZeroBatchSize,
            ),
            (
                TrainingConfig {
                    max_moves: 0,
                    ..TrainingConfig::default()
                },
                ConfigError::ZeroMaxMoves,
            ),
            (
                TrainingConfig {
                    promotion_threshold: 1.5,
                    ..TrainingConfig::default()
                },
                ConfigError::ThresholdOutOfRange { threshold: 1.5 },
            ),
            (
                TrainingConfig {
                    exploration_constant: -1.0,
                    ..TrainingConfig::default()
                },
                ConfigError::InvalidExplorationConstant { value: -1.0 },
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }

    #[test]
    fn test_explicit_worker_count() {
        let config = TrainingConfig {
            workers: 3,
            ..TrainingConfig::default()
        };
        assert_eq!(config.worker_count(), 3);
    }

    #[test]
    fn test_json_round_trip() {
        let config = TrainingConfig {
            num_epochs: 2,
            seating: Seating::ChallengerFirst,
            ..TrainingConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""seating":"challenger-first""#));
        let parsed: TrainingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_unknown_field() {
        let result = serde_json::from_str::<TrainingConfig>(r#"{ "epochs": 3 }"#);
        assert!(result.is_err());
    }
}
