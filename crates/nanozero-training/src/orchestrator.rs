//! The epoch loop tying self-play, retraining and the arena together.
//!
//! Each epoch runs strictly in order:
//!
//! 1. clone the current evaluator as the incumbent
//! 2. generate self-play examples with the current (not yet retrained) evaluator
//! 3. retrain the current evaluator in place, one optimizer step per mini-batch
//! 4. play the retrained challenger against the incumbent
//! 5. carry the arena's winner into the next epoch
//!
//! Retraining borrows the challenger mutably, so no self-play or arena game can observe
//! a half-updated evaluator.

use nanozero_evaluator::{Evaluator, Search, loss::StepLoss};
use nanozero_game::Game;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, TrainingConfig, TrainingError,
    arena::{Arena, ArenaRecord},
    batcher::ExampleBatcher,
    self_play::SelfPlayGenerator,
};

/// Summary of one finished epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    pub epoch: usize,
    pub examples: usize,
    pub batches: usize,
    /// Mean loss over the epoch's optimizer steps.
    pub loss: StepLoss,
    pub arena: ArenaRecord,
    pub promoted: bool,
}

/// Final evaluator of a training run and its per-epoch history.
#[derive(Debug, Clone)]
pub struct TrainingRun<E> {
    pub evaluator: E,
    pub epochs: Vec<EpochReport>,
}

impl<E> TrainingRun<E> {
    /// Number of epochs in which the challenger was promoted.
    #[must_use]
    pub fn promotions(&self) -> usize {
        self.epochs.iter().filter(|e| e.promoted).count()
    }
}

#[derive(Debug)]
pub struct TrainingOrchestrator<'a, G, X> {
    config: TrainingConfig,
    generator: SelfPlayGenerator<'a, G, X>,
    batcher: ExampleBatcher,
    arena: Arena<'a, G>,
}

impl<'a, G, X> TrainingOrchestrator<'a, G, X>
where
    G: Game,
    X: Search<G>,
{
    /// Creates an orchestrator after validating `config`.
    pub fn new(game: &'a G, search: &'a X, config: TrainingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let batcher = ExampleBatcher::new(config.train_batch_size, game.action_space_size())?
            .with_shuffle(config.shuffle);
        Ok(Self {
            generator: SelfPlayGenerator::new(game, search, &config),
            arena: Arena::new(game, &config),
            batcher,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Runs all configured epochs starting from `evaluator`.
    ///
    /// With zero epochs the initial evaluator is returned untouched.
    pub fn run<E, R>(&self, evaluator: E, rng: &mut R) -> Result<TrainingRun<E>, TrainingError>
    where
        E: Evaluator<G>,
        R: Rng + ?Sized,
    {
        self.run_with(evaluator, rng, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_epoch` after every finished epoch.
    pub fn run_with<E, R, F>(
        &self,
        mut evaluator: E,
        rng: &mut R,
        mut on_epoch: F,
    ) -> Result<TrainingRun<E>, TrainingError>
    where
        E: Evaluator<G>,
        R: Rng + ?Sized,
        F: FnMut(&EpochReport),
    {
        let TrainingConfig {
            num_epochs,
            episodes_per_epoch,
            arena_games,
            promotion_threshold,
            ..
        } = self.config;

        let mut epochs = Vec::with_capacity(num_epochs);
        for epoch in 0..num_epochs {
            let incumbent = evaluator.clone();

            let examples = self
                .generator
                .generate(&evaluator, episodes_per_epoch, rng)?;
            let num_examples = examples.len();

            let batches = self.batcher.batch(examples, rng)?;
            let mut losses = Vec::with_capacity(batches.len());
            for (i, batch) in batches.iter().enumerate() {
                let loss = evaluator.train_step(batch);
                log::debug!(
                    "epoch #{epoch} batch #{i}: {} examples, loss {:.4}",
                    batch.len(),
                    loss.total()
                );
                losses.push(loss);
            }
            let loss = StepLoss::mean(losses);

            let decision = self
                .arena
                .evaluate(evaluator, incumbent, arena_games, promotion_threshold)?;
            let report = EpochReport {
                epoch,
                examples: num_examples,
                batches: batches.len(),
                loss,
                arena: decision.record,
                promoted: decision.promoted(),
            };
            evaluator = decision.into_evaluator();

            log::info!(
                "epoch {}/{num_epochs}: {} examples, {} batches, loss {:.4} (policy {:.4}, value {:.4})",
                epoch + 1,
                report.examples,
                report.batches,
                report.loss.total(),
                report.loss.policy,
                report.loss.value,
            );
            log::info!(
                "  arena: {}W {}L {}D, win rate {:.3} => {}",
                report.arena.challenger_wins,
                report.arena.incumbent_wins,
                report.arena.draws,
                report.arena.win_rate(),
                if report.promoted {
                    "challenger promoted"
                } else {
                    "incumbent retained"
                },
            );

            on_epoch(&report);
            epochs.push(report);
        }

        Ok(TrainingRun { evaluator, epochs })
    }
}

#[cfg(test)]
mod tests {
    use nanozero_evaluator::{
        MiniBatch, PolicyTarget, TrainingExample, mcts::PuctSearch, tabular::TabularEvaluator,
    };
    use nanozero_game::{
        Player,
        nim::{Nim, NimState},
    };
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn config() -> TrainingConfig {
        TrainingConfig {
            num_epochs: 2,
            episodes_per_epoch: 6,
            num_simulations: 12,
            train_batch_size: 8,
            arena_games: 4,
            workers: 2,
            ..TrainingConfig::default()
        }
    }

    /// Predictions for every reachable position.
    fn predictions(evaluator: &TabularEvaluator<NimState>, game: &Nim) -> Vec<(Vec<f32>, f32)> {
        let mut out = vec![];
        for stones in 0..=game.initial_stones() {
            for last_mover in [None, Some(Player::First), Some(Player::Second)] {
                for player in Player::ALL {
                    let state = NimState { stones, last_mover };
                    let p = Evaluator::<Nim>::predict(evaluator, &state, player);
                    out.push((p.policy, p.value));
                }
            }
        }
        out
    }

    #[test]
    fn test_zero_epochs_is_identity() {
        let game = Nim::new(5, 3);
        let search = PuctSearch::new();
        let mut evaluator = TabularEvaluator::new(3, 0.5);
        let mut batch = MiniBatch::with_capacity(3, 1);
        batch
            .push(TrainingExample {
                state: game.initial_state(),
                player: Player::First,
                policy: PolicyTarget::new(vec![0.0, 1.0, 0.0]).unwrap(),
                outcome: 1.0,
            })
            .unwrap();
        Evaluator::<Nim>::train_step(&mut evaluator, &batch);
        let before = predictions(&evaluator, &game);

        let config = TrainingConfig {
            num_epochs: 0,
            ..config()
        };
        let orchestrator = TrainingOrchestrator::new(&game, &search, config).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let run = orchestrator.run(evaluator, &mut rng).unwrap();
        assert!(run.epochs.is_empty());
        assert_eq!(run.evaluator.len(), 1);
        assert_eq!(predictions(&run.evaluator, &game), before);
    }

    #[test]
    fn test_reports_every_epoch() {
        let game = Nim::new(5, 3);
        let search = PuctSearch::new();
        let orchestrator = TrainingOrchestrator::new(&game, &search, config()).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(1);

        let mut seen = vec![];
        let run = orchestrator
            .run_with(TabularEvaluator::new(3, 0.5), &mut rng, |report| {
                seen.push(report.clone());
            })
            .unwrap();
        assert_eq!(run.epochs.len(), 2);
        assert_eq!(seen, run.epochs);
        for (i, report) in run.epochs.iter().enumerate() {
            assert_eq!(report.epoch, i);
            assert!(report.examples >= 6 * 2);
            assert_eq!(report.batches, report.examples.div_ceil(8));
            assert_eq!(report.arena.games(), 4);
            assert!(report.loss.total().is_finite());
        }
        assert!(run.promotions() <= 2);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let game = Nim::new(6, 3);
        let search = PuctSearch::new();
        let orchestrator = TrainingOrchestrator::new(&game, &search, config()).unwrap();

        let mut runs = vec![];
        for _ in 0..2 {
            let mut rng = Pcg64Mcg::seed_from_u64(9);
            runs.push(
                orchestrator
                    .run(TabularEvaluator::new(3, 0.5), &mut rng)
                    .unwrap(),
            );
        }
        assert_eq!(runs[0].epochs, runs[1].epochs);
        assert_eq!(
            predictions(&runs[0].evaluator, &game),
            predictions(&runs[1].evaluator, &game)
        );
    }

    #[test]
    fn test_unreachable_threshold_keeps_incumbent() {
        let game = Nim::new(5, 3);
        let search = PuctSearch::new();
        let config = TrainingConfig {
            promotion_threshold: 1.0,
            ..config()
        };
        let orchestrator = TrainingOrchestrator::new(&game, &search, config).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(2);

        let run = orchestrator
            .run(TabularEvaluator::new(3, 0.5), &mut rng)
            .unwrap();
        assert_eq!(run.promotions(), 0);
        assert!(run.epochs.iter().all(|e| e.batches > 0));
        // every epoch retrained a clone that was then discarded
        assert!(run.evaluator.is_empty());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let game = Nim::new(5, 3);
        let search = PuctSearch::new();
        let config = TrainingConfig {
            train_batch_size: 0,
            ..config()
        };
        assert!(matches!(
            TrainingOrchestrator::new(&game, &search, config),
            Err(ConfigError::ZeroBatchSize)
        ));
    }
}
