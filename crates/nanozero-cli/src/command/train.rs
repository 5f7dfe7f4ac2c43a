use std::{hash::Hash, path::PathBuf};

use anyhow::Context as _;
use chrono::Utc;
use nanozero_evaluator::{
    mcts::{PuctSearch, RootNoise},
    tabular::TabularEvaluator,
};
use nanozero_game::Game;
use nanozero_training::{TrainingConfig, orchestrator::TrainingOrchestrator};
use rand_pcg::Pcg64Mcg;
use serde::Serialize;

use crate::{
    command::{GameArg, GameKind, GameRunner},
    schema::report::TrainingReport,
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    game: GameArg,
    /// Training configuration file (JSON); flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of epochs
    #[arg(long)]
    epochs: Option<usize>,
    /// Self-play episodes per epoch
    #[arg(long)]
    episodes: Option<usize>,
    /// Search simulations per move
    #[arg(long)]
    simulations: Option<usize>,
    /// Arena games per epoch
    #[arg(long)]
    arena_games: Option<usize>,
    /// Win rate the challenger must exceed to be promoted
    #[arg(long)]
    threshold: Option<f32>,
    /// Worker threads (0 = available parallelism)
    #[arg(long)]
    workers: Option<usize>,
    /// Learning rate of the tabular evaluator
    #[arg(long, default_value_t = 0.5)]
    learning_rate: f32,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl TrainArg {
    fn training_config(&self) -> anyhow::Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file("training config", path)?,
            None => TrainingConfig::default(),
        };
        let overrides = [
            (&mut config.num_epochs, self.epochs),
            (&mut config.episodes_per_epoch, self.episodes),
            (&mut config.num_simulations, self.simulations),
            (&mut config.arena_games, self.arena_games),
            (&mut config.workers, self.workers),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(threshold) = self.threshold {
            config.promotion_threshold = threshold;
        }
        config
            .validate()
            .context("Invalid training configuration")?;
        Ok(config)
    }
}

struct Trainer {
    kind: GameKind,
    config: TrainingConfig,
    learning_rate: f32,
    seed: u64,
    rng: Pcg64Mcg,
}

impl GameRunner for Trainer {
    type Output = TrainingReport;

    fn run<G>(mut self, game: &G) -> anyhow::Result<TrainingReport>
    where
        G: Game,
        G::State: Hash + Eq + Serialize,
    {
        let search = PuctSearch::new().with_root_noise(RootNoise::default());
        let orchestrator = TrainingOrchestrator::new(game, &search, self.config.clone())?;
        let evaluator = TabularEvaluator::new(game.action_space_size(), self.learning_rate);

        let run = orchestrator.run(evaluator, &mut self.rng)?;
        Ok(TrainingReport {
            game: self.kind,
            trained_at: Utc::now(),
            seed: self.seed,
            learning_rate: self.learning_rate,
            config: self.config,
            trained_positions: run.evaluator.len(),
            promotions: run.promotions(),
            epochs: run.epochs,
        })
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    anyhow::ensure!(
        arg.learning_rate.is_finite() && arg.learning_rate > 0.0,
        "Learning rate must be positive, got {}",
        arg.learning_rate
    );
    let config = arg.training_config()?;
    let (seed, rng) = super::resolve_seed(arg.seed);

    log::info!(
        "Training on {} for {} epochs (seed {seed})",
        arg.game.kind(),
        config.num_epochs
    );
    let report = arg.game.dispatch(Trainer {
        kind: arg.game.kind(),
        config,
        learning_rate: arg.learning_rate,
        seed,
        rng,
    })?;
    util::save_json(&report, arg.output.as_deref())?;

    eprintln!();
    eprintln!("Training report saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Game: {}", report.game);
    eprintln!("  Trained at: {}", report.trained_at);
    eprintln!(
        "  Promotions: {}/{}",
        report.promotions,
        report.epochs.len()
    );
    eprintln!("  Trained positions: {}", report.trained_positions);

    Ok(())
}
