use std::{hash::Hash, path::PathBuf};

use chrono::Utc;
use nanozero_evaluator::{
    mcts::{PuctSearch, RootNoise},
    tabular::TabularEvaluator,
};
use nanozero_game::Game;
use nanozero_training::{TrainingConfig, self_play::SelfPlayGenerator};
use rand_pcg::Pcg64Mcg;
use serde::Serialize;

use crate::{
    command::{GameArg, GameRunner},
    schema::examples::ExampleSet,
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SelfPlayArg {
    #[clap(flatten)]
    game: GameArg,
    /// Number of episodes to play
    #[arg(long, default_value_t = 10)]
    episodes: usize,
    /// Search simulations per move
    #[arg(long, default_value_t = 25)]
    simulations: usize,
    /// Worker threads (0 = available parallelism)
    #[arg(long, default_value_t = 0)]
    workers: usize,
    /// Seed for reproducible episodes
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

struct Generator<'a> {
    arg: &'a SelfPlayArg,
    seed: u64,
    rng: Pcg64Mcg,
}

impl GameRunner for Generator<'_> {
    type Output = usize;

    fn run<G>(mut self, game: &G) -> anyhow::Result<usize>
    where
        G: Game,
        G::State: Hash + Eq + Serialize,
    {
        let config = TrainingConfig {
            num_simulations: self.arg.simulations,
            workers: self.arg.workers,
            ..TrainingConfig::default()
        };
        let search = PuctSearch::new().with_root_noise(RootNoise::default());
        let generator = SelfPlayGenerator::new(game, &search, &config);
        let evaluator = TabularEvaluator::new(game.action_space_size(), 1.0);

        let examples = generator.generate(&evaluator, self.arg.episodes, &mut self.rng)?;
        let count = examples.len();
        let set = ExampleSet {
            game: self.arg.game.kind(),
            generated_at: Utc::now(),
            seed: self.seed,
            episodes: self.arg.episodes,
            examples,
        };
        util::save_json(&set, self.arg.output.as_deref())?;
        Ok(count)
    }
}

pub(crate) fn run(arg: &SelfPlayArg) -> anyhow::Result<()> {
    let (seed, rng) = super::resolve_seed(arg.seed);
    log::info!(
        "Playing {} {} episodes (seed {seed})",
        arg.episodes,
        arg.game.kind()
    );
    let count = arg.game.dispatch(Generator { arg, seed, rng })?;

    eprintln!();
    eprintln!("Generated {count} examples from {} episodes", arg.episodes);
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    Ok(())
}
