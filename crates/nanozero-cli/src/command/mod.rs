use std::hash::Hash;

use clap::{Parser, Subcommand};
use flexi_logger::Logger;
use nanozero_game::{Game, nim::Nim, tic_tac_toe::TicTacToe};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use self::{self_play::SelfPlayArg, train::TrainArg};

mod self_play;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train an evaluator through self-play and arena promotion
    Train(#[clap(flatten)] TrainArg),
    /// Generate self-play training examples with an untrained evaluator
    SelfPlay(#[clap(flatten)] SelfPlayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let _logger = Logger::try_with_env_or_str("info")?
        .format(flexi_logger::colored_default_format)
        .start()?;
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::SelfPlay(arg) => self_play::run(&arg)?,
    }
    Ok(())
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    #[display("tic-tac-toe")]
    TicTacToe,
    #[display("nim")]
    Nim,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GameArg {
    /// Game to train on
    #[arg(long, value_enum, default_value_t = GameKind::TicTacToe)]
    game: GameKind,
    /// Initial pile size (nim only)
    #[arg(long, default_value_t = 10)]
    stones: u32,
    /// Most stones taken per move (nim only)
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    max_take: u32,
}

/// Work that runs on whichever game was selected.
pub(crate) trait GameRunner {
    type Output;

    fn run<G>(self, game: &G) -> anyhow::Result<Self::Output>
    where
        G: Game,
        G::State: Hash + Eq + Serialize;
}

impl GameArg {
    pub(crate) fn kind(&self) -> GameKind {
        self.game
    }

    pub(crate) fn dispatch<T>(&self, runner: T) -> anyhow::Result<T::Output>
    where
        T: GameRunner,
    {
        match self.game {
            GameKind::TicTacToe => runner.run(&TicTacToe),
            GameKind::Nim => runner.run(&Nim::new(self.stones, self.max_take)),
        }
    }
}

/// Returns the given seed, or a fresh one when none was given.
pub(crate) fn resolve_seed(seed: Option<u64>) -> (u64, Pcg64Mcg) {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    (seed, Pcg64Mcg::seed_from_u64(seed))
}
