//! Head-to-head promotion gate between two evaluators.
//!
//! The arena plays a fixed number of games between a freshly retrained **challenger** and
//! the **incumbent** it was cloned from. Both sides play greedily on their own raw
//! predictions (no search, no sampling), so with deterministic evaluators an arena is
//! fully reproducible.
//!
//! The challenger is promoted only if it wins strictly more than `threshold` of all games.
//! Draws count towards the number of games but not towards either side's wins.
//!
//! # Seating
//!
//! With [`Seating::Alternate`] the challenger moves first in even-numbered games and
//! second in odd-numbered ones, cancelling out first-move advantage over an even number of
//! games. [`Seating::ChallengerFirst`] always seats the challenger as the first player.

use nanozero_evaluator::{Evaluator, ShapeMismatchError};
use nanozero_game::{Game, Outcome, Player};
use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::{
    TrainingConfig, TrainingError, parallel,
    play::{self, Greedy},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Seating {
    #[default]
    Alternate,
    ChallengerFirst,
}

impl Seating {
    /// The challenger's seat in game number `game_index`.
    #[must_use]
    pub fn challenger_seat(self, game_index: usize) -> Player {
        match self {
            Self::Alternate if game_index % 2 == 1 => Player::Second,
            Self::Alternate | Self::ChallengerFirst => Player::First,
        }
    }
}

/// Result of one arena game from the challenger's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ArenaGameResult {
    ChallengerWin,
    IncumbentWin,
    Draw,
}

impl ArenaGameResult {
    /// Interprets a terminal outcome for a challenger seated as `challenger_seat`.
    #[must_use]
    pub fn from_outcome(outcome: Outcome, challenger_seat: Player) -> Self {
        let value = outcome.for_player(challenger_seat);
        if value > 0.0 {
            Self::ChallengerWin
        } else if value < 0.0 {
            Self::IncumbentWin
        } else {
            Self::Draw
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaRecord {
    pub challenger_wins: usize,
    pub incumbent_wins: usize,
    pub draws: usize,
}

impl ArenaRecord {
    pub fn record(&mut self, result: ArenaGameResult) {
        match result {
            ArenaGameResult::ChallengerWin => self.challenger_wins += 1,
            ArenaGameResult::IncumbentWin => self.incumbent_wins += 1,
            ArenaGameResult::Draw => self.draws += 1,
        }
    }

    #[must_use]
    pub fn games(&self) -> usize {
        self.challenger_wins + self.incumbent_wins + self.draws
    }

    /// Fraction of all games won by the challenger; `0` when no game was played.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn win_rate(&self) -> f32 {
        match self.games() {
            0 => 0.0,
            games => self.challenger_wins as f32 / games as f32,
        }
    }

    /// Returns `true` if the challenger's win rate strictly exceeds `threshold`.
    #[must_use]
    pub fn promotes(&self, threshold: f32) -> bool {
        self.games() > 0 && self.win_rate() > threshold
    }
}

/// Which evaluator survived an arena.
#[derive(Debug, Clone, derive_more::IsVariant)]
pub enum ArenaWinner<E> {
    Promoted(E),
    Retained(E),
}

#[derive(Debug, Clone)]
pub struct ArenaDecision<E> {
    pub winner: ArenaWinner<E>,
    pub record: ArenaRecord,
}

impl<E> ArenaDecision<E> {
    #[must_use]
    pub fn promoted(&self) -> bool {
        self.winner.is_promoted()
    }

    #[must_use]
    pub fn into_evaluator(self) -> E {
        match self.winner {
            ArenaWinner::Promoted(evaluator) | ArenaWinner::Retained(evaluator) => evaluator,
        }
    }
}

#[derive(Debug)]
pub struct Arena<'a, G> {
    game: &'a G,
    max_moves: usize,
    seating: Seating,
    workers: usize,
}

impl<'a, G> Arena<'a, G>
where
    G: Game,
{
    #[must_use]
    pub fn new(game: &'a G, config: &TrainingConfig) -> Self {
        Self {
            game,
            max_moves: config.max_moves,
            seating: config.seating,
            workers: config.worker_count(),
        }
    }

    /// Plays one greedy game with the challenger seated as `challenger_seat`.
    pub fn play_game<E>(
        &self,
        challenger: &E,
        incumbent: &E,
        challenger_seat: Player,
    ) -> Result<ArenaGameResult, TrainingError>
    where
        E: Evaluator<G>,
    {
        let action_space_size = self.game.action_space_size();
        // greedy selection never draws from it
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let played = play::play_game(
            self.game,
            self.max_moves,
            |state, player, _| {
                let side = if player == challenger_seat {
                    challenger
                } else {
                    incumbent
                };
                let policy = side.predict(state, player).policy;
                if policy.len() != action_space_size {
                    return Err(ShapeMismatchError {
                        expected: action_space_size,
                        found: policy.len(),
                    }
                    .into());
                }
                Ok(policy)
            },
            &Greedy,
            &mut rng,
        )?;
        Ok(ArenaGameResult::from_outcome(
            played.outcome,
            challenger_seat,
        ))
    }

    /// Plays `num_games` games and tallies them without deciding.
    pub fn compete<E>(
        &self,
        challenger: &E,
        incumbent: &E,
        num_games: usize,
    ) -> Result<ArenaRecord, TrainingError>
    where
        E: Evaluator<G>,
    {
        let games = (0..num_games).collect::<Vec<_>>();
        let results = parallel::map_ordered(games, self.workers, |game_index| {
            let seat = self.seating.challenger_seat(game_index);
            self.play_game(challenger, incumbent, seat)
        });

        let mut record = ArenaRecord::default();
        for result in results {
            record.record(result?);
        }
        Ok(record)
    }

    /// Plays the arena and keeps the challenger iff its win rate exceeds `threshold`.
    pub fn evaluate<E>(
        &self,
        challenger: E,
        incumbent: E,
        num_games: usize,
        threshold: f32,
    ) -> Result<ArenaDecision<E>, TrainingError>
    where
        E: Evaluator<G>,
    {
        let record = self.compete(&challenger, &incumbent, num_games)?;
        let winner = if record.promotes(threshold) {
            ArenaWinner::Promoted(challenger)
        } else {
            ArenaWinner::Retained(incumbent)
        };
        Ok(ArenaDecision { winner, record })
    }
}
