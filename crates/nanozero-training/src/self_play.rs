//! Self-play episode generation.
//!
//! An episode is one complete game of the current evaluator against itself. At every
//! non-terminal position the search produces a policy target, the next move is sampled
//! from that target, and the position is recorded. Once the game ends its outcome is read
//! a single time and attached to every recorded position from the side of the player who
//! was to move there.

use nanozero_evaluator::{
    Evaluator, PolicyTarget, Search, SearchParams, ShapeMismatchError, TrainingExample,
};
use nanozero_game::{Game, Outcome};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg64Mcg;

use crate::{
    TrainingConfig, TrainingError, parallel,
    play::{self, Step, Stochastic},
};

/// Recorded positions of one self-play game and its result.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode<S> {
    pub steps: Vec<Step<S, PolicyTarget>>,
    /// Terminal result from [`Player::First`](nanozero_game::Player::First)'s side.
    pub outcome: Outcome,
}

impl<S> Episode<S> {
    /// Labels every step with the outcome as seen by its player.
    #[must_use]
    pub fn into_examples(self) -> Vec<TrainingExample<S>> {
        let outcome = self.outcome;
        self.steps
            .into_iter()
            .map(|step| TrainingExample {
                state: step.state,
                player: step.player,
                policy: step.policy,
                outcome: outcome.for_player(step.player),
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct SelfPlayGenerator<'a, G, X> {
    game: &'a G,
    search: &'a X,
    params: SearchParams,
    max_moves: usize,
    workers: usize,
}

impl<'a, G, X> SelfPlayGenerator<'a, G, X>
where
    G: Game,
    X: Search<G>,
{
    #[must_use]
    pub fn new(game: &'a G, search: &'a X, config: &TrainingConfig) -> Self {
        Self {
            game,
            search,
            params: config.search_params(),
            max_moves: config.max_moves,
            workers: config.worker_count(),
        }
    }

    /// Plays a single episode on the calling thread.
    pub fn play_episode<E, R>(
        &self,
        evaluator: &E,
        rng: &mut R,
    ) -> Result<Episode<G::State>, TrainingError>
    where
        E: Evaluator<G>,
        R: Rng + ?Sized,
    {
        let action_space_size = self.game.action_space_size();
        let played = play::play_game(
            self.game,
            self.max_moves,
            |state, player, rng| {
                let probs =
                    self.search
                        .search(self.game, state, player, evaluator, &self.params, rng);
                if probs.len() != action_space_size {
                    return Err(ShapeMismatchError {
                        expected: action_space_size,
                        found: probs.len(),
                    }
                    .into());
                }
                Ok(PolicyTarget::new(probs)?)
            },
            &Stochastic,
            rng,
        )?;
        Ok(Episode {
            steps: played.steps,
            outcome: played.outcome,
        })
    }

    /// Plays `num_episodes` episodes and returns their examples in episode order.
    ///
    /// Each episode runs with its own RNG seeded from `rng`, so the result only depends on
    /// `rng`, never on the worker count.
    pub fn generate<E, R>(
        &self,
        evaluator: &E,
        num_episodes: usize,
        rng: &mut R,
    ) -> Result<Vec<TrainingExample<G::State>>, TrainingError>
    where
        E: Evaluator<G>,
        R: Rng + ?Sized,
    {
        let seeds = (0..num_episodes)
            .map(|_| rng.random::<u64>())
            .collect::<Vec<_>>();
        let episodes = parallel::map_ordered(seeds, self.workers, |seed| {
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            self.play_episode(evaluator, &mut rng)
        });

        let mut examples = vec![];
        for (i, episode) in episodes.into_iter().enumerate() {
            let episode = episode?;
            log::debug!(
                "episode #{i}: {} moves, outcome {:+.1}",
                episode.steps.len(),
                episode.outcome.value()
            );
            examples.extend(episode.into_examples());
        }
        Ok(examples)
    }
}
