//! The shared game loop behind self-play and arena games.
//!
//! [`play_game`] asks a policy source for a distribution at every non-terminal position,
//! lets an [`ActionSelector`] turn it into a move, checks the move against the legal set
//! and applies it. Self-play plugs in search policies with [`Stochastic`] selection; the
//! arena plugs in raw evaluator predictions with [`Greedy`] selection.

use nanozero_evaluator::InvalidPolicyError;
use nanozero_game::{Action, Game, IllegalActionError, Outcome, Player};
use rand::{Rng, distr::Distribution as _, distr::weighted::WeightedIndex};

use crate::TrainingError;

/// Turns a policy into a move.
pub trait ActionSelector {
    /// Picks an action from `policy`, a distribution over the full action space.
    ///
    /// `legal` is never empty. The returned action is checked against `legal` by the
    /// caller.
    fn select<R>(
        &self,
        policy: &[f32],
        legal: &[Action],
        rng: &mut R,
    ) -> Result<Action, TrainingError>
    where
        R: Rng + ?Sized;
}

/// Categorical sample over the full distribution.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stochastic;

impl ActionSelector for Stochastic {
    fn select<R>(
        &self,
        policy: &[f32],
        _legal: &[Action],
        rng: &mut R,
    ) -> Result<Action, TrainingError>
    where
        R: Rng + ?Sized,
    {
        let dist = WeightedIndex::new(policy).map_err(|_| InvalidPolicyError::BadMass {
            sum: policy.iter().sum(),
        })?;
        Ok(dist.sample(rng))
    }
}

/// Highest-probability legal action, ties broken towards the lowest index.
#[derive(Debug, Default, Clone, Copy)]
pub struct Greedy;

impl ActionSelector for Greedy {
    fn select<R>(
        &self,
        policy: &[f32],
        legal: &[Action],
        _rng: &mut R,
    ) -> Result<Action, TrainingError>
    where
        R: Rng + ?Sized,
    {
        let mut best = legal[0];
        for &action in &legal[1..] {
            if policy[action] > policy[best] {
                best = action;
            }
        }
        Ok(best)
    }
}

/// One recorded position of a played game.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S, P> {
    pub state: S,
    pub player: Player,
    pub policy: P,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayedGame<S, P> {
    /// Every non-terminal position visited, in order.
    pub steps: Vec<Step<S, P>>,
    pub final_state: S,
    /// Terminal result, read once from the final state.
    pub outcome: Outcome,
}

/// Plays one game from the initial state with [`Player::First`] to move.
///
/// `policy_for` supplies the distribution for each position; the RNG is handed to it so a
/// stochastic policy source and the selector draw from the same stream.
///
/// # Errors
///
/// - [`TrainingError::NonTerminatingGame`] if the game is still running after
///   `max_moves` moves
/// - [`TrainingError::NoLegalActions`] if a non-terminal position has no legal action
/// - [`TrainingError::InvalidAction`] if the selected action is not legal or the game
///   rejects it
/// - any error returned by `policy_for` or the selector
pub fn play_game<G, P, F, A, R>(
    game: &G,
    max_moves: usize,
    mut policy_for: F,
    selector: &A,
    rng: &mut R,
) -> Result<PlayedGame<G::State, P>, TrainingError>
where
    G: Game,
    P: AsRef<[f32]>,
    F: FnMut(&G::State, Player, &mut R) -> Result<P, TrainingError>,
    A: ActionSelector,
    R: Rng + ?Sized,
{
    let mut state = game.initial_state();
    let mut player = Player::First;
    let mut steps = vec![];

    while !game.is_terminal(&state, player) {
        if steps.len() >= max_moves {
            return Err(TrainingError::NonTerminatingGame { max_moves });
        }
        let legal = game.legal_actions(&state, player);
        if legal.is_empty() {
            return Err(TrainingError::NoLegalActions { player });
        }

        let policy = policy_for(&state, player, &mut *rng)?;
        let action = selector.select(policy.as_ref(), &legal, rng)?;
        if !legal.contains(&action) {
            return Err(IllegalActionError { action, player }.into());
        }
        let (next_state, next_player) = game.apply(&state, player, action)?;

        steps.push(Step {
            state,
            player,
            policy,
        });
        state = next_state;
        player = next_player;
    }

    let outcome = game.outcome(&state);
    Ok(PlayedGame {
        steps,
        final_state: state,
        outcome,
    })
}
