//! The search interface producing policy targets.

use std::fmt;

use nanozero_game::{Game, Player};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Evaluator;

/// Budget and exploration settings for one search call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Number of simulations (tree descents) per call.
    pub num_simulations: usize,
    /// Weight of the exploration term relative to the value estimate.
    pub exploration_constant: f32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            num_simulations: 25,
            exploration_constant: 1.0,
        }
    }
}

/// Computes an improved policy for a position, guided by an evaluator.
pub trait Search<G>: fmt::Debug + Send + Sync
where
    G: Game,
{
    /// Searches from `state` with `player` to move.
    ///
    /// # Returns
    ///
    /// A probability for every slot of `game`'s action space. Illegal actions must get
    /// zero mass.
    fn search<E, R>(
        &self,
        game: &G,
        state: &G::State,
        player: Player,
        evaluator: &E,
        params: &SearchParams,
        rng: &mut R,
    ) -> Vec<f32>
    where
        E: Evaluator<G>,
        R: Rng + ?Sized;
}
