//! PUCT Monte Carlo tree search.
//!
//! Each simulation descends from the root by maximizing
//!
//! ```text
//! Q(child) + c · P(child) · √N(parent) / (1 + N(child))
//! ```
//!
//! expands the reached leaf with the evaluator's policy (masked to legal actions) and
//! backs up the evaluator's value, or the exact result at terminal leaves. The returned
//! policy is the root's visit distribution.
//!
//! Values are stored per node from the perspective of the player to move there, so games
//! where a player may move twice in a row need no special handling.
//!
//! # Root Noise
//!
//! For self-play, [`PuctSearch::with_root_noise`] mixes Dirichlet noise into the root
//! priors: `P = (1 - ε)·P + ε·η`, `η ~ Dir(α)`.

use nanozero_game::{Action, Game, Player};
use rand::{Rng, distr::Distribution as _};
use rand_distr::Gamma;
use serde::{Deserialize, Serialize};

use crate::{Evaluator, Search, SearchParams, policy};

/// Dirichlet noise mixed into root priors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootNoise {
    /// Concentration `α` of the symmetric Dirichlet distribution.
    pub alpha: f32,
    /// Mixing weight `ε` of the noise.
    pub fraction: f32,
}

impl Default for RootNoise {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            fraction: 0.25,
        }
    }
}

/// PUCT tree search over a [`Game`].
#[derive(Debug, Default, Clone)]
pub struct PuctSearch {
    root_noise: Option<RootNoise>,
}

impl PuctSearch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_root_noise(mut self, noise: RootNoise) -> Self {
        self.root_noise = Some(noise);
        self
    }
}

#[derive(Debug)]
struct Node<S> {
    state: S,
    player: Player,
    prior: f32,
    visits: u32,
    /// Sum of backed-up values from `player`'s perspective.
    value_sum: f32,
    children: Vec<(Action, usize)>,
    expanded: bool,
}

impl<S> Node<S> {
    fn new(state: S, player: Player, prior: f32) -> Self {
        Self {
            state,
            player,
            prior,
            visits: 0,
            value_sum: 0.0,
            children: vec![],
            expanded: false,
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn mean_value(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f32
        }
    }
}

impl<G> Search<G> for PuctSearch
where
    G: Game,
{
    #[expect(clippy::cast_precision_loss)]
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
        R: Rng + ?Sized,
    {
        let mut nodes = vec![Node::new(state.clone(), player, 1.0)];

        // the first simulation only expands the root
        for _ in 0..params.num_simulations.max(1) {
            let mut path = vec![0];
            let mut current = 0;
            while nodes[current].expanded && !nodes[current].children.is_empty() {
                current = select_child(&nodes, current, params.exploration_constant);
                path.push(current);
            }

            let leaf = &nodes[current];
            let leaf_player = leaf.player;
            let value = if game.is_terminal(&leaf.state, leaf.player) {
                game.outcome(&leaf.state).for_player(leaf.player)
            } else if leaf.expanded {
                evaluator.predict(&leaf.state, leaf.player).value
            } else {
                let value = expand(game, evaluator, &mut nodes, current);
                if let (0, Some(noise)) = (current, self.root_noise) {
                    add_root_noise(&mut nodes, noise, rng);
                }
                value
            };
            backup(&mut nodes, &path, leaf_player, value);
        }

        let mut policy = vec![0.0; game.action_space_size()];
        let root = &nodes[0];
        let total_visits = root
            .children
            .iter()
            .map(|(_, child)| nodes[*child].visits)
            .sum::<u32>();
        for &(action, child) in &root.children {
            policy[action] = if total_visits == 0 {
                nodes[child].prior
            } else {
                nodes[child].visits as f32 / total_visits as f32
            };
        }
        policy
    }
}

#[expect(clippy::cast_precision_loss)]
fn select_child<S>(nodes: &[Node<S>], parent: usize, exploration_constant: f32) -> usize {
    let parent = &nodes[parent];
    let sqrt_visits = (parent.visits as f32).sqrt();
    let mut best_score = f32::NEG_INFINITY;
    let mut best = parent.children[0].1;
    for &(_, index) in &parent.children {
        let child = &nodes[index];
        let q = if child.player == parent.player {
            child.mean_value()
        } else {
            -child.mean_value()
        };
        let u = exploration_constant * child.prior * sqrt_visits / (1.0 + child.visits as f32);
        if q + u > best_score {
            best_score = q + u;
            best = index;
        }
    }
    best
}

/// Expands `index` and returns the evaluator's value for it.
fn expand<G, E>(game: &G, evaluator: &E, nodes: &mut Vec<Node<G::State>>, index: usize) -> f32
where
    G: Game,
    E: Evaluator<G>,
{
    let state = nodes[index].state.clone();
    let player = nodes[index].player;
    let prediction = evaluator.predict(&state, player);
    assert_eq!(
        prediction.policy.len(),
        game.action_space_size(),
        "evaluator policy does not cover the action space"
    );
    let legal = game.legal_actions(&state, player);
    let priors = policy::mask_to_legal(&prediction.policy, &legal);
    for action in legal {
        let (child_state, child_player) = game
            .apply(&state, player, action)
            .unwrap_or_else(|err| panic!("game rejected one of its legal actions: {err}"));
        let child = nodes.len();
        nodes.push(Node::new(child_state, child_player, priors[action]));
        nodes[index].children.push((action, child));
    }
    nodes[index].expanded = true;
    prediction.value
}

fn add_root_noise<S, R>(nodes: &mut [Node<S>], noise: RootNoise, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let Ok(gamma) = Gamma::new(noise.alpha, 1.0) else {
        return;
    };
    let children = nodes[0].children.clone();
    let samples = children
        .iter()
        .map(|_| gamma.sample(rng))
        .collect::<Vec<f32>>();
    let total = samples.iter().sum::<f32>();
    if total <= 0.0 || !total.is_finite() {
        return;
    }
    for ((_, index), sample) in children.into_iter().zip(samples) {
        let child = &mut nodes[index];
        child.prior = (1.0 - noise.fraction) * child.prior + noise.fraction * sample / total;
    }
}

fn backup<S>(nodes: &mut [Node<S>], path: &[usize], leaf_player: Player, value: f32) {
    for &index in path {
        let node = &mut nodes[index];
        node.visits += 1;
        node.value_sum += if node.player == leaf_player {
            value
        } else {
            -value
        };
    }
}

#[cfg(test)]
mod tests {
    use nanozero_game::{
        nim::Nim,
        tic_tac_toe::{CELLS, TicTacToe},
    };
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::tabular::TabularEvaluator;

    fn params(num_simulations: usize) -> SearchParams {
        SearchParams {
            num_simulations,
            exploration_constant: 1.0,
        }
    }

    fn argmax(policy: &[f32]) -> usize {
        policy
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap()
            .0
    }

    fn assert_distribution(policy: &[f32]) {
        assert!(policy.iter().all(|p| *p >= 0.0));
        assert!((policy.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_finds_winning_take_in_nim() {
        let game = Nim::new(3, 3);
        let evaluator = TabularEvaluator::new(3, 0.1);
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let policy = PuctSearch::new().search(
            &game,
            &game.initial_state(),
            Player::First,
            &evaluator,
            &params(200),
            &mut rng,
        );
        assert_distribution(&policy);
        assert_eq!(argmax(&policy), 2);
    }

    #[test]
    fn test_illegal_actions_get_no_mass() {
        let game = Nim::new(2, 3);
        let evaluator = TabularEvaluator::new(3, 0.1);
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let policy = PuctSearch::new().search(
            &game,
            &game.initial_state(),
            Player::First,
            &evaluator,
            &params(50),
            &mut rng,
        );
        assert_distribution(&policy);
        assert_eq!(policy[2], 0.0);
    }

    #[test]
    fn test_single_simulation_returns_priors() {
        let game = Nim::new(2, 3);
        let evaluator = TabularEvaluator::new(3, 0.1);
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let policy = PuctSearch::new().search(
            &game,
            &game.initial_state(),
            Player::First,
            &evaluator,
            &params(1),
            &mut rng,
        );
        assert_eq!(policy, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_completes_tic_tac_toe_row() {
        // X: 0 1, O: 3 4, X to move
        let game = TicTacToe;
        let mut state = game.initial_state();
        let mut player = Player::First;
        for action in [0, 3, 1, 4] {
            (state, player) = game.apply(&state, player, action).unwrap();
        }
        let evaluator = TabularEvaluator::new(CELLS, 0.1);
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let policy =
            PuctSearch::new().search(&game, &state, player, &evaluator, &params(300), &mut rng);
        assert_distribution(&policy);
        assert_eq!(argmax(&policy), 2);
    }

    #[test]
    fn test_root_noise_keeps_distribution() {
        let game = TicTacToe;
        let evaluator = TabularEvaluator::new(CELLS, 0.1);
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let search = PuctSearch::new().with_root_noise(RootNoise::default());
        for num_simulations in [1, 30] {
            let policy = search.search(
                &game,
                &game.initial_state(),
                Player::First,
                &evaluator,
                &params(num_simulations),
                &mut rng,
            );
            assert_distribution(&policy);
        }
    }
}
