//! Tiny games and evaluators for exercising the training loop.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use nanozero_evaluator::{Evaluator, MiniBatch, Prediction, loss::StepLoss};
use nanozero_game::{Action, Game, IllegalActionError, Outcome, Player};

/// Two states: the first player's only action forfeits the game.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resign;

impl Game for Resign {
    type State = bool;

    fn action_space_size(&self) -> usize {
        1
    }

    fn initial_state(&self) -> bool {
        false
    }

    fn legal_actions(&self, state: &bool, _player: Player) -> Vec<Action> {
        if *state { vec![] } else { vec![0] }
    }

    fn is_terminal(&self, state: &bool, _player: Player) -> bool {
        *state
    }

    fn outcome(&self, state: &bool) -> Outcome {
        if *state {
            Outcome::SECOND_WINS
        } else {
            Outcome::DRAW
        }
    }

    fn apply(
        &self,
        state: &bool,
        player: Player,
        action: Action,
    ) -> Result<(bool, Player), IllegalActionError> {
        if *state || action != 0 {
            return Err(IllegalActionError { action, player });
        }
        Ok((true, player.opponent()))
    }
}

/// Over before it starts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Finished;

impl Game for Finished {
    type State = ();

    fn action_space_size(&self) -> usize {
        1
    }

    fn initial_state(&self) {}

    fn legal_actions(&self, _state: &(), _player: Player) -> Vec<Action> {
        vec![]
    }

    fn is_terminal(&self, _state: &(), _player: Player) -> bool {
        true
    }

    fn outcome(&self, _state: &()) -> Outcome {
        Outcome::DRAW
    }

    fn apply(
        &self,
        _state: &(),
        player: Player,
        action: Action,
    ) -> Result<((), Player), IllegalActionError> {
        Err(IllegalActionError { action, player })
    }
}

/// Never terminates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Endless;

impl Game for Endless {
    type State = ();

    fn action_space_size(&self) -> usize {
        1
    }

    fn initial_state(&self) {}

    fn legal_actions(&self, _state: &(), _player: Player) -> Vec<Action> {
        vec![0]
    }

    fn is_terminal(&self, _state: &(), _player: Player) -> bool {
        false
    }

    fn outcome(&self, _state: &()) -> Outcome {
        Outcome::DRAW
    }

    fn apply(
        &self,
        _state: &(),
        player: Player,
        action: Action,
    ) -> Result<((), Player), IllegalActionError> {
        if action != 0 {
            return Err(IllegalActionError { action, player });
        }
        Ok(((), player.opponent()))
    }
}

/// One move decides the game: action 0 wins for the mover, action 1 loses.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Duel;

impl Game for Duel {
    type State = Option<Outcome>;

    fn action_space_size(&self) -> usize {
        2
    }

    fn initial_state(&self) -> Option<Outcome> {
        None
    }

    fn legal_actions(&self, state: &Option<Outcome>, _player: Player) -> Vec<Action> {
        if state.is_some() { vec![] } else { vec![0, 1] }
    }

    fn is_terminal(&self, state: &Option<Outcome>, _player: Player) -> bool {
        state.is_some()
    }

    fn outcome(&self, state: &Option<Outcome>) -> Outcome {
        state.unwrap_or(Outcome::DRAW)
    }

    fn apply(
        &self,
        state: &Option<Outcome>,
        player: Player,
        action: Action,
    ) -> Result<(Option<Outcome>, Player), IllegalActionError> {
        let outcome = match (state, action) {
            (None, 0) => Outcome::win_for(player),
            (None, 1) => Outcome::loss_for(player),
            _ => return Err(IllegalActionError { action, player }),
        };
        Ok((Some(outcome), player.opponent()))
    }
}

/// Plays [`Duel`] to win for its first `wins` predictions, then to lose.
///
/// Clones share the prediction counter.
#[derive(Debug, Clone)]
pub(crate) struct Scripted {
    wins: usize,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    pub(crate) fn new(wins: usize) -> Self {
        Self {
            wins,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Evaluator<Duel> for Scripted {
    fn predict(&self, _state: &Option<Outcome>, _player: Player) -> Prediction {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let policy = if call < self.wins {
            vec![1.0, 0.0]
        } else {
            vec![0.0, 1.0]
        };
        Prediction { policy, value: 0.0 }
    }

    fn train_step(&mut self, _batch: &MiniBatch<Option<Outcome>>) -> StepLoss {
        StepLoss::default()
    }
}
