//! Single-pile Nim (a subtraction game).
//!
//! Players alternately remove between 1 and `max_take` stones; whoever takes the last
//! stone wins. Action `a` removes `a + 1` stones, so the action space has `max_take`
//! slots.
//!
//! With perfect play the player to move loses exactly when the pile is a multiple of
//! `max_take + 1`, which makes the game a convenient sanity check for training.

use serde::{Deserialize, Serialize};

use crate::{Action, Game, IllegalActionError, Outcome, Player};

/// Pile size and the player who moved last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NimState {
    pub stones: u32,
    pub last_mover: Option<Player>,
}

/// Nim rules.
#[derive(Debug, Clone, Copy)]
pub struct Nim {
    initial_stones: u32,
    max_take: u32,
}

impl Default for Nim {
    fn default() -> Self {
        Self::new(10, 3)
    }
}

impl Nim {
    /// Creates a game starting from `initial_stones` stones.
    ///
    /// # Panics
    ///
    /// Panics if `max_take` is zero.
    #[must_use]
    pub fn new(initial_stones: u32, max_take: u32) -> Self {
        assert!(max_take > 0, "max_take must be positive");
        Self {
            initial_stones,
            max_take,
        }
    }

    #[must_use]
    pub const fn initial_stones(&self) -> u32 {
        self.initial_stones
    }

    #[must_use]
    pub const fn max_take(&self) -> u32 {
        self.max_take
    }

    /// Stones removed by `action`, if it is within the action space.
    fn stones_taken(&self, action: Action) -> Option<u32> {
        u32::try_from(action)
            .ok()
            .filter(|a| *a < self.max_take)
            .map(|a| a + 1)
    }
}

impl Game for Nim {
    type State = NimState;

    fn action_space_size(&self) -> usize {
        self.max_take as usize
    }

    fn initial_state(&self) -> Self::State {
        NimState {
            stones: self.initial_stones,
            last_mover: None,
        }
    }

    fn legal_actions(&self, state: &Self::State, _player: Player) -> Vec<Action> {
        let count = state.stones.min(self.max_take) as usize;
        (0..count).collect()
    }

    fn is_terminal(&self, state: &Self::State, _player: Player) -> bool {
        state.stones == 0
    }

    fn outcome(&self, state: &Self::State) -> Outcome {
        // an empty initial pile has no winner
        state.last_mover.map_or(Outcome::DRAW, Outcome::win_for)
    }

    fn apply(
        &self,
        state: &Self::State,
        player: Player,
        action: Action,
    ) -> Result<(Self::State, Player), IllegalActionError> {
        let taken = self
            .stones_taken(action)
            .filter(|taken| *taken <= state.stones)
            .ok_or(IllegalActionError { action, player })?;
        let next = NimState {
            stones: state.stones - taken,
            last_mover: Some(player),
        };
        Ok((next, player.opponent()))
    }
}
