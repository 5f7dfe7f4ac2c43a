//! Game rule oracles for two-player, turn-based, finite games.
//!
//! This crate defines the [`Game`] trait consumed by the self-play and arena loops, the
//! [`Player`] seats and the [`Outcome`] of a finished game, together with two small
//! reference games:
//!
//! - [`tic_tac_toe`] - the classic 3×3 game (9 action slots)
//! - [`nim`] - a single-pile subtraction game (take 1..=`max_take` stones, last stone wins)
//!
//! # Perspective
//!
//! A game reports its terminal result once, from the fixed reference perspective of
//! [`Player::First`]. Callers that need the result for a particular seat convert it with
//! [`Outcome::for_player`]; games never compute per-seat results themselves.
//!
//! ```
//! use nanozero_game::{Outcome, Player};
//!
//! let outcome = Outcome::win_for(Player::Second);
//! assert_eq!(outcome.for_player(Player::First), -1.0);
//! assert_eq!(outcome.for_player(Player::Second), 1.0);
//! ```

use std::fmt;

pub use self::{outcome::Outcome, player::Player};

pub mod nim;
mod outcome;
mod player;
pub mod tic_tac_toe;

/// Index into a game's fixed action space.
pub type Action = usize;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("action {action} is not legal for the {player} player")]
pub struct IllegalActionError {
    pub action: Action,
    pub player: Player,
}

/// Pure rule oracle of a two-player game.
///
/// States are values: [`Game::apply`] never mutates its input and returns the successor
/// state together with the player to move next. Every game must be finite; the training
/// loops still guard against runaway games with a move bound.
pub trait Game: fmt::Debug + Send + Sync {
    /// Game-defined position.
    type State: Clone + fmt::Debug + Send + Sync;

    /// Number of action slots (legal or not) in every policy over this game.
    fn action_space_size(&self) -> usize;

    /// Position the first player moves from.
    fn initial_state(&self) -> Self::State;

    /// Actions `player` may take in `state`, in ascending order.
    ///
    /// Terminal states have no legal actions.
    fn legal_actions(&self, state: &Self::State, player: Player) -> Vec<Action>;

    /// Returns `true` if the game is over with `player` to move.
    fn is_terminal(&self, state: &Self::State, player: Player) -> bool;

    /// Result of a terminal state from [`Player::First`]'s perspective.
    fn outcome(&self, state: &Self::State) -> Outcome;

    /// Plays `action` for `player`.
    ///
    /// # Returns
    ///
    /// The successor state and the player to move in it.
    fn apply(
        &self,
        state: &Self::State,
        player: Player,
        action: Action,
    ) -> Result<(Self::State, Player), IllegalActionError>;
}
