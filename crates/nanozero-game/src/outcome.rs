use serde::{Deserialize, Serialize};

use crate::Player;

/// Result of a finished game, stored from [`Player::First`]'s perspective.
///
/// Values lie in `[-1.0, 1.0]`: `1.0` is a first-player win, `-1.0` a second-player win
/// and `0.0` a draw. Games with graded results may report anything in between.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outcome(f32);

impl Outcome {
    pub const FIRST_WINS: Self = Self(1.0);
    pub const SECOND_WINS: Self = Self(-1.0);
    pub const DRAW: Self = Self(0.0);

    /// Creates an outcome from a first-player value.
    ///
    /// # Panics
    ///
    /// Panics if `value` is not finite or lies outside `[-1.0, 1.0]`.
    #[must_use]
    pub fn new(value: f32) -> Self {
        assert!(
            value.is_finite() && (-1.0..=1.0).contains(&value),
            "outcome must lie in [-1, 1], got {value}"
        );
        Self(value)
    }

    /// Outcome where `player` won.
    #[must_use]
    pub const fn win_for(player: Player) -> Self {
        match player {
            Player::First => Self::FIRST_WINS,
            Player::Second => Self::SECOND_WINS,
        }
    }

    /// Outcome where `player` lost.
    #[must_use]
    pub const fn loss_for(player: Player) -> Self {
        Self::win_for(player.opponent())
    }

    /// Raw value from the first player's perspective.
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Value of this outcome as seen by `player`.
    #[must_use]
    pub fn for_player(self, player: Player) -> f32 {
        self.0 * player.sign()
    }
}
