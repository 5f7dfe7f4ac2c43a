use serde::{Deserialize, Serialize};

/// One of the two seats of a game.
///
/// [`Player::First`] always moves from the initial state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "kebab-case")]
pub enum Player {
    #[display("first")]
    First,
    #[display("second")]
    Second,
}

impl Player {
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    /// Returns the other seat.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    /// Returns `1.0` for [`Player::First`] and `-1.0` for [`Player::Second`].
    ///
    /// Multiplying a first-player value by the sign converts it to this player's view.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::First => 1.0,
            Self::Second => -1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_involution() {
        for player in Player::ALL {
            assert_ne!(player.opponent(), player);
            assert_eq!(player.opponent().opponent(), player);
        }
    }

    #[test]
    fn test_signs_are_opposite() {
        assert_eq!(Player::First.sign(), 1.0);
        assert_eq!(Player::Second.sign(), -1.0);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Player::Second).unwrap();
        assert_eq!(json, "\"second\"");
        let player: Player = serde_json::from_str("\"first\"").unwrap();
        assert!(player.is_first());
    }
}
