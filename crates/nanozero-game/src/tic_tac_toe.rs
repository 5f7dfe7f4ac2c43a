//! Tic-tac-toe on a 3×3 board.
//!
//! Cells are numbered row-major from the top-left corner, so action `i` marks cell `i`:
//!
//! ```text
//! 0 | 1 | 2
//! 3 | 4 | 5
//! 6 | 7 | 8
//! ```
//!
//! The first player plays `X`, the second `O`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Action, Game, IllegalActionError, Outcome, Player};

/// Number of cells (and action slots).
pub const CELLS: usize = 9;

const ALL_CELLS_MASK: u16 = (1 << CELLS) - 1;

const LINES: [u16; 8] = [
    0b000_000_111,
    0b000_111_000,
    0b111_000_000,
    0b001_001_001,
    0b010_010_010,
    0b100_100_100,
    0b100_010_001,
    0b001_010_100,
];

/// Board position stored as one 9-bit mask per player.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    first: u16,
    second: u16,
}

impl Board {
    pub const EMPTY: Self = Self {
        first: 0,
        second: 0,
    };

    /// Returns the player occupying `cell`, if any.
    #[must_use]
    pub fn cell(&self, cell: usize) -> Option<Player> {
        let bit = 1 << cell;
        if self.first & bit != 0 {
            Some(Player::First)
        } else if self.second & bit != 0 {
            Some(Player::Second)
        } else {
            None
        }
    }

    #[inline]
    fn occupied(&self) -> u16 {
        self.first | self.second
    }

    #[inline]
    fn marks(&self, player: Player) -> u16 {
        match player {
            Player::First => self.first,
            Player::Second => self.second,
        }
    }

    /// Returns `true` if every cell is marked.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupied() == ALL_CELLS_MASK
    }

    /// Returns the player owning a complete line, if any.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        Player::ALL.into_iter().find(|player| {
            let marks = self.marks(*player);
            LINES.iter().any(|line| marks & line == *line)
        })
    }

    /// Empty cells in ascending order.
    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + use<> {
        let occupied = self.occupied();
        (0..CELLS).filter(move |cell| occupied & (1 << cell) == 0)
    }

    #[must_use]
    fn with_mark(self, player: Player, cell: usize) -> Self {
        let bit = 1 << cell;
        match player {
            Player::First => Self {
                first: self.first | bit,
                ..self
            },
            Player::Second => Self {
                second: self.second | bit,
                ..self
            },
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let ch = match self.cell(row * 3 + col) {
                    Some(Player::First) => 'X',
                    Some(Player::Second) => 'O',
                    None => '.',
                };
                write!(f, "{ch}")?;
            }
            if row < 2 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Tic-tac-toe rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct TicTacToe;

impl Game for TicTacToe {
    type State = Board;

    fn action_space_size(&self) -> usize {
        CELLS
    }

    fn initial_state(&self) -> Self::State {
        Board::EMPTY
    }

    fn legal_actions(&self, state: &Self::State, player: Player) -> Vec<Action> {
        if self.is_terminal(state, player) {
            return vec![];
        }
        state.empty_cells().collect()
    }

    fn is_terminal(&self, state: &Self::State, _player: Player) -> bool {
        state.winner().is_some() || state.is_full()
    }

    fn outcome(&self, state: &Self::State) -> Outcome {
        state.winner().map_or(Outcome::DRAW, Outcome::win_for)
    }

    fn apply(
        &self,
        state: &Self::State,
        player: Player,
        action: Action,
    ) -> Result<(Self::State, Player), IllegalActionError> {
        let legal = action < CELLS
            && state.cell(action).is_none()
            && !self.is_terminal(state, player);
        if !legal {
            return Err(IllegalActionError { action, player });
        }
        Ok((state.with_mark(player, action), player.opponent()))
    }
}
