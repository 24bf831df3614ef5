//! Player identities and board cells.
//!
//! A cell holds an accumulated charge and the player that owns it. An
//! unowned cell never carries charge.

use serde::{Deserialize, Serialize};

/// Highest charge a cell can hold.
pub const MAX_CHARGE: u8 = 5;

/// Charge at which a cell explodes in the next resolution round.
pub const EXPLODE_THRESHOLD: u8 = 4;

/// Charge written by a player's initial placement.
pub const PLACEMENT_CHARGE: u8 = 5;

/// Subtracted from an exploding cell's charge to get the per-direction payload.
pub const PAYLOAD_BASE: u8 = 3;

/// Maximum number of seats in a match.
pub const MAX_PLAYERS: usize = 8;

/// A seat at the table. Seats are numbered from zero in turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Returns the seat index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the lowercase letter used in board notation (`a` for seat 0),
    /// or `None` for a seat past `MAX_PLAYERS`.
    pub const fn letter(self) -> Option<char> {
        if (self.0 as usize) < MAX_PLAYERS {
            Some((b'a' + self.0) as char)
        } else {
            None
        }
    }

    /// Parses a notation letter back into a seat.
    pub fn from_letter(c: char) -> Option<PlayerId> {
        if c.is_ascii_lowercase() {
            let idx = c as u8 - b'a';
            if (idx as usize) < MAX_PLAYERS {
                return Some(PlayerId(idx));
            }
        }
        None
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.letter() {
            Some(c) => write!(f, "{}", c),
            None => write!(f, "#{}", self.0),
        }
    }
}

/// A single square of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub charge: u8,
    pub owner: Option<PlayerId>,
}

impl Cell {
    /// An unowned, uncharged cell.
    pub const EMPTY: Cell = Cell {
        charge: 0,
        owner: None,
    };

    /// Creates an owned cell, clamping the charge to `MAX_CHARGE`.
    /// A zero charge yields an empty cell.
    pub fn owned(player: PlayerId, charge: u8) -> Cell {
        if charge == 0 {
            return Cell::EMPTY;
        }
        Cell {
            charge: charge.min(MAX_CHARGE),
            owner: Some(player),
        }
    }

    /// Returns true if nobody owns this cell.
    pub const fn is_empty(self) -> bool {
        self.owner.is_none()
    }

    /// Returns true if the cell will explode in the next round.
    pub const fn is_critical(self) -> bool {
        self.charge >= EXPLODE_THRESHOLD
    }

    /// Returns true if the cell is owned by `player`.
    pub fn is_owned_by(self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }
}
