//! Search values.
//!
//! An `Outcome` is either a material value or a forced result with the
//! number of plies until it happens. The ordering is from the focus seat's
//! point of view: any win beats any value, faster wins beat slower ones,
//! and slower losses beat faster ones.

use std::cmp::Ordering;
use std::fmt;

/// Value of a position for the focus seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Loss { plies: u32 },
    Value(i32),
    Win { plies: u32 },
}

impl Outcome {
    /// Lowest possible outcome (immediate loss).
    pub const WORST: Outcome = Outcome::Loss { plies: 0 };
    /// Highest possible outcome (immediate win).
    pub const BEST: Outcome = Outcome::Win { plies: 0 };

    fn rank(self) -> (u8, i64) {
        match self {
            Outcome::Loss { plies } => (0, plies as i64),
            Outcome::Value(v) => (1, v as i64),
            Outcome::Win { plies } => (2, -(plies as i64)),
        }
    }

    /// The same outcome seen one ply earlier.
    pub fn deeper(self) -> Outcome {
        match self {
            Outcome::Loss { plies } => Outcome::Loss { plies: plies + 1 },
            Outcome::Win { plies } => Outcome::Win { plies: plies + 1 },
            v => v,
        }
    }

    /// The same outcome seen one ply later. Inverse of `deeper` except at
    /// zero plies.
    pub fn shallower(self) -> Outcome {
        match self {
            Outcome::Loss { plies } => Outcome::Loss {
                plies: plies.saturating_sub(1),
            },
            Outcome::Win { plies } => Outcome::Win {
                plies: plies.saturating_sub(1),
            },
            v => v,
        }
    }

    /// Expresses a material value relative to `base`; forced results are
    /// unchanged.
    pub fn relative_to(self, base: i32) -> Outcome {
        match self {
            Outcome::Value(v) => Outcome::Value(v - base),
            other => other,
        }
    }

    pub fn is_win(self) -> bool {
        matches!(self, Outcome::Win { .. })
    }

    pub fn is_loss(self) -> bool {
        matches!(self, Outcome::Loss { .. })
    }

    /// Plies to a forced result, if this is one.
    pub fn plies(self) -> Option<u32> {
        match self {
            Outcome::Loss { plies } | Outcome::Win { plies } => Some(plies),
            Outcome::Value(_) => None,
        }
    }
}

impl Ord for Outcome {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Outcome {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Loss { plies } => write!(f, "loss {}", plies),
            Outcome::Value(v) => write!(f, "{}", v),
            Outcome::Win { plies } => write!(f, "win {}", plies),
        }
    }
}
