//! Board representation and game-state types.
//!
//! Contains the cell and player types, grid geometry, the board itself,
//! and the per-seat placement flags.

pub mod adjacency;
pub mod cell;
pub mod state;

pub use adjacency::{excluded_center, is_excluded_center, neighbors, off_board_directions};
pub use cell::{
    Cell, PlayerId, EXPLODE_THRESHOLD, MAX_CHARGE, MAX_PLAYERS, PAYLOAD_BASE, PLACEMENT_CHARGE,
};
pub use state::{Board, EdgeRule, Placement, MAX_SIZE, MIN_SIZE};

/// A move tagged with the seat making it.
///
/// For a seat that has not placed yet the move is its initial placement;
/// afterwards it increments one of its own cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
    pub player: PlayerId,
}

impl Move {
    pub const fn new(row: usize, col: usize, player: PlayerId) -> Self {
        Move { row, col, player }
    }
}
