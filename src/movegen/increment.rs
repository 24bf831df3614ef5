//! Normal-play move generation.
//!
//! After placement a seat may only add charge to a cell it already owns.

use crate::board::{Board, Move, PlayerId};

/// Returns true if `player` owns `(row, col)`.
pub fn is_legal_increment(board: &Board, player: PlayerId, row: usize, col: usize) -> bool {
    board
        .try_get(row, col)
        .is_some_and(|cell| cell.is_owned_by(player))
}

/// Lists every cell `player` may increment, in row-major order.
pub fn legal_increments(board: &Board, player: PlayerId) -> Vec<Move> {
    board
        .iter()
        .filter(|(_, _, cell)| cell.is_owned_by(player))
        .map(|(r, c, _)| Move::new(r, c, player))
        .collect()
}
