//! Initial-placement move generation.
//!
//! A seat's first move claims an empty cell outside the center exclusion
//! zone with no owned orthogonal neighbor.

use crate::board::{is_excluded_center, neighbors, Board, Move, PlayerId};

/// Returns true if an initial placement at `(row, col)` is legal.
pub fn is_legal_placement(board: &Board, row: usize, col: usize) -> bool {
    if !board.contains(row, col) || board.get(row, col).charge != 0 {
        return false;
    }
    if is_excluded_center(board.size(), row, col) {
        return false;
    }
    neighbors(board.size(), row, col).all(|(r, c)| board.get(r, c).is_empty())
}

/// Lists every legal initial placement for `player` in row-major order.
pub fn legal_placements(board: &Board, player: PlayerId) -> Vec<Move> {
    board
        .iter()
        .filter(|&(r, c, _)| is_legal_placement(board, r, c))
        .map(|(r, c, _)| Move::new(r, c, player))
        .collect()
}
