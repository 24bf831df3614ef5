//! Legal move generation and validation.
//!
//! A seat that has not placed yet may only make an initial placement; a
//! seat that has placed may only increment its own cells. The coalition
//! helpers merge every other seat's moves for search.

pub mod increment;
pub mod placement;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Board, Move, Placement, PlayerId};

pub use increment::{is_legal_increment, legal_increments};
pub use placement::{is_legal_placement, legal_placements};

/// Decides whether `player` may act on `(row, col)`.
///
/// Pure predicate over the snapshot. Unknown seats and off-board
/// coordinates are never legal.
pub fn is_legal(
    board: &Board,
    placement: &Placement,
    player: PlayerId,
    row: usize,
    col: usize,
) -> bool {
    if player.index() >= placement.players() {
        return false;
    }
    if placement.has_placed(player) {
        is_legal_increment(board, player, row, col)
    } else {
        is_legal_placement(board, row, col)
    }
}

/// Lists every legal move for `player` in row-major order.
pub fn legal_moves(board: &Board, placement: &Placement, player: PlayerId) -> Vec<Move> {
    if player.index() >= placement.players() {
        return Vec::new();
    }
    if placement.has_placed(player) {
        legal_increments(board, player)
    } else {
        legal_placements(board, player)
    }
}

/// Lists the union of legal moves of every seat except `focus`, each
/// tagged with its real owner.
pub fn coalition_moves(board: &Board, placement: &Placement, focus: PlayerId) -> Vec<Move> {
    placement
        .seats()
        .filter(|&p| p != focus)
        .flat_map(|p| legal_moves(board, placement, p))
        .collect()
}

/// Picks a uniformly random legal move for `player`, or `None` if the seat
/// has to pass.
pub fn random_move(
    board: &Board,
    placement: &Placement,
    player: PlayerId,
    rng: &mut impl Rng,
) -> Option<Move> {
    legal_moves(board, placement, player).choose(rng).copied()
}
