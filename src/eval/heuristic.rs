//! Static position features.
//!
//! Material is the summed charge a seat owns. The attack and defense counts
//! are only used to rank otherwise equal AI candidates.

use crate::board::{neighbors, Board, Placement, PlayerId, EXPLODE_THRESHOLD};

/// Sum of charge over the cells owned by `player`.
pub fn total_owned(board: &Board, player: PlayerId) -> i32 {
    board
        .cells()
        .iter()
        .filter(|c| c.is_owned_by(player))
        .map(|c| c.charge as i32)
        .sum()
}

/// Returns the only seat owning cells, if exactly one does.
///
/// Returns `None` for an empty board or when two or more seats own cells.
pub fn sole_owner(board: &Board) -> Option<PlayerId> {
    let mut sole = None;
    for cell in board.cells() {
        match (cell.owner, sole) {
            (None, _) => {}
            (Some(p), None) => sole = Some(p),
            (Some(p), Some(s)) if p != s => return None,
            _ => {}
        }
    }
    sole
}

/// Returns the winner if the game is over: every seat has placed and a
/// single seat owns all occupied cells.
pub fn is_terminal(board: &Board, placement: &Placement) -> Option<PlayerId> {
    if !placement.all_placed() {
        return None;
    }
    sole_owner(board)
}

/// Counts `player`'s cells that have at least one orthogonal enemy
/// neighbor holding strictly less charge.
pub fn attack_count(board: &Board, player: PlayerId) -> u32 {
    let size = board.size();
    board
        .iter()
        .filter(|(_, _, cell)| cell.is_owned_by(player))
        .filter(|&(r, c, cell)| {
            neighbors(size, r, c).any(|(nr, nc)| {
                let n = board.get(nr, nc);
                n.owner.is_some_and(|o| o != player) && cell.charge > n.charge
            })
        })
        .count() as u32
}

/// Counts `player`'s cells one increment away from exploding.
pub fn defense_count(board: &Board, player: PlayerId) -> u32 {
    board
        .cells()
        .iter()
        .filter(|c| c.is_owned_by(player) && c.charge == EXPLODE_THRESHOLD - 1)
        .count() as u32
}

/// Number of cells owned by each seat, indexed by seat.
pub fn owned_cells(board: &Board, players: usize) -> Vec<u32> {
    let mut counts = vec![0u32; players];
    for cell in board.cells() {
        if let Some(slot) = cell.owner.and_then(|p| counts.get_mut(p.index())) {
            *slot += 1;
        }
    }
    counts
}
