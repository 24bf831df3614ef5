//! Chain-reaction resolution.
//!
//! Every round collects all cells at or above the explosion threshold from
//! the pre-round board, empties them, then spreads `charge - 3` to each
//! on-board orthogonal neighbor, capturing it for the exploding owner.
//! Fragments that would leave the board are lost, except while the
//! placement rule says they return: then the origin receives one charge
//! per off-board direction. Rounds repeat until the board is stable or the
//! round cap is hit, which is reported as a runaway.

use crate::board::{
    neighbors, off_board_directions, Board, Cell, Placement, PlayerId, MAX_CHARGE, PAYLOAD_BASE,
};

/// Round cap for a board of dimension `size`.
pub const fn max_rounds(size: usize) -> usize {
    size * 3
}

/// Summary of a full resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    /// Individual cell explosions across all rounds.
    pub explosions: u32,
    /// Rounds executed.
    pub rounds: u32,
    /// The chain was still going when the round cap was reached.
    pub runaway: bool,
}

/// One cell exploding within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Explosion {
    pub row: usize,
    pub col: usize,
    pub owner: PlayerId,
    /// Charge sent to each on-board neighbor.
    pub payload: u8,
    /// Charge returned to the origin for off-board directions.
    pub returned: u8,
}

/// Reusable resolver that keeps its per-round buffer between calls.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    exploding: Vec<Explosion>,
}

impl Resolver {
    /// Creates a resolver with room for `capacity` explosions per round.
    pub fn new(capacity: usize) -> Self {
        Resolver {
            exploding: Vec::with_capacity(capacity),
        }
    }

    /// Resolves `board` in place until it is stable or the round cap is hit.
    ///
    /// A board with no critical cell is returned untouched with zero
    /// explosions.
    pub fn resolve(&mut self, board: &mut Board, placement: &Placement) -> Resolution {
        let cap = max_rounds(board.size());
        let mut summary = Resolution::default();
        loop {
            if !board.has_critical() {
                return summary;
            }
            if summary.rounds as usize >= cap {
                summary.runaway = true;
                return summary;
            }
            summary.explosions += self.step(board, placement) as u32;
            summary.rounds += 1;
        }
    }

    /// Resolves a single round and returns how many cells exploded.
    pub fn step(&mut self, board: &mut Board, placement: &Placement) -> usize {
        self.collect(board, placement);

        for e in &self.exploding {
            board.set(e.row, e.col, Cell::EMPTY);
        }

        let size = board.size();
        for e in &self.exploding {
            for (r, c) in neighbors(size, e.row, e.col) {
                add_charge(board, r, c, e.payload, e.owner);
            }
            if e.returned > 0 {
                add_charge(board, e.row, e.col, e.returned, e.owner);
            }
        }

        self.exploding.len()
    }

    /// Explosions of the most recent round, in row-major order.
    pub fn last_round(&self) -> &[Explosion] {
        &self.exploding
    }

    /// Snapshots the explosion set from the pre-round board.
    fn collect(&mut self, board: &mut Board, placement: &Placement) {
        self.exploding.clear();
        let size = board.size();
        for row in 0..size {
            for col in 0..size {
                let cell = board.get(row, col);
                if !cell.is_critical() {
                    continue;
                }
                let Some(owner) = cell.owner else {
                    // Charge without an owner cannot propagate.
                    board.set(row, col, Cell::EMPTY);
                    continue;
                };
                let returned = if placement.returns_edge_fragments(owner) {
                    off_board_directions(size, row, col)
                } else {
                    0
                };
                self.exploding.push(Explosion {
                    row,
                    col,
                    owner,
                    payload: cell.charge - PAYLOAD_BASE,
                    returned,
                });
            }
        }
    }
}

/// Adds charge to a cell, clamping at `MAX_CHARGE` and capturing it.
fn add_charge(board: &mut Board, row: usize, col: usize, amount: u8, owner: PlayerId) {
    let cell = board.get(row, col);
    board.set(
        row,
        col,
        Cell {
            charge: cell.charge.saturating_add(amount).min(MAX_CHARGE),
            owner: Some(owner),
        },
    );
}

/// Resolves `board` in place with a fresh resolver.
pub fn resolve(board: &mut Board, placement: &Placement) -> Resolution {
    Resolver::new(board.size()).resolve(board, placement)
}
