//! Board and placement-phase state.
//!
//! `Board` is the square grid of cells; `Placement` tracks which seats have
//! made their single initial placement. Both are plain data: every change
//! goes through the validator and resolver.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, PlayerId};

/// Smallest supported board dimension.
pub const MIN_SIZE: usize = 3;

/// Largest supported board dimension.
pub const MAX_SIZE: usize = 16;

/// Square grid of cells, stored row-major.
///
/// Cloning a board is how search takes a snapshot: every branch works on
/// its own copy and never aliases the live board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty board of dimension `size`.
    pub fn new(size: usize) -> Self {
        Board {
            size,
            cells: vec![Cell::EMPTY; size * size],
        }
    }

    /// Builds a board from row-major cells. Returns `None` if the cell count
    /// is not `size * size`.
    pub fn from_cells(size: usize, cells: Vec<Cell>) -> Option<Self> {
        (cells.len() == size * size).then_some(Board { size, cells })
    }

    /// Board dimension.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns true if `(row, col)` lies on the board.
    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    /// Returns the cell at `(row, col)`. Panics if off-board.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.size + col]
    }

    /// Returns the cell at `(row, col)`, or `None` if off-board.
    pub fn try_get(&self, row: usize, col: usize) -> Option<Cell> {
        self.contains(row, col).then(|| self.get(row, col))
    }

    /// Overwrites the cell at `(row, col)`. Panics if off-board.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row * self.size + col] = cell;
    }

    /// Row-major view of all cells.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterates `(row, col, cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (i / size, i % size, cell))
    }

    /// Returns true if `player` owns at least one cell.
    pub fn has_cells(&self, player: PlayerId) -> bool {
        self.cells.iter().any(|c| c.is_owned_by(player))
    }

    /// Returns true if any cell is at or above the explosion threshold.
    pub fn has_critical(&self) -> bool {
        self.cells.iter().any(|c| c.is_critical())
    }
}

/// How off-board explosion fragments are treated while placements are
/// still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EdgeRule {
    /// Fragments return to the origin only while the exploding cell's owner
    /// has not completed their own placement.
    #[default]
    PerPlayer,
    /// Fragments return to the origin while any seat has not placed yet.
    Global,
}

/// Per-seat initial placement flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    placed: Vec<bool>,
    pub edge_rule: EdgeRule,
}

impl Placement {
    /// Fresh flags for `players` seats, nobody placed yet.
    pub fn new(players: usize) -> Self {
        Self::with_rule(players, EdgeRule::default())
    }

    /// Fresh flags using the given edge rule.
    pub fn with_rule(players: usize, edge_rule: EdgeRule) -> Self {
        Placement {
            placed: vec![false; players],
            edge_rule,
        }
    }

    /// Builds flags from explicit values.
    pub fn from_flags(placed: Vec<bool>, edge_rule: EdgeRule) -> Self {
        Placement { placed, edge_rule }
    }

    /// Number of seats.
    pub fn players(&self) -> usize {
        self.placed.len()
    }

    /// All seats in turn order.
    pub fn seats(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.placed.len() as u8).map(PlayerId)
    }

    /// Returns true if `player` has completed their initial placement.
    /// Unknown seats count as placed.
    pub fn has_placed(&self, player: PlayerId) -> bool {
        self.placed.get(player.index()).copied().unwrap_or(true)
    }

    /// Marks `player`'s placement as done. Irreversible.
    pub fn mark_placed(&mut self, player: PlayerId) {
        if let Some(flag) = self.placed.get_mut(player.index()) {
            *flag = true;
        }
    }

    /// Returns true once every seat has placed.
    pub fn all_placed(&self) -> bool {
        self.placed.iter().all(|&p| p)
    }

    /// Raw flags in seat order.
    pub fn flags(&self) -> &[bool] {
        &self.placed
    }

    /// Returns true if fragments leaving the board from an explosion owned
    /// by `owner` come back to the origin cell.
    pub fn returns_edge_fragments(&self, owner: PlayerId) -> bool {
        match self.edge_rule {
            EdgeRule::PerPlayer => !self.has_placed(owner),
            EdgeRule::Global => !self.all_placed(),
        }
    }
}
