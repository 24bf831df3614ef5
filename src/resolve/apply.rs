//! Applying a move and stabilizing the result.

use crate::board::{Board, Cell, Move, Placement, PlayerId, MAX_CHARGE, PLACEMENT_CHARGE};
use crate::movegen::is_legal;

use super::chain::{Resolution, Resolver};

/// Errors raised when applying a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("illegal move for player {player} at ({row}, {col})")]
    Illegal {
        player: PlayerId,
        row: usize,
        col: usize,
    },
}

/// A fully resolved move: new snapshots plus chain metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: Board,
    pub placement: Placement,
    pub explosions: u32,
    pub runaway: bool,
}

/// Validates and applies `player`'s move at `(row, col)`, resolving the
/// chain to stability. The inputs are never modified; an illegal move
/// returns an error and no outcome.
pub fn apply_move(
    board: &Board,
    placement: &Placement,
    player: PlayerId,
    row: usize,
    col: usize,
) -> Result<MoveOutcome, MoveError> {
    if !is_legal(board, placement, player, row, col) {
        return Err(MoveError::Illegal { player, row, col });
    }
    let mut board = board.clone();
    let mut placement = placement.clone();
    let mut resolver = Resolver::new(board.size());
    let res = play_unchecked(
        &mut board,
        &mut placement,
        &mut resolver,
        Move::new(row, col, player),
    );
    Ok(MoveOutcome {
        board,
        placement,
        explosions: res.explosions,
        runaway: res.runaway,
    })
}

/// Writes `mv` onto the board and resolves in place. The caller guarantees
/// legality.
///
/// The mover's placement flag stays unset while their placement chain
/// resolves and is set afterwards.
pub fn play_unchecked(
    board: &mut Board,
    placement: &mut Placement,
    resolver: &mut Resolver,
    mv: Move,
) -> Resolution {
    let cell = board.get(mv.row, mv.col);
    let charge = if placement.has_placed(mv.player) {
        cell.charge.saturating_add(1).min(MAX_CHARGE)
    } else {
        PLACEMENT_CHARGE
    };
    board.set(mv.row, mv.col, Cell::owned(mv.player, charge));
    let res = resolver.resolve(board, placement);
    placement.mark_placed(mv.player);
    res
}
