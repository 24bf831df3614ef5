//! Round-by-round resolution for presentation.
//!
//! `Rounds` owns a snapshot and yields the board after every explosion
//! round, so an animation layer can pace the chain however it likes. The
//! iterator is `Clone`: cloning it before iterating gives a restartable
//! sequence.

use crate::board::{Board, Placement};

use super::chain::{max_rounds, Explosion, Resolver};

/// The board after one explosion round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    /// Zero-based round number.
    pub index: usize,
    /// Cells that exploded in this round.
    pub explosions: Vec<Explosion>,
    /// Board state once the round's fragments have landed.
    pub board: Board,
}

/// Lazy sequence of resolution rounds.
#[derive(Debug, Clone)]
pub struct Rounds {
    board: Board,
    placement: Placement,
    resolver: Resolver,
    index: usize,
    cap: usize,
}

impl Rounds {
    /// Starts a sequence over a copy of `board`.
    pub fn new(board: &Board, placement: &Placement) -> Self {
        Rounds {
            board: board.clone(),
            placement: placement.clone(),
            resolver: Resolver::new(board.size()),
            index: 0,
            cap: max_rounds(board.size()),
        }
    }

    /// Returns true once the sequence stopped at the round cap with cells
    /// still critical.
    pub fn is_runaway(&self) -> bool {
        self.index >= self.cap && self.board.has_critical()
    }

    /// The board as of the last yielded round.
    pub fn board(&self) -> &Board {
        &self.board
    }
}

impl Iterator for Rounds {
    type Item = Round;

    fn next(&mut self) -> Option<Round> {
        if self.index >= self.cap || !self.board.has_critical() {
            return None;
        }
        self.resolver.step(&mut self.board, &self.placement);
        let round = Round {
            index: self.index,
            explosions: self.resolver.last_round().to_vec(),
            board: self.board.clone(),
        };
        self.index += 1;
        Some(round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, EdgeRule, PlayerId};
    use crate::resolve::resolve;

    #[test]
    fn last_round_matches_full_resolution() {
        let mut board = Board::new(5);
        board.set(2, 2, Cell::owned(PlayerId(0), 4));
        board.set(2, 3, Cell::owned(PlayerId(1), 3));
        let placement = Placement::from_flags(vec![true, true], EdgeRule::PerPlayer);

        let rounds: Vec<Round> = Rounds::new(&board, &placement).collect();
        let mut resolved = board.clone();
        let summary = resolve(&mut resolved, &placement);

        assert_eq!(rounds.len(), summary.rounds as usize);
        assert_eq!(rounds.last().map(|r| &r.board), Some(&resolved));
        let total: usize = rounds.iter().map(|r| r.explosions.len()).sum();
        assert_eq!(total, summary.explosions as usize);
    }

    #[test]
    fn clone_restarts_sequence() {
        let mut board = Board::new(4);
        board.set(0, 0, Cell::owned(PlayerId(0), 5));
        let placement = Placement::new(2);
        let rounds = Rounds::new(&board, &placement);
        let first: Vec<_> = rounds.clone().collect();
        let second: Vec<_> = rounds.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn stable_board_yields_nothing() {
        let board = Board::new(4);
        let mut rounds = Rounds::new(&board, &Placement::new(2));
        assert!(rounds.next().is_none());
        assert!(!rounds.is_runaway());
    }
}
