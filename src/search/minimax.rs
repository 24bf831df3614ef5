//! Coalition minimax with alpha-beta pruning.
//!
//! The focus seat maximizes its material; every other seat is merged into
//! one minimizing coalition whose ply is a single move by any of its
//! members. Candidates are applied and resolved once for ordering, then
//! only the best `branching` of them are searched further. A candidate
//! whose chain runs away is decisive for its owner.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::board::{Board, Move, Placement, PlayerId};
use crate::eval::{is_terminal, total_owned};
use crate::movegen::{coalition_moves, legal_moves};
use crate::resolve::{play_unchecked, Resolver};

use super::outcome::Outcome;

/// Which side moves at a search node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mover {
    Focus,
    Coalition,
}

impl Mover {
    pub const fn other(self) -> Mover {
        match self {
            Mover::Focus => Mover::Coalition,
            Mover::Coalition => Mover::Focus,
        }
    }
}

/// A candidate after one application and resolution.
#[derive(Debug, Clone)]
pub(crate) struct Child {
    pub mv: Move,
    pub board: Board,
    pub placement: Placement,
    pub immediate: Outcome,
    pub explosions: u32,
    pub runaway: bool,
}

/// Depth- and width-bounded tree walker.
///
/// Every node works on its own snapshots, so abandoning a search through
/// the stop flag never leaves anything half-modified.
pub struct Searcher<'a> {
    branching: usize,
    stop: &'a AtomicBool,
    nodes: u64,
    resolver: Resolver,
}

impl<'a> Searcher<'a> {
    /// Creates a searcher exploring at most `branching` candidates per node.
    pub fn new(branching: usize, stop: &'a AtomicBool) -> Self {
        Searcher {
            branching: branching.max(1),
            stop,
            nodes: 0,
            resolver: Resolver::new(16),
        }
    }

    /// Nodes visited so far.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Returns true once the caller asked the search to stop.
    pub fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Evaluates the position for `focus` with `mover` to play and `depth`
    /// plies left, inside the `(alpha, beta)` window.
    pub fn search(
        &mut self,
        board: &Board,
        placement: &Placement,
        mover: Mover,
        depth: u32,
        mut alpha: Outcome,
        mut beta: Outcome,
        focus: PlayerId,
    ) -> Outcome {
        self.nodes += 1;

        if let Some(winner) = is_terminal(board, placement) {
            return if winner == focus {
                Outcome::Win { plies: 0 }
            } else {
                Outcome::Loss { plies: 0 }
            };
        }
        if depth == 0 || self.stopped() {
            return Outcome::Value(total_owned(board, focus));
        }

        let moves = match mover {
            Mover::Focus => legal_moves(board, placement, focus),
            Mover::Coalition => coalition_moves(board, placement, focus),
        };
        if moves.is_empty() {
            // Pass: the other side moves, the ply is still spent.
            return self.search(board, placement, mover.other(), depth - 1, alpha, beta, focus);
        }

        let mut children = self.expand(board, placement, &moves, focus);
        match mover {
            Mover::Focus => children.sort_by(|a, b| b.immediate.cmp(&a.immediate)),
            Mover::Coalition => children.sort_by(|a, b| a.immediate.cmp(&b.immediate)),
        }
        children.truncate(self.branching);

        if let Some(first) = children.first() {
            if first.runaway {
                return first.immediate;
            }
        }

        let mut best = match mover {
            Mover::Focus => Outcome::WORST,
            Mover::Coalition => Outcome::BEST,
        };
        for child in &children {
            let value = self
                .search(
                    &child.board,
                    &child.placement,
                    mover.other(),
                    depth - 1,
                    alpha.shallower(),
                    beta.shallower(),
                    focus,
                )
                .deeper();
            match mover {
                Mover::Focus => {
                    best = best.max(value);
                    alpha = alpha.max(best);
                }
                Mover::Coalition => {
                    best = best.min(value);
                    beta = beta.min(best);
                }
            }
            if alpha >= beta {
                break;
            }
        }
        best
    }

    /// Applies and resolves every move on its own snapshot.
    pub(crate) fn expand(
        &mut self,
        board: &Board,
        placement: &Placement,
        moves: &[Move],
        focus: PlayerId,
    ) -> Vec<Child> {
        moves
            .iter()
            .map(|&mv| {
                let mut next = board.clone();
                let mut next_placement = placement.clone();
                let res = play_unchecked(&mut next, &mut next_placement, &mut self.resolver, mv);
                let immediate = if res.runaway {
                    if mv.player == focus {
                        Outcome::Win { plies: 1 }
                    } else {
                        Outcome::Loss { plies: 1 }
                    }
                } else {
                    Outcome::Value(total_owned(&next, focus))
                };
                Child {
                    mv,
                    board: next,
                    placement: next_placement,
                    immediate,
                    explosions: res.explosions,
                    runaway: res.runaway,
                }
            })
            .collect()
    }
}

/// Full-window search from `mover`'s ply. Convenience wrapper around
/// `Searcher` with no stop flag.
pub fn minimax(
    board: &Board,
    placement: &Placement,
    mover: Mover,
    depth: u32,
    focus: PlayerId,
    branching: usize,
) -> Outcome {
    let stop = AtomicBool::new(false);
    Searcher::new(branching, &stop).search(
        board,
        placement,
        mover,
        depth,
        Outcome::WORST,
        Outcome::BEST,
        focus,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, EdgeRule};
    use crate::movegen::random_move;
    use crate::protocol::notation::parse_board;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);
    const C: PlayerId = PlayerId(2);

    fn placed(n: usize) -> Placement {
        Placement::from_flags(vec![true; n], EdgeRule::PerPlayer)
    }

    /// Same tree as `Searcher::search` without cutoffs.
    fn plain(
        s: &mut Searcher<'_>,
        board: &Board,
        placement: &Placement,
        mover: Mover,
        depth: u32,
        focus: PlayerId,
    ) -> Outcome {
        if let Some(w) = is_terminal(board, placement) {
            return if w == focus {
                Outcome::Win { plies: 0 }
            } else {
                Outcome::Loss { plies: 0 }
            };
        }
        if depth == 0 {
            return Outcome::Value(total_owned(board, focus));
        }
        let moves = match mover {
            Mover::Focus => legal_moves(board, placement, focus),
            Mover::Coalition => coalition_moves(board, placement, focus),
        };
        if moves.is_empty() {
            return plain(s, board, placement, mover.other(), depth - 1, focus);
        }
        let mut children = s.expand(board, placement, &moves, focus);
        match mover {
            Mover::Focus => children.sort_by(|a, b| b.immediate.cmp(&a.immediate)),
            Mover::Coalition => children.sort_by(|a, b| a.immediate.cmp(&b.immediate)),
        }
        children.truncate(s.branching);
        if children[0].runaway {
            return children[0].immediate;
        }
        let values = children
            .iter()
            .map(|c| plain(s, &c.board, &c.placement, mover.other(), depth - 1, focus).deeper());
        match mover {
            Mover::Focus => values.max().unwrap(),
            Mover::Coalition => values.min().unwrap(),
        }
    }

    #[test]
    fn depth_zero_is_material() {
        let mut board = Board::new(4);
        board.set(0, 0, Cell::owned(A, 3));
        board.set(3, 3, Cell::owned(B, 2));
        let v = minimax(&board, &placed(2), Mover::Focus, 0, A, 25);
        assert_eq!(v, Outcome::Value(3));
    }

    #[test]
    fn terminal_is_decisive_regardless_of_depth() {
        let mut board = Board::new(4);
        board.set(0, 0, Cell::owned(B, 1));
        assert_eq!(
            minimax(&board, &placed(2), Mover::Focus, 5, A, 25),
            Outcome::Loss { plies: 0 }
        );
        assert_eq!(
            minimax(&board, &placed(2), Mover::Focus, 5, B, 25),
            Outcome::Win { plies: 0 }
        );
    }

    #[test]
    fn focus_runaway_is_an_immediate_win() {
        // Only (0, 2) runs away while b still has to place.
        let (board, placement) =
            parse_board("10/.,a3,a3/.,a3,a3/a3,a3,a1", EdgeRule::Global).unwrap();
        for depth in 1..=3 {
            assert_eq!(
                minimax(&board, &placement, Mover::Focus, depth, A, 25),
                Outcome::Win { plies: 1 }
            );
        }
    }

    #[test]
    fn coalition_runaway_is_an_immediate_loss() {
        let (board, placement) =
            parse_board("01/b3,b3,b3/b3,b3,b3/b3,b3,b3", EdgeRule::Global).unwrap();
        assert_eq!(
            minimax(&board, &placement, Mover::Coalition, 1, A, 25),
            Outcome::Loss { plies: 1 }
        );
        // a has no room to place and passes without spending a ply.
        assert_eq!(
            minimax(&board, &placement, Mover::Focus, 2, A, 25),
            Outcome::Loss { plies: 1 }
        );
    }

    #[test]
    fn coalition_finds_capture() {
        let mut board = Board::new(4);
        board.set(0, 0, Cell::owned(A, 1));
        board.set(0, 1, Cell::owned(B, 3));
        let v = minimax(&board, &placed(2), Mover::Coalition, 1, A, 25);
        assert_eq!(v, Outcome::Loss { plies: 1 });
    }

    #[test]
    fn focus_finds_capture() {
        let mut board = Board::new(4);
        board.set(0, 0, Cell::owned(A, 3));
        board.set(0, 1, Cell::owned(B, 1));
        board.set(3, 3, Cell::owned(A, 1));
        let v = minimax(&board, &placed(2), Mover::Focus, 2, A, 25);
        assert_eq!(v, Outcome::Win { plies: 1 });
    }

    #[test]
    fn pass_spends_a_ply() {
        let mut board = Board::new(5);
        board.set(0, 0, Cell::owned(B, 1));
        board.set(4, 4, Cell::owned(C, 1));
        let stop = AtomicBool::new(false);
        let mut s = Searcher::new(25, &stop);
        let v = s.search(
            &board,
            &placed(3),
            Mover::Focus,
            1,
            Outcome::WORST,
            Outcome::BEST,
            A,
        );
        assert_eq!(v, Outcome::Value(0));
        assert_eq!(s.nodes(), 2);
    }

    #[test]
    fn stop_flag_returns_static_value() {
        let mut board = Board::new(5);
        board.set(0, 0, Cell::owned(A, 2));
        board.set(4, 4, Cell::owned(B, 1));
        let stop = AtomicBool::new(true);
        let mut s = Searcher::new(25, &stop);
        let v = s.search(
            &board,
            &placed(2),
            Mover::Focus,
            6,
            Outcome::WORST,
            Outcome::BEST,
            A,
        );
        assert_eq!(v, Outcome::Value(2));
        assert_eq!(s.nodes(), 1);
    }

    #[test]
    fn pruning_matches_plain_minimax() {
        for seed in 0..6u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::new(5);
            let mut placement = Placement::new(3);
            let mut resolver = Resolver::default();
            for turn in 0..9u8 {
                let player = PlayerId(turn % 3);
                if let Some(mv) = random_move(&board, &placement, player, &mut rng) {
                    play_unchecked(&mut board, &mut placement, &mut resolver, mv);
                } else {
                    placement.mark_placed(player);
                }
            }

            let stop = AtomicBool::new(false);
            for mover in [Mover::Focus, Mover::Coalition] {
                let pruned = minimax(&board, &placement, mover, 3, A, 4);
                let mut s = Searcher::new(4, &stop);
                let reference = plain(&mut s, &board, &placement, mover, 3, A);
                assert_eq!(pruned, reference, "seed {} mover {:?}", seed, mover);
            }
        }
    }
}
