//! AI move selection.
//!
//! Ranks the acting seat's legal moves by immediate material gain, keeps
//! the top `branching`, and searches each against the coalition's reply.
//! A forced win short-circuits to the fastest one; otherwise candidates
//! are ranked by search score, then attack and defense counts. Exact ties
//! are broken by the injected random source.

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;

use crate::board::{Board, Move, Placement, PlayerId};
use crate::eval::{attack_count, defense_count, total_owned};
use crate::movegen::legal_moves;

use super::minimax::{Mover, Searcher};
use super::outcome::Outcome;

/// Default plies of lookahead, counting the AI's own move.
pub const DEFAULT_DEPTH: u32 = 4;

/// Default number of candidates explored per node.
pub const DEFAULT_BRANCHING: usize = 25;

/// Errors from configuring or running a move search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("search depth must be at least 1, got {0}")]
    DepthOutOfRange(u32),

    #[error("branching cap must be at least 1, got {0}")]
    BranchingOutOfRange(usize),

    #[error("search aborted")]
    Aborted,
}

/// Search limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    pub depth: u32,
    pub branching: usize,
}

impl SearchParams {
    /// Validates and builds search limits.
    pub fn new(depth: u32, branching: usize) -> Result<Self, SearchError> {
        if depth < 1 {
            return Err(SearchError::DepthOutOfRange(depth));
        }
        if branching < 1 {
            return Err(SearchError::BranchingOutOfRange(branching));
        }
        Ok(SearchParams { depth, branching })
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            depth: DEFAULT_DEPTH,
            branching: DEFAULT_BRANCHING,
        }
    }
}

/// A ranked root candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub mv: Move,
    /// Material change from this move alone.
    pub gain: Outcome,
    pub explosions: u32,
    /// Search result relative to the material before the move.
    pub score: Outcome,
    pub atk: u32,
    pub def: u32,
}

/// The chosen move with the statistics behind it.
#[derive(Debug, Clone)]
pub struct Selection {
    pub mv: Move,
    pub score: Outcome,
    /// Plies to the forced win, if the score is one.
    pub winning_plies: Option<u32>,
    pub atk: u32,
    pub def: u32,
    /// Candidates that survived the branching cap.
    pub candidates: usize,
    pub nodes: u64,
    /// True if the move was picked as a forced win.
    pub forced_win: bool,
    pub elapsed_ms: u64,
}

/// Picks a move for `player`, or `None` if the seat must pass.
pub fn choose_move(
    board: &Board,
    placement: &Placement,
    player: PlayerId,
    params: &SearchParams,
    rng: &mut impl Rng,
) -> Option<Move> {
    let stop = AtomicBool::new(false);
    choose_move_with_stop(board, placement, player, params, rng, &stop)
        .ok()
        .flatten()
        .map(|s| s.mv)
}

/// Like `choose_move`, but abandons the search once `stop` is set and
/// reports full statistics. Inputs are never modified.
pub fn choose_move_with_stop(
    board: &Board,
    placement: &Placement,
    player: PlayerId,
    params: &SearchParams,
    rng: &mut impl Rng,
    stop: &AtomicBool,
) -> Result<Option<Selection>, SearchError> {
    let start = Instant::now();
    let moves = legal_moves(board, placement, player);
    if moves.is_empty() {
        return Ok(None);
    }

    let before = total_owned(board, player);
    let mut children = Searcher::new(params.branching, stop).expand(board, placement, &moves, player);
    children.sort_by(|a, b| {
        let ga = a.immediate.relative_to(before);
        let gb = b.immediate.relative_to(before);
        gb.cmp(&ga).then(b.explosions.cmp(&a.explosions))
    });
    children.truncate(params.branching);

    let scored: Vec<(Candidate, u64)> = children
        .par_iter()
        .map(|child| {
            let gain = child.immediate.relative_to(before);
            let (score, nodes) = if child.runaway {
                (child.immediate, 0)
            } else {
                let mut searcher = Searcher::new(params.branching, stop);
                let value = searcher
                    .search(
                        &child.board,
                        &child.placement,
                        Mover::Coalition,
                        params.depth - 1,
                        Outcome::WORST,
                        Outcome::BEST,
                        player,
                    )
                    .deeper();
                (value.relative_to(before), searcher.nodes())
            };
            let candidate = Candidate {
                mv: child.mv,
                gain,
                explosions: child.explosions,
                score,
                atk: attack_count(&child.board, player),
                def: defense_count(&child.board, player),
            };
            (candidate, nodes)
        })
        .collect();

    if stop.load(std::sync::atomic::Ordering::Relaxed) {
        return Err(SearchError::Aborted);
    }

    let nodes: u64 = scored.iter().map(|(_, n)| n).sum::<u64>() + moves.len() as u64;
    let candidates: Vec<Candidate> = scored.into_iter().map(|(c, _)| c).collect();
    let forced_win = candidates.iter().any(|c| c.score.is_win());

    let pool: Vec<&Candidate> = if forced_win {
        // Outcome ordering already puts the fewest plies first.
        let best = candidates.iter().map(|c| c.score).max();
        candidates.iter().filter(|c| Some(c.score) == best).collect()
    } else {
        let key = |c: &Candidate| (c.score, c.atk, c.def);
        let best = candidates.iter().map(key).max();
        candidates.iter().filter(|c| Some(key(c)) == best).collect()
    };

    let Some(chosen) = pool.choose(rng).copied() else {
        return Ok(None);
    };

    log::debug!(
        "player {} picks ({}, {}) score {} atk {} def {} over {} candidates, {} nodes",
        player,
        chosen.mv.row,
        chosen.mv.col,
        chosen.score,
        chosen.atk,
        chosen.def,
        candidates.len(),
        nodes
    );

    Ok(Some(Selection {
        mv: chosen.mv,
        score: chosen.score,
        winning_plies: chosen.score.is_win().then(|| chosen.score.plies()).flatten(),
        atk: chosen.atk,
        def: chosen.def,
        candidates: candidates.len(),
        nodes,
        forced_win,
        elapsed_ms: start.elapsed().as_millis() as u64,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, EdgeRule};
    use crate::movegen::is_legal;
    use crate::protocol::notation::parse_board;
    use crate::resolve::apply_move;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);

    fn placed(n: usize) -> Placement {
        Placement::from_flags(vec![true; n], EdgeRule::PerPlayer)
    }

    /// A can capture B's last cell by charging (0,0).
    fn one_move_from_win() -> Board {
        let mut board = Board::new(3);
        board.set(0, 0, Cell::owned(A, 3));
        board.set(0, 1, Cell::owned(B, 1));
        board.set(2, 2, Cell::owned(A, 1));
        board
    }

    #[test]
    fn params_validate() {
        assert!(SearchParams::new(1, 1).is_ok());
        assert_eq!(SearchParams::new(0, 5), Err(SearchError::DepthOutOfRange(0)));
        assert_eq!(
            SearchParams::new(3, 0),
            Err(SearchError::BranchingOutOfRange(0))
        );
        assert_eq!(SearchParams::default().branching, 25);
    }

    #[test]
    fn picks_forced_win() {
        let board = one_move_from_win();
        let params = SearchParams::new(2, 25).unwrap();
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let stop = AtomicBool::new(false);
            let sel = choose_move_with_stop(&board, &placed(2), A, &params, &mut rng, &stop)
                .unwrap()
                .unwrap();
            assert_eq!(sel.mv, Move::new(0, 0, A));
            assert!(sel.forced_win);
            assert_eq!(sel.score, Outcome::Win { plies: 1 });
            assert_eq!(sel.winning_plies, Some(1));
        }
    }

    #[test]
    fn picks_the_runaway_move() {
        // (0, 2) is the only move whose chain never settles.
        let (board, placement) =
            parse_board("10/.,a3,a3/.,a3,a3/a3,a3,a1", EdgeRule::Global).unwrap();
        let params = SearchParams::new(2, 25).unwrap();
        for seed in 0..4 {
            let mut rng = StdRng::seed_from_u64(seed);
            let stop = AtomicBool::new(false);
            let sel = choose_move_with_stop(&board, &placement, A, &params, &mut rng, &stop)
                .unwrap()
                .unwrap();
            assert_eq!(sel.mv, Move::new(0, 2, A));
            assert!(sel.forced_win);
            assert_eq!(sel.score, Outcome::Win { plies: 1 });
            assert_eq!(sel.winning_plies, Some(1));
            assert!(apply_move(&board, &placement, A, 0, 2).unwrap().runaway);
        }
    }

    #[test]
    fn picks_forced_win_at_depth_one() {
        let board = one_move_from_win();
        let params = SearchParams::new(1, 25).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            choose_move(&board, &placed(2), A, &params, &mut rng),
            Some(Move::new(0, 0, A))
        );
    }

    #[test]
    fn pass_when_no_moves() {
        let mut board = Board::new(4);
        board.set(0, 0, Cell::owned(B, 1));
        let mut rng = StdRng::seed_from_u64(0);
        let params = SearchParams::default();
        assert_eq!(choose_move(&board, &placed(2), A, &params, &mut rng), None);
    }

    #[test]
    fn placement_choice_is_legal_and_seeded() {
        let board = Board::new(6);
        let placement = Placement::new(3);
        let params = SearchParams::new(2, 6).unwrap();
        let a = choose_move(&board, &placement, B, &params, &mut StdRng::seed_from_u64(11));
        let b = choose_move(&board, &placement, B, &params, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
        let mv = a.unwrap();
        assert_eq!(mv.player, B);
        assert!(is_legal(&board, &placement, B, mv.row, mv.col));
    }

    #[test]
    fn avoids_feeding_a_capture() {
        // Charging (3,0) to 3 leaves it next to B's 3 at (3,1); charging
        // (0,3) is far away. B answers by exploding (3,1) either way, but
        // only the first lets B take the charged cell.
        let mut board = Board::new(4);
        board.set(0, 3, Cell::owned(A, 1));
        board.set(3, 0, Cell::owned(A, 2));
        board.set(3, 1, Cell::owned(B, 3));
        board.set(0, 0, Cell::owned(B, 1));
        let params = SearchParams::new(2, 25).unwrap();
        let mv = choose_move(&board, &placed(2), A, &params, &mut StdRng::seed_from_u64(5));
        assert_eq!(mv, Some(Move::new(0, 3, A)));
    }

    #[test]
    fn stop_flag_aborts() {
        let board = one_move_from_win();
        let stop = AtomicBool::new(true);
        let mut rng = StdRng::seed_from_u64(0);
        let res = choose_move_with_stop(
            &board,
            &placed(2),
            A,
            &SearchParams::default(),
            &mut rng,
            &stop,
        );
        assert_eq!(res.unwrap_err(), SearchError::Aborted);
    }
}
