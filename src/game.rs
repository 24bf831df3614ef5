//! Match state: configuration, turn order and the winner.
//!
//! `Game` owns the live board and placement flags and is the only place
//! the turn cursor moves. Every accepted move goes through the validator
//! and is resolved to stability before the next seat is chosen.

use serde::{Deserialize, Serialize};

use crate::board::{Board, EdgeRule, Move, Placement, PlayerId, MAX_PLAYERS, MAX_SIZE, MIN_SIZE};
use crate::eval::is_terminal;
use crate::movegen::{is_legal, legal_moves};
use crate::resolve::{play_unchecked, Resolver};

/// Fewest seats in a match.
pub const MIN_PLAYERS: usize = 2;

/// Errors raised by match bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("{what} {value} out of range {min}..={max}")]
    ConfigOutOfRange {
        what: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },

    #[error("it is {current}'s turn, not {player}'s")]
    NotYourTurn { player: PlayerId, current: PlayerId },

    #[error("game is over")]
    GameOver,

    #[error("illegal move for player {player} at ({row}, {col})")]
    IllegalMove {
        player: PlayerId,
        row: usize,
        col: usize,
    },

    #[error("player {0} has a legal move and cannot pass")]
    CannotPass(PlayerId),

    #[error("position does not match the configuration")]
    PositionMismatch,

    #[error("stale ticket")]
    StaleTicket,
}

fn check_range(what: &'static str, value: usize, min: usize, max: usize) -> Result<(), GameError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(GameError::ConfigOutOfRange {
            what,
            value,
            min,
            max,
        })
    }
}

/// Board dimension, seat count and edge rule of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: usize,
    pub players: usize,
    pub edge_rule: EdgeRule,
}

impl GameConfig {
    /// Validates size and seat count.
    pub fn new(size: usize, players: usize) -> Result<Self, GameError> {
        check_range("size", size, MIN_SIZE, MAX_SIZE)?;
        check_range("players", players, MIN_PLAYERS, MAX_PLAYERS)?;
        Ok(GameConfig {
            size,
            players,
            edge_rule: EdgeRule::default(),
        })
    }

    /// Rechecks bounds on a config that may have been built by hand.
    pub fn validate(&self) -> Result<(), GameError> {
        GameConfig::new(self.size, self.players).map(|_| ())
    }

    pub fn with_edge_rule(mut self, edge_rule: EdgeRule) -> Self {
        self.edge_rule = edge_rule;
        self
    }

    /// The usual board for `players` seats: three cells wider than the seat
    /// count.
    pub fn for_players(players: usize) -> Result<Self, GameError> {
        Self::new((players + 3).max(MIN_SIZE), players)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            size: 5,
            players: 2,
            edge_rule: EdgeRule::default(),
        }
    }
}

/// What happened on one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub player: PlayerId,
    /// `None` for a pass.
    pub mv: Option<Move>,
    pub explosions: u32,
    pub runaway: bool,
    pub winner: Option<PlayerId>,
    /// Seat to act next; `None` once the game is decided.
    pub next: Option<PlayerId>,
}

/// Identifies the position an asynchronous search was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    generation: u64,
    turn: u32,
    pub player: PlayerId,
}

/// A running match.
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    board: Board,
    placement: Placement,
    current: PlayerId,
    winner: Option<PlayerId>,
    turn: u32,
    generation: u64,
    resolver: Resolver,
}

impl Game {
    /// Starts a match on an empty board with `first` to act.
    pub fn new(config: GameConfig, first: PlayerId) -> Result<Self, GameError> {
        config.validate()?;
        check_range("first player", first.index(), 0, config.players - 1)?;
        Ok(Game {
            config,
            board: Board::new(config.size),
            placement: Placement::with_rule(config.players, config.edge_rule),
            current: first,
            winner: None,
            turn: 0,
            generation: 0,
            resolver: Resolver::new(config.size),
        })
    }

    /// Resumes a match from an arbitrary stable position.
    pub fn from_position(
        config: GameConfig,
        board: Board,
        mut placement: Placement,
        current: PlayerId,
    ) -> Result<Self, GameError> {
        config.validate()?;
        if board.size() != config.size || placement.players() != config.players {
            return Err(GameError::PositionMismatch);
        }
        check_range("current player", current.index(), 0, config.players - 1)?;
        placement.edge_rule = config.edge_rule;
        let winner = is_terminal(&board, &placement);
        Ok(Game {
            config,
            resolver: Resolver::new(config.size),
            board,
            placement,
            current,
            winner,
            turn: 0,
            generation: 0,
        })
    }

    /// Starts over with a new configuration. Tickets issued before the
    /// reset become stale.
    pub fn reset(&mut self, config: GameConfig, first: PlayerId) -> Result<(), GameError> {
        let generation = self.generation + 1;
        *self = Game::new(config, first)?;
        self.generation = generation;
        Ok(())
    }

    /// Replaces the match with a position, as `reset` does for an empty
    /// board. Tickets issued before become stale.
    pub fn restore(
        &mut self,
        config: GameConfig,
        board: Board,
        placement: Placement,
        current: PlayerId,
    ) -> Result<(), GameError> {
        let generation = self.generation + 1;
        *self = Game::from_position(config, board, placement, current)?;
        self.generation = generation;
        Ok(())
    }

    /// Hands the turn to `player` without playing. Tickets issued before
    /// become stale.
    pub fn set_current(&mut self, player: PlayerId) -> Result<(), GameError> {
        check_range("current player", player.index(), 0, self.config.players - 1)?;
        self.current = player;
        self.generation += 1;
        Ok(())
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Seat to act.
    pub fn current(&self) -> PlayerId {
        self.current
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Turns taken so far, passes included.
    pub fn turns(&self) -> u32 {
        self.turn
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Legal moves of the seat to act.
    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(&self.board, &self.placement, self.current)
    }

    /// Returns true if the seat to act has no legal move.
    pub fn must_pass(&self) -> bool {
        !self.is_over() && self.legal_moves().is_empty()
    }

    /// Captures the current position for a search that will report back
    /// later.
    pub fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.generation,
            turn: self.turn,
            player: self.current,
        }
    }

    /// Plays `player`'s move at `(row, col)`. An error leaves the game
    /// untouched.
    pub fn play(&mut self, player: PlayerId, row: usize, col: usize) -> Result<TurnReport, GameError> {
        self.check_turn(player)?;
        if !is_legal(&self.board, &self.placement, player, row, col) {
            return Err(GameError::IllegalMove { player, row, col });
        }

        let mv = Move::new(row, col, player);
        let res = play_unchecked(&mut self.board, &mut self.placement, &mut self.resolver, mv);
        if res.runaway {
            log::debug!("runaway chain after {} explosions, {} wins", res.explosions, player);
            self.winner = Some(player);
        } else {
            self.winner = is_terminal(&self.board, &self.placement);
        }
        Ok(self.finish_turn(player, Some(mv), res.explosions, res.runaway))
    }

    /// Plays a move found by a search started at `ticket`. Rejects results
    /// from an earlier game or an earlier turn.
    pub fn play_ticket(&mut self, ticket: Ticket, mv: Move) -> Result<TurnReport, GameError> {
        if ticket != self.ticket() || mv.player != ticket.player {
            return Err(GameError::StaleTicket);
        }
        self.play(mv.player, mv.row, mv.col)
    }

    /// Skips `player`'s turn. Only allowed when they have no legal move; a
    /// seat that passes without having placed loses its placement.
    pub fn pass(&mut self, player: PlayerId) -> Result<TurnReport, GameError> {
        self.check_turn(player)?;
        if !self.legal_moves().is_empty() {
            return Err(GameError::CannotPass(player));
        }
        self.placement.mark_placed(player);
        self.winner = is_terminal(&self.board, &self.placement);
        Ok(self.finish_turn(player, None, 0, false))
    }

    fn check_turn(&self, player: PlayerId) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if player != self.current {
            return Err(GameError::NotYourTurn {
                player,
                current: self.current,
            });
        }
        Ok(())
    }

    fn finish_turn(
        &mut self,
        player: PlayerId,
        mv: Option<Move>,
        explosions: u32,
        runaway: bool,
    ) -> TurnReport {
        self.turn += 1;
        let next = if self.is_over() {
            None
        } else {
            self.current = self.next_seat();
            Some(self.current)
        };
        TurnReport {
            player,
            mv,
            explosions,
            runaway,
            winner: self.winner,
            next,
        }
    }

    /// Next seat in turn order, skipping seats without cells once every
    /// seat has placed. Gives up after one lap.
    fn next_seat(&self) -> PlayerId {
        let n = self.config.players as u8;
        let after = |p: PlayerId| PlayerId((p.0 + 1) % n);
        let mut candidate = after(self.current);
        if !self.placement.all_placed() {
            return candidate;
        }
        for _ in 0..n {
            if self.board.has_cells(candidate) {
                return candidate;
            }
            candidate = after(candidate);
        }
        after(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);
    const C: PlayerId = PlayerId(2);

    fn game(size: usize, players: usize) -> Game {
        Game::new(GameConfig::new(size, players).unwrap(), A).unwrap()
    }

    #[test]
    fn config_bounds() {
        assert!(GameConfig::new(3, 2).is_ok());
        assert!(GameConfig::new(16, 8).is_ok());
        assert!(matches!(
            GameConfig::new(2, 2),
            Err(GameError::ConfigOutOfRange { what: "size", .. })
        ));
        assert!(matches!(
            GameConfig::new(5, 9),
            Err(GameError::ConfigOutOfRange { what: "players", .. })
        ));
        assert!(matches!(
            GameConfig::new(5, 1),
            Err(GameError::ConfigOutOfRange { what: "players", .. })
        ));
        assert_eq!(GameConfig::for_players(4).unwrap().size, 7);
        assert!(Game::new(GameConfig::new(5, 2).unwrap(), C).is_err());
    }

    #[test]
    fn turns_rotate() {
        let mut g = game(6, 3);
        let r = g.play(A, 0, 0).unwrap();
        assert_eq!(r.next, Some(B));
        assert_eq!(g.current(), B);
        g.play(B, 5, 5).unwrap();
        assert_eq!(g.current(), C);
        g.play(C, 0, 5).unwrap();
        assert_eq!(g.current(), A);
        assert_eq!(g.turns(), 3);
    }

    #[test]
    fn wrong_seat_is_rejected() {
        let mut g = game(5, 2);
        assert_eq!(
            g.play(B, 0, 0),
            Err(GameError::NotYourTurn {
                player: B,
                current: A
            })
        );
        assert_eq!(g.turns(), 0);
    }

    #[test]
    fn illegal_move_changes_nothing() {
        let mut g = game(5, 2);
        let before = g.board().clone();
        assert_eq!(
            g.play(A, 2, 2),
            Err(GameError::IllegalMove {
                player: A,
                row: 2,
                col: 2
            })
        );
        assert_eq!(g.board(), &before);
        assert_eq!(g.current(), A);
        assert!(!g.placement().has_placed(A));
    }

    #[test]
    fn capture_of_last_cell_wins() {
        let mut board = Board::new(3);
        board.set(0, 0, Cell::owned(A, 3));
        board.set(0, 1, Cell::owned(B, 1));
        board.set(2, 2, Cell::owned(A, 1));
        let placement = Placement::from_flags(vec![true, true], EdgeRule::PerPlayer);
        let mut g =
            Game::from_position(GameConfig::new(3, 2).unwrap(), board, placement, A).unwrap();

        let r = g.play(A, 0, 0).unwrap();
        assert_eq!(r.winner, Some(A));
        assert_eq!(r.next, None);
        assert!(g.is_over());
        assert_eq!(g.play(B, 0, 1), Err(GameError::GameOver));
    }

    #[test]
    fn runaway_wins_for_the_mover() {
        let mut board = Board::new(3);
        for (r, c, _) in Board::new(3).iter() {
            board.set(r, c, Cell::owned(A, 3));
        }
        // b has not placed, so every fragment keeps coming back.
        let placement = Placement::from_flags(vec![true, false], EdgeRule::Global);
        let config = GameConfig::new(3, 2).unwrap().with_edge_rule(EdgeRule::Global);
        let mut g = Game::from_position(config, board, placement, A).unwrap();
        assert_eq!(g.winner(), None);

        let r = g.play(A, 0, 0).unwrap();
        assert!(r.runaway);
        assert_eq!(r.winner, Some(A));
        assert_eq!(r.next, None);
        assert!(g.is_over());
        assert_eq!(g.pass(B), Err(GameError::GameOver));
    }

    #[test]
    fn no_winner_before_everyone_placed() {
        let mut g = game(5, 2);
        g.play(A, 0, 0).unwrap();
        assert_eq!(g.winner(), None);
        assert_eq!(g.current(), B);
    }

    #[test]
    fn eliminated_seats_are_skipped() {
        let mut board = Board::new(5);
        board.set(0, 0, Cell::owned(A, 1));
        board.set(4, 4, Cell::owned(C, 1));
        let placement = Placement::from_flags(vec![true; 3], EdgeRule::PerPlayer);
        let mut g =
            Game::from_position(GameConfig::new(5, 3).unwrap(), board, placement, A).unwrap();
        let r = g.play(A, 0, 0).unwrap();
        assert_eq!(r.next, Some(C));
    }

    #[test]
    fn pass_only_without_moves() {
        let mut g = game(5, 2);
        assert_eq!(g.pass(A), Err(GameError::CannotPass(A)));

        let mut board = Board::new(5);
        board.set(0, 0, Cell::owned(B, 1));
        board.set(4, 4, Cell::owned(C, 1));
        let placement = Placement::from_flags(vec![true; 3], EdgeRule::PerPlayer);
        let mut g =
            Game::from_position(GameConfig::new(5, 3).unwrap(), board, placement, A).unwrap();
        assert!(g.must_pass());
        let r = g.pass(A).unwrap();
        assert_eq!(r.mv, None);
        assert_eq!(r.next, Some(B));
    }

    #[test]
    fn tickets_go_stale() {
        let mut g = game(5, 2);
        let t = g.ticket();
        g.play(A, 0, 0).unwrap();
        assert_eq!(
            g.play_ticket(t, Move::new(4, 4, A)),
            Err(GameError::StaleTicket)
        );

        let t = g.ticket();
        g.reset(GameConfig::new(5, 2).unwrap(), B).unwrap();
        assert_eq!(g.generation(), 1);
        assert_eq!(
            g.play_ticket(t, Move::new(4, 4, B)),
            Err(GameError::StaleTicket)
        );

        let t = g.ticket();
        assert!(g.play_ticket(t, Move::new(4, 4, B)).is_ok());
    }

    #[test]
    fn generation_only_grows() {
        let mut g = game(5, 2);
        g.reset(GameConfig::new(5, 2).unwrap(), A).unwrap();
        assert_eq!(g.generation(), 1);

        let t = g.ticket();
        g.restore(GameConfig::new(4, 2).unwrap(), Board::new(4), Placement::new(2), A)
            .unwrap();
        assert_eq!(g.generation(), 2);
        assert_eq!(g.board().size(), 4);
        assert_eq!(
            g.play_ticket(t, Move::new(0, 0, A)),
            Err(GameError::StaleTicket)
        );

        let t = g.ticket();
        g.set_current(B).unwrap();
        assert_eq!(g.generation(), 3);
        assert_eq!(g.current(), B);
        assert_eq!(
            g.play_ticket(t, Move::new(0, 0, A)),
            Err(GameError::StaleTicket)
        );
        assert!(g.set_current(PlayerId(2)).is_err());
        assert_eq!(g.generation(), 3);
    }

    #[test]
    fn position_must_match_config() {
        let placement = Placement::new(2);
        let res = Game::from_position(GameConfig::new(5, 2).unwrap(), Board::new(4), placement, A);
        assert_eq!(res.err(), Some(GameError::PositionMismatch));
    }
}
