//! Engine state management.
//!
//! Holds the current match, engine options and the random source, and
//! runs the move selector for the `go` command.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::board::{EdgeRule, PlayerId};
use crate::game::{Game, GameConfig, GameError, TurnReport};
use crate::movegen::random_move;
use crate::protocol::notation::{encode_board, parse_board, NotationError};
use crate::protocol::parser::{GoParams, NewGameParams};
use crate::search::{choose_move_with_stop, SearchError, SearchParams, Selection};

/// Errors reported back to the client as `error <message>`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no game in progress")]
    NoGame,

    #[error(transparent)]
    Notation(#[from] NotationError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub game: Option<Game>,
    pub options: HashMap<String, String>,
    rng: SmallRng,
    stop: Arc<AtomicBool>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates a new engine with no game.
    pub fn new() -> Self {
        Engine {
            game: None,
            options: HashMap::new(),
            rng: SmallRng::from_entropy(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that aborts a running `go` when set from another thread. The
    /// owner clears it before handing over each `go`.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Sets an engine option. `Seed` reseeds the random source at once.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        let value = value.unwrap_or_default();
        if name == "Seed" {
            match value.parse::<u64>() {
                Ok(seed) => self.rng = SmallRng::seed_from_u64(seed),
                Err(_) => log::warn!("invalid Seed value: '{}'", value),
            }
        }
        self.options.insert(name, value);
    }

    fn option<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.options.get(name).and_then(|v| v.parse::<T>().ok())
    }

    fn edge_rule(&self) -> EdgeRule {
        match self.options.get("EdgeRule").map(String::as_str) {
            Some("global") => EdgeRule::Global,
            _ => EdgeRule::PerPlayer,
        }
    }

    /// Search limits from `go` parameters, then options, then defaults.
    fn search_params(&self, go: GoParams) -> Result<SearchParams, SearchError> {
        let defaults = SearchParams::default();
        SearchParams::new(
            go.depth
                .or_else(|| self.option("Depth"))
                .unwrap_or(defaults.depth),
            go.branching
                .or_else(|| self.option("Branching"))
                .unwrap_or(defaults.branching),
        )
    }

    /// Starts a fresh match. Missing parameters default to two players on
    /// a board three cells wider than the seat count.
    pub fn new_game(&mut self, params: NewGameParams) -> Result<(), EngineError> {
        let players = params.players.unwrap_or(2);
        let config = match params.size {
            Some(size) => GameConfig::new(size, players)?,
            None => GameConfig::for_players(players)?,
        }
        .with_edge_rule(self.edge_rule());
        let first = params.first.unwrap_or(PlayerId(0));

        match &mut self.game {
            Some(game) => game.reset(config, first)?,
            None => self.game = Some(Game::new(config, first)?),
        }
        log::debug!("new game {}x{} with {} players", config.size, config.size, players);
        Ok(())
    }

    /// Replaces the position from board notation. Seat `a` is to act until
    /// `setplayer` says otherwise.
    pub fn set_position(&mut self, notation: &str) -> Result<(), EngineError> {
        let (board, placement) = parse_board(notation, self.edge_rule())?;
        let config =
            GameConfig::new(board.size(), placement.players())?.with_edge_rule(self.edge_rule());
        match &mut self.game {
            Some(game) => game.restore(config, board, placement, PlayerId(0))?,
            None => self.game = Some(Game::from_position(config, board, placement, PlayerId(0))?),
        }
        Ok(())
    }

    /// Sets the seat to act in the current position.
    pub fn set_player(&mut self, player: PlayerId) -> Result<(), EngineError> {
        let game = self.game.as_mut().ok_or(EngineError::NoGame)?;
        game.set_current(player)?;
        Ok(())
    }

    /// Handles the handshake: writes id, options, protocol_version, and cciok.
    pub fn handle_cci<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name chainclash")?;
        writeln!(out, "id author chainclash developers")?;
        writeln!(out, "option name Depth type spin default 4 min 1 max 12")?;
        writeln!(out, "option name Branching type spin default 25 min 1 max 256")?;
        writeln!(out, "option name Seed type spin default 0 min 0 max 18446744073709551615")?;
        writeln!(out, "option name EdgeRule type combo default perplayer var perplayer var global")?;
        writeln!(out, "protocol_version 1")?;
        writeln!(out, "cciok")?;
        out.flush()
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Reports a rejected command to the client.
    pub fn write_error<W: Write>(&self, out: &mut W, err: &EngineError) -> io::Result<()> {
        log::warn!("{}", err);
        writeln!(out, "error {}", err)?;
        out.flush()
    }

    /// Plays the seat to act's move at `(row, col)`.
    pub fn handle_play<W: Write>(&mut self, row: usize, col: usize, out: &mut W) -> io::Result<()> {
        let result = match self.game.as_mut() {
            Some(game) => game.play(game.current(), row, col).map_err(EngineError::from),
            None => Err(EngineError::NoGame),
        };
        match result {
            Ok(report) => self.write_report(&report, out),
            Err(e) => self.write_error(out, &e),
        }
    }

    /// Passes for the seat to act.
    pub fn handle_pass<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let result = match self.game.as_mut() {
            Some(game) => game.pass(game.current()).map_err(EngineError::from),
            None => Err(EngineError::NoGame),
        };
        match result {
            Ok(report) => self.write_report(&report, out),
            Err(e) => self.write_error(out, &e),
        }
    }

    fn write_report<W: Write>(&self, report: &TurnReport, out: &mut W) -> io::Result<()> {
        match report.mv {
            Some(mv) => writeln!(
                out,
                "played {} {} explosions {} runaway {}",
                mv.row,
                mv.col,
                report.explosions,
                u8::from(report.runaway)
            )?,
            None => writeln!(out, "passed {}", report.player)?,
        }
        if let Some(winner) = report.winner {
            writeln!(out, "winner {}", winner)?;
        }
        out.flush()
    }

    /// Writes the position and the seat to act.
    pub fn handle_show<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let Some(game) = &self.game else {
            return self.write_error(out, &EngineError::NoGame);
        };
        writeln!(out, "board {}", encode_board(game.board(), game.placement()))?;
        match game.winner() {
            Some(winner) => writeln!(out, "winner {}", winner)?,
            None => writeln!(out, "turn {}", game.current())?,
        }
        out.flush()
    }

    /// Searches for the seat to act and writes an `info` line followed by
    /// `bestmove`. A stopped search falls back to a random legal move.
    pub fn handle_go<W: Write>(&mut self, go: GoParams, out: &mut W) -> io::Result<()> {
        let params = match self.search_params(go) {
            Ok(p) => p,
            Err(e) => return self.write_error(out, &e.into()),
        };
        let Some(game) = &self.game else {
            return self.write_error(out, &EngineError::NoGame);
        };
        if game.is_over() {
            return self.write_error(out, &GameError::GameOver.into());
        }

        let player = game.current();
        let result = choose_move_with_stop(
            game.board(),
            game.placement(),
            player,
            &params,
            &mut self.rng,
            &self.stop,
        );

        let mv = match result {
            Ok(Some(selection)) => {
                write_info(out, &params, &selection)?;
                Some(selection.mv)
            }
            Ok(None) => None,
            Err(SearchError::Aborted) => {
                log::info!("search stopped, playing a random move");
                random_move(game.board(), game.placement(), player, &mut self.rng)
            }
            Err(e) => return self.write_error(out, &e.into()),
        };

        match mv {
            Some(mv) => writeln!(out, "bestmove {} {}", mv.row, mv.col)?,
            None => writeln!(out, "bestmove pass")?,
        }
        out.flush()
    }
}

fn write_info<W: Write>(out: &mut W, params: &SearchParams, selection: &Selection) -> io::Result<()> {
    writeln!(
        out,
        "info depth {} nodes {} score {} time {} atk {} def {}",
        params.depth,
        selection.nodes,
        selection.score,
        selection.elapsed_ms,
        selection.atk,
        selection.def
    )
}
