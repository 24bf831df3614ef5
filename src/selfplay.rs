//! Self-play match generation.
//!
//! Plays complete AI-vs-AI matches, every seat driven by the move selector,
//! and records each turn with the position it was played from. Games can
//! run concurrently on a rayon pool; each game seeds its own random source
//! from the configured seed and its id, so a seeded run reproduces the same
//! records regardless of thread count.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::board::{EdgeRule, Move, PlayerId};
use crate::eval::owned_cells;
use crate::game::{Game, GameConfig, GameError};
use crate::movegen::random_move;
use crate::protocol::notation::encode_board;
use crate::search::{choose_move, SearchError, SearchParams};

/// Errors that prevent a self-play run from starting.
#[derive(Debug, thiserror::Error)]
pub enum SelfPlayError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration for self-play match generation.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Board dimension; `None` picks three more than the seat count.
    pub size: Option<usize>,
    pub players: usize,
    pub edge_rule: EdgeRule,
    /// Search depth in plies.
    pub depth: u32,
    /// Candidates searched per node.
    pub branching: usize,
    /// Probability of replacing the searched move with a random legal one.
    pub exploration: f64,
    /// Turns after which an undecided game is abandoned.
    pub max_turns: u32,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress logging.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            size: None,
            players: 2,
            edge_rule: EdgeRule::default(),
            depth: 3,
            branching: 12,
            exploration: 0.0,
            max_turns: 400,
            threads: 4,
            seed: 0,
            quiet: false,
        }
    }
}

impl SelfPlayConfig {
    /// Validated match configuration.
    pub fn game_config(&self) -> Result<GameConfig, GameError> {
        let config = match self.size {
            Some(size) => GameConfig::new(size, self.players)?,
            None => GameConfig::for_players(self.players)?,
        };
        Ok(config.with_edge_rule(self.edge_rule))
    }

    /// Validated search limits.
    pub fn search_params(&self) -> Result<SearchParams, SearchError> {
        SearchParams::new(self.depth, self.branching)
    }

    fn rng_for(&self, game_id: usize) -> SmallRng {
        if self.seed != 0 {
            SmallRng::seed_from_u64(self.seed.wrapping_add(game_id as u64))
        } else {
            SmallRng::from_entropy()
        }
    }
}

/// One turn of a recorded game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Board notation before the turn.
    pub position: String,
    pub player: PlayerId,
    /// `None` for a pass.
    pub mv: Option<Move>,
    pub explosions: u32,
    pub runaway: bool,
    /// The move was drawn at random instead of searched.
    pub explored: bool,
}

/// A complete self-play game record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Sequential game ID.
    pub game_id: usize,
    pub config: GameConfig,
    pub first: PlayerId,
    pub turns: Vec<TurnRecord>,
    /// `None` if the game hit the turn cap undecided.
    pub winner: Option<PlayerId>,
    /// Board notation of the final position.
    pub final_position: String,
    /// Cells owned by each seat at the end.
    pub final_cells: Vec<u32>,
}

/// Plays a single self-play game and returns its record.
pub fn play_game(
    config: &SelfPlayConfig,
    game_id: usize,
    rng: &mut SmallRng,
) -> Result<GameRecord, SelfPlayError> {
    let game_config = config.game_config()?;
    let params = config.search_params()?;
    let first = PlayerId((game_id % game_config.players) as u8);
    let mut game = Game::new(game_config, first)?;
    let mut turns = Vec::new();

    while !game.is_over() && game.turns() < config.max_turns {
        let ticket = game.ticket();
        let player = ticket.player;
        let position = encode_board(game.board(), game.placement());

        let explored = config.exploration > 0.0 && rng.gen::<f64>() < config.exploration;
        let mv = if explored {
            random_move(game.board(), game.placement(), player, rng)
        } else {
            choose_move(game.board(), game.placement(), player, &params, rng)
        };

        let report = match mv {
            Some(mv) => game.play_ticket(ticket, mv)?,
            None => game.pass(player)?,
        };
        turns.push(TurnRecord {
            position,
            player,
            mv: report.mv,
            explosions: report.explosions,
            runaway: report.runaway,
            explored,
        });
    }

    Ok(GameRecord {
        game_id,
        config: game_config,
        first,
        turns,
        winner: game.winner(),
        final_position: encode_board(game.board(), game.placement()),
        final_cells: owned_cells(game.board(), game_config.players),
    })
}

/// Runs self-play generation, producing multiple game records.
///
/// When `config.threads > 1`, games are played concurrently using rayon
/// and records arrive in completion order.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<GameRecord>, SelfPlayError> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |game| {
        games.push(game);
    })?;
    Ok(games)
}

/// Runs self-play generation, calling `on_game` with each completed game record.
///
/// This allows the caller to process games incrementally (e.g. write to disk)
/// rather than waiting for all games to finish.
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord) + Send,
{
    config.game_config()?;
    config.search_params()?;
    if config.threads > 1 {
        run_self_play_parallel(config, on_game)
    } else {
        run_self_play_sequential(config, on_game)
    }
}

fn log_game(game: &GameRecord, n: usize, total: usize, started: Instant) {
    let outcome = match game.winner {
        Some(w) => format!("{} wins", w),
        None => "undecided".to_string(),
    };
    log::info!(
        "game {}/{}: {} after {} turns ({:.1}s)",
        n,
        total,
        outcome,
        game.turns.len(),
        started.elapsed().as_secs_f64()
    );
}

/// Sequential self-play: plays games one at a time.
fn run_self_play_sequential<F>(config: &SelfPlayConfig, mut on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let started = Instant::now();
        let mut rng = config.rng_for(i);
        let game = play_game(config, i, &mut rng)?;
        if !config.quiet {
            log_game(&game, i + 1, config.num_games, started);
        }
        on_game(game);
    }
    Ok(())
}

/// Parallel self-play: plays games concurrently using rayon.
/// Uses a channel to deliver completed games to the callback from worker threads.
fn run_self_play_parallel<F>(config: &SelfPlayConfig, mut on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<Result<GameRecord, SelfPlayError>>();

    let config_clone = config.clone();
    let handle = std::thread::spawn(move || {
        pool.install(|| {
            (0..config_clone.num_games)
                .into_par_iter()
                .for_each_with(tx, |tx, i| {
                    let started = Instant::now();
                    let mut rng = config_clone.rng_for(i);
                    let game = play_game(&config_clone, i, &mut rng);
                    if let (Ok(game), false) = (&game, config_clone.quiet) {
                        let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        log_game(game, n, config_clone.num_games, started);
                    }
                    let _ = tx.send(game);
                });
        });
    });

    // Receive completed games on the calling thread and pass to callback.
    let mut first_error = None;
    for game in rx {
        match game {
            Ok(game) => on_game(game),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    if handle.join().is_err() {
        log::error!("self-play worker thread panicked");
    }
    first_error.map_or(Ok(()), Err)
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Aggregate results over a set of games.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub games: usize,
    pub undecided: usize,
    pub runaways: usize,
    /// Wins per seat.
    pub wins: Vec<usize>,
    pub avg_turns: f64,
}

/// Tallies wins, undecided games and game length.
pub fn summarize(games: &[GameRecord]) -> Summary {
    let seats = games.iter().map(|g| g.config.players).max().unwrap_or(0);
    let mut summary = Summary {
        games: games.len(),
        wins: vec![0; seats],
        ..Summary::default()
    };
    let mut total_turns = 0usize;
    for game in games {
        total_turns += game.turns.len();
        match game.winner {
            Some(w) => summary.wins[w.index()] += 1,
            None => summary.undecided += 1,
        }
        if game.turns.iter().any(|t| t.runaway) {
            summary.runaways += 1;
        }
    }
    summary.avg_turns = total_turns as f64 / games.len().max(1) as f64;
    summary
}

/// Logs a summary of self-play results.
pub fn log_summary(games: &[GameRecord]) {
    let summary = summarize(games);
    log::info!("=== Self-Play Summary ===");
    log::info!("Games: {}", summary.games);
    log::info!("Avg turns/game: {:.1}", summary.avg_turns);
    log::info!("Undecided: {}", summary.undecided);
    log::info!("Decided by runaway: {}", summary.runaways);
    for (seat, &wins) in summary.wins.iter().enumerate() {
        let pct = 100.0 * wins as f64 / summary.games.max(1) as f64;
        log::info!("  {}: {} ({:.1}%)", PlayerId(seat as u8), wins, pct);
    }
}
