//! Self-play match generation CLI.
//!
//! Plays AI-vs-AI matches and outputs the records as JSONL.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N       Number of games to play (default: 10)
//!   --size N        Board dimension (default: players + 3)
//!   --players N     Seats per game (default: 2)
//!   --depth N       Search depth in plies (default: 3)
//!   --branching N   Candidates searched per node (default: 12)
//!   --explore P     Probability of a random move (default: 0)
//!   --edge-rule R   perplayer or global (default: perplayer)
//!   --max-turns N   Turn cap per game (default: 400)
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress progress and summary logging

use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use chainclash::board::EdgeRule;
use chainclash::selfplay::{self, SelfPlayConfig};

/// Parses the value following `flag`, exiting with usage on failure.
fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|v| v.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--games" => {
                i += 1;
                config.num_games = value(&args, i, flag);
            }
            "--size" => {
                i += 1;
                config.size = Some(value(&args, i, flag));
            }
            "--players" => {
                i += 1;
                config.players = value(&args, i, flag);
            }
            "--depth" => {
                i += 1;
                config.depth = value(&args, i, flag);
            }
            "--branching" => {
                i += 1;
                config.branching = value(&args, i, flag);
            }
            "--explore" => {
                i += 1;
                config.exploration = value(&args, i, flag);
            }
            "--edge-rule" => {
                i += 1;
                config.edge_rule = match value::<String>(&args, i, flag).as_str() {
                    "perplayer" => EdgeRule::PerPlayer,
                    "global" => EdgeRule::Global,
                    other => {
                        eprintln!("unknown edge rule: {}", other);
                        process::exit(1);
                    }
                };
            }
            "--max-turns" => {
                i += 1;
                config.max_turns = value(&args, i, flag);
            }
            "--threads" => {
                i += 1;
                config.threads = value(&args, i, flag);
            }
            "--seed" => {
                i += 1;
                config.seed = value(&args, i, flag);
            }
            "--output" => {
                i += 1;
                output_path = Some(value(&args, i, flag));
            }
            "--quiet" => {
                config.quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    if !config.quiet {
        log::info!(
            "Self-play: {} games, {} players, depth {}, branching {}, {} threads",
            config.num_games,
            config.players,
            config.depth,
            config.branching,
            config.threads
        );
    }

    let start = Instant::now();
    let games = match selfplay::run_self_play(&config) {
        Ok(games) => games,
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    if !config.quiet {
        log::info!(
            "Completed {} games in {:.1}s",
            games.len(),
            elapsed.as_secs_f64()
        );
        selfplay::log_summary(&games);
    }

    let written = match &output_path {
        Some(path) => File::create(path)
            .and_then(|file| write_games(&games, BufWriter::new(file))),
        None => write_games(&games, BufWriter::new(io::stdout().lock())),
    };
    match (written, &output_path) {
        (Err(e), _) => {
            log::error!("failed to write output: {}", e);
            process::exit(1);
        }
        (Ok(()), Some(path)) if !config.quiet => {
            log::info!("Wrote {} games to {}", games.len(), path);
        }
        _ => {}
    }
}

fn write_games<W: Write>(games: &[selfplay::GameRecord], mut writer: W) -> io::Result<()> {
    selfplay::write_jsonl(games, &mut writer)
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --size N         Board dimension (default: players + 3)");
    eprintln!("  --players N      Seats per game (default: 2)");
    eprintln!("  --depth N        Search depth in plies (default: 3)");
    eprintln!("  --branching N    Candidates searched per node (default: 12)");
    eprintln!("  --explore P      Probability of a random move (default: 0)");
    eprintln!("  --edge-rule R    perplayer or global (default: perplayer)");
    eprintln!("  --max-turns N    Turn cap per game (default: 400)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress progress and summary logging");
    eprintln!("  --help           Show this help");
}
