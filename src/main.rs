//! Chainclash -- a chain-reaction territory engine speaking a line protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Input is read on its own thread so that `stop` can interrupt a running
//! search.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use chainclash::engine::Engine;
use chainclash::protocol::parser::{parse_command, Command};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut engine = Engine::new();
    let stop = engine.stop_handle();

    let (tx, rx) = mpsc::channel::<Command>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let Some(cmd) = parse_command(&line) else {
                continue;
            };
            signal(&cmd, &stop);
            if tx.send(cmd).is_err() {
                break;
            }
        }
    });

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    if let Err(e) = run(&mut engine, &rx, &mut out) {
        log::error!("output failed: {}", e);
    }
}

/// Updates the stop flag as a command is read, before it is queued.
/// `go` clears it so a `stop` read later always cancels the newest search.
fn signal(cmd: &Command, stop: &AtomicBool) {
    match cmd {
        Command::Go(_) => stop.store(false, Ordering::Relaxed),
        Command::Stop | Command::Quit => stop.store(true, Ordering::Relaxed),
        _ => {}
    }
}

/// Runs the protocol loop until `quit` or end of input.
fn run<W: Write>(engine: &mut Engine, rx: &mpsc::Receiver<Command>, out: &mut W) -> io::Result<()> {
    for cmd in rx.iter() {
        match cmd {
            Command::Cci => engine.handle_cci(out)?,
            Command::IsReady => engine.handle_isready(out)?,
            Command::SetOption { name, value } => engine.set_option(name, value),
            Command::NewGame(params) => {
                if let Err(e) = engine.new_game(params) {
                    engine.write_error(out, &e)?;
                }
            }
            Command::Position { notation } => {
                if let Err(e) = engine.set_position(&notation) {
                    engine.write_error(out, &e)?;
                }
            }
            Command::SetPlayer { player } => {
                if let Err(e) = engine.set_player(player) {
                    engine.write_error(out, &e)?;
                }
            }
            Command::Play { row, col } => engine.handle_play(row, col, out)?,
            Command::Pass => engine.handle_pass(out)?,
            Command::Go(params) => engine.handle_go(params, out)?,
            Command::Show => engine.handle_show(out)?,
            // The reader thread already raised the flag.
            Command::Stop => {}
            Command::Quit => break,
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainclash::protocol::parser::GoParams;

    #[test]
    fn stop_read_behind_a_queued_go_stays_raised() {
        let mut engine = Engine::new();
        let stop = engine.stop_handle();
        let (tx, rx) = mpsc::channel();
        for line in ["newgame 5 2", "go", "stop"] {
            let cmd = parse_command(line).unwrap();
            signal(&cmd, &stop);
            tx.send(cmd).unwrap();
        }
        drop(tx);
        assert!(stop.load(Ordering::Relaxed));

        let mut out = Vec::new();
        run(&mut engine, &rx, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("info "), "{}", text);
        assert!(text.starts_with("bestmove "), "{}", text);
    }

    #[test]
    fn go_clears_an_earlier_stop() {
        let stop = AtomicBool::new(false);
        signal(&Command::Stop, &stop);
        assert!(stop.load(Ordering::Relaxed));
        signal(&Command::Go(GoParams::default()), &stop);
        assert!(!stop.load(Ordering::Relaxed));
        signal(&Command::IsReady, &stop);
        assert!(!stop.load(Ordering::Relaxed));
    }
}
