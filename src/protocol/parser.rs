//! Command parser.
//!
//! Parses incoming protocol lines into structured `Command` variants that
//! the engine main loop can dispatch on.

use crate::board::PlayerId;

/// Search limits passed with the `go` command. Unset fields fall back to
/// the engine options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoParams {
    pub depth: Option<u32>,
    pub branching: Option<usize>,
}

/// Match setup passed with the `newgame` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewGameParams {
    pub size: Option<usize>,
    pub players: Option<usize>,
    pub first: Option<PlayerId>,
}

/// A parsed client-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Protocol handshake.
    Cci,

    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Start a fresh match: `newgame [size] [players] [first]`.
    NewGame(NewGameParams),

    /// Set the position from board notation.
    Position { notation: String },

    /// Set the seat to act.
    SetPlayer { player: PlayerId },

    /// Play the seat to act's move at a cell.
    Play { row: usize, col: usize },

    /// The seat to act passes.
    Pass,

    /// Search for the seat to act.
    Go(GoParams),

    /// Print the current position.
    Show,

    /// Interrupt the current search.
    Stop,

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (&head, _) = tokens.split_first()?;

    match head {
        "cci" => Some(Command::Cci),
        "isready" => Some(Command::IsReady),
        "pass" => Some(Command::Pass),
        "show" => Some(Command::Show),
        "stop" => Some(Command::Stop),
        "quit" => Some(Command::Quit),

        "setoption" => parse_setoption(&tokens),
        "newgame" => parse_newgame(&tokens),
        "position" => parse_position(&tokens),
        "setplayer" => parse_setplayer(&tokens),
        "play" => parse_play(&tokens),
        "go" => parse_go(&tokens),

        other => {
            log::warn!("unknown command: {}", other);
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        log::warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let (name, value) = match tokens.iter().position(|&t| t == "value") {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            if name_parts.is_empty() {
                log::warn!("malformed setoption: empty name");
                return None;
            }
            let value_parts = &tokens[vi + 1..];
            let value = (!value_parts.is_empty()).then(|| value_parts.join(" "));
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Some(Command::SetOption { name, value })
}

fn parse_number<T: std::str::FromStr>(what: &str, token: &str) -> Option<T> {
    match token.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("invalid {} value: '{}'", what, token);
            None
        }
    }
}

fn parse_player(token: &str) -> Option<PlayerId> {
    let mut chars = token.chars();
    match (chars.next().and_then(PlayerId::from_letter), chars.next()) {
        (Some(p), None) => Some(p),
        _ => {
            log::warn!("unknown player: '{}'", token);
            None
        }
    }
}

/// Parses `newgame [size] [players] [first]`.
fn parse_newgame(tokens: &[&str]) -> Option<Command> {
    if tokens.len() > 4 {
        log::warn!("malformed newgame: expected 'newgame [size] [players] [first]'");
        return None;
    }
    let mut params = NewGameParams::default();
    if let Some(t) = tokens.get(1) {
        params.size = Some(parse_number("size", t)?);
    }
    if let Some(t) = tokens.get(2) {
        params.players = Some(parse_number("players", t)?);
    }
    if let Some(t) = tokens.get(3) {
        params.first = Some(parse_player(t)?);
    }
    Some(Command::NewGame(params))
}

/// Parses `position <notation>`.
fn parse_position(tokens: &[&str]) -> Option<Command> {
    match tokens {
        [_, notation] => Some(Command::Position {
            notation: notation.to_string(),
        }),
        _ => {
            log::warn!("malformed position: expected 'position <notation>'");
            None
        }
    }
}

/// Parses `setplayer <letter>`.
fn parse_setplayer(tokens: &[&str]) -> Option<Command> {
    match tokens {
        [_, letter] => parse_player(letter).map(|player| Command::SetPlayer { player }),
        _ => {
            log::warn!("malformed setplayer: expected 'setplayer <letter>'");
            None
        }
    }
}

/// Parses `play <row> <col>`.
fn parse_play(tokens: &[&str]) -> Option<Command> {
    match tokens {
        [_, row, col] => Some(Command::Play {
            row: parse_number("row", row)?,
            col: parse_number("col", col)?,
        }),
        _ => {
            log::warn!("malformed play: expected 'play <row> <col>'");
            None
        }
    }
}

/// Parses `go [depth <n>] [branching <n>]`. Unknown or malformed
/// parameters are skipped.
fn parse_go(tokens: &[&str]) -> Option<Command> {
    let mut params = GoParams::default();
    let mut i = 1;

    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                if let Some(t) = tokens.get(i) {
                    params.depth = parse_number("depth", t).or(params.depth);
                }
            }
            "branching" => {
                i += 1;
                if let Some(t) = tokens.get(i) {
                    params.branching = parse_number("branching", t).or(params.branching);
                }
            }
            other => {
                log::warn!("unknown go parameter: '{}'", other);
            }
        }
        i += 1;
    }

    Some(Command::Go(params))
}
