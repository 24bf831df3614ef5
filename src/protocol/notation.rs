//! Board notation.
//!
//! A position is written on one line as the placement flags followed by
//! one section per board row:
//!
//! `<placed>/<row>/<row>/...`
//!
//! `<placed>` holds one `0` or `1` per seat in turn order. Each row is a
//! comma-separated list of cells, `.` for an empty cell or the owner's
//! letter followed by its charge (`a3`). Only stable positions are
//! accepted: no cell may be at or above the explosion threshold.

use crate::board::{
    Board, Cell, EdgeRule, Placement, PlayerId, EXPLODE_THRESHOLD, MAX_PLAYERS, MAX_SIZE,
    MIN_SIZE,
};
use crate::game::MIN_PLAYERS;

/// Errors that can occur while parsing board notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("expected placement flags and at least one row")]
    MissingSections,

    #[error("invalid placement flags: '{0}'")]
    InvalidFlags(String),

    #[error("player count {0} out of range")]
    PlayerCount(usize),

    #[error("board size {0} out of range")]
    Size(usize),

    #[error("row {row} has {got} cells, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid cell entry: '{0}'")]
    InvalidCell(String),

    #[error("cell '{entry}' belongs to a seat outside the {players} players")]
    UnknownPlayer { entry: String, players: usize },

    #[error("cell ({row}, {col}) is unstable")]
    Unstable { row: usize, col: usize },
}

/// Encodes a position as notation.
pub fn encode_board(board: &Board, placement: &Placement) -> String {
    let mut out: String = placement
        .flags()
        .iter()
        .map(|&p| if p { '1' } else { '0' })
        .collect();
    let size = board.size();
    for row in 0..size {
        out.push('/');
        for col in 0..size {
            if col > 0 {
                out.push(',');
            }
            let cell = board.get(row, col);
            match cell.owner {
                Some(owner) if cell.charge > 0 => {
                    out.push_str(&owner.to_string());
                    out.push_str(&cell.charge.to_string());
                }
                _ => out.push('.'),
            }
        }
    }
    out
}

/// Parses notation into a board and placement flags using `edge_rule`.
pub fn parse_board(s: &str, edge_rule: EdgeRule) -> Result<(Board, Placement), NotationError> {
    let mut sections = s.trim().split('/');
    let flags = sections.next().ok_or(NotationError::MissingSections)?;
    let rows: Vec<&str> = sections.collect();
    if rows.is_empty() {
        return Err(NotationError::MissingSections);
    }

    let placed = parse_flags(flags)?;
    let players = placed.len();

    let size = rows.len();
    if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
        return Err(NotationError::Size(size));
    }

    let mut cells = Vec::with_capacity(size * size);
    for (row, text) in rows.iter().enumerate() {
        let entries: Vec<&str> = text.split(',').collect();
        if entries.len() != size {
            return Err(NotationError::RowLength {
                row,
                expected: size,
                got: entries.len(),
            });
        }
        for (col, entry) in entries.into_iter().enumerate() {
            let cell = parse_cell(entry, players)?;
            if cell.charge >= EXPLODE_THRESHOLD {
                return Err(NotationError::Unstable { row, col });
            }
            cells.push(cell);
        }
    }

    let board = Board::from_cells(size, cells).ok_or(NotationError::Size(size))?;
    Ok((board, Placement::from_flags(placed, edge_rule)))
}

fn parse_flags(s: &str) -> Result<Vec<bool>, NotationError> {
    let placed = s
        .chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            _ => Err(NotationError::InvalidFlags(s.to_string())),
        })
        .collect::<Result<Vec<bool>, _>>()?;
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&placed.len()) {
        return Err(NotationError::PlayerCount(placed.len()));
    }
    Ok(placed)
}

fn parse_cell(entry: &str, players: usize) -> Result<Cell, NotationError> {
    if entry == "." {
        return Ok(Cell::EMPTY);
    }
    let invalid = || NotationError::InvalidCell(entry.to_string());

    let mut chars = entry.chars();
    let owner = chars
        .next()
        .and_then(PlayerId::from_letter)
        .ok_or_else(invalid)?;
    if owner.index() >= players {
        return Err(NotationError::UnknownPlayer {
            entry: entry.to_string(),
            players,
        });
    }
    let charge: u8 = chars.as_str().parse().map_err(|_| invalid())?;
    // An owned cell always carries charge.
    if charge == 0 {
        return Err(invalid());
    }
    Ok(Cell::owned(owner, charge))
}
