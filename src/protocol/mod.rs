//! Text protocol handling.
//!
//! This module implements the line-oriented command protocol spoken by the
//! engine binary and the one-line board notation used to exchange
//! positions.

pub mod notation;
pub mod parser;

pub use notation::{encode_board, parse_board, NotationError};
pub use parser::{parse_command, Command, GoParams, NewGameParams};
