//! Chainclash engine library.
//!
//! Exposes the board representation, move validation, chain-reaction
//! resolver, evaluation, search, match state and protocol modules for use
//! by integration tests and the binary entry points.

pub mod board;
pub mod engine;
pub mod eval;
pub mod game;
pub mod movegen;
pub mod protocol;
pub mod resolve;
pub mod search;
pub mod selfplay;
