//! Move application and chain-reaction resolution.
//!
//! Applies a move to a snapshot and resolves simultaneous explosion rounds
//! until the board is stable or a runaway is detected.

pub mod apply;
pub mod chain;
pub mod rounds;

pub use apply::{apply_move, play_unchecked, MoveError, MoveOutcome};
pub use chain::{max_rounds, resolve, Explosion, Resolution, Resolver};
pub use rounds::{Round, Rounds};
