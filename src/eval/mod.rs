//! Position evaluation.
//!
//! Scores a board from one seat's perspective and detects the
//! single-survivor end of the game.

pub(crate) mod heuristic;

pub use heuristic::{
    attack_count, defense_count, is_terminal, owned_cells, sole_owner, total_owned,
};
