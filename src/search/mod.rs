//! Search and move selection.
//!
//! Looks ahead over focus and coalition plies to rank the acting seat's
//! candidate moves.

pub mod minimax;
pub mod outcome;
pub mod selector;

pub use minimax::{minimax, Mover, Searcher};
pub use outcome::Outcome;
pub use selector::{
    choose_move, choose_move_with_stop, Candidate, SearchError, SearchParams, Selection,
    DEFAULT_BRANCHING, DEFAULT_DEPTH,
};
