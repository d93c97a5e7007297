//! SameGame board model for the search engine.
//!
//! SameGame is a single-player elimination puzzle: clicking a group of two or
//! more side-adjacent cells of one color removes it, the cells above fall
//! down, and empty columns collapse to the left. Removing `n` cells scores
//! `(n - 2)^2`; clearing the whole board adds a bonus of 1000.
//!
//! # Board Layout
//!
//! Cells are stored row-major with row 0 at the top:
//! ```text
//! Row 0: [ 0][ 1][ 2]  <- Top
//! Row 1: [ 3][ 4][ 5]
//! Row 2: [ 6][ 7][ 8]  <- Bottom
//! ```
//!
//! # Usage
//!
//! ```rust
//! use games_samegame::{Grid, State, cluster_score};
//!
//! let grid = Grid::parse("112\n122\n", 2).unwrap();
//! let mut state = State::new(grid);
//!
//! let actions = state.valid_actions();
//! let removed = state.apply_action(&actions[0]);
//! assert_eq!(cluster_score(removed.size), 1);
//!
//! state.undo_action(&removed);
//! assert_eq!(state.depth(), 0);
//! ```

pub mod cluster;
pub mod grid;
pub mod scoring;
pub mod state;
pub mod zobrist;

pub use cluster::{
    has_removable_cluster, partition, remove_cluster, remove_random_cluster, valid_actions,
    Action, Cluster, ClusterData, UnionFind,
};
pub use grid::{BoardError, Cell, Color, ColorCounter, Grid, CELL_NONE, EMPTY, MAX_COLORS};
pub use scoring::{cluster_score, replay, terminal_bonus, ReplayError, Score, CLEAR_BONUS};
pub use state::{State, StateData};
pub use zobrist::{Key, ZobristTable, FLAG_KNOWN, FLAG_MASK, FLAG_TERMINAL};
