//! Monte Carlo Tree Search (MCTS) for SameGame.
//!
//! # Overview
//!
//! MCTS builds a search tree by running iterations from a root board. Each
//! iteration consists of four phases:
//!
//! 1. **Selection**: Traverse the tree using UCB (Upper Confidence Bound) to
//!    balance exploration and exploitation
//! 2. **Expansion**: When reaching an unvisited board, add one edge per
//!    removable cluster, each seeded with one random rollout
//! 3. **Evaluation**: Score the leaf from its path (terminal) or its seeds
//!    (fresh expansion)
//! 4. **Backpropagation**: Update visit counts, running averages and best
//!    values along the path while undoing back to the root
//!
//! Boards reached by different move orders share one node through a
//! transposition table keyed by Zobrist hash.
//!
//! # Usage
//!
//! ```rust
//! use games_samegame::{Grid, State};
//! use mcts::{MctsAgent, MctsConfig};
//!
//! let grid = Grid::parse("1122\n2211\n1122\n", 2).unwrap();
//! let state = State::new(grid);
//!
//! let mut agent = MctsAgent::new(MctsConfig::for_testing()).unwrap();
//! let result = agent.search(&state);
//!
//! assert!(result.action.is_some());
//! println!("Expected score: {}", result.expected_score);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `exploration`: Exploration constant C for UCB (default: 0.5)
//! - `max_iterations` / `max_time_ms`: Budgets, 0 = unbounded (at least one must be set)
//! - `max_children`: Fan-out cap per node (default: 128)
//! - `backprop`: What a fresh expansion propagates (default: best seed)
//! - `final_selection`: How the answer is read off the root
//!
//! # Policies
//!
//! [`Policy`] abstracts over move choosers: [`RandomPolicy`], [`GreedyPolicy`]
//! and [`MctsPolicy`]; [`play_game`] runs any of them to the end of a game.

pub mod config;
pub mod node;
pub mod policy;
pub mod search;
pub mod strategy;
pub mod table;

// Re-export main types
pub use config::MctsConfig;
pub use node::{Edge, Node, NodeId};
pub use policy::{play_game, GreedyPolicy, MctsPolicy, Playthrough, Policy, RandomPolicy};
pub use search::{MctsAgent, SearchError, SearchResult, SearchStats};
pub use strategy::{BackpropStrategy, FinalSelection, ParseStrategyError, ValueTerm};
pub use table::{TableStats, TranspositionTable};
