//! MCTS search implementation.
//!
//! Each iteration runs four phases against one live [`State`]:
//! 1. Selection: descend from the root by UCB, applying each edge's action
//! 2. Expansion: enumerate the leaf's clusters and seed one edge per cluster
//!    with a single random rollout
//! 3. Evaluation: terminal leaves score their path, fresh leaves score their
//!    seeds according to the backprop strategy
//! 4. Backpropagation: update the traversed edges while undoing back to the root
//!
//! Rewards are absolute game scores measured from the search root: the points
//! collected on the way down plus whatever the rollout collected after.

use std::time::{Duration, Instant};

use games_samegame::{cluster_score, terminal_bonus, ClusterData, Score, State};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::MctsConfig;
use crate::node::{Edge, Node, NodeId};
use crate::table::TranspositionTable;

/// Errors that can occur when setting up a search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search needs an iteration budget or a time budget")]
    UnboundedBudget,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result of an MCTS search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Best action from the root, `None` when the root is terminal.
    pub action: Option<ClusterData>,

    /// Principal variation from the root, as actually realized on the board.
    pub sequence: Vec<ClusterData>,

    /// Score of playing `sequence` from the root, clear bonus included.
    pub expected_score: Score,

    /// Number of iterations performed
    pub iterations: u32,

    pub elapsed: Duration,

    /// Nodes in the transposition table after the search
    pub table_size: usize,
}

/// Counters for one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub iterations: u32,
    pub expansions: u32,
    pub rollouts: u64,
    /// Selected edges whose action no longer removed a cluster.
    pub desyncs: u32,
    /// Deepest selection path, in plies below the root.
    pub max_depth: usize,
}

/// One traversed edge, in the order it was taken.
#[derive(Debug, Clone, Copy)]
struct PathStep {
    node: NodeId,
    edge: usize,
    applied: ClusterData,
}

/// Single-threaded MCTS agent with a transposition table.
#[derive(Debug)]
pub struct MctsAgent {
    config: MctsConfig,
    table: TranspositionTable,
    rng: ChaCha20Rng,
    root: NodeId,
    path: Vec<PathStep>,
    stats: SearchStats,
}

impl MctsAgent {
    /// Create an agent, rejecting configs the search cannot run with.
    pub fn new(config: MctsConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        Ok(Self {
            path: Vec::with_capacity(config.max_ply.min(1024)),
            config,
            table: TranspositionTable::new(),
            rng,
            root: NodeId::NONE,
            stats: SearchStats::default(),
        })
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Get the transposition table (for inspection/debugging).
    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    /// Counters of the most recent search.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Root node of the most recent search.
    pub fn root_node(&self) -> Option<&Node> {
        self.root.is_some().then(|| self.table.get(self.root))
    }

    /// Search from `state` and return the best first action.
    pub fn best_action(&mut self, state: &State) -> Option<ClusterData> {
        self.search(state).action
    }

    /// Search from `state` and return the whole principal variation.
    pub fn best_action_sequence(&mut self, state: &State) -> Vec<ClusterData> {
        self.search(state).sequence
    }

    /// Run one search from `state` within the configured budget.
    ///
    /// `state` is not modified; the search works on a snapshot of its
    /// current board.
    pub fn search(&mut self, state: &State) -> SearchResult {
        let start = Instant::now();
        let mut live = state.snapshot();
        self.set_root(&mut live);

        if self.table.get(self.root).is_terminal {
            debug!("Root is terminal, nothing to search");
            return SearchResult {
                action: None,
                sequence: Vec::new(),
                expected_score: terminal_bonus(live.is_empty()),
                iterations: 0,
                elapsed: start.elapsed(),
                table_size: self.table.len(),
            };
        }

        let mut iterations = 0u32;
        while self.has_budget(iterations, start.elapsed()) {
            self.iterate(&mut live);
            iterations += 1;
        }
        self.stats.iterations = iterations;

        let root = self.table.get(self.root);
        let action = root
            .final_edge(
                self.config.final_selection,
                self.config.exploration,
                self.config.reward_scale,
                self.config.value_term,
            )
            .map(|i| root.edges[i].action);
        let (sequence, expected_score) = self.principal_variation(&live);
        let elapsed = start.elapsed();

        debug!(
            iterations,
            elapsed_ms = elapsed.as_millis() as u64,
            expansions = self.stats.expansions,
            rollouts = self.stats.rollouts,
            desyncs = self.stats.desyncs,
            max_depth = self.stats.max_depth,
            table_size = self.table.len(),
            expected_score,
            "MCTS search complete"
        );

        SearchResult {
            action,
            sequence,
            expected_score,
            iterations,
            elapsed,
            table_size: self.table.len(),
        }
    }

    fn has_budget(&self, iterations: u32, elapsed: Duration) -> bool {
        let iterations_left =
            self.config.max_iterations == 0 || iterations < self.config.max_iterations;
        let time_left = self.config.time_budget().map_or(true, |budget| elapsed < budget);
        iterations_left && time_left
    }

    /// Point the search at `live`'s board, expanding it if it is new.
    fn set_root(&mut self, live: &mut State) {
        if !self.config.reuse_table {
            self.table.clear();
        }
        self.stats = SearchStats::default();
        self.path.clear();

        let key = live.key();
        self.root = self.table.get_or_insert(key.board_hash());
        if self.table.get(self.root).visits > 0 {
            return;
        }
        if live.is_terminal() {
            self.table.get_mut(self.root).is_terminal = true;
        } else {
            self.expand(self.root, live, 0);
        }
        self.table.get_mut(self.root).visits += 1;
    }

    /// Run a single iteration (select -> expand -> evaluate -> backpropagate).
    fn iterate(&mut self, live: &mut State) {
        debug_assert!(self.path.is_empty() && live.depth() == 0);

        // Selection
        let mut current = self.root;
        let mut path_score: Score = 0;
        loop {
            let node = self.table.get(current);
            if node.is_leaf() || self.path.len() >= self.config.max_ply {
                break;
            }
            let Some(edge) = node.select_edge(
                self.config.exploration,
                self.config.reward_scale,
                self.config.value_term,
            ) else {
                break;
            };
            let action = node.edges[edge].action;
            let applied = live.apply_action(&action);
            if !applied.is_removable() {
                self.stats.desyncs += 1;
                warn!(
                    cell = action.cell,
                    expected = action.size,
                    actual = applied.size,
                    ply = self.path.len(),
                    "Edge action does not match the board, continuing with stale edge"
                );
            }
            path_score += cluster_score(applied.size);
            self.path.push(PathStep {
                node: current,
                edge,
                applied,
            });
            current = self.table.get_or_insert(live.key().board_hash());
        }

        // Expansion + evaluation
        let leaf = self.table.get(current);
        let unexplored = !leaf.is_terminal && !leaf.is_expanded();
        let reward = if unexplored && live.is_terminal() {
            self.table.get_mut(current).is_terminal = true;
            (path_score + terminal_bonus(live.is_empty())) as f64
        } else if unexplored && self.path.len() < self.config.max_ply {
            self.expand(current, live, path_score)
        } else {
            // Terminal, or cut off by the depth bound.
            (path_score + terminal_bonus(live.is_empty())) as f64
        };
        self.table.get_mut(current).visits += 1;

        // Backpropagation
        let depth = self.path.len();
        self.stats.max_depth = self.stats.max_depth.max(depth);
        while let Some(step) = self.path.pop() {
            let node = self.table.get_mut(step.node);
            node.visits += 1;
            node.edges[step.edge].update(reward);
            live.undo_action(&step.applied);
        }

        trace!(
            leaf = current.0,
            depth,
            reward,
            table_size = self.table.len(),
            "MCTS iteration complete"
        );
    }

    /// Create the edges of `node_id` and return the value to propagate.
    fn expand(&mut self, node_id: NodeId, live: &mut State, path_score: Score) -> f64 {
        let actions = live.valid_actions();
        let mut edges = Vec::with_capacity(actions.len());
        for action in actions {
            let applied = live.apply_action(&action);
            let reward = path_score + cluster_score(applied.size) + self.rollout(live);
            live.undo_action(&applied);
            edges.push(Edge::seeded(action, reward as f64));
        }

        edges.sort_by(|a, b| b.best_reward.total_cmp(&a.best_reward));
        edges.truncate(self.config.max_children);
        let seeds: Vec<f64> = edges.iter().map(|e| e.best_reward).collect();
        let value = self.config.backprop.leaf_value(&seeds);

        self.stats.expansions += 1;
        self.table.get_mut(node_id).edges = edges;
        value
    }

    /// Play random clusters on the current snapshot until none is left.
    ///
    /// The snapshot is modified in place; the caller undoes the action that
    /// created it.
    fn rollout(&mut self, live: &mut State) -> Score {
        let mut score = 0;
        loop {
            let removed = live.apply_random_action(&mut self.rng);
            if !removed.is_removable() {
                break;
            }
            score += cluster_score(removed.size);
        }
        self.stats.rollouts += 1;
        score + terminal_bonus(live.is_empty())
    }

    /// Follow the final-selection edges from the root as far as the table
    /// knows, then optionally finish with a random rollout.
    fn principal_variation(&mut self, root_state: &State) -> (Vec<ClusterData>, Score) {
        let mut scratch = root_state.snapshot();
        let mut sequence = Vec::new();
        let mut score = 0;

        let mut current = Some(self.root);
        while let Some(id) = current {
            let node = self.table.get(id);
            if node.visits == 0 || node.is_terminal {
                break;
            }
            let Some(edge) = node.final_edge(
                self.config.final_selection,
                self.config.exploration,
                self.config.reward_scale,
                self.config.value_term,
            ) else {
                break;
            };
            let applied = scratch.apply_action(&node.edges[edge].action);
            if !applied.is_removable() {
                break;
            }
            score += cluster_score(applied.size);
            sequence.push(applied);
            current = self.table.find(scratch.key().board_hash());
        }

        if self.config.complete_with_rollout {
            loop {
                let removed = scratch.apply_random_action(&mut self.rng);
                if !removed.is_removable() {
                    break;
                }
                score += cluster_score(removed.size);
                sequence.push(removed);
            }
        }

        (sequence, score + terminal_bonus(scratch.is_empty()))
    }
}
