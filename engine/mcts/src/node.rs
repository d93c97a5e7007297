//! Search nodes and the edges leaving them.
//!
//! A node stands for a board (identified by its hash), not for a path: two
//! move orders that reach the same board share one node. Statistics used for
//! selection therefore live on the edges, which belong to exactly one node.

use games_samegame::ClusterData;

use crate::strategy::{FinalSelection, ValueTerm};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// One candidate action and what the search has learned about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Cluster to remove, as enumerated when the node was expanded.
    pub action: ClusterData,

    /// Times this edge was traversed during selection.
    pub visits: u32,

    /// Running mean of rewards propagated through this edge.
    /// Starts at the seeding rollout's reward.
    pub avg_reward: f64,

    /// Best reward ever propagated through this edge.
    pub best_reward: f64,
}

impl Edge {
    /// New edge whose statistics start at a single rollout reward.
    pub fn seeded(action: ClusterData, reward: f64) -> Self {
        Self {
            action,
            visits: 0,
            avg_reward: reward,
            best_reward: reward,
        }
    }

    /// Fold one propagated reward into the statistics.
    #[inline]
    pub fn update(&mut self, reward: f64) {
        self.visits += 1;
        self.avg_reward += (reward - self.avg_reward) / self.visits as f64;
        if reward > self.best_reward {
            self.best_reward = reward;
        }
    }

    #[inline]
    pub fn value(&self, term: ValueTerm) -> f64 {
        match term {
            ValueTerm::Average => self.avg_reward,
            ValueTerm::Best => self.best_reward,
        }
    }

    /// UCB = value / reward_scale + C * sqrt(ln(N_parent) / (N_edge + 1))
    ///
    /// Takes pre-computed ln(parent_visits) to avoid redundant logs when
    /// comparing siblings.
    #[inline]
    pub fn ucb_score(
        &self,
        parent_visits_ln: f64,
        exploration: f64,
        reward_scale: f64,
        term: ValueTerm,
    ) -> f64 {
        let exploit = self.value(term) / reward_scale;
        let explore = exploration * (parent_visits_ln / (self.visits as f64 + 1.0)).sqrt();
        exploit + explore
    }
}

/// A board in the transposition table.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Board hash with the flag bits cleared.
    pub key: u64,

    /// Times an iteration reached or passed through this node. The expansion
    /// itself counts as the first visit.
    pub visits: u32,

    /// No removable cluster is left on this board.
    pub is_terminal: bool,

    /// Candidate actions, best seed first. Empty until expanded.
    pub edges: Vec<Edge>,
}

impl Node {
    pub fn new(key: u64) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    /// Check if this node has been expanded (has edges).
    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.edges.is_empty()
    }

    /// Check if selection has to stop here.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.visits == 0 || self.is_terminal || !self.is_expanded()
    }

    /// Index of the edge with the highest UCB score.
    ///
    /// Falls back to the first edge when no score beats the sentinel
    /// (e.g. all scores are NaN). Returns `None` only without edges.
    pub fn select_edge(&self, exploration: f64, reward_scale: f64, term: ValueTerm) -> Option<usize> {
        if self.edges.is_empty() {
            return None;
        }
        // Pre-compute ln once instead of per-edge comparison
        let parent_visits_ln = (self.visits.max(1) as f64).ln();
        let mut best_index = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, edge) in self.edges.iter().enumerate() {
            let score = edge.ucb_score(parent_visits_ln, exploration, reward_scale, term);
            if score > best_score {
                best_score = score;
                best_index = i;
            }
        }
        Some(best_index)
    }

    /// Index of the edge to play once the search is over.
    pub fn final_edge(
        &self,
        selection: FinalSelection,
        exploration: f64,
        reward_scale: f64,
        term: ValueTerm,
    ) -> Option<usize> {
        let key: fn(&Edge) -> f64 = match selection {
            FinalSelection::Ucb => return self.select_edge(exploration, reward_scale, term),
            FinalSelection::MostVisits => |edge: &Edge| edge.visits as f64,
            FinalSelection::BestAverage => |edge: &Edge| edge.avg_reward,
            FinalSelection::BestValue => |edge: &Edge| edge.best_reward,
        };

        let mut best: Option<(usize, f64)> = None;
        for (i, edge) in self.edges.iter().enumerate() {
            let k = key(edge);
            // Ties keep the earlier edge, which has the better seed.
            if best.map_or(true, |(_, b)| k > b) {
                best = Some((i, k));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Total visits over all edges.
    pub fn edge_visits(&self) -> u32 {
        self.edges.iter().map(|e| e.visits).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(cell: usize, size: u32) -> ClusterData {
        ClusterData::new(cell, 1, size)
    }

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::NONE.is_some());
        assert!(!NodeId(0).is_none());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_edge_update() {
        let mut edge = Edge::seeded(action(0, 3), 40.0);
        assert_eq!(edge.visits, 0);
        assert!((edge.avg_reward - 40.0).abs() < 1e-9);

        edge.update(10.0);
        edge.update(30.0);
        assert_eq!(edge.visits, 2);
        assert!((edge.avg_reward - 20.0).abs() < 1e-9);
        assert!((edge.best_reward - 40.0).abs() < 1e-9);

        edge.update(100.0);
        assert!((edge.best_reward - 100.0).abs() < 1e-9);
        assert!((edge.avg_reward - 140.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_ucb_score() {
        let mut edge = Edge::seeded(action(0, 2), 2500.0);
        edge.visits = 3;

        // UCB = 2500 / 5000 + 1.0 * sqrt(ln(100) / 4)
        let ln = (100f64).ln();
        let ucb = edge.ucb_score(ln, 1.0, 5000.0, ValueTerm::Average);
        assert!((ucb - (0.5 + (ln / 4.0).sqrt())).abs() < 1e-9);
    }

    #[test]
    fn test_select_prefers_unvisited_then_value() {
        let mut node = Node::new(7);
        node.visits = 10;
        node.edges.push(Edge::seeded(action(0, 2), 100.0));
        node.edges.push(Edge::seeded(action(1, 2), 100.0));
        node.edges[0].visits = 9;

        // Same value, the unvisited edge gets the exploration bonus.
        assert_eq!(node.select_edge(1.0, 5000.0, ValueTerm::Average), Some(1));

        // Without exploration only the value counts.
        node.edges[0].avg_reward = 200.0;
        assert_eq!(node.select_edge(0.0, 5000.0, ValueTerm::Average), Some(0));
    }

    #[test]
    fn test_select_falls_back_to_first_edge() {
        let mut node = Node::new(1);
        node.edges.push(Edge::seeded(action(0, 2), f64::NAN));
        node.edges.push(Edge::seeded(action(1, 2), f64::NAN));
        assert_eq!(node.select_edge(1.0, 5000.0, ValueTerm::Average), Some(0));
        assert_eq!(Node::new(2).select_edge(1.0, 5000.0, ValueTerm::Average), None);
    }

    #[test]
    fn test_final_edge() {
        let mut node = Node::new(1);
        node.visits = 20;
        let mut a = Edge::seeded(action(0, 2), 300.0);
        a.visits = 5;
        a.avg_reward = 250.0;
        let mut b = Edge::seeded(action(1, 2), 200.0);
        b.visits = 14;
        b.avg_reward = 260.0;
        node.edges = vec![a, b];

        let pick = |s| node.final_edge(s, 1.0, 5000.0, ValueTerm::Average);
        assert_eq!(pick(FinalSelection::BestValue), Some(0));
        assert_eq!(pick(FinalSelection::MostVisits), Some(1));
        assert_eq!(pick(FinalSelection::BestAverage), Some(1));
        assert_eq!(node.edge_visits(), 19);
    }

    #[test]
    fn test_is_leaf() {
        let mut node = Node::new(3);
        assert!(node.is_leaf());
        node.visits = 1;
        node.edges.push(Edge::seeded(action(0, 2), 1.0));
        assert!(!node.is_leaf());
        node.is_terminal = true;
        assert!(node.is_leaf());
    }
}
