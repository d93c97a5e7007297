//! Transposition table with arena allocation.
//!
//! Nodes are stored in a contiguous Vec and referenced by NodeId indices; a
//! hash map from board hash to NodeId lets different move orders that reach
//! the same board share a node. Nodes are only ever added during a search.

use std::collections::HashMap;

use crate::node::{Node, NodeId};

#[derive(Debug, Default)]
pub struct TranspositionTable {
    /// Arena storing all nodes
    nodes: Vec<Node>,

    /// Board hash (flag bits cleared) to arena index
    index: HashMap<u64, NodeId>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Node for `key`, created unvisited if absent.
    pub fn get_or_insert(&mut self, key: u64) -> NodeId {
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(key));
        self.index.insert(key, id);
        id
    }

    /// Look up a node without creating it.
    #[inline]
    pub fn find(&self, key: u64) -> Option<NodeId> {
        self.index.get(&key).copied()
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    /// Get the total number of nodes in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node, keeping the allocations.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }

    /// Get statistics about the table for debugging.
    pub fn stats(&self) -> TableStats {
        let mut stats = TableStats {
            nodes: self.nodes.len(),
            ..TableStats::default()
        };
        for node in &self.nodes {
            stats.edges += node.edges.len();
            if node.is_expanded() {
                stats.expanded += 1;
            }
            if node.is_terminal {
                stats.terminal += 1;
            }
            stats.max_fanout = stats.max_fanout.max(node.edges.len());
        }
        stats
    }
}

/// Statistics about a transposition table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableStats {
    pub nodes: usize,
    pub edges: usize,
    pub expanded: usize,
    pub terminal: usize,
    pub max_fanout: usize,
}
