//! Cluster engine.
//!
//! A cluster is a maximal set of side-adjacent cells sharing one color.
//! Partitioning uses a union-find forest built by a single bottom-to-top
//! scan; removal uses an iterative flood fill followed by settling the grid.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::{Cell, Color, Grid, CELL_NONE, EMPTY};

/// Lightweight action descriptor: enough to re-derive and execute a removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterData {
    /// Representative cell (any member works as the flood-fill seed).
    pub cell: Cell,
    pub color: Color,
    /// Number of member cells. Values below 2 mean "not applied".
    pub size: u32,
}

/// Actions are non-trivial clusters.
pub type Action = ClusterData;

impl ClusterData {
    /// Null action: returned when nothing can be removed.
    pub const NONE: ClusterData = ClusterData {
        cell: CELL_NONE,
        color: EMPTY,
        size: 0,
    };

    pub fn new(cell: Cell, color: Color, size: u32) -> Self {
        Self { cell, color, size }
    }

    /// True if this descriptor stands for an actual removal.
    #[inline]
    pub fn is_removable(&self) -> bool {
        self.size >= 2
    }
}

/// A connected component with its full member list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub representative: Cell,
    pub color: Color,
    pub members: Vec<Cell>,
}

impl Cluster {
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Single-cell clusters can never be removed.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.members.len() == 1
    }

    pub fn to_action(&self) -> ClusterData {
        ClusterData::new(self.representative, self.color, self.members.len() as u32)
    }
}

/// Disjoint-set forest with union by size and path halving.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<u32>,
    size: Vec<u32>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
            size: vec![1; n],
        }
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] as usize != x {
            let grandparent = self.parent[self.parent[x] as usize];
            self.parent[x] = grandparent;
            x = grandparent as usize;
        }
        x
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra as u32;
        self.size[ra] += self.size[rb];
    }

    /// Size of the set containing `x`.
    pub fn set_size(&mut self, x: usize) -> u32 {
        let root = self.find(x);
        self.size[root]
    }
}

/// Cells in bottom-to-top, left-to-right scan order, skipping the empty top rows.
fn scan_order(grid: &Grid) -> impl Iterator<Item = Cell> + '_ {
    let w = grid.width();
    (grid.n_empty_rows()..grid.height())
        .rev()
        .flat_map(move |row| (0..w).map(move |col| row * w + col))
}

/// Build the union-find forest over all occupied cells.
fn build_forest(grid: &Grid) -> UnionFind {
    let w = grid.width();
    let cells = grid.cells();
    let mut uf = UnionFind::new(cells.len());
    for cell in scan_order(grid) {
        let color = cells[cell];
        if color == EMPTY {
            continue;
        }
        if cell >= w && cells[cell - w] == color {
            uf.union(cell, cell - w);
        }
        if (cell % w) + 1 < w && cells[cell + 1] == color {
            uf.union(cell, cell + 1);
        }
    }
    uf
}

/// Partition the grid into maximal same-color clusters, trivial ones included.
///
/// Every occupied cell belongs to exactly one returned cluster. Clusters are
/// ordered by their representative, the first member met in scan order.
pub fn partition(grid: &Grid) -> Vec<Cluster> {
    let mut uf = build_forest(grid);
    let mut slot = vec![usize::MAX; grid.len()];
    let mut clusters: Vec<Cluster> = Vec::new();

    for cell in scan_order(grid) {
        let color = grid.get(cell);
        if color == EMPTY {
            continue;
        }
        let root = uf.find(cell);
        if slot[root] == usize::MAX {
            slot[root] = clusters.len();
            clusters.push(Cluster {
                representative: cell,
                color,
                members: Vec::new(),
            });
        }
        clusters[slot[root]].members.push(cell);
    }

    clusters
}

/// All removable clusters (size >= 2) as action descriptors.
pub fn valid_actions(grid: &Grid) -> Vec<ClusterData> {
    let mut uf = build_forest(grid);
    let mut seen = vec![false; grid.len()];
    let mut actions = Vec::new();

    for cell in scan_order(grid) {
        let color = grid.get(cell);
        if color == EMPTY {
            continue;
        }
        let root = uf.find(cell);
        if seen[root] {
            continue;
        }
        seen[root] = true;
        let size = uf.set_size(root);
        if size >= 2 {
            actions.push(ClusterData::new(cell, color, size));
        }
    }

    actions
}

/// True if `cell` has a same-colored neighbor to the right or below.
///
/// Checking two directions per cell covers every adjacent pair once.
#[inline]
fn pairs_forward(grid: &Grid, cell: Cell, color: Color) -> bool {
    let w = grid.width();
    let cells = grid.cells();
    ((cell % w) + 1 < w && cells[cell + 1] == color)
        || (cell + w < cells.len() && cells[cell + w] == color)
}

/// Existence-only scan: stops at the first same-color adjacency.
pub fn has_removable_cluster(grid: &Grid) -> bool {
    scan_order(grid).any(|cell| {
        let color = grid.get(cell);
        color != EMPTY && pairs_forward(grid, cell, color)
    })
}

/// Up, down, left and right neighbors of a cell.
#[inline]
fn neighbors(width: usize, len: usize, cell: Cell) -> impl Iterator<Item = Cell> {
    let col = cell % width;
    let up = cell.checked_sub(width);
    let down = (cell + width < len).then_some(cell + width);
    let left = (col > 0).then(|| cell - 1);
    let right = (col + 1 < width).then_some(cell + 1);
    [up, down, left, right].into_iter().flatten()
}

fn has_same_neighbor(grid: &Grid, cell: Cell, color: Color) -> bool {
    neighbors(grid.width(), grid.len(), cell).any(|n| grid.get(n) == color)
}

/// Remove the cluster containing `cell`, then settle the grid.
///
/// Returns the realized descriptor: size 0 for an empty or out-of-range
/// cell, size 1 for a singleton (the grid is left untouched in both cases).
pub fn remove_cluster(grid: &mut Grid, cell: Cell) -> ClusterData {
    if cell >= grid.len() {
        return ClusterData::new(cell, EMPTY, 0);
    }
    let color = grid.get(cell);
    if color == EMPTY {
        return ClusterData::new(cell, EMPTY, 0);
    }
    if !has_same_neighbor(grid, cell, color) {
        return ClusterData::new(cell, color, 1);
    }

    let (w, len) = (grid.width(), grid.len());
    let cells = grid.cells_mut();
    let mut stack = vec![cell];
    cells[cell] = EMPTY;
    let mut removed = 1u32;

    while let Some(current) = stack.pop() {
        for n in neighbors(w, len, current) {
            if cells[n] == color {
                cells[n] = EMPTY;
                removed += 1;
                stack.push(n);
            }
        }
    }

    grid.settle();
    ClusterData::new(cell, color, removed)
}

/// Remove a random removable cluster in place.
///
/// Rows are visited in random order; within a row, occupied cells are tried
/// in random order and the first one with a same-colored neighbor is removed.
/// Returns [`ClusterData::NONE`] when the board is terminal.
pub fn remove_random_cluster<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> ClusterData {
    let w = grid.width();
    let mut rows: Vec<usize> = (grid.n_empty_rows()..grid.height()).collect();
    rows.shuffle(rng);

    let mut row_cells = Vec::with_capacity(w);
    for row in rows {
        row_cells.clear();
        row_cells.extend((row * w..(row + 1) * w).filter(|&c| grid.get(c) != EMPTY));
        row_cells.shuffle(rng);

        if let Some(&cell) = row_cells
            .iter()
            .find(|&&c| has_same_neighbor(grid, c, grid.get(c)))
        {
            return remove_cluster(grid, cell);
        }
    }

    ClusterData::NONE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(text: &str, colors: usize) -> Grid {
        Grid::parse(text, colors).unwrap()
    }

    #[test]
    fn test_union_find() {
        let mut uf = UnionFind::new(6);
        uf.union(0, 1);
        uf.union(2, 3);
        uf.union(1, 3);
        assert_eq!(uf.find(0), uf.find(2));
        assert_ne!(uf.find(0), uf.find(4));
        assert_eq!(uf.set_size(3), 4);
        assert_eq!(uf.set_size(5), 1);
    }

    #[test]
    fn test_partition_simple() {
        let g = grid("112\n122\n", 2);
        let clusters = partition(&g);
        assert_eq!(clusters.len(), 2);
        let sizes: Vec<usize> = clusters.iter().map(Cluster::len).collect();
        assert_eq!(sizes.iter().sum::<usize>(), 6);
        assert!(clusters.iter().all(|c| c.len() == 3));
        // First representative is the bottom-left cell.
        assert_eq!(clusters[0].representative, g.index(1, 0));
    }

    #[test]
    fn test_partition_u_shape() {
        // The two arms of the U only join through the bottom row.
        let g = grid("121\n121\n111\n", 2);
        let clusters = partition(&g);
        let ones: Vec<&Cluster> = clusters.iter().filter(|c| c.color == 1).collect();
        assert_eq!(ones.len(), 1);
        assert_eq!(ones[0].len(), 7);
    }

    #[test]
    fn test_valid_actions_skip_singletons() {
        let g = grid("123\n112\n", 3);
        let actions = valid_actions(&g);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].color, 1);
        assert_eq!(actions[0].size, 3);
    }

    #[test]
    fn test_has_removable_cluster() {
        assert!(!has_removable_cluster(&grid("12\n21\n", 2)));
        assert!(has_removable_cluster(&grid("12\n22\n", 2)));
        assert!(!has_removable_cluster(&Grid::empty(3, 3, 2).unwrap()));
    }

    #[test]
    fn test_remove_cluster_gravity_and_compaction() {
        // Removing the 1s empties column 0.
        let mut g = grid("13\n13\n12\n", 3);
        let idx = g.index(2, 0);
        let removed = remove_cluster(&mut g, idx);
        assert_eq!(removed.size, 3);
        assert_eq!(removed.color, 1);
        assert_eq!(g.to_string(), "3.\n3.\n2.\n");
        assert!(g.is_settled());

        // Cells above a removed cluster fall down.
        let mut g = grid("23\n13\n12\n", 3);
        let idx = g.index(1, 0);
        let removed = remove_cluster(&mut g, idx);
        assert_eq!(removed.size, 2);
        assert_eq!(g.to_string(), ".3\n.3\n22\n");
        assert!(g.is_settled());
    }

    #[test]
    fn test_remove_singleton_is_noop() {
        let mut g = grid("12\n21\n", 2);
        let before = g.clone();
        let removed = remove_cluster(&mut g, 0);
        assert_eq!(removed.size, 1);
        assert_eq!(g, before);
    }

    #[test]
    fn test_remove_empty_or_none() {
        let mut g = grid("..\n11\n", 1);
        let before = g.clone();
        assert_eq!(remove_cluster(&mut g, 0).size, 0);
        assert_eq!(remove_cluster(&mut g, CELL_NONE).size, 0);
        assert_eq!(g, before);
    }

    #[test]
    fn test_remove_random_cluster_terminal() {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(1);
        let mut g = grid("12\n21\n", 2);
        assert_eq!(remove_random_cluster(&mut g, &mut rng), ClusterData::NONE);

        let mut g = grid("11\n22\n", 2);
        let first = remove_random_cluster(&mut g, &mut rng);
        assert_eq!(first.size, 2);
        let second = remove_random_cluster(&mut g, &mut rng);
        assert_eq!(second.size, 2);
        assert!(g.is_cleared());
    }

    #[test]
    fn test_remove_random_cluster_skips_dead_rows() {
        use rand::SeedableRng;
        // Only the bottom-right L of 1s is removable; the other rows hold singletons.
        let text = "..\n12\n21\n11\n";
        assert_eq!(grid(text, 2).n_empty_rows(), 1);
        for seed in 0..32 {
            let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(seed);
            let mut g = grid(text, 2);
            let removed = remove_random_cluster(&mut g, &mut rng);
            assert_eq!((removed.color, removed.size), (1, 3));
            assert_eq!(g, grid("..\n..\n1.\n22\n", 2));
        }
    }
}
