//! Mutable game state with stack-disciplined apply/undo.
//!
//! A [`State`] owns a ply-indexed stack of [`StateData`] snapshots. Applying
//! an action copies the current snapshot into the next slot and mutates the
//! copy; undoing steps back one slot, so the previous snapshot is restored
//! exactly. Slots are reused between searches, so descending and unwinding
//! does not allocate once the stack has grown to the deepest ply seen.

use std::sync::Arc;

use rand::Rng;

use crate::cluster::{self, ClusterData};
use crate::grid::{BoardError, ColorCounter, Grid};
use crate::zobrist::{Key, ZobristTable};

/// One board snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateData {
    grid: Grid,
    counter: ColorCounter,
    /// Cached hash, `None` while stale.
    key: Option<Key>,
    /// Actions applied since the initial board.
    ply: u32,
}

impl StateData {
    pub fn new(grid: Grid) -> Self {
        let counter = ColorCounter::from_grid(&grid);
        Self {
            grid,
            counter,
            key: None,
            ply: 0,
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn counter(&self) -> &ColorCounter {
        &self.counter
    }

    #[inline]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    #[inline]
    pub fn cached_key(&self) -> Option<Key> {
        self.key
    }

    fn copy_from(&mut self, other: &StateData) {
        self.grid.copy_from(&other.grid);
        self.counter.copy_from(&other.counter);
        self.key = other.key;
        self.ply = other.ply;
    }

    /// Book-keeping after a removal was carried out on `grid`.
    fn record(&mut self, removed: &ClusterData) {
        if removed.is_removable() {
            self.counter.remove(removed.color, removed.size);
            self.key = None;
            self.ply += 1;
        }
    }
}

/// Search handle over a stack of board snapshots.
#[derive(Debug, Clone)]
pub struct State {
    hasher: Arc<ZobristTable>,
    stack: Vec<StateData>,
    /// Index of the current snapshot. Each slot's predecessor is `depth - 1`.
    depth: usize,
}

impl State {
    /// Create a state with a freshly built hasher using the default seed.
    pub fn new(grid: Grid) -> Self {
        let hasher = Arc::new(ZobristTable::for_grid(&grid, ZobristTable::DEFAULT_SEED));
        Self::from_parts(grid, hasher)
    }

    /// Create a state sharing an existing hasher.
    pub fn with_hasher(grid: Grid, hasher: Arc<ZobristTable>) -> Result<Self, BoardError> {
        if !hasher.fits(&grid) {
            let (w, h, k) = hasher.shape();
            return Err(BoardError::HasherMismatch {
                expected: format!("{}x{} with {} colors", w, h, k),
                actual: format!(
                    "{}x{} with {} colors",
                    grid.width(),
                    grid.height(),
                    grid.num_colors()
                ),
            });
        }
        Ok(Self::from_parts(grid, hasher))
    }

    fn from_parts(grid: Grid, hasher: Arc<ZobristTable>) -> Self {
        Self {
            hasher,
            stack: vec![StateData::new(grid)],
            depth: 0,
        }
    }

    /// A new state whose root is this state's current snapshot.
    pub fn snapshot(&self) -> State {
        Self {
            hasher: Arc::clone(&self.hasher),
            stack: vec![self.data().clone()],
            depth: 0,
        }
    }

    /// Pre-grow the snapshot stack to hold `plies` actions.
    pub fn reserve(&mut self, plies: usize) {
        let wanted = plies + 1;
        while self.stack.len() < wanted {
            let copy = self.stack[self.depth].clone();
            self.stack.push(copy);
        }
    }

    #[inline]
    pub fn data(&self) -> &StateData {
        &self.stack[self.depth]
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.stack[self.depth].grid
    }

    #[inline]
    pub fn counter(&self) -> &ColorCounter {
        &self.stack[self.depth].counter
    }

    /// Number of actions applied since the initial board.
    #[inline]
    pub fn ply(&self) -> u32 {
        self.stack[self.depth].ply
    }

    /// Number of undoable actions on the stack.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn hasher(&self) -> &Arc<ZobristTable> {
        &self.hasher
    }

    /// All removable clusters on the current board.
    pub fn valid_actions(&self) -> Vec<ClusterData> {
        cluster::valid_actions(self.grid())
    }

    /// Apply `action` on a copy of the current snapshot and make the copy current.
    ///
    /// Always pushes a snapshot, even when nothing was removed, so every call
    /// must be paired with [`State::undo_action`]. The returned descriptor is
    /// what actually happened; callers score with it, not with `action`.
    pub fn apply_action(&mut self, action: &ClusterData) -> ClusterData {
        let next = self.depth + 1;
        if next == self.stack.len() {
            let copy = self.stack[self.depth].clone();
            self.stack.push(copy);
        } else {
            let (lower, upper) = self.stack.split_at_mut(next);
            upper[0].copy_from(&lower[self.depth]);
        }
        self.depth = next;

        let data = &mut self.stack[next];
        let removed = cluster::remove_cluster(&mut data.grid, action.cell);
        data.record(&removed);
        removed
    }

    /// Remove a random cluster directly on the current snapshot.
    ///
    /// Nothing is pushed: the mutation can only be discarded by undoing the
    /// action that created the current snapshot.
    pub fn apply_random_action<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ClusterData {
        let data = &mut self.stack[self.depth];
        let removed = cluster::remove_random_cluster(&mut data.grid, rng);
        data.record(&removed);
        removed
    }

    /// Return to the snapshot that `action` was applied to.
    ///
    /// # Panics
    /// Panics when called at the root snapshot.
    pub fn undo_action(&mut self, action: &ClusterData) {
        assert!(self.depth > 0, "undo_action called at the root state");
        debug_assert!(
            !action.is_removable()
                || self.stack[self.depth - 1].counter.get(action.color)
                    >= self.stack[self.depth].counter.get(action.color) + action.size,
            "undo_action out of order"
        );
        self.depth -= 1;
    }

    /// Board hash with cached terminal bits, computed on demand.
    pub fn key(&mut self) -> Key {
        let data = &mut self.stack[self.depth];
        match data.key {
            Some(key) => key,
            None => {
                let key = self.hasher.hash(&data.grid);
                data.key = Some(key);
                key
            }
        }
    }

    /// True when no removable cluster remains.
    pub fn is_terminal(&self) -> bool {
        let data = self.data();
        match data.key.and_then(Key::terminal) {
            Some(terminal) => terminal,
            None => !cluster::has_removable_cluster(&data.grid),
        }
    }

    /// True when every cell is empty.
    pub fn is_empty(&self) -> bool {
        self.counter().occupied() == 0
    }
}
