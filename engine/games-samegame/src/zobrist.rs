//! Zobrist hashing of board contents.
//!
//! One random 64-bit key is drawn per `(cell, color)` pair; a board hashes to
//! the XOR of the keys of its occupied cells. The two low bits of every key
//! are cleared so they can carry cached facts about the board instead:
//!
//! ```text
//! bit 0: terminal status known
//! bit 1: board is terminal (no removable cluster)
//! ```

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::grid::{Cell, Color, Grid, EMPTY};

/// Bit 0: the terminal flag below is valid.
pub const FLAG_KNOWN: u64 = 0b01;
/// Bit 1: the board has no removable cluster.
pub const FLAG_TERMINAL: u64 = 0b10;
/// Both flag bits.
pub const FLAG_MASK: u64 = FLAG_KNOWN | FLAG_TERMINAL;

/// Board hash with two cached status bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(u64);

impl Key {
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Hash of the board contents alone. Use this to compare boards.
    #[inline]
    pub fn board_hash(self) -> u64 {
        self.0 & !FLAG_MASK
    }

    /// Cached terminal status, if it was computed alongside the hash.
    #[inline]
    pub fn terminal(self) -> Option<bool> {
        (self.0 & FLAG_KNOWN != 0).then_some(self.0 & FLAG_TERMINAL != 0)
    }
}

/// Random key table, built once per board shape and shared read-only.
#[derive(Debug, Clone)]
pub struct ZobristTable {
    width: usize,
    height: usize,
    num_colors: usize,
    keys: Vec<u64>,
}

impl ZobristTable {
    pub const DEFAULT_SEED: u64 = 0x5eed_c1a5_7e25_0b1f;

    pub fn new(width: usize, height: usize, num_colors: usize, seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let keys = (0..width * height * (num_colors + 1))
            .map(|_| rng.next_u64() & !FLAG_MASK)
            .collect();
        Self {
            width,
            height,
            num_colors,
            keys,
        }
    }

    /// Table matching the shape of `grid`.
    pub fn for_grid(grid: &Grid, seed: u64) -> Self {
        Self::new(grid.width(), grid.height(), grid.num_colors(), seed)
    }

    /// True if this table can hash `grid`.
    pub fn fits(&self, grid: &Grid) -> bool {
        self.width == grid.width()
            && self.height == grid.height()
            && self.num_colors == grid.num_colors()
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.num_colors)
    }

    /// Key for `color` at `cell`. The empty color has no effect on hashes.
    #[inline]
    pub fn cell_key(&self, cell: Cell, color: Color) -> u64 {
        if color == EMPTY {
            0
        } else {
            self.keys[cell * (self.num_colors + 1) + color as usize]
        }
    }

    /// Hash the whole board and record its terminal status in the flag bits.
    pub fn hash(&self, grid: &Grid) -> Key {
        debug_assert!(self.fits(grid));
        let w = grid.width();
        let cells = grid.cells();
        let mut hash = 0u64;
        let mut removable = false;

        for cell in grid.n_empty_rows() * w..cells.len() {
            let color = cells[cell];
            if color == EMPTY {
                continue;
            }
            hash ^= self.cell_key(cell, color);
            if !removable {
                removable = ((cell % w) + 1 < w && cells[cell + 1] == color)
                    || (cell + w < cells.len() && cells[cell + w] == color);
            }
        }

        let flags = if removable {
            FLAG_KNOWN
        } else {
            FLAG_KNOWN | FLAG_TERMINAL
        };
        Key(hash | flags)
    }
}
