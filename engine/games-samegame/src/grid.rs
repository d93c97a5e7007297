//! Board representation: a row-major grid of colored cells.
//!
//! Row 0 is the top of the board and gravity pulls cells towards the last row:
//! ```text
//! Row 0: [ 0][ 1][ 2][ 3]  <- Top
//! Row 1: [ 4][ 5][ 6][ 7]
//! Row 2: [ 8][ 9][10][11]  <- Bottom
//!         Col 0  1  2  3
//! ```
//!
//! Every grid is kept in settled form: no empty cell sits below an occupied
//! cell in the same column, and all empty columns form a block on the right.

use std::fmt;

use rand::Rng;
use thiserror::Error;

/// Cell color: 0 is empty, `1..=num_colors` are the playable colors.
pub type Color = u8;

/// The empty color. Never part of a cluster.
pub const EMPTY: Color = 0;

/// Index of a cell in row-major order.
pub type Cell = usize;

/// Sentinel for "no cell".
pub const CELL_NONE: Cell = usize::MAX;

/// Largest supported color count (single-digit text format).
pub const MAX_COLORS: usize = 9;

/// Errors produced while building a grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Invalid color count {0}, expected 1..=9")]
    InvalidColorCount(usize),

    #[error("Cell {cell} has color {color}, expected 0..={num_colors}")]
    ColorOutOfRange {
        cell: usize,
        color: u8,
        num_colors: usize,
    },

    #[error("Expected {expected} cells, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },

    #[error("Row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Unexpected character {ch:?} at row {row}, column {col}")]
    InvalidCharacter { ch: char, row: usize, col: usize },

    #[error("Hasher built for {expected}, board is {actual}")]
    HasherMismatch { expected: String, actual: String },
}

/// Fixed-size board of colored cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    num_colors: usize,
    cells: Vec<Color>,
    /// Number of fully empty rows at the top. Only grows as the board empties.
    n_empty_rows: usize,
}

impl Grid {
    /// Create an all-empty grid.
    pub fn empty(width: usize, height: usize, num_colors: usize) -> Result<Self, BoardError> {
        Self::check_shape(width, height, num_colors)?;
        Ok(Self {
            width,
            height,
            num_colors,
            cells: vec![EMPTY; width * height],
            n_empty_rows: height,
        })
    }

    /// Build a grid from row-major cells (top row first).
    ///
    /// The board is settled on construction so that floating cells and
    /// gaps between columns from the input are removed.
    pub fn from_cells(
        width: usize,
        height: usize,
        num_colors: usize,
        cells: Vec<Color>,
    ) -> Result<Self, BoardError> {
        Self::check_shape(width, height, num_colors)?;
        if cells.len() != width * height {
            return Err(BoardError::CellCountMismatch {
                expected: width * height,
                actual: cells.len(),
            });
        }
        if let Some((cell, &color)) = cells
            .iter()
            .enumerate()
            .find(|(_, &c)| c as usize > num_colors)
        {
            return Err(BoardError::ColorOutOfRange {
                cell,
                color,
                num_colors,
            });
        }

        let mut grid = Self {
            width,
            height,
            num_colors,
            cells,
            n_empty_rows: 0,
        };
        grid.settle();
        Ok(grid)
    }

    /// Build a grid from rows of colors (top row first).
    pub fn from_rows(rows: &[Vec<Color>], num_colors: usize) -> Result<Self, BoardError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(BoardError::RaggedRow {
                    row,
                    expected: width,
                    actual: cells.len(),
                });
            }
        }
        Self::from_cells(width, height, num_colors, rows.concat())
    }

    /// Parse a textual board: one line per row (top first), one digit per
    /// cell, `.` or `0` for empty. Blank lines and whitespace inside a row
    /// are ignored.
    pub fn parse(text: &str, num_colors: usize) -> Result<Self, BoardError> {
        let mut rows = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let row = rows.len();
            let mut cells = Vec::with_capacity(line.len());
            for (col, ch) in line.chars().filter(|c| !c.is_whitespace()).enumerate() {
                let color = match ch {
                    '.' => EMPTY,
                    '0'..='9' => ch as u8 - b'0',
                    _ => return Err(BoardError::InvalidCharacter { ch, row, col }),
                };
                cells.push(color);
            }
            rows.push(cells);
        }
        Self::from_rows(&rows, num_colors)
    }

    /// Fill every cell with a uniformly random color.
    pub fn random<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        num_colors: usize,
        rng: &mut R,
    ) -> Result<Self, BoardError> {
        Self::check_shape(width, height, num_colors)?;
        let cells = (0..width * height)
            .map(|_| rng.gen_range(1..=num_colors as u8))
            .collect();
        Self::from_cells(width, height, num_colors, cells)
    }

    fn check_shape(width: usize, height: usize, num_colors: usize) -> Result<(), BoardError> {
        if width == 0 || height == 0 || width > u16::MAX as usize || height > u16::MAX as usize {
            return Err(BoardError::InvalidDimensions { width, height });
        }
        if num_colors == 0 || num_colors > MAX_COLORS {
            return Err(BoardError::InvalidColorCount(num_colors));
        }
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn num_colors(&self) -> usize {
        self.num_colors
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn cells(&self) -> &[Color] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, cell: Cell) -> Color {
        self.cells[cell]
    }

    /// Convert row and column to a cell index.
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> Cell {
        row * self.width + col
    }

    /// Convert a cell index to `(row, col)`.
    #[inline]
    pub fn row_col(&self, cell: Cell) -> (usize, usize) {
        (cell / self.width, cell % self.width)
    }

    /// Number of fully empty rows at the top of the board.
    #[inline]
    pub fn n_empty_rows(&self) -> usize {
        self.n_empty_rows
    }

    /// True when no cell is occupied.
    pub fn is_cleared(&self) -> bool {
        self.n_empty_rows == self.height
    }

    /// "Last row" sentinel: bottom-left cell. Empty iff the whole settled
    /// board is empty.
    #[inline]
    pub fn corner_cell(&self) -> Cell {
        self.index(self.height - 1, 0)
    }

    /// Copy another grid of the same shape into this one, reusing the
    /// cell allocation.
    pub fn copy_from(&mut self, other: &Grid) {
        self.width = other.width;
        self.height = other.height;
        self.num_colors = other.num_colors;
        self.cells.clone_from(&other.cells);
        self.n_empty_rows = other.n_empty_rows;
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [Color] {
        &mut self.cells
    }

    /// Apply gravity and column compaction, then refresh the empty-row cache.
    pub(crate) fn settle(&mut self) {
        self.apply_gravity();
        self.compact_columns();
        self.refresh_empty_rows();
    }

    /// Within each column, drop occupied cells to the bottom keeping their order.
    fn apply_gravity(&mut self) {
        let (w, h) = (self.width, self.height);
        for col in 0..w {
            let mut write = h;
            for row in (self.n_empty_rows..h).rev() {
                let color = self.cells[row * w + col];
                if color != EMPTY {
                    write -= 1;
                    if write != row {
                        self.cells[write * w + col] = color;
                        self.cells[row * w + col] = EMPTY;
                    }
                }
            }
        }
    }

    /// Shift occupied columns left so empty columns end up on the right.
    fn compact_columns(&mut self) {
        let (w, h) = (self.width, self.height);
        let bottom = (h - 1) * w;
        let mut dst = 0;
        for col in 0..w {
            if self.cells[bottom + col] == EMPTY {
                continue;
            }
            if dst != col {
                for row in self.n_empty_rows..h {
                    self.cells[row * w + dst] = self.cells[row * w + col];
                    self.cells[row * w + col] = EMPTY;
                }
            }
            dst += 1;
        }
    }

    fn refresh_empty_rows(&mut self) {
        let w = self.width;
        while self.n_empty_rows < self.height {
            let start = self.n_empty_rows * w;
            if self.cells[start..start + w].iter().any(|&c| c != EMPTY) {
                break;
            }
            self.n_empty_rows += 1;
        }
    }

    /// Check the settled-form invariant.
    pub fn is_settled(&self) -> bool {
        let (w, h) = (self.width, self.height);
        for col in 0..w {
            for row in 1..h {
                let above = self.cells[(row - 1) * w + col];
                let here = self.cells[row * w + col];
                if above != EMPTY && here == EMPTY {
                    return false;
                }
            }
        }
        let bottom = (h - 1) * w;
        let first_empty = (0..w).find(|&c| self.cells[bottom + c] == EMPTY);
        match first_empty {
            Some(col) => (col..w).all(|c| self.cells[bottom + c] == EMPTY),
            None => true,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            for col in 0..self.width {
                match self.cells[self.index(row, col)] {
                    EMPTY => f.write_str(".")?,
                    color => write!(f, "{}", color)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Per-color occupancy counts. Index 0 counts empty cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorCounter {
    counts: Vec<u32>,
}

impl ColorCounter {
    /// Count every color on the grid.
    pub fn from_grid(grid: &Grid) -> Self {
        let mut counts = vec![0u32; grid.num_colors() + 1];
        for &color in grid.cells() {
            counts[color as usize] += 1;
        }
        Self { counts }
    }

    #[inline]
    pub fn get(&self, color: Color) -> u32 {
        self.counts[color as usize]
    }

    #[inline]
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> u32 {
        self.counts[1..].iter().sum()
    }

    /// Record `n` cells of `color` becoming empty.
    pub(crate) fn remove(&mut self, color: Color, n: u32) {
        debug_assert!(color != EMPTY);
        self.counts[color as usize] -= n;
        self.counts[EMPTY as usize] += n;
    }

    pub(crate) fn copy_from(&mut self, other: &ColorCounter) {
        self.counts.clone_from(&other.counts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_parse_and_display() {
        // The floating 1 in the top-left corner settles on construction.
        let grid = Grid::parse("12.\n.21\n", 2).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.to_string(), ".2.\n121\n");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            Grid::parse("12\n1", 2),
            Err(BoardError::RaggedRow { row: 1, .. })
        ));
        assert!(matches!(
            Grid::parse("1x", 2),
            Err(BoardError::InvalidCharacter { ch: 'x', .. })
        ));
        assert!(matches!(
            Grid::parse("13", 2),
            Err(BoardError::ColorOutOfRange { color: 3, .. })
        ));
        assert!(matches!(
            Grid::empty(0, 3, 2),
            Err(BoardError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Grid::empty(3, 3, 10),
            Err(BoardError::InvalidColorCount(10))
        ));
    }

    #[test]
    fn test_empty_grid() {
        let grid = Grid::empty(4, 3, 3).unwrap();
        assert!(grid.is_cleared());
        assert_eq!(grid.n_empty_rows(), 3);
        assert!(grid.is_settled());
        assert_eq!(grid.get(grid.corner_cell()), EMPTY);
    }

    #[test]
    fn test_settle_gravity_and_columns() {
        // Column 0 empty, column 1 has a gap.
        let grid = Grid::parse(".1.\n...\n.23", 3).unwrap();
        assert_eq!(grid.to_string(), "...\n1..\n23.\n");
        assert!(grid.is_settled());
        assert_eq!(grid.n_empty_rows(), 1);
    }

    #[test]
    fn test_random_grid_is_full() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let grid = Grid::random(6, 5, 4, &mut rng).unwrap();
        assert!(grid.cells().iter().all(|&c| (1..=4).contains(&c)));
        assert_eq!(grid.n_empty_rows(), 0);
    }

    #[test]
    fn test_color_counter() {
        let grid = Grid::parse("11.\n122", 2).unwrap();
        let counter = ColorCounter::from_grid(&grid);
        assert_eq!(counter.counts(), &[1, 3, 2]);
        assert_eq!(counter.occupied(), 5);
    }

    #[test]
    fn test_row_col_roundtrip() {
        let grid = Grid::empty(5, 4, 2).unwrap();
        let cell = grid.index(3, 2);
        assert_eq!(cell, 17);
        assert_eq!(grid.row_col(cell), (3, 2));
        assert_eq!(grid.corner_cell(), 15);
    }
}
