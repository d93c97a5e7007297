//! Board sources: a text file or a seeded random generator.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use games_samegame::{Grid, MAX_COLORS};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::info;

use crate::config::Config;

/// Build the initial board described by the command line.
pub fn initial_grid(config: &Config) -> Result<Grid> {
    match &config.board {
        Some(path) => load_board(path),
        None => random_board(config.width, config.height, config.colors, config.seed()),
    }
}

/// Read a board file. The color count is the highest color found in it.
pub fn load_board(path: &Path) -> Result<Grid> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read board file {}", path.display()))?;
    let num_colors = infer_colors(&text)?;
    let grid = Grid::parse(&text, num_colors)
        .with_context(|| format!("Failed to parse board file {}", path.display()))?;
    info!(
        "Loaded {}x{} board with {} colors from {}",
        grid.width(),
        grid.height(),
        num_colors,
        path.display()
    );
    Ok(grid)
}

/// Generate a board, from entropy when no seed is given.
pub fn random_board(
    width: usize,
    height: usize,
    colors: usize,
    seed: Option<u64>,
) -> Result<Grid> {
    let mut rng = match seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };
    let grid = Grid::random(width, height, colors, &mut rng)
        .context("Failed to generate random board")?;
    info!(
        "Generated {}x{} board with {} colors (seed: {:?})",
        width, height, colors, seed
    );
    Ok(grid)
}

fn infer_colors(text: &str) -> Result<usize> {
    let max = text
        .chars()
        .filter_map(|c| c.to_digit(10))
        .max()
        .unwrap_or(0) as usize;
    if max > MAX_COLORS {
        return Err(anyhow!("board uses color {}, at most {} supported", max, MAX_COLORS));
    }
    Ok(max.max(1))
}
