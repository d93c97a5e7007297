//! Default configuration values loaded from config.defaults.toml.
//!
//! This module loads defaults from the shared TOML file at compile time, so
//! the documented defaults and the compiled ones cannot drift apart.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    board: BoardDefaults,
    search: SearchDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct BoardDefaults {
    width: usize,
    height: usize,
    num_colors: usize,
}

#[derive(Debug, Deserialize)]
struct SearchDefaults {
    exploration: f64,
    max_iterations: u32,
    max_time_ms: u64,
    max_children: usize,
    max_ply: usize,
    reward_scale: f64,
    backprop: String,
    value_term: String,
    final_selection: String,
    reuse_table: bool,
    complete_with_rollout: bool,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}
pub fn seed() -> Option<u64> {
    DEFAULTS.common.seed
}

// Board
pub fn width() -> usize {
    DEFAULTS.board.width
}
pub fn height() -> usize {
    DEFAULTS.board.height
}
pub fn num_colors() -> usize {
    DEFAULTS.board.num_colors
}

// Search
pub fn exploration() -> f64 {
    DEFAULTS.search.exploration
}
pub fn max_iterations() -> u32 {
    DEFAULTS.search.max_iterations
}
pub fn max_time_ms() -> u64 {
    DEFAULTS.search.max_time_ms
}
pub fn max_children() -> usize {
    DEFAULTS.search.max_children
}
pub fn max_ply() -> usize {
    DEFAULTS.search.max_ply
}
pub fn reward_scale() -> f64 {
    DEFAULTS.search.reward_scale
}
pub fn backprop() -> &'static str {
    &DEFAULTS.search.backprop
}
pub fn value_term() -> &'static str {
    &DEFAULTS.search.value_term
}
pub fn final_selection() -> &'static str {
    &DEFAULTS.search.final_selection
}
pub fn reuse_table() -> bool {
    DEFAULTS.search.reuse_table
}
pub fn complete_with_rollout() -> bool {
    DEFAULTS.search.complete_with_rollout
}
