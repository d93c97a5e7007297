//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_seed() -> Option<u64> {
    defaults::seed()
}
fn d_width() -> usize {
    defaults::width()
}
fn d_height() -> usize {
    defaults::height()
}
fn d_num_colors() -> usize {
    defaults::num_colors()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_max_iterations() -> u32 {
    defaults::max_iterations()
}
fn d_max_time_ms() -> u64 {
    defaults::max_time_ms()
}
fn d_max_children() -> usize {
    defaults::max_children()
}
fn d_max_ply() -> usize {
    defaults::max_ply()
}
fn d_reward_scale() -> f64 {
    defaults::reward_scale()
}
fn d_backprop() -> String {
    defaults::backprop().into()
}
fn d_value_term() -> String {
    defaults::value_term().into()
}
fn d_final_selection() -> String {
    defaults::final_selection().into()
}
fn d_reuse_table() -> bool {
    defaults::reuse_table()
}
fn d_complete_with_rollout() -> bool {
    defaults::complete_with_rollout()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Settings shared by every binary
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
    /// RNG seed for board generation and search. Unset seeds from entropy.
    #[serde(default = "d_seed")]
    pub seed: Option<u64>,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
            seed: defaults::seed(),
        }
    }
}

/// Shape of generated boards
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoardConfig {
    #[serde(default = "d_width")]
    pub width: usize,
    #[serde(default = "d_height")]
    pub height: usize,
    #[serde(default = "d_num_colors")]
    pub num_colors: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: defaults::width(),
            height: defaults::height(),
            num_colors: defaults::num_colors(),
        }
    }
}

/// MCTS search settings. Strategy names are parsed by the consumer.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    #[serde(default = "d_exploration")]
    pub exploration: f64,
    #[serde(default = "d_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "d_max_time_ms")]
    pub max_time_ms: u64,
    #[serde(default = "d_max_children")]
    pub max_children: usize,
    #[serde(default = "d_max_ply")]
    pub max_ply: usize,
    #[serde(default = "d_reward_scale")]
    pub reward_scale: f64,
    #[serde(default = "d_backprop")]
    pub backprop: String,
    #[serde(default = "d_value_term")]
    pub value_term: String,
    #[serde(default = "d_final_selection")]
    pub final_selection: String,
    #[serde(default = "d_reuse_table")]
    pub reuse_table: bool,
    #[serde(default = "d_complete_with_rollout")]
    pub complete_with_rollout: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration: defaults::exploration(),
            max_iterations: defaults::max_iterations(),
            max_time_ms: defaults::max_time_ms(),
            max_children: defaults::max_children(),
            max_ply: defaults::max_ply(),
            reward_scale: defaults::reward_scale(),
            backprop: defaults::backprop().into(),
            value_term: defaults::value_term().into(),
            final_selection: defaults::final_selection().into(),
            reuse_table: defaults::reuse_table(),
            complete_with_rollout: defaults::complete_with_rollout(),
        }
    }
}
