//! Configuration for the solver binary
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use engine_config::{load_config, CentralConfig};
use games_samegame::MAX_COLORS;
use mcts::{BackpropStrategy, FinalSelection, MctsConfig, ValueTerm};
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_width() -> usize {
    CENTRAL_CONFIG.board.width
}

fn default_height() -> usize {
    CENTRAL_CONFIG.board.height
}

fn default_colors() -> usize {
    CENTRAL_CONFIG.board.num_colors
}

fn default_iterations() -> u32 {
    CENTRAL_CONFIG.search.max_iterations
}

fn default_time_ms() -> u64 {
    CENTRAL_CONFIG.search.max_time_ms
}

fn default_exploration() -> f64 {
    CENTRAL_CONFIG.search.exploration
}

fn default_backprop() -> String {
    CENTRAL_CONFIG.search.backprop.clone()
}

fn default_selection() -> String {
    CENTRAL_CONFIG.search.final_selection.clone()
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

/// What to do with the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// One search from the initial board, printing its principal variation
    Sequence,
    /// Search again before every move
    Play,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "solver")]
#[command(about = "SameGame solver - Monte Carlo Tree Search")]
#[command(
    long_about = "Loads a SameGame board from a file (rows of digits, '.' for empty,
top row first) or generates a random one, searches it with MCTS and prints the
resulting move trace and score.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Board file to solve
    #[arg(long, conflicts_with = "random")]
    pub board: Option<PathBuf>,

    /// Generate a random board (the default when no board file is given)
    #[arg(long)]
    pub random: bool,

    /// Width of a generated board
    #[arg(long, default_value_t = default_width())]
    pub width: usize,

    /// Height of a generated board
    #[arg(long, default_value_t = default_height())]
    pub height: usize,

    /// Number of colors of a generated board
    #[arg(long, default_value_t = default_colors())]
    pub colors: usize,

    /// Seed for board generation and search (unset: from entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Iteration budget per search (0 for unbounded)
    #[arg(long, default_value_t = default_iterations())]
    pub iterations: u32,

    /// Time budget per search in milliseconds (0 for unbounded)
    #[arg(long, default_value_t = default_time_ms())]
    pub time_ms: u64,

    /// UCB exploration constant
    #[arg(long, default_value_t = default_exploration())]
    pub exploration: f64,

    /// Backpropagation strategy (best_value, average_value, average_of_best)
    #[arg(long, default_value_t = default_backprop())]
    pub backprop: String,

    /// Final action selection (most_visits, best_average, best_value, ucb)
    #[arg(long, default_value_t = default_selection())]
    pub selection: String,

    /// Solve mode
    #[arg(long, value_enum, default_value_t = Mode::Sequence)]
    pub mode: Mode,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.board.is_none() {
            if self.width == 0 || self.height == 0 {
                return Err(anyhow!("width and height must be greater than 0"));
            }
            if self.colors == 0 || self.colors > MAX_COLORS {
                return Err(anyhow!("colors must be between 1 and {}", MAX_COLORS));
            }
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        self.search_config()?.validate()?;
        Ok(())
    }

    /// Seed from the command line, else from config.toml.
    pub fn seed(&self) -> Option<u64> {
        self.seed.or(CENTRAL_CONFIG.common.seed)
    }

    /// Search settings: CLI flags over the central config.
    pub fn search_config(&self) -> Result<MctsConfig> {
        self.search_config_from(&CENTRAL_CONFIG)
    }

    fn search_config_from(&self, central: &CentralConfig) -> Result<MctsConfig> {
        let search = &central.search;
        let backprop: BackpropStrategy = self.backprop.parse()?;
        let final_selection: FinalSelection = self.selection.parse()?;
        let value_term: ValueTerm = search.value_term.parse()?;

        Ok(MctsConfig {
            exploration: self.exploration,
            max_iterations: self.iterations,
            max_time_ms: self.time_ms,
            max_children: search.max_children,
            max_ply: search.max_ply,
            reward_scale: search.reward_scale,
            backprop,
            value_term,
            final_selection,
            reuse_table: search.reuse_table,
            complete_with_rollout: search.complete_with_rollout,
            seed: self.seed.or(central.common.seed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            board: None,
            random: true,
            width: 10,
            height: 10,
            colors: 4,
            seed: Some(1),
            iterations: 100,
            time_ms: 0,
            exploration: 0.5,
            backprop: "best_value".into(),
            selection: "most_visits".into(),
            mode: Mode::Sequence,
            log_level: "info".into(),
        }
    }

    #[test]
    fn validate_accepts_valid_configuration() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "nope".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn validate_rejects_too_many_colors() {
        let mut cfg = base_config();
        cfg.colors = MAX_COLORS + 1;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("colors"));
    }

    #[test]
    fn validate_rejects_unbounded_search() {
        let mut cfg = base_config();
        cfg.iterations = 0;
        cfg.time_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_strategy() {
        let mut cfg = base_config();
        cfg.backprop = "median".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("backprop strategy"));
    }

    #[test]
    fn search_config_takes_cli_values() {
        let cfg = base_config();
        let search = cfg.search_config_from(&CentralConfig::default()).unwrap();
        assert_eq!(search.max_iterations, 100);
        assert_eq!(search.final_selection, FinalSelection::MostVisits);
        assert_eq!(search.backprop, BackpropStrategy::BestValue);
        assert_eq!(search.max_children, 128);
        assert_eq!(search.seed, Some(1));
    }

    #[test]
    fn cli_parses_flags() {
        let cfg = Config::try_parse_from([
            "solver",
            "--random",
            "--width",
            "6",
            "--iterations",
            "20",
            "--mode",
            "play",
        ])
        .unwrap();
        assert!(cfg.random);
        assert_eq!(cfg.width, 6);
        assert_eq!(cfg.iterations, 20);
        assert_eq!(cfg.mode, Mode::Play);
    }
}
