//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SAMEGAME_CONFIG";

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from subdirectory)
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by SAMEGAME_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    // Check for explicit config path
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from {}: {}", CONFIG_ENV_VAR, path.display());
            return load_from_path(&path);
        }
        warn!(
            "{}={} not found, searching defaults",
            CONFIG_ENV_VAR,
            path.display()
        );
    }

    // Search default locations
    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    // Fall back to defaults
    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (usize, u64, f64, bool, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
    // Optional parseable field (Option<u64>, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, optional_parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = Some(v);
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: SAMEGAME_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.log_level, "SAMEGAME_COMMON_LOG_LEVEL");
    env_override!(config, common.seed, "SAMEGAME_COMMON_SEED", optional_parse);

    // Board
    env_override!(config, board.width, "SAMEGAME_BOARD_WIDTH", parse);
    env_override!(config, board.height, "SAMEGAME_BOARD_HEIGHT", parse);
    env_override!(
        config,
        board.num_colors,
        "SAMEGAME_BOARD_NUM_COLORS",
        parse
    );

    // Search
    env_override!(
        config,
        search.exploration,
        "SAMEGAME_SEARCH_EXPLORATION",
        parse
    );
    env_override!(
        config,
        search.max_iterations,
        "SAMEGAME_SEARCH_MAX_ITERATIONS",
        parse
    );
    env_override!(
        config,
        search.max_time_ms,
        "SAMEGAME_SEARCH_MAX_TIME_MS",
        parse
    );
    env_override!(
        config,
        search.max_children,
        "SAMEGAME_SEARCH_MAX_CHILDREN",
        parse
    );
    env_override!(config, search.max_ply, "SAMEGAME_SEARCH_MAX_PLY", parse);
    env_override!(
        config,
        search.reward_scale,
        "SAMEGAME_SEARCH_REWARD_SCALE",
        parse
    );
    env_override!(config, search.backprop, "SAMEGAME_SEARCH_BACKPROP");
    env_override!(config, search.value_term, "SAMEGAME_SEARCH_VALUE_TERM");
    env_override!(
        config,
        search.final_selection,
        "SAMEGAME_SEARCH_FINAL_SELECTION"
    );
    env_override!(
        config,
        search.reuse_table,
        "SAMEGAME_SEARCH_REUSE_TABLE",
        parse
    );
    env_override!(
        config,
        search.complete_with_rollout,
        "SAMEGAME_SEARCH_COMPLETE_WITH_ROLLOUT",
        parse
    );

    config
}
