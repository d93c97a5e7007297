//! Centralized configuration loading from config.toml.
//!
//! This crate provides the configuration structs and loading logic shared
//! by the solver binary and anything else that drives a search.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`SAMEGAME_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! SAMEGAME_<SECTION>_<KEY>=value
//!
//! Examples:
//!     SAMEGAME_COMMON_LOG_LEVEL=debug
//!     SAMEGAME_COMMON_SEED=7
//!     SAMEGAME_BOARD_NUM_COLORS=4
//!     SAMEGAME_SEARCH_MAX_ITERATIONS=50000
//!     SAMEGAME_SEARCH_BACKPROP=average_of_best
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_ENV_VAR, CONFIG_SEARCH_PATHS,
};
pub use structs::*;

#[cfg(test)]
mod tests;
