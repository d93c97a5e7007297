//! Tests for the configuration module.

use super::*;
use std::io::Write;
use std::sync::Mutex;

/// Tests touching process environment variables run one at a time.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.common.seed, None);
    assert_eq!(config.board.width, 15);
    assert_eq!(config.board.height, 15);
    assert_eq!(config.board.num_colors, 5);
}

#[test]
fn test_search_defaults() {
    let config = CentralConfig::default();
    assert!((config.search.exploration - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.search.max_iterations, 10_000);
    assert_eq!(config.search.max_time_ms, 0);
    assert_eq!(config.search.max_children, 128);
    assert_eq!(config.search.max_ply, 256);
    assert!((config.search.reward_scale - 5000.0).abs() < f64::EPSILON);
    assert_eq!(config.search.backprop, "best_value");
    assert_eq!(config.search.value_term, "average");
    assert_eq!(config.search.final_selection, "best_value");
    assert!(!config.search.reuse_table);
    assert!(config.search.complete_with_rollout);
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
log_level = "debug"
seed = 7

[board]
width = 10
height = 12
num_colors = 3

[search]
max_iterations = 500
max_time_ms = 250
backprop = "average_of_best"
reuse_table = true
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.log_level, "debug");
    assert_eq!(config.common.seed, Some(7));
    assert_eq!(config.board.width, 10);
    assert_eq!(config.board.height, 12);
    assert_eq!(config.board.num_colors, 3);
    assert_eq!(config.search.max_iterations, 500);
    assert_eq!(config.search.max_time_ms, 250);
    assert_eq!(config.search.backprop, "average_of_best");
    assert!(config.search.reuse_table);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[search]
exploration = 0.1
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert!((config.search.exploration - 0.1).abs() < f64::EPSILON);
    assert_eq!(config.search.max_children, 128); // Default
    assert_eq!(config.board.width, 15); // Default
    assert_eq!(config.common.log_level, "info"); // Default
}

#[test]
fn test_load_from_path() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let file = write_config("[board]\nnum_colors = 4\n");
    let config = load_from_path(file.path());
    assert_eq!(config.board.num_colors, 4);
    assert_eq!(config.board.width, 15);
}

#[test]
fn test_invalid_file_falls_back_to_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let file = write_config("[board\nwidth = ");
    let config = load_from_path(file.path());
    assert_eq!(config.board.width, 15);

    let dir = tempfile::tempdir().unwrap();
    let config = load_from_path(&dir.path().join("missing.toml"));
    assert_eq!(config.search.max_children, 128);
}

#[test]
fn test_samegame_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("SAMEGAME_BOARD_WIDTH", "9");
    std::env::set_var("SAMEGAME_COMMON_SEED", "123");
    std::env::set_var("SAMEGAME_SEARCH_EXPLORATION", "0.25");
    std::env::set_var("SAMEGAME_SEARCH_FINAL_SELECTION", "most_visits");
    std::env::set_var("SAMEGAME_SEARCH_REUSE_TABLE", "true");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.board.width, 9);
    assert_eq!(config.common.seed, Some(123));
    assert!((config.search.exploration - 0.25).abs() < f64::EPSILON);
    assert_eq!(config.search.final_selection, "most_visits");
    assert!(config.search.reuse_table);

    std::env::remove_var("SAMEGAME_BOARD_WIDTH");
    std::env::remove_var("SAMEGAME_COMMON_SEED");
    std::env::remove_var("SAMEGAME_SEARCH_EXPLORATION");
    std::env::remove_var("SAMEGAME_SEARCH_FINAL_SELECTION");
    std::env::remove_var("SAMEGAME_SEARCH_REUSE_TABLE");
}

#[test]
fn test_unparsable_env_override_is_ignored() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("SAMEGAME_SEARCH_MAX_ITERATIONS", "lots");
    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.search.max_iterations, 10_000);
    std::env::remove_var("SAMEGAME_SEARCH_MAX_ITERATIONS");
}

#[test]
fn test_explicit_config_path() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let file = write_config("[search]\nmax_ply = 64\n");
    std::env::set_var(CONFIG_ENV_VAR, file.path());
    let config = load_config();
    std::env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(config.search.max_ply, 64);
}
