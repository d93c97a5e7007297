//! Solver - SameGame MCTS command line front end
//!
//! Loads or generates a board, searches it and prints the move trace:
//! 1. `sequence` mode runs one search and plays its principal variation
//! 2. `play` mode searches again before every move

use anyhow::Result;
use clap::Parser;
use games_samegame::State;
use mcts::{play_game, MctsAgent, MctsPolicy};
use tracing::info;

mod board;
mod config;
mod report;

use crate::config::{Config, Mode};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    let grid = board::initial_grid(&config)?;
    let state = State::new(grid);
    let search = config.search_config()?;
    info!(
        mode = ?config.mode,
        iterations = search.max_iterations,
        time_ms = search.max_time_ms,
        backprop = %search.backprop,
        selection = %search.final_selection,
        "Starting search"
    );

    let actions = match config.mode {
        Mode::Sequence => {
            let mut agent = MctsAgent::new(search)?;
            let result = agent.search(&state);
            info!(
                iterations = result.iterations,
                elapsed_ms = result.elapsed.as_millis() as u64,
                table_size = result.table_size,
                expected_score = result.expected_score,
                "Search finished"
            );
            result.sequence
        }
        Mode::Play => {
            let mut policy = MctsPolicy::new(search)?;
            let game = play_game(&mut policy, &state);
            info!(
                moves = game.actions.len(),
                score = game.score,
                cleared = game.cleared,
                "Game finished"
            );
            game.actions
        }
    };

    let trace = report::render_trace(&state, &actions)?;
    print!("{}", trace.text);
    Ok(())
}
