//! Human-readable move traces.

use anyhow::{anyhow, Result};
use games_samegame::{cluster_score, terminal_bonus, ClusterData, Score, State};

/// Outcome of replaying a move list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub text: String,
    pub score: Score,
    pub cleared: bool,
}

/// Replay `actions` from `state`, describing each removal and the final board.
///
/// Fails if an action does not remove a cluster on the board it meets.
pub fn render_trace(state: &State, actions: &[ClusterData]) -> Result<Trace> {
    let mut scratch = state.snapshot();
    let mut text = format!("Initial board:\n{}\n", scratch.grid());
    let mut score: Score = 0;

    for (index, action) in actions.iter().enumerate() {
        let (row, col) = scratch.grid().row_col(action.cell);
        let removed = scratch.apply_action(action);
        if !removed.is_removable() {
            return Err(anyhow!(
                "move {} at ({}, {}) does not remove a cluster",
                index + 1,
                row,
                col
            ));
        }
        let gain = cluster_score(removed.size);
        score += gain;
        text.push_str(&format!(
            "{:>3}. ({:>2}, {:>2}) color {} size {:>3} +{:<4} total {}\n",
            index + 1,
            row,
            col,
            removed.color,
            removed.size,
            gain,
            score
        ));
    }

    let cleared = scratch.is_empty();
    let bonus = terminal_bonus(cleared);
    score += bonus;
    text.push_str(&format!("\nFinal board:\n{}\n", scratch.grid()));
    if cleared {
        text.push_str(&format!("Board cleared, bonus +{}\n", bonus));
    }
    text.push_str(&format!("Moves: {}  Score: {}\n", actions.len(), score));

    Ok(Trace {
        text,
        score,
        cleared,
    })
}
