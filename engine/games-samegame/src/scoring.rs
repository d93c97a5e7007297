//! Scoring rules shared by the search and by anything replaying its output.

use thiserror::Error;

use crate::cluster::ClusterData;
use crate::grid::Cell;
use crate::state::State;

pub type Score = i64;

/// Bonus for clearing the whole board.
pub const CLEAR_BONUS: Score = 1000;

/// Points for removing a cluster of `size` cells: `(size - 2)^2`.
#[inline]
pub fn cluster_score(size: u32) -> Score {
    if size < 2 {
        0
    } else {
        let n = (size - 2) as Score;
        n * n
    }
}

/// End-of-game bonus.
#[inline]
pub fn terminal_bonus(cleared: bool) -> Score {
    if cleared {
        CLEAR_BONUS
    } else {
        0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("Action {index} at cell {cell} did not remove a cluster")]
    NotRemovable { index: usize, cell: Cell },
}

/// Replay `actions` from the current board of `state` and return the score,
/// including the clear bonus if the board ends up empty.
///
/// `state` itself is left untouched.
pub fn replay(state: &State, actions: &[ClusterData]) -> Result<Score, ReplayError> {
    let mut scratch = state.snapshot();
    let mut score = 0;
    for (index, action) in actions.iter().enumerate() {
        let removed = scratch.apply_action(action);
        if !removed.is_removable() {
            return Err(ReplayError::NotRemovable {
                index,
                cell: action.cell,
            });
        }
        score += cluster_score(removed.size);
    }
    Ok(score + terminal_bonus(scratch.is_empty()))
}
