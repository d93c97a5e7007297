//! Move selection policies.
//!
//! Every way of playing a board, from uniform random play to a full search
//! per move, sits behind the same [`Policy`] trait so drivers such as
//! [`play_game`] do not care which one they run.

use games_samegame::{cluster_score, terminal_bonus, ClusterData, Score, State};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::config::MctsConfig;
use crate::search::{MctsAgent, SearchError};

/// Chooses the next cluster to remove.
pub trait Policy {
    /// Name for logs and reports.
    fn name(&self) -> &str;

    /// Pick an action for the current board of `state`, or `None` if the
    /// board is terminal. `state` must not be left modified.
    fn choose_action(&mut self, state: &State) -> Option<ClusterData>;
}

/// Removes a uniformly random removable cluster.
#[derive(Debug)]
pub struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Create with a specific seed for determinism
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_action(&mut self, state: &State) -> Option<ClusterData> {
        state.valid_actions().choose(&mut self.rng).copied()
    }
}

/// Removes the largest cluster; ties go to the lowest representative cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyPolicy;

impl Policy for GreedyPolicy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn choose_action(&mut self, state: &State) -> Option<ClusterData> {
        state
            .valid_actions()
            .into_iter()
            .min_by_key(|a| (std::cmp::Reverse(a.size), a.cell))
    }
}

/// Runs a full search before every move.
#[derive(Debug)]
pub struct MctsPolicy {
    agent: MctsAgent,
}

impl MctsPolicy {
    pub fn new(config: MctsConfig) -> Result<Self, SearchError> {
        Ok(Self {
            agent: MctsAgent::new(config)?,
        })
    }

    pub fn agent(&self) -> &MctsAgent {
        &self.agent
    }
}

impl Policy for MctsPolicy {
    fn name(&self) -> &str {
        "mcts"
    }

    fn choose_action(&mut self, state: &State) -> Option<ClusterData> {
        let result = self.agent.search(state);
        debug!(
            ply = state.ply(),
            iterations = result.iterations,
            expected_score = result.expected_score,
            "MCTS policy move"
        );
        result.action
    }
}

/// A finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playthrough {
    /// Realized actions, in order.
    pub actions: Vec<ClusterData>,
    /// Final score including the clear bonus.
    pub score: Score,
    /// The board was emptied.
    pub cleared: bool,
}

/// Let `policy` play from `state`'s current board until no move is left.
///
/// `state` itself is not modified.
pub fn play_game<P: Policy + ?Sized>(policy: &mut P, state: &State) -> Playthrough {
    let mut board = state.snapshot();
    let mut actions = Vec::new();
    let mut score = 0;

    while let Some(action) = policy.choose_action(&board) {
        let removed = board.apply_action(&action);
        if !removed.is_removable() {
            // The policy named a stale cluster; drop the empty snapshot and stop.
            board.undo_action(&removed);
            break;
        }
        score += cluster_score(removed.size);
        actions.push(removed);
    }

    let cleared = board.is_empty();
    score += terminal_bonus(cleared);
    debug!(
        policy = policy.name(),
        moves = actions.len(),
        score,
        cleared,
        "Game finished"
    );
    Playthrough {
        actions,
        score,
        cleared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_samegame::{replay, Grid};

    fn random_state(seed: u64) -> State {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        State::new(Grid::random(8, 8, 3, &mut rng).unwrap())
    }

    #[test]
    fn test_random_policy_plays_valid_moves() {
        let state = random_state(1);
        let mut policy = RandomPolicy::with_seed(3);
        let game = play_game(&mut policy, &state);
        assert!(!game.actions.is_empty());
        assert_eq!(replay(&state, &game.actions).unwrap(), game.score);
    }

    #[test]
    fn test_greedy_picks_largest_then_lowest_cell() {
        let state = State::new(Grid::parse("1122\n1222\n", 2).unwrap());
        let mut greedy = GreedyPolicy;
        let action = greedy.choose_action(&state).unwrap();
        assert_eq!(action.size, 5);
        assert_eq!(action.color, 2);

        let tied = State::new(Grid::parse("12\n12\n", 2).unwrap());
        let pick = greedy.choose_action(&tied).unwrap();
        let lowest = tied.valid_actions().iter().map(|a| a.cell).min().unwrap();
        assert_eq!(pick.cell, lowest);
    }

    #[test]
    fn test_terminal_board_ends_game() {
        let state = State::new(Grid::parse("12\n21\n", 2).unwrap());
        let game = play_game(&mut GreedyPolicy, &state);
        assert!(game.actions.is_empty());
        assert_eq!(game.score, 0);
        assert!(!game.cleared);
    }

    #[test]
    fn test_mcts_policy_plays_to_the_end() {
        let state = random_state(2);
        let config = MctsConfig::for_testing().with_iterations(40);
        let mut policy = MctsPolicy::new(config).unwrap();
        let game = play_game(&mut policy, &state);

        assert_eq!(replay(&state, &game.actions).unwrap(), game.score);
        let mut end = state.snapshot();
        for action in &game.actions {
            end.apply_action(action);
        }
        assert!(end.is_terminal());
        assert_eq!(policy.name(), "mcts");
    }

    #[test]
    fn test_policies_behind_trait_objects() {
        let state = random_state(4);
        let mut policies: Vec<Box<dyn Policy>> = vec![
            Box::new(RandomPolicy::with_seed(5)),
            Box::new(GreedyPolicy),
        ];
        for policy in policies.iter_mut() {
            let game = play_game(policy.as_mut(), &state);
            assert_eq!(replay(&state, &game.actions).unwrap(), game.score);
        }
    }
}
