//! MCTS configuration parameters.

use std::time::Duration;

use crate::search::SearchError;
use crate::strategy::{BackpropStrategy, FinalSelection, ValueTerm};

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Exploration constant C in the UCB formula.
    pub exploration: f64,

    /// Iteration budget per search. 0 = unbounded.
    pub max_iterations: u32,

    /// Wall-clock budget per search in milliseconds. 0 = unbounded.
    /// When both budgets are set the search stops at whichever runs out first.
    pub max_time_ms: u64,

    /// Maximum edges kept per expanded node. Expansion keeps the best seeds.
    pub max_children: usize,

    /// Maximum selection depth below the root.
    pub max_ply: usize,

    /// Rewards are divided by this before entering UCB so that scores of a few
    /// thousand points compare sensibly with the exploration term.
    pub reward_scale: f64,

    pub backprop: BackpropStrategy,
    pub value_term: ValueTerm,
    pub final_selection: FinalSelection,

    /// Keep the transposition table between searches instead of clearing it.
    pub reuse_table: bool,

    /// Finish the principal variation with a random rollout.
    pub complete_with_rollout: bool,

    /// RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: 0.5,
            max_iterations: 10_000,
            max_time_ms: 0,
            max_children: 128,
            max_ply: 256,
            reward_scale: 5000.0,
            backprop: BackpropStrategy::BestValue,
            value_term: ValueTerm::Average,
            final_selection: FinalSelection::BestValue,
            reuse_table: false,
            complete_with_rollout: true,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Create a small, deterministic config for testing.
    pub fn for_testing() -> Self {
        Self {
            max_iterations: 200,
            seed: Some(42),
            ..Self::default()
        }
    }

    /// Builder pattern: set the iteration budget.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.max_iterations = n;
        self
    }

    /// Builder pattern: set the time budget in milliseconds.
    pub fn with_time_ms(mut self, ms: u64) -> Self {
        self.max_time_ms = ms;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    pub fn with_max_children(mut self, n: usize) -> Self {
        self.max_children = n;
        self
    }

    pub fn with_max_ply(mut self, n: usize) -> Self {
        self.max_ply = n;
        self
    }

    pub fn with_backprop(mut self, strategy: BackpropStrategy) -> Self {
        self.backprop = strategy;
        self
    }

    pub fn with_value_term(mut self, term: ValueTerm) -> Self {
        self.value_term = term;
        self
    }

    pub fn with_final_selection(mut self, selection: FinalSelection) -> Self {
        self.final_selection = selection;
        self
    }

    pub fn with_reuse_table(mut self, reuse: bool) -> Self {
        self.reuse_table = reuse;
        self
    }

    pub fn with_rollout_completion(mut self, complete: bool) -> Self {
        self.complete_with_rollout = complete;
        self
    }

    /// Builder pattern: set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Time budget, if any.
    pub fn time_budget(&self) -> Option<Duration> {
        (self.max_time_ms > 0).then(|| Duration::from_millis(self.max_time_ms))
    }

    /// Check that the search can run and terminate with this config.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_iterations == 0 && self.max_time_ms == 0 {
            return Err(SearchError::UnboundedBudget);
        }
        if self.max_children == 0 {
            return Err(SearchError::InvalidConfig(
                "max_children must be at least 1".into(),
            ));
        }
        if self.max_ply == 0 {
            return Err(SearchError::InvalidConfig(
                "max_ply must be at least 1".into(),
            ));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "exploration must be a finite non-negative number, got {}",
                self.exploration
            )));
        }
        if !(self.reward_scale.is_finite() && self.reward_scale > 0.0) {
            return Err(SearchError::InvalidConfig(format!(
                "reward_scale must be positive, got {}",
                self.reward_scale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.max_children, 128);
        assert!((config.reward_scale - 5000.0).abs() < 1e-9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::default()
            .with_iterations(100)
            .with_exploration(0.25)
            .with_final_selection(FinalSelection::MostVisits);

        assert_eq!(config.max_iterations, 100);
        assert!((config.exploration - 0.25).abs() < 1e-9);
        assert_eq!(config.final_selection, FinalSelection::MostVisits);
    }

    #[test]
    fn test_unbounded_budget_rejected() {
        let config = MctsConfig::default().with_iterations(0).with_time_ms(0);
        assert!(matches!(config.validate(), Err(SearchError::UnboundedBudget)));

        let timed = MctsConfig::default().with_iterations(0).with_time_ms(50);
        assert!(timed.validate().is_ok());
        assert_eq!(timed.time_budget(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(MctsConfig::default().with_max_children(0).validate().is_err());
        assert!(MctsConfig::default().with_max_ply(0).validate().is_err());
        assert!(MctsConfig::default()
            .with_exploration(f64::NAN)
            .validate()
            .is_err());
        let mut config = MctsConfig::default();
        config.reward_scale = 0.0;
        assert!(config.validate().is_err());
    }
}
