//! Named search strategies, parseable from config strings.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct ParseStrategyError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// What a freshly expanded leaf propagates up the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackpropStrategy {
    /// Best seeded rollout among the new edges.
    #[default]
    BestValue,
    /// Mean of all seeded rollouts.
    AverageValue,
    /// Mean of the top quarter of seeded rollouts (at least one).
    AverageOfBest,
}

impl BackpropStrategy {
    /// Reduce the seeded rewards of a fresh expansion to a single value.
    ///
    /// `seeds` must be sorted best first.
    pub fn leaf_value(self, seeds: &[f64]) -> f64 {
        if seeds.is_empty() {
            return 0.0;
        }
        match self {
            BackpropStrategy::BestValue => seeds[0],
            BackpropStrategy::AverageValue => mean(seeds),
            BackpropStrategy::AverageOfBest => {
                let n = (seeds.len() / 4).max(1);
                mean(&seeds[..n])
            }
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Which edge statistic feeds the exploitation half of UCB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueTerm {
    #[default]
    Average,
    Best,
}

/// How the answer is read off the root once the budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinalSelection {
    MostVisits,
    BestAverage,
    #[default]
    BestValue,
    Ucb,
}

macro_rules! named_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const NAMES: &'static str = concat!($($name, " "),+);

            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseStrategyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
                match normalized.as_str() {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(ParseStrategyError {
                        kind: $kind,
                        value: s.to_string(),
                        expected: Self::NAMES.trim_end(),
                    }),
                }
            }
        }
    };
}

named_enum!(BackpropStrategy, "backprop strategy", {
    BestValue => "best_value",
    AverageValue => "average_value",
    AverageOfBest => "average_of_best",
});

named_enum!(ValueTerm, "value term", {
    Average => "average",
    Best => "best",
});

named_enum!(FinalSelection, "final selection", {
    MostVisits => "most_visits",
    BestAverage => "best_average",
    BestValue => "best_value",
    Ucb => "ucb",
});
