use std::{fmt, str::FromStr, time::Duration};

use accountant_system_evolution::Config as EvolutionConfig;
use accountant_system_lookahead::Config as LookaheadConfig;
use serde::Deserialize;
use thiserror::Error;

/// Strategy used to pick the defender's action each turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Always shoot the nearest enemy.
    NearestShot,
    /// Walk toward the arena centre for four turns, then shoot the nearest enemy.
    Scripted,
    /// Single-turn decision of the heuristic playout policy.
    Heuristic,
    /// Ring and focus-fire lookahead search.
    #[default]
    Lookahead,
    /// Evolutionary search with heuristic fall-back.
    Evolution,
    /// Lookahead and evolution on half the turn budget each; the higher score wins.
    Hybrid,
}

impl Policy {
    /// Every policy, in declaration order.
    pub const ALL: [Policy; 6] = [
        Policy::NearestShot,
        Policy::Scripted,
        Policy::Heuristic,
        Policy::Lookahead,
        Policy::Evolution,
        Policy::Hybrid,
    ];

    /// Kebab-case name used on the command line and in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Policy::NearestShot => "nearest-shot",
            Policy::Scripted => "scripted",
            Policy::Heuristic => "heuristic",
            Policy::Lookahead => "lookahead",
            Policy::Evolution => "evolution",
            Policy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Policy::ALL
            .into_iter()
            .find(|policy| policy.name() == value)
            .ok_or_else(|| ConfigError::UnknownPolicy(value.to_owned()))
    }
}

/// Errors raised while interpreting planner configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The policy name does not match any known policy.
    #[error("unknown policy `{0}`; expected one of nearest-shot, scripted, heuristic, lookahead, evolution, hybrid")]
    UnknownPolicy(String),
    /// A move ring must have at least one heading.
    #[error("lookahead ring sizes must be positive")]
    EmptyRing,
    /// Candidate moves must lie away from the defender.
    #[error("move radius must be positive, got {0}")]
    NonPositiveRadius(i32),
    /// The evolutionary search needs genomes to evolve.
    #[error("population size and genome length must be positive")]
    EmptyPopulation,
    /// Breeding rates are fractions of the population and cannot be negative.
    #[error("breeding rate must be a finite non-negative number, got {0}")]
    InvalidRate(f64),
    /// A zero turn budget leaves no time to search.
    #[error("turn budget must be positive")]
    ZeroBudget,
}

/// Planner configuration, usually loaded from a TOML file.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Strategy applied every turn.
    pub policy: Policy,
    /// Wall-clock allowance for a hybrid turn, in milliseconds.
    pub turn_budget_ms: u64,
    /// Lookahead search tuning.
    pub lookahead: LookaheadConfig,
    /// Evolutionary search tuning.
    pub evolution: EvolutionConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            turn_budget_ms: 90,
            lookahead: LookaheadConfig::default(),
            evolution: EvolutionConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Checks that every search can run with the configured values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.turn_budget_ms == 0 {
            return Err(ConfigError::ZeroBudget);
        }

        let lookahead = &self.lookahead;
        if lookahead.ring_size == 0 || lookahead.crowded_ring_size == 0 {
            return Err(ConfigError::EmptyRing);
        }
        if lookahead.radius <= 0 {
            return Err(ConfigError::NonPositiveRadius(lookahead.radius));
        }

        let evolution = &self.evolution;
        if evolution.population_size == 0 || evolution.genome_length == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if evolution.radius <= 0 {
            return Err(ConfigError::NonPositiveRadius(evolution.radius));
        }
        for rate in [evolution.mutation_rate, evolution.recombination_rate] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ConfigError::InvalidRate(rate));
            }
        }

        Ok(())
    }

    /// Allowance for a single lookahead search.
    #[must_use]
    pub fn lookahead_budget(&self) -> Duration {
        Duration::from_millis(self.lookahead.budget_ms)
    }

    /// Allowance for a single evolutionary search.
    #[must_use]
    pub fn evolution_budget(&self) -> Duration {
        Duration::from_millis(self.evolution.budget_ms)
    }

    /// Allowance for each half of a hybrid turn.
    #[must_use]
    pub fn hybrid_half_budget(&self) -> Duration {
        Duration::from_millis(self.turn_budget_ms) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_names_round_trip_through_from_str() {
        for policy in Policy::ALL {
            assert_eq!(policy.name().parse::<Policy>(), Ok(policy));
        }
        assert_eq!(
            "greedy".parse::<Policy>(),
            Err(ConfigError::UnknownPolicy("greedy".to_owned()))
        );
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(PlannerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_degenerate_values() {
        let mut config = PlannerConfig::default();
        config.evolution.mutation_rate = -0.5;
        assert_eq!(config.validate(), Err(ConfigError::InvalidRate(-0.5)));

        let mut config = PlannerConfig::default();
        config.lookahead.crowded_ring_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyRing));

        let mut config = PlannerConfig::default();
        config.turn_budget_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroBudget));
    }

    #[test]
    fn hybrid_splits_turn_budget() {
        let config = PlannerConfig::default();
        assert_eq!(config.hybrid_half_budget(), Duration::from_millis(45));
    }
}
