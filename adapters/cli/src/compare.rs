//! Side-by-side comparison of two policies over a directory of scenarios.

use std::fmt;

use accountant_system_planner::{Planner, PlannerConfig, Policy};
use anyhow::{Context, Result};
use tracing::info;

use crate::{
    referee::{self, MatchReport},
    scenario::Scenario,
};

/// Aggregated results of one policy over every scenario.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Totals {
    /// Sum of final scores.
    pub(crate) score: i64,
    /// Sum of awarded bonuses.
    pub(crate) bonus: i64,
    /// Number of matches that earned a positive bonus.
    pub(crate) positive_bonus_games: usize,
    /// Number of matches played.
    pub(crate) games: usize,
}

impl Totals {
    fn record(&mut self, report: &MatchReport) {
        self.score += i64::from(report.score);
        self.bonus += i64::from(report.bonus);
        if report.bonus > 0 {
            self.positive_bonus_games += 1;
        }
        self.games += 1;
    }

    /// Percentage of the total score that came from bonuses.
    pub(crate) fn bonus_share(&self) -> f64 {
        percentage(self.bonus as f64, self.score as f64)
    }

    /// Percentage of matches that earned a positive bonus.
    pub(crate) fn positive_bonus_share(&self) -> f64 {
        percentage(self.positive_bonus_games as f64, self.games as f64)
    }
}

/// Per-scenario pair of scores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub(crate) scenario: String,
    pub(crate) baseline: i32,
    pub(crate) candidate: i32,
}

/// Full comparison between a baseline and a candidate policy.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Comparison {
    pub(crate) baseline_policy: Policy,
    pub(crate) candidate_policy: Policy,
    pub(crate) outcomes: Vec<Outcome>,
    pub(crate) baseline: Totals,
    pub(crate) candidate: Totals,
}

/// Referees every scenario with both policies.
///
/// Each match gets a fresh planner so turn counters never leak between games.
pub(crate) fn run(
    scenarios: &[Scenario],
    config: &PlannerConfig,
    baseline: Policy,
    candidate: Policy,
) -> Result<Comparison> {
    let mut comparison = Comparison {
        baseline_policy: baseline,
        candidate_policy: candidate,
        outcomes: Vec::with_capacity(scenarios.len()),
        baseline: Totals::default(),
        candidate: Totals::default(),
    };

    for scenario in scenarios {
        let before = referee_with(scenario, config, baseline)?;
        let after = referee_with(scenario, config, candidate)?;
        info!(
            scenario = %scenario.name,
            baseline = before.score,
            candidate = after.score,
            "scenario compared"
        );

        comparison.baseline.record(&before);
        comparison.candidate.record(&after);
        comparison.outcomes.push(Outcome {
            scenario: scenario.name.clone(),
            baseline: before.score,
            candidate: after.score,
        });
    }

    Ok(comparison)
}

fn referee_with(scenario: &Scenario, config: &PlannerConfig, policy: Policy) -> Result<MatchReport> {
    let mut planner = Planner::new(PlannerConfig { policy, ..*config })
        .with_context(|| format!("cannot build {policy} planner"))?;
    Ok(referee::play(&scenario.snapshot, &mut planner))
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            let verdict = match outcome.candidate.cmp(&outcome.baseline) {
                std::cmp::Ordering::Greater => "improvement",
                std::cmp::Ordering::Less => "regression",
                std::cmp::Ordering::Equal => continue,
            };
            writeln!(
                f,
                "{:31} {verdict}: {} -> {}",
                outcome.scenario, outcome.baseline, outcome.candidate
            )?;
        }
        writeln!(
            f,
            "Sum ({} -> {}): {} -> {}",
            self.baseline_policy, self.candidate_policy, self.baseline.score, self.candidate.score
        )?;
        writeln!(
            f,
            "Bonus: {} -> {} ({:.2}% -> {:.2}%)",
            self.baseline.bonus,
            self.candidate.bonus,
            self.baseline.bonus_share(),
            self.candidate.bonus_share()
        )?;
        write!(
            f,
            "Positive bonus: {:.2}% -> {:.2}%",
            self.baseline.positive_bonus_share(),
            self.candidate.positive_bonus_share()
        )
    }
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}
