//! Authoritative match runner used by `play` and `compare`.

use std::fmt;

use accountant_core::{Command, Event, TurnSnapshot};
use accountant_system_planner::Planner;
use accountant_world::{self as world, query, World};
use tracing::{debug, trace, warn};

/// Upper bound on turns per match; enemies reach a data point long before it.
pub(crate) const TURN_LIMIT: u32 = 1_000;

/// Outcome of one refereed match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct MatchReport {
    /// Final score, bonus included.
    pub(crate) score: i32,
    /// Number of resolved turns.
    pub(crate) turns: u32,
    /// Whether the match ended with the defender killed.
    pub(crate) defender_killed: bool,
    /// Sum of every bonus awarded during the match.
    pub(crate) bonus: i32,
    /// Number of shots that hit.
    pub(crate) shots_fired: i32,
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "score={} turns={} bonus={} shots={} defender_killed={}",
            self.score, self.turns, self.bonus, self.shots_fired, self.defender_killed
        )
    }
}

/// Plays `opening` to the end, asking `planner` for every turn.
///
/// Each turn the planner only sees a fresh snapshot of the authoritative
/// world, exactly as it would over the line protocol.
pub(crate) fn play(opening: &TurnSnapshot, planner: &mut Planner) -> MatchReport {
    let mut world = World::from_snapshot(opening);
    let mut report = MatchReport::default();
    let mut events = Vec::new();

    while !query::is_game_over(&world) {
        if report.turns >= TURN_LIMIT {
            warn!(turns = report.turns, "turn limit reached");
            break;
        }

        let snapshot = query::snapshot(&world);
        let Some(decision) = planner.decide(&snapshot) else {
            break;
        };

        events.clear();
        world::apply(
            &mut world,
            Command::IssueAction {
                action: decision.action,
            },
            &mut events,
        );
        world::apply(&mut world, Command::ResolveTurn, &mut events);
        report.turns += 1;

        for event in &events {
            trace!(turn = report.turns, ?event, "event");
            if let Event::BonusAwarded { amount } = event {
                report.bonus += amount;
            }
        }
    }

    report.score = query::score(&world);
    report.defender_killed = query::is_defender_killed(&world);
    report.shots_fired = query::shots_fired(&world);
    debug!(%report, "match finished");
    report
}
