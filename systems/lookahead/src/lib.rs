#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shallow lookahead search over the defender's first action.
//!
//! Move candidates sit on a ring around the defender. Each one is applied to a
//! private copy of the world, optionally expanded by one more ring, and then
//! scored by a heuristic playout. Shot candidates are the nearest enemy plus,
//! while the field is small enough, focus fire on every living enemy. The
//! search polls a [`Budget`] between candidates and always keeps the best
//! proposal found so far; the move ring is searched before focus fire.

use accountant_core::{Action, Budget, EnemyId, Point};
use accountant_system_rollout::Rollout;
use accountant_world::{query, World};
use serde::Deserialize;
use tracing::{debug, trace};

/// Tuning knobs for [`Lookahead`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of move headings explored around the defender.
    pub ring_size: u32,
    /// Number of move headings once the field becomes crowded.
    pub crowded_ring_size: u32,
    /// Living-enemy count above which the field counts as crowded.
    pub crowd_threshold: usize,
    /// Distance from the defender to every move candidate.
    pub radius: i32,
    /// Number of move plies explored before handing over to the playout.
    pub plies: u32,
    /// Living-enemy count up to which focus fire on every enemy is evaluated.
    pub focus_fire_limit: usize,
    /// Wall-clock allowance for one search, in milliseconds.
    pub budget_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ring_size: 8,
            crowded_ring_size: 4,
            crowd_threshold: 20,
            radius: 1_000,
            plies: 2,
            focus_fire_limit: 20,
            budget_ms: 45,
        }
    }
}

/// First action proposed by a search together with its terminal score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Proposal {
    /// Action to take this turn.
    pub action: Action,
    /// Score the playout reached after taking the action.
    pub score: i32,
}

/// Lookahead search system.
#[derive(Clone, Debug, Default)]
pub struct Lookahead {
    config: Config,
    rollout: Rollout,
}

impl Lookahead {
    /// Creates a lookahead search with the provided configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            rollout: Rollout::new(),
        }
    }

    /// Configuration the search runs with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Picks the better of the best move and the best shot.
    ///
    /// The nearest-enemy shot is scored first, then the move ring, and focus
    /// fire gets whatever budget remains. Equal scores favour the move unless
    /// the defender is cornered. Returns `None` only when the world is over.
    #[must_use]
    pub fn decide(&self, world: &World, budget: &Budget) -> Option<Proposal> {
        let nearest = self.nearest_shot(world)?;
        let step = self.best_move(world, budget);
        let shot = self.focus_fire_all(world, nearest, budget);
        let Some(step) = step else {
            debug!(action = %shot.action, score = shot.score, "no move candidate, shooting");
            return Some(shot);
        };

        let proposal = if step.score > shot.score {
            step
        } else if shot.score > step.score || self.rollout.is_cornered(world) {
            shot
        } else {
            step
        };
        debug!(
            action = %proposal.action,
            score = proposal.score,
            move_score = step.score,
            shot_score = shot.score,
            elapsed_us = budget.elapsed().as_micros() as u64,
            "lookahead decided"
        );
        Some(proposal)
    }

    /// Best move on the candidate ring, searched up to the configured plies.
    ///
    /// Returns `None` when the world is over, every candidate leaves the
    /// arena, or the budget expired before the first candidate was scored.
    #[must_use]
    pub fn best_move(&self, world: &World, budget: &Budget) -> Option<Proposal> {
        self.search_ring(world, 0, budget)
            .map(|(target, score)| Proposal {
                action: Action::Move(target),
                score,
            })
    }

    /// Best shot: the nearest enemy, then focus fire on each living enemy.
    ///
    /// The nearest-enemy shot is always scored, so an expired budget still
    /// yields a proposal. Returns `None` only when the world is over.
    #[must_use]
    pub fn best_shot(&self, world: &World, budget: &Budget) -> Option<Proposal> {
        let nearest = self.nearest_shot(world)?;
        Some(self.focus_fire_all(world, nearest, budget))
    }

    /// Number of move headings explored for `world`.
    #[must_use]
    pub fn ring_size(&self, world: &World) -> u32 {
        if query::enemies(world).len() > self.config.crowd_threshold {
            self.config.crowded_ring_size
        } else {
            self.config.ring_size
        }
    }

    fn search_ring(&self, world: &World, depth: u32, budget: &Budget) -> Option<(Point, i32)> {
        if query::is_game_over(world) {
            return None;
        }

        let origin = query::defender(world).position;
        let count = self.ring_size(world);
        let mut best: Option<(Point, i32)> = None;

        for index in 0..count {
            if budget.expired() {
                break;
            }

            let target = origin.on_ring(index, count, self.config.radius);
            if !target.in_arena() {
                continue;
            }

            let mut after = world.clone();
            after.issue(Action::Move(target));
            after.step();

            let mut score = self.rollout.evaluate(&after);
            if depth + 1 < self.config.plies {
                if let Some((_, deeper)) = self.search_ring(&after, depth + 1, budget) {
                    score = score.max(deeper);
                }
            }
            trace!(depth, target = %target, score, "move candidate");

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((target, score));
            }
        }

        best
    }

    fn nearest_shot(&self, world: &World) -> Option<Proposal> {
        if query::is_game_over(world) {
            return None;
        }

        let defender = query::defender(world).position;
        let nearest = query::nearest_enemy(world, defender)?.id;
        let mut after = world.clone();
        after.issue(Action::Shoot(nearest));
        after.step();
        let score = self.rollout.evaluate(&after);
        trace!(target = %nearest, score, "nearest shot");
        Some(Proposal {
            action: Action::Shoot(nearest),
            score,
        })
    }

    fn focus_fire_all(&self, world: &World, mut best: Proposal, budget: &Budget) -> Proposal {
        let enemies = query::enemies(world);
        if enemies.len() > self.config.focus_fire_limit {
            return best;
        }

        for target in enemies.iter().map(|enemy| enemy.id) {
            if budget.expired() {
                debug!(target = %target, "budget expired during focus fire");
                break;
            }
            let score = self.focus_fire(world, target);
            trace!(target = %target, score, "focus fire");
            if score > best.score {
                best = Proposal {
                    action: Action::Shoot(target),
                    score,
                };
            }
        }

        best
    }

    fn focus_fire(&self, world: &World, target: EnemyId) -> i32 {
        let mut playout = world.clone();
        while !query::is_game_over(&playout) && query::enemy(&playout, target).is_some() {
            playout.issue(Action::Shoot(target));
            playout.step();
        }
        self.rollout.play_out(&mut playout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accountant_core::{DataPoint, DataPointId, Enemy, TurnSnapshot};

    fn crowd(enemies: u32) -> World {
        World::from_snapshot(&TurnSnapshot {
            defender: Point::new(8_000, 4_500),
            data_points: vec![DataPoint::new(DataPointId::new(0), Point::new(100, 100))],
            enemies: (0..enemies)
                .map(|id| {
                    let x = 15_000 - 100 * i32::try_from(id).unwrap_or(0);
                    Enemy::new(EnemyId::new(id), Point::new(x, 8_500), 5)
                })
                .collect(),
        })
    }

    #[test]
    fn ring_shrinks_once_field_is_crowded() {
        let lookahead = Lookahead::default();
        assert_eq!(lookahead.ring_size(&crowd(20)), 8);
        assert_eq!(lookahead.ring_size(&crowd(21)), 4);
    }

    #[test]
    fn finished_world_yields_no_proposal() {
        let world = crowd(0);
        let lookahead = Lookahead::default();
        assert!(query::is_game_over(&world));
        assert_eq!(lookahead.decide(&world, &Budget::unbounded()), None);
        assert_eq!(lookahead.best_move(&world, &Budget::unbounded()), None);
    }

    #[test]
    fn config_defaults_match_reference_tuning() {
        let config = Config::default();
        assert_eq!((config.ring_size, config.crowded_ring_size), (8, 4));
        assert_eq!(config.radius, 1_000);
        assert_eq!(config.plies, 2);
        assert_eq!(config.budget_ms, 45);
    }
}
