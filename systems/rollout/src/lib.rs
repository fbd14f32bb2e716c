#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic heuristic policy used to play a world out to the end.
//!
//! Each turn the policy looks one enemy move ahead. If the most dangerous
//! enemy would end up inside the kill radius, the defender retreats to the
//! mirror image of that enemy's projected position; when the mirror image
//! lies outside the arena it shoots the nearest enemy instead. Without an
//! immediate threat it always shoots the nearest enemy. The terminal score of
//! a playout is the evaluation function shared by every search system.

use accountant_core::{kill_radius_squared, Action, EnemyId, Point, ENEMY_SPEED};
use accountant_world::{query, World};

/// Projected position of the enemy that would end up closest to the defender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Threat {
    /// Enemy that poses the threat.
    pub enemy: EnemyId,
    /// Where the enemy will be after its next move.
    pub projected: Point,
    /// Squared distance from the defender to the projected position.
    pub distance_squared: i64,
}

impl Threat {
    /// Reports whether the projected position lies inside the kill radius.
    #[must_use]
    pub fn is_imminent(&self) -> bool {
        self.distance_squared <= kill_radius_squared()
    }
}

/// Heuristic playout policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rollout;

impl Rollout {
    /// Creates the playout policy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Scores a world by playing a private copy of it to the end.
    ///
    /// A world that is already over scores its current value.
    #[must_use]
    pub fn evaluate(&self, world: &World) -> i32 {
        let mut playout = world.clone();
        self.play_out(&mut playout)
    }

    /// Drives `world` in place until the game is over and returns its score.
    pub fn play_out(&self, world: &mut World) -> i32 {
        while !query::is_game_over(world) {
            let Some(action) = self.decide(world) else {
                break;
            };
            world.issue(action);
            world.step();
        }
        query::score(world)
    }

    /// Chooses the heuristic action for the next turn.
    ///
    /// Returns `None` once the game is over.
    #[must_use]
    pub fn decide(&self, world: &World) -> Option<Action> {
        if query::is_game_over(world) {
            return None;
        }

        let defender = query::defender(world).position;
        if let Some(threat) = self.threat(world) {
            if threat.is_imminent() {
                if let Some(target) = retreat_target(defender, threat.projected) {
                    return Some(Action::Move(target));
                }
            }
        }

        query::nearest_enemy(world, defender).map(|enemy| Action::Shoot(enemy.id))
    }

    /// Finds the enemy whose next move brings it closest to the defender.
    ///
    /// Ties go to the first enemy in iteration order.
    #[must_use]
    pub fn threat(&self, world: &World) -> Option<Threat> {
        if query::data_points(world).is_empty() {
            return None;
        }

        let defender = query::defender(world).position;
        query::enemies(world)
            .iter()
            .filter_map(|enemy| {
                let goal = query::nearest_data_point(world, enemy.position)?;
                let projected = enemy.position.stepped_toward(goal.position, ENEMY_SPEED);
                Some(Threat {
                    enemy: enemy.id,
                    projected,
                    distance_squared: projected.dist2(defender),
                })
            })
            .min_by_key(|threat| threat.distance_squared)
    }

    /// Reports whether an enemy is about to reach the defender and the
    /// retreat square lies outside the arena.
    #[must_use]
    pub fn is_cornered(&self, world: &World) -> bool {
        let defender = query::defender(world).position;
        self.threat(world).map_or(false, |threat| {
            threat.is_imminent() && retreat_target(defender, threat.projected).is_none()
        })
    }
}

/// Mirror image of `threat` through `defender`, if it lies inside the arena.
#[must_use]
pub fn retreat_target(defender: Point, threat: Point) -> Option<Point> {
    let target = defender.reflect_away_from(threat);
    target.in_arena().then_some(target)
}
