#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state and turn resolution for Accountant.
//!
//! A [`World`] is a plain value: cloning it yields an independent copy that
//! search systems can drive to the end of the game without affecting the
//! original. Mutation happens through [`World::issue`] and [`World::step`]
//! on the hot path, or through [`apply`] when the caller wants every rule
//! firing reported as an [`Event`].

use accountant_core::{
    damage_at, kill_radius_squared, Action, Command, DataPoint, DeathCause, Defender, Enemy,
    Event, Point, TurnSnapshot, DATA_POINT_VALUE, DEFENDER_SPEED, ENEMY_KILL_VALUE, ENEMY_SPEED,
};

/// Represents the authoritative Accountant world state.
#[derive(Clone, Debug)]
pub struct World {
    defender: Defender,
    enemies: Vec<Enemy>,
    data_points: Vec<DataPoint>,
    score: i32,
    defender_killed: bool,
    initial_life_sum: i32,
    shots_fired: i32,
}

impl World {
    /// Creates a world from raw entity lists without initialising the score.
    ///
    /// Call [`World::init`] before resolving turns.
    #[must_use]
    pub fn new(defender: Point, data_points: Vec<DataPoint>, enemies: Vec<Enemy>) -> Self {
        Self {
            defender: Defender::at(defender),
            enemies,
            data_points,
            score: 0,
            defender_killed: false,
            initial_life_sum: 0,
            shots_fired: 0,
        }
    }

    /// Builds an initialised world from a turn snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &TurnSnapshot) -> Self {
        let mut world = Self::new(
            snapshot.defender,
            snapshot.data_points.clone(),
            snapshot.enemies.clone(),
        );
        world.init();
        world
    }

    /// Captures the initial life sum and resets score and counters.
    pub fn init(&mut self) {
        self.initial_life_sum = self.enemies.iter().map(|enemy| enemy.life).sum();
        self.shots_fired = 0;
        self.defender_killed = false;
        self.score = DATA_POINT_VALUE * count(self.data_points.len());
    }

    /// Queues the defender's order for the next call to [`World::step`].
    pub fn issue(&mut self, action: Action) {
        self.defender.action = Some(action);
    }

    /// Resolves one turn using the queued order, which is consumed.
    ///
    /// The world must not be over; see [`query::is_game_over`].
    pub fn step(&mut self) {
        self.resolve(&mut Silent);
    }

    fn resolve<S: EventSink>(&mut self, sink: &mut S) {
        debug_assert!(
            !query::is_game_over(self),
            "a finished game must not be stepped"
        );

        let data_points = &self.data_points;
        for enemy in &mut self.enemies {
            if let Some(goal) = nearest(data_points, enemy.position, |point| point.position) {
                enemy.position.move_toward(goal.position, ENEMY_SPEED);
            }
        }

        let action = self.defender.action.take();

        if let Some(Action::Move(target)) = action {
            if !target.in_arena() {
                self.kill(DeathCause::MovedOutOfArena, sink);
                return;
            }
            let from = self.defender.position;
            self.defender.position.move_toward(target, DEFENDER_SPEED);
            sink.record(Event::DefenderMoved {
                from,
                to: self.defender.position,
            });
        }

        let defender = self.defender.position;
        if self
            .enemies
            .iter()
            .any(|enemy| enemy.position.dist2(defender) <= kill_radius_squared())
        {
            self.kill(DeathCause::EnemyInRange, sink);
            return;
        }

        if let Some(Action::Shoot(target)) = action {
            let Some(index) = self
                .enemies
                .iter()
                .position(|enemy| enemy.id == target && enemy.is_alive())
            else {
                self.kill(DeathCause::InvalidTarget, sink);
                return;
            };
            self.shots_fired += 1;
            let enemy = &mut self.enemies[index];
            let damage = damage_at(defender.distance(enemy.position));
            enemy.life = (enemy.life - damage).max(0);
            sink.record(Event::ShotFired {
                enemy: target,
                damage,
            });
        }

        let mut destroyed = 0;
        self.enemies.retain(|enemy| {
            if enemy.life == 0 {
                destroyed += 1;
                sink.record(Event::EnemyDestroyed { enemy: enemy.id });
                false
            } else {
                true
            }
        });
        self.score += ENEMY_KILL_VALUE * destroyed;
        if self.enemies.is_empty() {
            self.award_bonus(sink);
        }

        let enemies = &self.enemies;
        let mut collected = 0;
        self.data_points.retain(|point| {
            if enemies.iter().any(|enemy| enemy.position == point.position) {
                collected += 1;
                sink.record(Event::DataPointCollected {
                    data_point: point.id,
                });
                false
            } else {
                true
            }
        });
        self.score -= DATA_POINT_VALUE * collected;
        // Both collections may empty in one turn; each applies the bonus.
        if self.data_points.is_empty() {
            self.award_bonus(sink);
        }

        sink.record(Event::TurnResolved { score: self.score });
    }

    fn kill<S: EventSink>(&mut self, cause: DeathCause, sink: &mut S) {
        self.score = 0;
        self.defender_killed = true;
        sink.record(Event::DefenderKilled { cause });
    }

    fn award_bonus<S: EventSink>(&mut self, sink: &mut S) {
        let amount = bonus(
            count(self.data_points.len()),
            self.initial_life_sum,
            self.shots_fired,
        );
        self.score += amount;
        sink.record(Event::BonusAwarded { amount });
    }
}

/// Applies the provided command to the world, reporting every rule that fired.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::IssueAction { action } => world.issue(action),
        Command::ResolveTurn => world.resolve(out_events),
    }
}

/// End-of-game bonus: `remaining × max(0, initial_life − 3 × shots) × 3`.
#[must_use]
pub fn bonus(remaining_data_points: i32, initial_life_sum: i32, shots_fired: i32) -> i32 {
    remaining_data_points * (initial_life_sum - 3 * shots_fired).max(0) * 3
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use accountant_core::{DataPoint, Defender, Enemy, EnemyId, Point, TurnSnapshot};

    use super::{nearest, World};

    /// Provides read-only access to the defender.
    #[must_use]
    pub fn defender(world: &World) -> &Defender {
        &world.defender
    }

    /// Enemies still in play, in stable iteration order.
    #[must_use]
    pub fn enemies(world: &World) -> &[Enemy] {
        &world.enemies
    }

    /// Data points still in play, in stable iteration order.
    #[must_use]
    pub fn data_points(world: &World) -> &[DataPoint] {
        &world.data_points
    }

    /// Looks up a living enemy by identifier.
    #[must_use]
    pub fn enemy(world: &World, id: EnemyId) -> Option<&Enemy> {
        world
            .enemies
            .iter()
            .find(|enemy| enemy.id == id && enemy.is_alive())
    }

    /// Cumulative score.
    #[must_use]
    pub fn score(world: &World) -> i32 {
        world.score
    }

    /// Reports whether an enemy reached the defender or the defender erred fatally.
    #[must_use]
    pub fn is_defender_killed(world: &World) -> bool {
        world.defender_killed
    }

    /// Number of shots resolved since initialisation.
    #[must_use]
    pub fn shots_fired(world: &World) -> i32 {
        world.shots_fired
    }

    /// Sum of enemy life captured at initialisation.
    #[must_use]
    pub fn initial_life_sum(world: &World) -> i32 {
        world.initial_life_sum
    }

    /// Reports whether no further turns can be resolved.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.enemies.is_empty() || world.data_points.is_empty() || world.defender_killed
    }

    /// Nearest enemy to `from`, ties going to the first in iteration order.
    ///
    /// Requires at least one enemy; callers check [`is_game_over`] first.
    #[must_use]
    pub fn nearest_enemy(world: &World, from: Point) -> Option<&Enemy> {
        debug_assert!(!world.enemies.is_empty(), "nearest enemy requires enemies");
        nearest(&world.enemies, from, |enemy| enemy.position)
    }

    /// Nearest data point to `from`, ties going to the first in iteration order.
    ///
    /// Requires at least one data point; callers check [`is_game_over`] first.
    #[must_use]
    pub fn nearest_data_point(world: &World, from: Point) -> Option<&DataPoint> {
        debug_assert!(
            !world.data_points.is_empty(),
            "nearest data point requires data points"
        );
        nearest(&world.data_points, from, |point| point.position)
    }

    /// Captures the state a player would observe at the start of the next turn.
    #[must_use]
    pub fn snapshot(world: &World) -> TurnSnapshot {
        TurnSnapshot {
            defender: world.defender.position,
            data_points: world.data_points.clone(),
            enemies: world.enemies.clone(),
        }
    }
}

trait EventSink {
    fn record(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn record(&mut self, event: Event) {
        self.push(event);
    }
}

struct Silent;

impl EventSink for Silent {
    fn record(&mut self, _event: Event) {}
}

fn nearest<T>(items: &[T], from: Point, position: impl Fn(&T) -> Point) -> Option<&T> {
    items.iter().min_by_key(|item| position(item).dist2(from))
}

fn count(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}
