#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Accountant decision engine.
//!
//! This crate defines the value types every other crate speaks: integer
//! kinematics on the arena, the entity records that make up a turn snapshot,
//! the defender's [`Action`], and the [`Command`]/[`Event`] surface through
//! which the authoritative world is driven and observed. Systems never hold
//! references into a world; they clone it, drive the clone, and report the
//! resulting score.

use std::{
    f64::consts::PI,
    fmt,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

/// Width of the arena; valid x coordinates lie in `[0, ARENA_WIDTH)`.
pub const ARENA_WIDTH: i32 = 16_000;
/// Height of the arena; valid y coordinates lie in `[0, ARENA_HEIGHT)`.
pub const ARENA_HEIGHT: i32 = 9_000;
/// Distance at which an enemy reaches the defender and ends the game.
pub const KILL_RADIUS: i32 = 2_000;
/// Maximum distance the defender covers in a single turn.
pub const DEFENDER_SPEED: i32 = 1_000;
/// Maximum distance an enemy covers in a single turn.
pub const ENEMY_SPEED: i32 = 500;
/// Score credited per data point when a world is initialised and debited per collection.
pub const DATA_POINT_VALUE: i32 = 100;
/// Score credited for every destroyed enemy.
pub const ENEMY_KILL_VALUE: i32 = 10;

const DAMAGE_NUMERATOR: f64 = 125_000.0;
const DAMAGE_EXPONENT: f64 = 1.2;

/// Squared kill radius, compared against [`Point::dist2`].
#[must_use]
pub const fn kill_radius_squared() -> i64 {
    KILL_RADIUS as i64 * KILL_RADIUS as i64
}

/// Integer position on the arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Creates a point at the provided coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn dist2(self, other: Point) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// True Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.dist2(other) as f64).sqrt()
    }

    /// Reports whether the point lies inside `[0, 16000) × [0, 9000)`.
    #[must_use]
    pub const fn in_arena(self) -> bool {
        self.x >= 0 && self.x < ARENA_WIDTH && self.y >= 0 && self.y < ARENA_HEIGHT
    }

    /// Advances at most `speed` units toward `target`.
    ///
    /// A target within reach is snapped onto exactly. Otherwise each axis
    /// advances by `floor(delta * speed / distance)` independently, so the
    /// result may undershoot the nominal step by up to one unit per axis.
    pub fn move_toward(&mut self, target: Point, speed: i32) {
        let reach = i64::from(speed) * i64::from(speed);
        let d2 = self.dist2(target);
        if d2 <= reach {
            *self = target;
            return;
        }

        let distance = (d2 as f64).sqrt();
        let dx = f64::from(target.x) - f64::from(self.x);
        let dy = f64::from(target.y) - f64::from(self.y);
        let speed = f64::from(speed);
        self.x += (dx * speed / distance).floor() as i32;
        self.y += (dy * speed / distance).floor() as i32;
    }

    /// Returns the point reached by [`Point::move_toward`] without mutating `self`.
    #[must_use]
    pub fn stepped_toward(self, target: Point, speed: i32) -> Point {
        let mut moved = self;
        moved.move_toward(target, speed);
        moved
    }

    /// Reflects `self` through `pivot`, yielding `self + (self - pivot)`.
    #[must_use]
    pub fn reflect_away_from(self, pivot: Point) -> Point {
        Point::new(
            self.x.saturating_add(self.x.saturating_sub(pivot.x)),
            self.y.saturating_add(self.y.saturating_sub(pivot.y)),
        )
    }

    /// Offsets the point by `radius` along the `index`-th of `count` evenly
    /// spaced headings, truncating each coordinate toward zero.
    ///
    /// Heading zero points along the positive x axis; headings advance
    /// counter-clockwise in arena coordinates.
    #[must_use]
    pub fn on_ring(self, index: u32, count: u32, radius: i32) -> Point {
        debug_assert!(count > 0, "a ring needs at least one heading");
        let angle = f64::from(index) * 2.0 * PI / f64::from(count.max(1));
        let radius = f64::from(radius);
        Point::new(
            (f64::from(self.x) + radius * angle.cos()) as i32,
            (f64::from(self.y) + radius * angle.sin()) as i32,
        )
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.x, self.y)
    }
}

/// Damage dealt by a shot fired from `distance` units away.
///
/// Computes `round(125000 / distance^1.2)`; the value shrinks monotonically
/// as distance grows.
#[must_use]
pub fn damage_at(distance: f64) -> i32 {
    (DAMAGE_NUMERATOR / distance.powf(DAMAGE_EXPONENT)).round() as i32
}

/// Unique identifier assigned to an enemy by the game.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier assigned to a data point by the game.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DataPointId(u32);

impl DataPointId {
    /// Creates a new data point identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DataPointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The single order the defender executes during a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Travel toward the target point, covering at most [`DEFENDER_SPEED`].
    Move(Point),
    /// Fire at the enemy with the provided identifier.
    Shoot(EnemyId),
}

impl fmt::Display for Action {
    /// Renders the action as a single protocol line without the newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(target) => write!(f, "MOVE {} {}", target.x, target.y),
            Self::Shoot(enemy) => write!(f, "SHOOT {enemy}"),
        }
    }
}

/// The controllable unit, together with the order queued for the next turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Defender {
    /// Current position of the defender.
    pub position: Point,
    /// Order consumed by the next turn resolution, if any.
    pub action: Option<Action>,
}

impl Defender {
    /// Creates an idle defender at the provided position.
    #[must_use]
    pub const fn at(position: Point) -> Self {
        Self {
            position,
            action: None,
        }
    }
}

/// Hostile unit that homes in on the nearest data point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Enemy {
    /// Identifier reported by the game.
    pub id: EnemyId,
    /// Current position of the enemy.
    pub position: Point,
    /// Remaining life; the enemy is removed the turn this reaches zero.
    pub life: i32,
}

impl Enemy {
    /// Creates a new enemy record.
    #[must_use]
    pub const fn new(id: EnemyId, position: Point, life: i32) -> Self {
        Self { id, position, life }
    }

    /// Reports whether the enemy still has life remaining.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.life > 0
    }
}

/// Collectible objective with an immutable position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataPoint {
    /// Identifier reported by the game.
    pub id: DataPointId,
    /// Fixed position of the data point.
    pub position: Point,
}

impl DataPoint {
    /// Creates a new data point record.
    #[must_use]
    pub const fn new(id: DataPointId, position: Point) -> Self {
        Self { id, position }
    }
}

/// Structured per-turn input handed to the decision layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnSnapshot {
    /// Position of the defender at the start of the turn.
    pub defender: Point,
    /// Data points still in play, in the order the game reported them.
    pub data_points: Vec<DataPoint>,
    /// Enemies still in play, in the order the game reported them.
    pub enemies: Vec<Enemy>,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Queues the defender's order for the next turn resolution.
    IssueAction {
        /// Order to execute.
        action: Action,
    },
    /// Resolves one full turn using the queued order.
    ResolveTurn,
}

/// Reasons a turn resolution may end with the defender killed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// An enemy came within [`KILL_RADIUS`] of the defender.
    EnemyInRange,
    /// The defender was ordered to move to a point outside the arena.
    MovedOutOfArena,
    /// The defender was ordered to shoot an enemy that is not alive.
    InvalidTarget,
}

/// Events reported by the world while resolving a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the defender travelled between two points.
    DefenderMoved {
        /// Position before the move.
        from: Point,
        /// Position after the move.
        to: Point,
    },
    /// Confirms that a shot hit an enemy.
    ShotFired {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Life removed by the shot before clamping at zero.
        damage: i32,
    },
    /// Announces that an enemy ran out of life and left play.
    EnemyDestroyed {
        /// Enemy that was removed.
        enemy: EnemyId,
    },
    /// Announces that an enemy collected a data point.
    DataPointCollected {
        /// Data point that was removed.
        data_point: DataPointId,
    },
    /// Reports the end-of-game bonus credited to the score.
    BonusAwarded {
        /// Points added by the bonus.
        amount: i32,
    },
    /// Reports that the game ended with the defender killed.
    DefenderKilled {
        /// What killed the defender.
        cause: DeathCause,
    },
    /// Marks the end of a turn resolution that did not kill the defender.
    TurnResolved {
        /// Score after the turn.
        score: i32,
    },
}

/// Wall-clock allowance shared by the cooperative search loops of one turn.
#[derive(Clone, Copy, Debug)]
pub struct Budget {
    started: Instant,
    limit: Option<Duration>,
}

impl Budget {
    /// Starts a budget that expires `limit` after now.
    #[must_use]
    pub fn start(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit: Some(limit),
        }
    }

    /// Creates a budget that never expires.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            started: Instant::now(),
            limit: None,
        }
    }

    /// Time elapsed since the budget started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Reports whether the allowance has been used up.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.limit.map_or(false, |limit| self.elapsed() >= limit)
    }
}
