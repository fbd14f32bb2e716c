#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-turn decision layer that turns a snapshot into the defender's action.
//!
//! The planner rebuilds a world from each [`TurnSnapshot`], runs the
//! configured [`Policy`] against it and reports the chosen action together
//! with the terminal score the policy expects it to reach.

mod config;

pub use config::{ConfigError, Policy, PlannerConfig};

use accountant_core::{Action, Budget, Point, TurnSnapshot};
use accountant_system_evolution::Evolution;
use accountant_system_lookahead::Lookahead;
use accountant_system_rollout::Rollout;
use accountant_world::{query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info_span};

/// Number of opening turns the scripted policy spends walking to the centre.
pub const SCRIPTED_OPENING_TURNS: u32 = 4;
/// Point the scripted policy walks toward during its opening.
pub const SCRIPTED_WAYPOINT: Point = Point::new(8_000, 4_000);

/// Action chosen for one turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Action to emit.
    pub action: Action,
    /// Terminal score the producing search expects, when it computed one.
    pub expected_score: Option<i32>,
    /// Policy that produced the action.
    pub source: Policy,
}

/// Stateful planner; the only state carried across turns is the turn counter.
#[derive(Debug)]
pub struct Planner {
    config: PlannerConfig,
    lookahead: Lookahead,
    evolution: Evolution,
    rollout: Rollout,
    turn: u32,
}

impl Planner {
    /// Creates a planner after validating its configuration.
    pub fn new(config: PlannerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            lookahead: Lookahead::new(config.lookahead),
            evolution: Evolution::new(config.evolution),
            rollout: Rollout::new(),
            turn: 0,
        })
    }

    /// Configuration the planner runs with.
    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Number of turns decided so far.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Chooses the action for the turn described by `snapshot`.
    ///
    /// Returns `None` when the snapshot is already a finished game.
    pub fn decide(&mut self, snapshot: &TurnSnapshot) -> Option<Decision> {
        let world = World::from_snapshot(snapshot);
        if query::is_game_over(&world) {
            return None;
        }

        let turn = self.turn;
        self.turn += 1;
        let policy = self.config.policy;
        let _span = info_span!("decide", turn, %policy).entered();

        let decision = match policy {
            Policy::NearestShot => self.nearest_shot(&world, policy),
            Policy::Scripted if turn < SCRIPTED_OPENING_TURNS => Some(Decision {
                action: Action::Move(SCRIPTED_WAYPOINT),
                expected_score: None,
                source: policy,
            }),
            Policy::Scripted => self.nearest_shot(&world, policy),
            Policy::Heuristic => self.heuristic(&world),
            Policy::Lookahead => {
                self.lookahead(&world, &Budget::start(self.config.lookahead_budget()))
            }
            Policy::Evolution => self.evolution(
                &world,
                &Budget::start(self.config.evolution_budget()),
                turn,
            ),
            Policy::Hybrid => self.hybrid(&world, turn),
        };

        if let Some(decision) = &decision {
            debug!(
                action = %decision.action,
                expected = ?decision.expected_score,
                source = %decision.source,
                "turn decided"
            );
        }
        decision
    }

    fn nearest_shot(&self, world: &World, source: Policy) -> Option<Decision> {
        let defender = query::defender(world).position;
        query::nearest_enemy(world, defender).map(|enemy| Decision {
            action: Action::Shoot(enemy.id),
            expected_score: None,
            source,
        })
    }

    fn heuristic(&self, world: &World) -> Option<Decision> {
        let action = self.rollout.decide(world)?;
        Some(Decision {
            action,
            expected_score: Some(self.rollout.evaluate(world)),
            source: Policy::Heuristic,
        })
    }

    fn lookahead(&self, world: &World, budget: &Budget) -> Option<Decision> {
        match self.lookahead.decide(world, budget) {
            Some(proposal) => Some(Decision {
                action: proposal.action,
                expected_score: Some(proposal.score),
                source: Policy::Lookahead,
            }),
            None => self.heuristic(world),
        }
    }

    fn evolution(&self, world: &World, budget: &Budget, turn: u32) -> Option<Decision> {
        let mut rng = ChaCha8Rng::seed_from_u64(
            self.config.evolution.seed.wrapping_add(u64::from(turn)),
        );
        match self.evolution.search(world, budget, &mut rng) {
            Some(report) => Some(Decision {
                action: report.action,
                expected_score: Some(if report.accepted {
                    report.fitness
                } else {
                    report.baseline
                }),
                source: if report.accepted {
                    Policy::Evolution
                } else {
                    Policy::Heuristic
                },
            }),
            None => self.heuristic(world),
        }
    }

    fn hybrid(&self, world: &World, turn: u32) -> Option<Decision> {
        let half = self.config.hybrid_half_budget();
        let lookahead = self.lookahead(world, &Budget::start(half));
        let evolution = self.evolution(world, &Budget::start(half), turn);

        match (lookahead, evolution) {
            (Some(lookahead), Some(evolution))
                if evolution.expected_score > lookahead.expected_score =>
            {
                Some(evolution)
            }
            (Some(lookahead), _) => Some(lookahead),
            (None, evolution) => evolution,
        }
    }
}
