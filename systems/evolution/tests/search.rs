use std::time::Duration;

use accountant_core::{
    Action, Budget, DataPoint, DataPointId, Enemy, EnemyId, Point, TurnSnapshot,
};
use accountant_system_evolution::{Config, Evolution};
use accountant_system_rollout::Rollout;
use accountant_world::{query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn opening() -> World {
    World::from_snapshot(&TurnSnapshot {
        defender: Point::new(1_100, 1_200),
        data_points: [
            (5_000, 5_000),
            (10_000, 5_000),
            (5_000, 1_900),
            (1_000, 4_000),
            (1_000, 8_999),
        ]
        .into_iter()
        .zip(0..)
        .map(|((x, y), id)| DataPoint::new(DataPointId::new(id), Point::new(x, y)))
        .collect(),
        enemies: vec![
            Enemy::new(EnemyId::new(0), Point::new(10_500, 8_000), 10),
            Enemy::new(EnemyId::new(1), Point::new(15_000, 0), 42),
            Enemy::new(EnemyId::new(2), Point::new(14_000, 0), 42),
        ],
    })
}

fn small_config() -> Config {
    Config {
        population_size: 20,
        max_generations: 15,
        ..Config::default()
    }
}

#[test]
fn best_fitness_never_regresses() {
    let world = opening();
    let evolution = Evolution::new(small_config());
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let report = evolution
        .search(&world, &Budget::unbounded(), &mut rng)
        .expect("world is not over");

    assert_eq!(report.generations, 15);
    assert_eq!(report.best_by_generation.len(), 16);
    assert!(report
        .best_by_generation
        .windows(2)
        .all(|pair| pair[0] <= pair[1]));
    assert_eq!(report.best_by_generation.last(), Some(&report.fitness));
}

#[test]
fn fixed_seed_reproduces_the_search() {
    let world = opening();
    let evolution = Evolution::new(small_config());

    let first = evolution.search(
        &world,
        &Budget::unbounded(),
        &mut ChaCha8Rng::seed_from_u64(7),
    );
    let second = evolution.search(
        &world,
        &Budget::unbounded(),
        &mut ChaCha8Rng::seed_from_u64(7),
    );

    assert_eq!(first, second);
}

#[test]
fn rejected_plans_fall_back_to_heuristic() {
    let world = opening();
    let evolution = Evolution::new(small_config());
    let rollout = Rollout::new();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let report = evolution
        .search(&world, &Budget::unbounded(), &mut rng)
        .expect("world is not over");

    assert_eq!(report.baseline, rollout.evaluate(&world));
    assert_eq!(report.accepted, report.fitness > report.baseline);
    if !report.accepted {
        assert_eq!(Some(report.action), rollout.decide(&world));
    }
    if let Action::Move(target) = report.action {
        assert!(target.in_arena());
    }
}

#[test]
fn expired_budget_still_yields_an_action() {
    let world = opening();
    let evolution = Evolution::new(Config::default());
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let report = evolution
        .search(&world, &Budget::start(Duration::ZERO), &mut rng)
        .expect("world is not over");

    assert_eq!(report.generations, 0);
    assert_eq!(report.best_by_generation.len(), 1);
    match report.action {
        Action::Move(target) => assert!(target.in_arena()),
        Action::Shoot(enemy) => assert!(query::enemy(&world, enemy).is_some()),
    }
}

#[test]
fn finished_world_is_not_searched() {
    let world = World::from_snapshot(&TurnSnapshot {
        defender: Point::new(100, 100),
        data_points: Vec::new(),
        enemies: vec![Enemy::new(EnemyId::new(0), Point::new(900, 900), 4)],
    });
    let evolution = Evolution::new(small_config());
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    assert!(evolution
        .search(&world, &Budget::unbounded(), &mut rng)
        .is_none());
}
