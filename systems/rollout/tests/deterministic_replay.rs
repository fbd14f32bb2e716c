use accountant_core::{
    Command, DataPoint, DataPointId, Enemy, EnemyId, Event, Point, TurnSnapshot,
};
use accountant_system_rollout::Rollout;
use accountant_world::{self as world, query, World};

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

fn replay(mut world: World) -> (Vec<Event>, i32) {
    let rollout = Rollout::new();
    let mut log = Vec::new();
    while let Some(action) = rollout.decide(&world) {
        world::apply(&mut world, Command::IssueAction { action }, &mut log);
        world::apply(&mut world, Command::ResolveTurn, &mut log);
    }
    (log, query::score(&world))
}

#[test]
fn playout_replays_identically() {
    let first = replay(opening());
    let second = replay(opening());

    assert_eq!(first, second, "replay diverged between runs");

    let (log, score) = first;
    let turns = log
        .iter()
        .filter(|event| matches!(event, Event::TurnResolved { .. }))
        .count();
    let bonus: i32 = log
        .iter()
        .filter_map(|event| match event {
            Event::BonusAwarded { amount } => Some(*amount),
            _ => None,
        })
        .sum();

    assert_eq!(score, 339);
    assert_eq!(turns, 31);
    assert_eq!(bonus, 9);
}

#[test]
fn evaluation_matches_replay_and_leaves_world_untouched() {
    let world = opening();
    let rollout = Rollout::new();

    let first = rollout.evaluate(&world);
    let second = rollout.evaluate(&world.clone());

    assert_eq!(first, second);
    assert_eq!(first, replay(world.clone()).1);
    assert_eq!(query::score(&world), 500);
    assert_eq!(query::shots_fired(&world), 0);
    assert_eq!(query::snapshot(&world), query::snapshot(&opening()));
}
