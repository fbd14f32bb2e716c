use accountant_core::{Action, DataPoint, DataPointId, Enemy, EnemyId, Point, TurnSnapshot};
use accountant_system_planner::{Planner, PlannerConfig, Policy};

fn retreat_snapshot() -> TurnSnapshot {
    TurnSnapshot {
        defender: Point::new(5_000, 5_000),
        data_points: vec![DataPoint::new(DataPointId::new(0), Point::new(0, 5_000))],
        enemies: vec![Enemy::new(EnemyId::new(0), Point::new(7_400, 5_000), 100)],
    }
}

fn relaxed(policy: Policy) -> PlannerConfig {
    let mut config = PlannerConfig {
        policy,
        turn_budget_ms: 20_000,
        ..PlannerConfig::default()
    };
    config.lookahead.budget_ms = 10_000;
    config.evolution.budget_ms = 10_000;
    config.evolution.population_size = 24;
    config.evolution.max_generations = 10;
    config
}

#[test]
fn config_loads_from_toml_with_defaults() {
    let config: PlannerConfig = toml::from_str(
        r#"
            policy = "hybrid"
            turn_budget_ms = 60

            [lookahead]
            plies = 1

            [evolution]
            population_size = 30
            seed = 7
        "#,
    )
    .expect("valid planner configuration");

    assert_eq!(config.policy, Policy::Hybrid);
    assert_eq!(config.turn_budget_ms, 60);
    assert_eq!(config.lookahead.plies, 1);
    assert_eq!(config.lookahead.ring_size, 8);
    assert_eq!(config.evolution.population_size, 30);
    assert_eq!(config.evolution.seed, 7);
    assert_eq!(config.evolution.genome_length, 4);
    assert!(config.validate().is_ok());
}

#[test]
fn config_rejects_unknown_keys_and_policies() {
    assert!(toml::from_str::<PlannerConfig>("polcy = \"hybrid\"").is_err());
    assert!(toml::from_str::<PlannerConfig>("policy = \"greedy\"").is_err());
    assert!(toml::from_str::<PlannerConfig>("[lookahead]\nrings = 3").is_err());
}

#[test]
fn heuristic_retreats_from_imminent_enemy() {
    let mut planner = Planner::new(relaxed(Policy::Heuristic)).expect("valid configuration");

    let decision = planner.decide(&retreat_snapshot()).expect("game is running");

    assert_eq!(decision.action, Action::Move(Point::new(3_100, 5_000)));
    assert_eq!(decision.expected_score, Some(0));
    assert_eq!(decision.source, Policy::Heuristic);
}

#[test]
fn lookahead_finds_an_escape() {
    let mut planner = Planner::new(relaxed(Policy::Lookahead)).expect("valid configuration");

    let decision = planner.decide(&retreat_snapshot()).expect("game is running");

    assert_eq!(decision.action, Action::Move(Point::new(4_292, 5_707)));
    assert_eq!(decision.expected_score, Some(329));
    assert_eq!(decision.source, Policy::Lookahead);
}

#[test]
fn hybrid_never_scores_below_lookahead() {
    let mut planner = Planner::new(relaxed(Policy::Hybrid)).expect("valid configuration");

    let decision = planner.decide(&retreat_snapshot()).expect("game is running");

    assert!(decision.expected_score >= Some(329));
    if decision.expected_score == Some(329) {
        assert_eq!(decision.source, Policy::Lookahead);
    }
}

#[test]
fn evolution_decisions_replay_with_the_same_seed() {
    let snapshot = retreat_snapshot();
    let mut first = Planner::new(relaxed(Policy::Evolution)).expect("valid configuration");
    let mut second = Planner::new(relaxed(Policy::Evolution)).expect("valid configuration");

    for _ in 0..3 {
        assert_eq!(first.decide(&snapshot), second.decide(&snapshot));
    }
}
