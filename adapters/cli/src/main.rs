#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for the Accountant decision engine.
//!
//! `bot` speaks the turn protocol on stdin/stdout, `play` referees a single
//! scenario and `compare` referees a directory of scenarios with two
//! policies side by side. Diagnostics go to stderr, filtered by `RUST_LOG`.

mod compare;
mod protocol;
mod referee;
mod scenario;

use std::{
    fs,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use accountant_core::Action;
use accountant_system_planner::{Planner, PlannerConfig, Policy};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{protocol::TurnReader, scenario::Scenario};

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser, Debug)]
#[command(name = "accountant", version, about = "Decision engine for the data-point defence game")]
struct Cli {
    /// Planner configuration file (TOML); built-in defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Answer turns read from stdin with one action line each on stdout.
    Bot {
        /// Policy overriding the configuration file.
        #[arg(long)]
        policy: Option<Policy>,
    },
    /// Referee one scenario file and print the match report.
    Play {
        /// Scenario file to play.
        scenario: PathBuf,
        /// Policy overriding the configuration file.
        #[arg(long)]
        policy: Option<Policy>,
    },
    /// Referee every scenario in a directory with two policies.
    Compare {
        /// Directory holding `*.toml` scenarios.
        dir: PathBuf,
        /// Policy the candidate is measured against.
        #[arg(long)]
        baseline: Policy,
        /// Policy under evaluation.
        #[arg(long)]
        candidate: Policy,
    },
}

/// Entry point for the Accountant command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        CliCommand::Bot { policy } => run_bot(with_policy(config, policy)),
        CliCommand::Play { scenario, policy } => run_play(&scenario, with_policy(config, policy)),
        CliCommand::Compare {
            dir,
            baseline,
            candidate,
        } => run_compare(&dir, &config, baseline, candidate),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true),
        )
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    let Some(path) = path else {
        return Ok(PlannerConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    let config: PlannerConfig = toml::from_str(&text)
        .with_context(|| format!("invalid configuration {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid configuration {}", path.display()))?;
    Ok(config)
}

fn with_policy(config: PlannerConfig, policy: Option<Policy>) -> PlannerConfig {
    PlannerConfig {
        policy: policy.unwrap_or(config.policy),
        ..config
    }
}

fn run_bot(config: PlannerConfig) -> Result<()> {
    let mut planner = Planner::new(config)?;
    let stdin = io::stdin();
    let mut turns = TurnReader::new(stdin.lock());
    let mut output = BufWriter::new(io::stdout().lock());

    info!(policy = %config.policy, "bot ready");
    while let Some(snapshot) = turns.next_turn()? {
        // A finished board has nothing to decide; holding position keeps the
        // one-line-per-turn contract.
        let action = planner
            .decide(&snapshot)
            .map_or(Action::Move(snapshot.defender), |decision| decision.action);
        protocol::write_action(&mut output, action).context("failed to write action")?;
    }
    info!(turns = planner.turn(), "input closed");
    Ok(())
}

fn run_play(path: &Path, config: PlannerConfig) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let mut planner = Planner::new(config)?;
    let report = referee::play(&scenario.snapshot, &mut planner);
    info!(scenario = %scenario.name, policy = %config.policy, %report, "match finished");
    println!("{} {report}", scenario.name);
    Ok(())
}

fn run_compare(
    dir: &Path,
    config: &PlannerConfig,
    baseline: Policy,
    candidate: Policy,
) -> Result<()> {
    let scenarios = scenario::list(dir)?
        .iter()
        .map(|path| Scenario::load(path))
        .collect::<Result<Vec<_>>>()?;
    anyhow::ensure!(
        !scenarios.is_empty(),
        "no scenarios found in {}",
        dir.display()
    );

    let comparison = compare::run(&scenarios, config, baseline, candidate)?;
    println!("{comparison}");
    Ok(())
}
