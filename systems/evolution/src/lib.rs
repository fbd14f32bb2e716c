#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Evolutionary search over short action plans.
//!
//! A population of fixed-length genomes is scored by playing each one on a
//! copy of the world and handing the remainder of the game to the heuristic
//! playout. Generations of mutation and single-point crossover are truncated
//! back to the fittest genomes until the generation cap or the wall-clock
//! budget runs out. The first gene of the fittest genome becomes the
//! proposal, unless it fails to beat the heuristic playout of the same world.

mod genome;

pub use genome::{Gene, Genome, Population};

use accountant_core::{Action, Budget};
use accountant_system_rollout::Rollout;
use accountant_world::{query, World};
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, trace};

/// Tuning knobs for [`Evolution`].
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of genes per genome.
    pub genome_length: usize,
    /// Number of evenly spaced move headings a gene can pick.
    pub move_directions: u32,
    /// Distance from the defender to every move heading.
    pub radius: i32,
    /// Number of genomes kept after each generation.
    pub population_size: usize,
    /// Mutants bred per generation, as a fraction of the population.
    pub mutation_rate: f64,
    /// Crossovers bred per generation, as a fraction of the population.
    pub recombination_rate: f64,
    /// Hard cap on generations per search.
    pub max_generations: u32,
    /// Wall-clock allowance for one search, in milliseconds.
    pub budget_ms: u64,
    /// Seed for the per-search random generator.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            genome_length: 4,
            move_directions: 4,
            radius: 1_000,
            population_size: 100,
            mutation_rate: 1.0,
            recombination_rate: 1.0,
            max_generations: 1_000,
            budget_ms: 80,
            seed: 42,
        }
    }
}

/// Outcome of one evolutionary search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvolutionReport {
    /// Action to take this turn.
    pub action: Action,
    /// Fitness of the best genome found.
    pub fitness: i32,
    /// Heuristic playout score of the unchanged world.
    pub baseline: i32,
    /// Number of completed generations.
    pub generations: u32,
    /// Best fitness after seeding and after every generation.
    pub best_by_generation: Vec<i32>,
    /// Whether the evolved action beat the baseline and was kept.
    pub accepted: bool,
}

/// Evolutionary search system.
#[derive(Clone, Debug, Default)]
pub struct Evolution {
    config: Config,
    rollout: Rollout,
}

impl Evolution {
    /// Creates an evolutionary search with the provided configuration.
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

    /// Evolves plans for `world` until the generation cap or `budget` runs out.
    ///
    /// Returns `None` only when the world is already over. When the fittest
    /// genome does not beat the baseline the report carries the heuristic
    /// action instead.
    pub fn search<R: Rng + ?Sized>(
        &self,
        world: &World,
        budget: &Budget,
        rng: &mut R,
    ) -> Option<EvolutionReport> {
        if query::is_game_over(world) {
            return None;
        }

        let mut population = Population::seed(world, &self.rollout, &self.config, rng);
        let mut best_by_generation = vec![best_fitness(&population)];
        let mut generations = 0;
        while generations < self.config.max_generations && !budget.expired() {
            population.advance(world, &self.rollout, &self.config, rng);
            generations += 1;
            best_by_generation.push(best_fitness(&population));
            trace!(generations, best = best_fitness(&population), "generation");
        }

        let baseline = self.rollout.evaluate(world);
        let heuristic = self.rollout.decide(world)?;
        let (fitness, evolved) = match population.best() {
            Some(genome) => (genome.fitness(), self.first_action(genome, world)),
            None => (i32::MIN, None),
        };

        let accepted = evolved.is_some() && fitness > baseline;
        let action = match evolved {
            Some(action) if accepted => action,
            _ => heuristic,
        };
        debug!(
            action = %action,
            fitness,
            baseline,
            generations,
            accepted,
            elapsed_us = budget.elapsed().as_micros() as u64,
            "evolution decided"
        );

        Some(EvolutionReport {
            action,
            fitness,
            baseline,
            generations,
            best_by_generation,
            accepted,
        })
    }

    fn first_action(&self, genome: &Genome, world: &World) -> Option<Action> {
        let action = genome.genes().first()?.decode(world, &self.config)?;
        match action {
            Action::Move(target) if !target.in_arena() => {
                let defender = query::defender(world).position;
                query::nearest_enemy(world, defender).map(|enemy| Action::Shoot(enemy.id))
            }
            _ => Some(action),
        }
    }
}

fn best_fitness(population: &Population) -> i32 {
    population.best().map_or(i32::MIN, Genome::fitness)
}
