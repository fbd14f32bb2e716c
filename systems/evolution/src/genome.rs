use accountant_core::Action;
use accountant_system_rollout::Rollout;
use accountant_world::{query, World};
use rand::Rng;

use crate::Config;

/// One step of a candidate plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gene {
    /// Step toward the `direction`-th heading of the move ring.
    Move {
        /// Index into the ring of evenly spaced headings.
        direction: u32,
    },
    /// Shoot an enemy chosen when the gene is decoded.
    ///
    /// The slot is reduced modulo the living-enemy count at decode time.
    /// Random genes always carry slot 0, which selects the first living enemy
    /// in the order the game reports them.
    Shoot {
        /// Raw selector reduced against the enemy list.
        slot: u32,
    },
}

impl Gene {
    /// Draws one of `move_directions + 1` choices uniformly: a move heading,
    /// or the single shot choice past the last heading.
    pub fn random<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Self {
        let choice = rng.gen_range(0..=config.move_directions);
        if choice < config.move_directions {
            Self::Move { direction: choice }
        } else {
            Self::Shoot {
                slot: choice - config.move_directions,
            }
        }
    }

    /// Translates the gene into a concrete action against `world`.
    ///
    /// Returns `None` for a shot gene when no enemy is left.
    #[must_use]
    pub fn decode(self, world: &World, config: &Config) -> Option<Action> {
        match self {
            Self::Move { direction } => {
                let origin = query::defender(world).position;
                Some(Action::Move(origin.on_ring(
                    direction,
                    config.move_directions,
                    config.radius,
                )))
            }
            Self::Shoot { slot } => {
                let enemies = query::enemies(world);
                if enemies.is_empty() {
                    return None;
                }
                let index = slot as usize % enemies.len();
                Some(Action::Shoot(enemies[index].id))
            }
        }
    }
}

/// Fixed-length gene sequence together with the score it reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Genome {
    genes: Vec<Gene>,
    fitness: i32,
}

impl Genome {
    /// Creates an unscored genome from explicit genes.
    #[must_use]
    pub fn from_genes(genes: Vec<Gene>) -> Self {
        Self { genes, fitness: 0 }
    }

    /// Draws `config.genome_length` random genes.
    pub fn random<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Self {
        Self::from_genes(
            (0..config.genome_length)
                .map(|_| Gene::random(config, rng))
                .collect(),
        )
    }

    /// Genes in execution order.
    #[must_use]
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Score reached by the last [`Genome::rescore`].
    #[must_use]
    pub fn fitness(&self) -> i32 {
        self.fitness
    }

    /// Plays the genome on a copy of `world` and records the terminal score.
    ///
    /// Move genes advance one turn each. A shot gene hands the rest of the
    /// game to the playout policy and ends the genome. Whatever remains after
    /// the last gene is played out as well.
    pub fn rescore(&mut self, world: &World, rollout: &Rollout, config: &Config) {
        let mut playout = world.clone();
        for gene in &self.genes {
            if query::is_game_over(&playout) {
                break;
            }
            let Gene::Move { .. } = gene else {
                break;
            };
            let Some(action) = gene.decode(&playout, config) else {
                break;
            };
            playout.issue(action);
            playout.step();
        }
        self.fitness = rollout.play_out(&mut playout);
    }

    /// Replaces one random gene with a fresh one.
    pub fn mutate<R: Rng + ?Sized>(&mut self, config: &Config, rng: &mut R) {
        if self.genes.is_empty() {
            return;
        }
        let index = rng.gen_range(0..self.genes.len());
        self.genes[index] = Gene::random(config, rng);
    }

    /// Single-point crossover: genes from a random cut onward come from `other`.
    ///
    /// Genomes shorter than two genes have no interior cut and stay unchanged.
    pub fn recombine<R: Rng + ?Sized>(&mut self, other: &Genome, rng: &mut R) {
        let len = self.genes.len().min(other.genes.len());
        if len < 2 {
            return;
        }
        let cut = rng.gen_range(1..len);
        self.genes[cut..len].copy_from_slice(&other.genes[cut..len]);
    }
}

/// Fixed-size pool of genomes kept sorted by descending fitness.
#[derive(Clone, Debug)]
pub struct Population {
    genomes: Vec<Genome>,
    size: usize,
}

impl Population {
    /// Seeds a population of random genomes scored against `world`.
    pub fn seed<R: Rng + ?Sized>(
        world: &World,
        rollout: &Rollout,
        config: &Config,
        rng: &mut R,
    ) -> Self {
        let mut genomes: Vec<Genome> = (0..config.population_size)
            .map(|_| Genome::random(config, rng))
            .collect();
        for genome in &mut genomes {
            genome.rescore(world, rollout, config);
        }
        let mut population = Self {
            genomes,
            size: config.population_size,
        };
        population.select();
        population
    }

    /// Runs one generation: mutants and crossovers join the pool, then the
    /// pool is truncated back to its fixed size.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        world: &World,
        rollout: &Rollout,
        config: &Config,
        rng: &mut R,
    ) {
        let parents = self.genomes.len();
        if parents == 0 {
            return;
        }

        let mutants = scaled(parents, config.mutation_rate);
        let crossovers = scaled(parents, config.recombination_rate);
        self.genomes.reserve(mutants + crossovers);

        for _ in 0..mutants {
            let mut child = self.genomes[rng.gen_range(0..parents)].clone();
            child.mutate(config, rng);
            child.rescore(world, rollout, config);
            self.genomes.push(child);
        }

        let half = parents / 2;
        if half > 0 {
            for _ in 0..crossovers {
                let mut child = self.genomes[rng.gen_range(0..half)].clone();
                let donor = &self.genomes[rng.gen_range(half..parents)];
                child.recombine(donor, rng);
                child.rescore(world, rollout, config);
                self.genomes.push(child);
            }
        }

        self.select();
    }

    /// Fittest genome, earliest on ties.
    #[must_use]
    pub fn best(&self) -> Option<&Genome> {
        self.genomes.first()
    }

    /// Genomes ordered by descending fitness.
    #[must_use]
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    fn select(&mut self) {
        self.genomes.sort_by(|a, b| b.fitness.cmp(&a.fitness));
        self.genomes.truncate(self.size);
    }
}

fn scaled(count: usize, rate: f64) -> usize {
    (count as f64 * rate.max(0.0)) as usize
}
