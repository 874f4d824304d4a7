//! Genetic algorithm over [`HeuristicWeights`].
//!
//! Each generation goes through the same cycle:
//!
//! 1. **Evaluate fitness**: every individual plays the same set of seeded games
//!    and scores the mean final game score.
//! 2. **Elitism**: the best `elite_count` individuals survive unchanged.
//! 3. **Tournament selection**: parents are the fittest of `tournament_size`
//!    randomly drawn individuals.
//! 4. **Crossover**: midpoint crossover yields two children per parent pair.
//! 5. **Mutation**: Gaussian noise that keeps each weight's sign.
//!
//! [`GeneticTrainer`] drives the cycle until its [`TerminationCriteria`] are met.
//!
//! # Example
//!
//! ```
//! use tetrobot_agent::SearchStrategy;
//! use tetrobot_training::genetic::{
//!     EvolutionParams, FitnessEvaluator, GeneticTrainer, Population, PopulationEvolver,
//!     TerminationCriteria,
//! };
//!
//! let mut rng = rand::rng();
//! let params = EvolutionParams { elite_count: 1, ..EvolutionParams::default() };
//! let trainer = GeneticTrainer {
//!     evaluator: FitnessEvaluator::random(&mut rng, 1, SearchStrategy::ColumnScan, Some(5)),
//!     evolver: PopulationEvolver::new(params).unwrap(),
//!     termination: TerminationCriteria::generations(2),
//! };
//! let population = Population::random(4, &mut rng, params.max_weight);
//! let population = trainer.run(population, &mut rng, |_, _| {});
//! assert!(population.best().is_some());
//! ```

use std::thread;

use rand::{Rng, seq::IndexedRandom as _};
use rand_distr::{Normal, NormalError};
use tetrobot_agent::{AgentController, HeuristicWeights, SearchStrategy, simulate_game};
use tetrobot_engine::{BoardEngine, GameSession, PieceSeed};

use crate::weights;

/// A candidate weight vector and its fitness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Individual {
    weights: HeuristicWeights,
    fitness: f32,
}

impl Individual {
    /// Creates an individual that has not been evaluated yet.
    #[must_use]
    pub fn new(weights: HeuristicWeights) -> Self {
        Self {
            weights,
            fitness: f32::MIN,
        }
    }

    /// Creates an individual with random weights, see [`weights::random`].
    pub fn random<R>(rng: &mut R, max_weight: f32) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(weights::random(rng, max_weight))
    }

    #[must_use]
    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }

    /// Mean score of the last evaluation, or `f32::MIN` before any.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

/// Plays seeded games with a weight vector and reports the mean score.
///
/// Every individual plays the same seeds, so fitness differences come from the
/// weights and not from the piece sequence.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    board: BoardEngine,
    strategy: SearchStrategy,
    max_placements: Option<usize>,
    seeds: Vec<PieceSeed>,
}

impl FitnessEvaluator {
    /// Plays one game per seed on an empty 20×10 board.
    #[must_use]
    pub fn new(
        seeds: Vec<PieceSeed>,
        strategy: SearchStrategy,
        max_placements: Option<usize>,
    ) -> Self {
        Self {
            board: BoardEngine::new(),
            strategy,
            max_placements,
            seeds,
        }
    }

    /// Like [`Self::new`], but with `rounds` random seeds.
    pub fn random<R>(
        rng: &mut R,
        rounds: usize,
        strategy: SearchStrategy,
        max_placements: Option<usize>,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let seeds = (0..rounds).map(|_| rng.random()).collect();
        Self::new(seeds, strategy, max_placements)
    }

    /// Starts every game from `board` instead of an empty 20×10 board.
    #[must_use]
    pub fn with_board(mut self, board: BoardEngine) -> Self {
        self.board = board;
        self
    }

    #[must_use]
    pub fn rounds(&self) -> usize {
        self.seeds.len()
    }

    #[must_use]
    pub fn seeds(&self) -> &[PieceSeed] {
        &self.seeds
    }

    /// Mean final score over all rounds, `0.0` when there are none.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn evaluate(&self, weights: HeuristicWeights) -> f32 {
        if self.seeds.is_empty() {
            return 0.0;
        }
        let total: usize = self
            .seeds
            .iter()
            .map(|&seed| {
                let mut controller = AgentController::new(weights, self.strategy);
                let mut session = GameSession::with_engine(self.board.clone(), seed);
                simulate_game(&mut controller, &mut session, self.max_placements).score()
            })
            .sum();
        total as f32 / self.seeds.len() as f32
    }
}

/// Best, mean and worst fitness of a population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessSummary {
    pub best: f32,
    pub mean: f32,
    pub worst: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    #[must_use]
    pub fn new(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    pub fn random<R>(count: usize, rng: &mut R, max_weight: f32) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| Individual::random(rng, max_weight))
            .collect();
        Self { individuals }
    }

    /// Individuals, best first once [`Self::evaluate_fitness`] has run.
    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Evaluates every individual on its own thread, then sorts by fitness
    /// in descending order.
    pub fn evaluate_fitness(&mut self, evaluator: &FitnessEvaluator) {
        thread::scope(|s| {
            for ind in &mut self.individuals {
                s.spawn(move || {
                    ind.fitness = evaluator.evaluate(ind.weights);
                });
            }
        });
        sort_by_fitness(&mut self.individuals);
    }

    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }

    #[must_use]
    pub fn fitness_summary(&self) -> Option<FitnessSummary> {
        let first = self.individuals.first()?.fitness;
        let mut summary = FitnessSummary {
            best: first,
            mean: 0.0,
            worst: first,
        };
        let mut total = 0.0;
        for ind in &self.individuals {
            summary.best = summary.best.max(ind.fitness);
            summary.worst = summary.worst.min(ind.fitness);
            total += ind.fitness;
        }
        #[expect(clippy::cast_precision_loss)]
        let len = self.individuals.len() as f32;
        summary.mean = total / len;
        Some(summary)
    }
}

fn sort_by_fitness(individuals: &mut [Individual]) {
    individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

/// Knobs for [`PopulationEvolver`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionParams {
    /// Number of top individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Individuals drawn per tournament (larger means stronger selection pressure).
    pub tournament_size: usize,
    /// Standard deviation of the Gaussian mutation noise.
    pub mutation_sigma: f32,
    /// Probability that each single weight is mutated.
    pub mutation_rate: f64,
    /// Upper bound on weight magnitudes.
    pub max_weight: f32,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            elite_count: 5,
            tournament_size: 3,
            mutation_sigma: 0.5,
            mutation_rate: 0.25,
            max_weight: 10.0,
        }
    }
}

/// Rejected [`EvolutionParams`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EvolverError {
    #[display("tournament size must be at least 1")]
    EmptyTournament,
    #[display("mutation rate {rate} is outside 0..=1")]
    InvalidMutationRate { rate: f64 },
    #[display("maximum weight {max_weight} must be positive and finite")]
    InvalidMaxWeight { max_weight: f32 },
    #[display("invalid mutation sigma {sigma}")]
    InvalidMutationSigma { sigma: f32, source: NormalError },
}

/// Builds the next generation from an evaluated population.
#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    params: EvolutionParams,
    noise: Normal<f32>,
}

impl PopulationEvolver {
    pub fn new(params: EvolutionParams) -> Result<Self, EvolverError> {
        let EvolutionParams {
            tournament_size,
            mutation_sigma,
            mutation_rate,
            max_weight,
            ..
        } = params;
        if tournament_size == 0 {
            return Err(EvolverError::EmptyTournament);
        }
        if !(0.0..=1.0).contains(&mutation_rate) {
            return Err(EvolverError::InvalidMutationRate {
                rate: mutation_rate,
            });
        }
        if !(max_weight.is_finite() && max_weight > 0.0) {
            return Err(EvolverError::InvalidMaxWeight { max_weight });
        }
        let noise = Normal::new(0.0, mutation_sigma).map_err(|source| {
            EvolverError::InvalidMutationSigma {
                sigma: mutation_sigma,
                source,
            }
        })?;
        Ok(Self { params, noise })
    }

    #[must_use]
    pub fn params(&self) -> &EvolutionParams {
        &self.params
    }

    /// Returns a population of the same size: the elites first, then mutated
    /// children of tournament-selected parents. Children are unevaluated.
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        let EvolutionParams {
            elite_count,
            tournament_size,
            mutation_rate,
            max_weight,
            ..
        } = self.params;

        let mut ranked = population.individuals.clone();
        sort_by_fitness(&mut ranked);
        let size = ranked.len();

        let mut next: Vec<Individual> = ranked.iter().take(elite_count).copied().collect();
        while next.len() < size {
            let (Some(p1), Some(p2)) = (
                tournament_select(&ranked, tournament_size, rng),
                tournament_select(&ranked, tournament_size, rng),
            ) else {
                break;
            };
            let (c1, c2) = weights::crossover(&p1.weights, &p2.weights);
            for child in [c1, c2] {
                if next.len() == size {
                    break;
                }
                let child = weights::mutate(child, &self.noise, mutation_rate, max_weight, rng);
                next.push(Individual::new(child));
            }
        }

        Population { individuals: next }
    }
}

/// Fittest of `tournament_size` distinct random individuals.
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> Option<&'a Individual>
where
    R: Rng + ?Sized,
{
    population
        .choose_multiple(rng, tournament_size)
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
}

/// When to stop training.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminationCriteria {
    /// Number of generations to evaluate at most.
    pub max_generations: usize,
    /// Stop early once the best fitness reaches this value.
    pub fitness_threshold: Option<f32>,
}

impl TerminationCriteria {
    #[must_use]
    pub const fn generations(max_generations: usize) -> Self {
        Self {
            max_generations,
            fitness_threshold: None,
        }
    }

    /// Whether training stops after `generation` evaluated generations whose
    /// latest best fitness is `best_fitness`.
    #[must_use]
    pub fn is_met(&self, generation: usize, best_fitness: f32) -> bool {
        generation >= self.max_generations
            || self
                .fitness_threshold
                .is_some_and(|threshold| best_fitness >= threshold)
    }
}

/// Runs the evaluate / evolve loop.
#[derive(Debug, Clone)]
pub struct GeneticTrainer {
    pub evaluator: FitnessEvaluator,
    pub evolver: PopulationEvolver,
    pub termination: TerminationCriteria,
}

impl GeneticTrainer {
    /// Trains `population` and returns the last evaluated generation, sorted
    /// best first.
    ///
    /// At least one generation is always evaluated. `on_generation` is called
    /// with the 1-based generation number after each evaluation.
    pub fn run<R, F>(
        &self,
        mut population: Population,
        rng: &mut R,
        mut on_generation: F,
    ) -> Population
    where
        R: Rng + ?Sized,
        F: FnMut(usize, &Population),
    {
        let mut generation = 0;
        loop {
            population.evaluate_fitness(&self.evaluator);
            generation += 1;

            let best = match population.fitness_summary() {
                Some(FitnessSummary { best, mean, worst }) => {
                    log::info!(
                        "generation {generation}: best {best:.1}, mean {mean:.1}, worst {worst:.1}"
                    );
                    best
                }
                None => f32::MIN,
            };
            on_generation(generation, &population);

            if self.termination.is_met(generation, best) {
                return population;
            }
            population = self.evolver.evolve(&population, rng);
        }
    }
}
