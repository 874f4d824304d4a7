use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use tetrobot_agent::SearchStrategy;
use tetrobot_training::genetic::{
    EvolutionParams, FitnessEvaluator, GeneticTrainer, Population, PopulationEvolver,
    TerminationCriteria,
};

use crate::{command::StrategyArg, model::WeightModel, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of individuals per generation
    #[arg(long, default_value_t = 50)]
    population: usize,
    /// Maximum number of generations
    #[arg(long, default_value_t = 20)]
    generations: usize,
    /// Games played per individual and generation
    #[arg(long, default_value_t = 3)]
    rounds: usize,
    /// Piece limit per game
    #[arg(long, default_value_t = 500)]
    max_placements: usize,
    /// Stop once the best mean score reaches this value
    #[arg(long)]
    fitness_threshold: Option<f32>,
    /// Placement search strategy used while training
    #[arg(long, value_enum, default_value_t = StrategyArg::ColumnScan)]
    strategy: StrategyArg,
    /// Individuals copied unchanged into the next generation
    #[arg(long, default_value_t = 5)]
    elite_count: usize,
    /// Individuals drawn per selection tournament
    #[arg(long, default_value_t = 3)]
    tournament_size: usize,
    /// Standard deviation of the Gaussian mutation
    #[arg(long, default_value_t = 0.5)]
    mutation_sigma: f32,
    /// Probability of mutating each weight
    #[arg(long, default_value_t = 0.25)]
    mutation_rate: f64,
    /// Model name stored in the output file
    #[arg(long, default_value = "trained")]
    name: String,
    /// Output file path for the model (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        population,
        generations,
        rounds,
        max_placements,
        fitness_threshold,
        strategy,
        elite_count,
        tournament_size,
        mutation_sigma,
        mutation_rate,
        name,
        output,
    } = arg;

    let params = EvolutionParams {
        elite_count: *elite_count,
        tournament_size: *tournament_size,
        mutation_sigma: *mutation_sigma,
        mutation_rate: *mutation_rate,
        ..EvolutionParams::default()
    };
    let evolver = PopulationEvolver::new(params).context("Invalid evolution parameters")?;

    let mut rng = rand::rng();
    let trainer = GeneticTrainer {
        evaluator: FitnessEvaluator::random(
            &mut rng,
            *rounds,
            SearchStrategy::from(*strategy),
            Some(*max_placements),
        ),
        evolver,
        termination: TerminationCriteria {
            max_generations: *generations,
            fitness_threshold: *fitness_threshold,
        },
    };
    let initial = Population::random(*population, &mut rng, params.max_weight);

    let population = trainer.run(initial, &mut rng, |generation, population| {
        eprintln!("Generation #{generation}:");
        for (i, ind) in population.individuals().iter().take(5).enumerate() {
            eprintln!("  {i:2}: {:.3} => {:.1}", ind.weights(), ind.fitness());
        }
        if let Some(summary) = population.fitness_summary() {
            eprintln!(
                "  Fitness: best {:.1}, mean {:.1}, worst {:.1}",
                summary.best, summary.mean, summary.worst
            );
        }
    });

    let best = population
        .best()
        .context("Population is empty, nothing to save")?;
    let model = WeightModel {
        name: name.clone(),
        trained_at: Utc::now(),
        final_fitness: best.fitness(),
        weights: *best.weights(),
    };
    Output::save_json(&model, output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final fitness: {:.1}", model.final_fitness);
    eprintln!("  Weights: {}", model.weights);

    Ok(())
}
