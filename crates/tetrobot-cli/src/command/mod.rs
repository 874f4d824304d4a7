use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tetrobot_agent::{HeuristicWeights, SearchStrategy};

use crate::model::WeightModel;

use self::{auto_play::AutoPlayArg, compare_strategies::CompareStrategiesArg, train::TrainArg};

mod auto_play;
mod compare_strategies;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play one headless game with the agent and print the final stats
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Play both search strategies on the same piece sequence
    CompareStrategies(#[clap(flatten)] CompareStrategiesArg),
    /// Tune heuristic weights with a genetic algorithm
    Train(#[clap(flatten)] TrainArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
        Mode::CompareStrategies(arg) => compare_strategies::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
    }
    Ok(())
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum StrategyArg {
    #[default]
    BreadthFirst,
    ColumnScan,
}

impl From<StrategyArg> for SearchStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::BreadthFirst => SearchStrategy::BreadthFirst,
            StrategyArg::ColumnScan => SearchStrategy::ColumnScan,
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct WeightsArg {
    /// Heuristic weights as `bumpiness,height,holes,cleared`
    #[arg(long, allow_hyphen_values = true, conflicts_with = "model")]
    weights: Option<HeuristicWeights>,
    /// Model file (JSON format) to read the weights from
    #[arg(long)]
    model: Option<PathBuf>,
}

impl WeightsArg {
    /// Weights from `--model` or `--weights`, defaulting to the built-in baseline.
    pub(crate) fn load(&self) -> anyhow::Result<HeuristicWeights> {
        if let Some(path) = &self.model {
            let model = WeightModel::open(path)?;
            log::info!(
                "loaded model {:?} (trained at {}, fitness {:.1})",
                model.name,
                model.trained_at,
                model.final_fitness
            );
            return Ok(model.weights);
        }
        Ok(self.weights.unwrap_or(HeuristicWeights::BASELINE))
    }
}
