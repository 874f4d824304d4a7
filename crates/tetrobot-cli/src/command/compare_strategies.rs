use std::{cmp::Ordering, path::PathBuf};

use rand::Rng as _;
use serde::Serialize;
use tetrobot_agent::{
    AgentController, BoardEvaluator, HeuristicEvaluator, HeuristicWeights, SearchStrategy,
    simulate_game,
};
use tetrobot_engine::{GameSession, GameStats, PieceSeed};

use crate::{command::WeightsArg, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CompareStrategiesArg {
    #[clap(flatten)]
    weights: WeightsArg,
    /// Number of pieces to play per game
    #[arg(long, default_value_t = 100)]
    pieces: usize,
    /// Piece sequence seed as 32 hex digits (random if omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Output file path for the JSON report (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct StrategyResult {
    strategy: SearchStrategy,
    game_over: bool,
    stats: GameStats,
}

/// Best-landing scores of both strategies on the same decision points.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
struct DecisionComparison {
    decisions: usize,
    breadth_first_better: usize,
    tied: usize,
    column_scan_better: usize,
}

impl DecisionComparison {
    fn record(&mut self, breadth_first: f32, column_scan: f32) {
        self.decisions += 1;
        match breadth_first.total_cmp(&column_scan) {
            Ordering::Greater => self.breadth_first_better += 1,
            Ordering::Equal => self.tied += 1,
            Ordering::Less => self.column_scan_better += 1,
        }
    }
}

#[derive(Debug, Serialize)]
struct ComparisonReport {
    seed: PieceSeed,
    weights: HeuristicWeights,
    games: Vec<StrategyResult>,
    decisions: DecisionComparison,
}

pub(crate) fn run(arg: &CompareStrategiesArg) -> anyhow::Result<()> {
    let CompareStrategiesArg {
        weights,
        pieces,
        seed,
        output,
    } = arg;

    let weights = weights.load()?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    eprintln!("Comparing strategies over {pieces} pieces");
    eprintln!("  Weights: {weights}");
    eprintln!("  Seed:    {seed}");

    let games: Vec<_> = SearchStrategy::ALL
        .into_iter()
        .map(|strategy| {
            let mut controller = AgentController::new(weights, strategy);
            let mut session = GameSession::new(seed);
            let stats = simulate_game(&mut controller, &mut session, Some(*pieces));
            StrategyResult {
                strategy,
                game_over: session.is_game_over(),
                stats,
            }
        })
        .collect();

    let decisions = compare_decisions(&HeuristicEvaluator::new(weights), seed, *pieces);

    eprintln!();
    for game in &games {
        eprintln!(
            "  {:<13} score {:>6}, lines {:>4}, pieces {:>4}{}",
            game.strategy.to_string(),
            game.stats.score(),
            game.stats.total_cleared_lines(),
            game.stats.completed_pieces(),
            if game.game_over { " (game over)" } else { "" }
        );
    }
    eprintln!();
    eprintln!("Decisions: {}", decisions.decisions);
    eprintln!("  breadth-first better: {}", decisions.breadth_first_better);
    eprintln!("  tied:                 {}", decisions.tied);
    eprintln!("  column-scan better:   {}", decisions.column_scan_better);

    let report = ComparisonReport {
        seed,
        weights,
        games,
        decisions,
    };
    Output::save_json(&report, output.clone())
}

/// Plays the breadth-first plan and, at every new piece, compares the best
/// landing score of both strategies on the same board.
fn compare_decisions(
    evaluator: &dyn BoardEvaluator,
    seed: PieceSeed,
    pieces: usize,
) -> DecisionComparison {
    let mut comparison = DecisionComparison::default();
    let mut session = GameSession::new(seed);
    while !session.is_game_over() && session.stats().completed_pieces() < pieces {
        let placed = session.stats().completed_pieces();
        let breadth_first = SearchStrategy::BreadthFirst.search(session.engine(), evaluator);
        let column_scan = SearchStrategy::ColumnScan.search(session.engine(), evaluator);
        comparison.record(breadth_first.score, column_scan.score);
        if column_scan.score > breadth_first.score {
            log::warn!(
                "column-scan found {} over breadth-first {} at piece {placed}",
                column_scan.score,
                breadth_first.score
            );
        }

        for mv in breadth_first.moves {
            session.apply(mv);
        }
        // an empty or stale plan still has to land the piece
        while !session.is_game_over() && session.stats().completed_pieces() == placed {
            session.auto_drop();
        }
    }
    comparison
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_outcomes() {
        let mut comparison = DecisionComparison::default();
        comparison.record(2.0, 1.0);
        comparison.record(-3.0, -3.0);
        comparison.record(f32::MIN, f32::MIN);
        assert_eq!(
            comparison,
            DecisionComparison {
                decisions: 3,
                breadth_first_better: 1,
                tied: 2,
                column_scan_better: 0,
            }
        );
    }

    #[test]
    fn test_breadth_first_never_loses() {
        let evaluator = HeuristicEvaluator::new(HeuristicWeights::BASELINE);
        let comparison = compare_decisions(&evaluator, PieceSeed::from_bytes([0x42; 16]), 15);
        assert_eq!(comparison.decisions, 15);
        assert_eq!(comparison.column_scan_better, 0);
    }
}
