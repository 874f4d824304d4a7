use std::{path::PathBuf, time::Instant};

use rand::Rng as _;
use serde::Serialize;
use tetrobot_agent::{AgentController, HeuristicWeights, SearchStrategy, simulate_game};
use tetrobot_engine::{BoardEngine, GameSession, GameStats, PieceSeed};

use crate::{
    command::{StrategyArg, WeightsArg},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    #[clap(flatten)]
    pub(crate) weights: WeightsArg,
    /// Placement search strategy
    #[arg(long, value_enum, default_value_t)]
    strategy: StrategyArg,
    /// Board height in rows
    #[arg(long, default_value_t = 20)]
    rows: usize,
    /// Board width in columns
    #[arg(long, default_value_t = 10)]
    cols: usize,
    /// Piece sequence seed as 32 hex digits (random if omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Stop after this many pieces have landed
    #[arg(long)]
    max_placements: Option<usize>,
    /// Print the final board to stderr
    #[arg(long)]
    show_board: bool,
    /// Output file path for the JSON report (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GameReport {
    seed: PieceSeed,
    strategy: SearchStrategy,
    weights: HeuristicWeights,
    game_over: bool,
    stats: GameStats,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        weights,
        strategy,
        rows,
        cols,
        seed,
        max_placements,
        show_board,
        output,
    } = arg;

    let weights = weights.load()?;
    let strategy = SearchStrategy::from(*strategy);
    let engine = BoardEngine::with_size(*rows, *cols)?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());

    eprintln!("Auto-play ({strategy})");
    eprintln!("  Board:   {rows} rows x {cols} cols");
    eprintln!("  Weights: {weights}");
    eprintln!("  Seed:    {seed}");

    let mut controller = AgentController::new(weights, strategy);
    let mut session = GameSession::with_engine(engine, seed);
    let started = Instant::now();
    let stats = simulate_game(&mut controller, &mut session, *max_placements);
    let elapsed = started.elapsed();

    if *show_board {
        eprintln!();
        eprintln!("{}", session.engine());
    }
    eprintln!();
    eprintln!("Game finished in {:.2}s", elapsed.as_secs_f64());
    eprintln!("  Score:         {}", stats.score());
    eprintln!("  Pieces:        {}", stats.completed_pieces());
    eprintln!("  Lines cleared: {}", stats.total_cleared_lines());
    eprintln!("  Clears by size (0..=4): {:?}", stats.line_cleared_counter());
    eprintln!("  Game over:     {}", session.is_game_over());

    let report = GameReport {
        seed,
        strategy,
        weights,
        game_over: session.is_game_over(),
        stats,
    };
    Output::save_json(&report, output.clone())
}
