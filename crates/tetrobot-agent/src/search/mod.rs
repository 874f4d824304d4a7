//! Placement search: choosing where the active piece should land.
//!
//! Every search works on a [`BoardEngine::fork`] of the live engine and never
//! mutates the caller's state. The result is a [`SearchOutcome`]: the best score
//! found and the [`Move`] sequence that reproduces that landing when applied to
//! the live engine from its current state.
//!
//! Two strategies share the [`PlacementSearch`] interface:
//!
//! - [`BreadthFirstSearch`] explores every `(row, col, orientation)` state
//!   reachable through rotate / shift / drop, including slides under overhangs.
//! - [`ColumnScanSearch`] tries every rotation and column followed by a hard
//!   drop. Its landings are a subset of the breadth-first ones, so its best score
//!   never exceeds the breadth-first score.
//!
//! # Tie-breaking
//!
//! Only a strictly better score replaces the current best, so the first state
//! reaching the maximum wins. Exploration order decides between equally good
//! landings but never changes the best score.
//!
//! # Example
//!
//! ```
//! use tetrobot_agent::{HeuristicEvaluator, HeuristicWeights, SearchStrategy};
//! use tetrobot_engine::{BoardEngine, PieceKind};
//!
//! let mut engine = BoardEngine::new();
//! engine.spawn(PieceKind::T);
//! let evaluator = HeuristicEvaluator::new(HeuristicWeights::BASELINE);
//!
//! let bfs = SearchStrategy::BreadthFirst.search(&engine, &evaluator);
//! let scan = SearchStrategy::ColumnScan.search(&engine, &evaluator);
//! assert!(bfs.score >= scan.score);
//! assert!(!bfs.moves.is_empty());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tetrobot_engine::{BoardEngine, Move};

use crate::heuristic::BoardEvaluator;

pub use self::{breadth_first::BreadthFirstSearch, column_scan::ColumnScanSearch};

mod breadth_first;
mod column_scan;

/// Explores the placements of the engine's active piece.
pub trait PlacementSearch: fmt::Debug + Send + Sync {
    /// Returns the best landing found. The outcome is empty when the engine has
    /// no active piece.
    fn search(&self, engine: &BoardEngine, evaluator: &dyn BoardEvaluator) -> SearchOutcome;
}

/// Result of one search call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Best score, or `f32::MIN` if nothing was found.
    pub score: f32,
    /// Moves reaching and executing the best landing, ending with the landing drop.
    pub moves: Vec<Move>,
    /// Number of states the strategy examined.
    pub explored: usize,
}

impl Default for SearchOutcome {
    fn default() -> Self {
        Self::empty()
    }
}

impl SearchOutcome {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            score: f32::MIN,
            moves: Vec::new(),
            explored: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Selectable search strategy.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::IsVariant,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// Exhaustive graph search over reachable states.
    #[default]
    #[display("breadth-first")]
    BreadthFirst,
    /// Rotate, shift, then hard-drop in every column.
    #[display("column-scan")]
    ColumnScan,
}

impl SearchStrategy {
    pub const ALL: [Self; 2] = [SearchStrategy::BreadthFirst, SearchStrategy::ColumnScan];

    /// Runs this strategy with its default settings.
    #[must_use]
    pub fn search(self, engine: &BoardEngine, evaluator: &dyn BoardEvaluator) -> SearchOutcome {
        let outcome = match self {
            SearchStrategy::BreadthFirst => BreadthFirstSearch::default().search(engine, evaluator),
            SearchStrategy::ColumnScan => ColumnScanSearch.search(engine, evaluator),
        };
        log::debug!(
            "{self}: explored {} states, best score {}, {} moves",
            outcome.explored,
            outcome.score,
            outcome.moves.len()
        );
        outcome
    }
}

fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
