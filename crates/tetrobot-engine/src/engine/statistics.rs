use serde::{Deserialize, Serialize};

use crate::core::board::Board;

/// Board-quality features fed to the heuristic evaluator.
///
/// All features are computed over landed cells only; the falling piece is not
/// part of the board until it lands.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardStatistics {
    /// Sum of `|height(i) - height(i + 1)|` over adjacent column pairs.
    pub bumpiness: usize,
    /// Sum of all column heights.
    pub aggregate_height: usize,
    /// Empty cells with at least one filled cell above them in the same column.
    pub holes: usize,
    /// Rows cleared since the line-clear accumulator was last drained.
    pub cleared: usize,
}

impl BoardStatistics {
    /// Computes the board features, attaching the given line-clear count.
    #[must_use]
    pub fn from_board(board: &Board, cleared: usize) -> Self {
        let heights: Vec<usize> = (0..board.cols()).map(|c| board.column_height(c)).collect();
        let bumpiness = heights.windows(2).map(|w| w[0].abs_diff(w[1])).sum();
        Self {
            bumpiness,
            aggregate_height: heights.iter().sum(),
            holes: board.holes(),
            cleared,
        }
    }
}
