use serde::{Deserialize, Serialize};

/// Point values for line clears.
///
/// Index corresponds to number of lines cleared simultaneously (0-4). The same
/// table drives score bookkeeping and the normalized line-clear feature used
/// by heuristic evaluation.
///
/// # Example
///
/// ```
/// use tetrobot_engine::RewardTable;
///
/// let table = RewardTable::DEFAULT;
/// assert_eq!(table.points(4), 1200);
/// assert_eq!(table.normalized(3), 7.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTable([u16; 5]);

impl Default for RewardTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl RewardTable {
    /// - 0 lines: 0 points
    /// - 1 line: 40 points
    /// - 2 lines: 100 points
    /// - 3 lines: 300 points
    /// - 4 lines: 1200 points
    pub const DEFAULT: Self = Self([0, 40, 100, 300, 1200]);

    #[must_use]
    pub const fn new(points: [u16; 5]) -> Self {
        Self(points)
    }

    /// Points for clearing `cleared` rows at once. Counts above 4 score as 4.
    #[must_use]
    pub fn points(&self, cleared: usize) -> u16 {
        self.0[cleared.min(4)]
    }

    /// Points for `cleared` rows in units of a single-line clear.
    ///
    /// With the default table this is `[0, 1, 2.5, 7.5, 30]`. A table that
    /// awards nothing for a single line returns raw points.
    #[must_use]
    pub fn normalized(&self, cleared: usize) -> f32 {
        let points = f32::from(self.points(cleared));
        match self.0[1] {
            0 => points,
            single => points / f32::from(single),
        }
    }
}

/// Game statistics tracking score, lines cleared, and piece count.
///
/// # Example
///
/// ```
/// use tetrobot_engine::{GameStats, RewardTable};
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(4, &RewardTable::DEFAULT);
///
/// assert_eq!(stats.score(), 1200);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Returns the total number of pieces that have landed.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of landings by lines cleared.
    ///
    /// `[0]` counts landings that cleared nothing, `[4]` counts tetrises.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Records one landing that cleared `cleared_lines` rows.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize, rewards: &RewardTable) {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        self.line_cleared_counter[cleared_lines.min(4)] += 1;
        self.score += usize::from(rewards.points(cleared_lines));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_default_table() {
        let table = RewardTable::DEFAULT;
        let normalized: Vec<_> = (0..=4).map(|n| table.normalized(n)).collect();
        assert_eq!(normalized, [0.0, 1.0, 2.5, 7.5, 30.0]);
    }

    #[test]
    fn test_points_saturate() {
        let table = RewardTable::DEFAULT;
        assert_eq!(table.points(0), 0);
        assert_eq!(table.points(1), 40);
        assert_eq!(table.points(7), 1200);
    }

    #[test]
    fn test_zero_single_line_reward_is_not_divided() {
        let table = RewardTable::new([0, 0, 10, 20, 30]);
        assert_eq!(table.normalized(2), 10.0);
    }

    #[test]
    fn test_stats_accumulate() {
        let mut stats = GameStats::new();
        let table = RewardTable::DEFAULT;
        stats.complete_piece_drop(0, &table);
        stats.complete_piece_drop(1, &table);
        stats.complete_piece_drop(2, &table);
        stats.complete_piece_drop(0, &table);

        assert_eq!(stats.score(), 140);
        assert_eq!(stats.completed_pieces(), 4);
        assert_eq!(stats.total_cleared_lines(), 3);
        assert_eq!(stats.line_cleared_counter(), &[2, 1, 1, 0, 0]);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = GameStats::new();
        stats.complete_piece_drop(1, &RewardTable::DEFAULT);
        let json = serde_json::to_string(&stats).unwrap();
        let restored: GameStats = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, stats);
        assert!(json.contains("\"score\":40"));
    }
}
