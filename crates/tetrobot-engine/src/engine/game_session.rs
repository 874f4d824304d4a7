use crate::core::piece::Piece;

use super::{BoardEngine, GameStats, Move, PieceGenerator, PieceId, PieceSeed, RewardTable};

/// A live game: the engine, its piece supply, and score bookkeeping.
///
/// Commands go through [`apply`](Self::apply). After every landing the session
/// drains the engine's line-clear count exactly once, adds the reward to the
/// score, and spawns the next piece from the 7-bag generator.
///
/// # Example
///
/// ```
/// use tetrobot_engine::{GameSession, Move, PieceSeed};
///
/// let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
/// let mut session = GameSession::new(seed);
/// let first = session.engine().active_id();
///
/// while session.engine().active_id() == first {
///     session.apply(Move::Drop);
/// }
/// assert_eq!(session.stats().completed_pieces(), 1);
/// assert_eq!(session.stats().score(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    engine: BoardEngine,
    generator: PieceGenerator,
    stats: GameStats,
    rewards: RewardTable,
}

impl GameSession {
    /// Starts a game on an empty 20×10 board.
    #[must_use]
    pub fn new(seed: PieceSeed) -> Self {
        Self::with_engine(BoardEngine::new(), seed)
    }

    /// Starts a game on an existing engine, spawning the first piece if the
    /// engine has none.
    #[must_use]
    pub fn with_engine(engine: BoardEngine, seed: PieceSeed) -> Self {
        let mut this = Self {
            engine,
            generator: PieceGenerator::with_seed(seed),
            stats: GameStats::new(),
            rewards: RewardTable::DEFAULT,
        };
        if this.engine.active_piece().is_none() {
            this.spawn_next();
        }
        this
    }

    #[must_use]
    pub fn with_rewards(mut self, rewards: RewardTable) -> Self {
        self.rewards = rewards;
        self
    }

    #[must_use]
    pub fn engine(&self) -> &BoardEngine {
        &self.engine
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn rewards(&self) -> &RewardTable {
        &self.rewards
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.stats.score()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.engine.is_game_over()
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        self.engine.active_piece()
    }

    #[must_use]
    pub fn active_id(&self) -> Option<PieceId> {
        self.engine.active_id()
    }

    /// Forwards one command to the engine, completing the landing if the
    /// command landed the piece. Returns whether the command had an effect.
    pub fn apply(&mut self, mv: Move) -> bool {
        if self.engine.is_game_over() {
            return false;
        }
        let applied = self.engine.apply(mv);
        if self.engine.is_landed() {
            self.complete_piece_drop();
        }
        applied
    }

    /// Gravity step: moves the piece down one row or lands it.
    pub fn auto_drop(&mut self) -> bool {
        self.apply(Move::Drop)
    }

    fn complete_piece_drop(&mut self) {
        let cleared = self.engine.clear_full_rows();
        self.stats.complete_piece_drop(cleared, &self.rewards);
        if cleared > 0 {
            log::debug!("cleared {cleared} rows, score {}", self.stats.score());
        }
        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        let kind = self.generator.pop_next();
        if !self.engine.spawn(kind) {
            log::info!(
                "game over after {} pieces, score {}",
                self.stats.completed_pieces(),
                self.stats.score()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceKind;

    const SEED: PieceSeed = PieceSeed::from_bytes([7; 16]);

    #[test]
    fn test_new_session_has_active_piece() {
        let session = GameSession::new(SEED);
        assert!(session.active_piece().is_some());
        assert!(!session.is_game_over());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_landing_spawns_next_piece() {
        let mut session = GameSession::new(SEED);
        let first = session.active_id();
        for _ in 0..18 {
            assert!(session.auto_drop());
            assert_eq!(session.active_id(), first);
        }
        while session.active_id() == first {
            assert!(session.auto_drop());
        }
        assert!(session.active_piece().is_some());
        assert_eq!(session.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_line_clear_scores_once() {
        let engine = BoardEngine::from_ascii(
            20,
            "
            IIIIIIII..
            IIIIIIII..
            ",
        );
        let mut session = GameSession::with_engine(engine, SEED);
        // replace whatever the bag dealt with an O at the right wall
        let piece = Piece::new(PieceKind::O, crate::Position::new(0, 8));
        session.engine.set_active_piece(piece).unwrap();
        while session.stats().completed_pieces() == 0 {
            session.apply(Move::Drop);
        }
        assert_eq!(session.stats().total_cleared_lines(), 2);
        assert_eq!(session.score(), 100);
        assert_eq!(session.engine().statistics().cleared, 0);
        assert_eq!(session.engine().board().topmost_occupied_row(), None);
    }

    #[test]
    fn test_stacking_ends_in_game_over() {
        let mut session = GameSession::new(SEED);
        let mut steps = 0;
        while !session.is_game_over() {
            session.auto_drop();
            steps += 1;
            assert!(steps < 10_000, "game should end when pieces stack up");
        }
        assert!(session.active_piece().is_none());
        assert!(!session.auto_drop());
        assert!(!session.apply(Move::Rotate));
    }
}
