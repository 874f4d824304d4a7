//! Per-tick decision making for a live game.

use std::collections::VecDeque;

use tetrobot_engine::{BoardEngine, GameSession, Move, PieceId};

use crate::{
    heuristic::{HeuristicEvaluator, HeuristicWeights},
    search::SearchStrategy,
};

/// Plans once per piece and feeds the plan to the game one move per tick.
///
/// A new plan is searched when the cached plan is exhausted or the active piece
/// is not the one the plan was computed for. If there is still nothing to play
/// after that, the tick does nothing.
///
/// # Example
///
/// ```
/// use tetrobot_agent::{AgentController, HeuristicWeights, SearchStrategy};
/// use tetrobot_engine::{GameSession, PieceSeed};
///
/// let seed = PieceSeed::from_bytes([1; 16]);
/// let mut session = GameSession::new(seed);
/// let mut controller = AgentController::new(HeuristicWeights::BASELINE, SearchStrategy::ColumnScan);
///
/// while session.stats().completed_pieces() < 3 {
///     controller.tick(&mut session).unwrap();
/// }
/// assert!(!session.is_game_over());
/// ```
#[derive(Debug, Clone)]
pub struct AgentController {
    evaluator: HeuristicEvaluator,
    strategy: SearchStrategy,
    plan: VecDeque<Move>,
    planned_for: Option<PieceId>,
}

impl AgentController {
    #[must_use]
    pub fn new(weights: HeuristicWeights, strategy: SearchStrategy) -> Self {
        Self::with_evaluator(HeuristicEvaluator::new(weights), strategy)
    }

    #[must_use]
    pub fn with_evaluator(evaluator: HeuristicEvaluator, strategy: SearchStrategy) -> Self {
        Self {
            evaluator,
            strategy,
            plan: VecDeque::new(),
            planned_for: None,
        }
    }

    #[must_use]
    pub fn evaluator(&self) -> &HeuristicEvaluator {
        &self.evaluator
    }

    #[must_use]
    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// Moves still queued for the current piece.
    pub fn pending_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.plan.iter().copied()
    }

    /// Returns the move to play now, replanning if needed.
    pub fn next_move(&mut self, engine: &BoardEngine) -> Option<Move> {
        let id = engine.active_id();
        if self.plan.is_empty() || self.planned_for != id {
            self.plan.clear();
            self.planned_for = id;
            if let Some(id) = id {
                let outcome = self.strategy.search(engine, &self.evaluator);
                if outcome.is_empty() {
                    log::warn!("{}: no placement found for piece {id}", self.strategy);
                }
                self.plan.extend(outcome.moves);
            }
        }
        self.plan.pop_front()
    }

    /// Plays one move on a bare engine. Returns the move, or `None` if the tick
    /// did nothing.
    pub fn tick_engine(&mut self, engine: &mut BoardEngine) -> Option<Move> {
        let mv = self.next_move(engine)?;
        engine.apply(mv);
        Some(mv)
    }

    /// Plays one move on a session, which handles scoring and spawning.
    pub fn tick(&mut self, session: &mut GameSession) -> Option<Move> {
        let mv = self.next_move(session.engine())?;
        session.apply(mv);
        Some(mv)
    }
}
