//! Headless full-game simulation.

use tetrobot_engine::{GameSession, GameStats};

use crate::controller::AgentController;

/// Plays `session` with `controller` until game over or until
/// `max_placements` pieces have landed.
///
/// A tick where the controller plays nothing falls back to one gravity step,
/// so the game always progresses.
///
/// # Example
///
/// ```
/// use tetrobot_agent::{AgentController, HeuristicWeights, SearchStrategy, simulate_game};
/// use tetrobot_engine::{GameSession, PieceSeed};
///
/// let mut controller = AgentController::new(HeuristicWeights::BASELINE, SearchStrategy::ColumnScan);
/// let mut session = GameSession::new(PieceSeed::from_bytes([0; 16]));
/// let stats = simulate_game(&mut controller, &mut session, Some(20));
/// assert_eq!(stats.completed_pieces(), 20);
/// ```
pub fn simulate_game(
    controller: &mut AgentController,
    session: &mut GameSession,
    max_placements: Option<usize>,
) -> GameStats {
    while !session.is_game_over() {
        if max_placements.is_some_and(|max| session.stats().completed_pieces() >= max) {
            break;
        }
        if controller.tick(session).is_none() {
            session.auto_drop();
        }
    }
    let stats = session.stats();
    log::info!(
        "{}: {} pieces, {} lines, score {}{}",
        controller.strategy(),
        stats.completed_pieces(),
        stats.total_cleared_lines(),
        stats.score(),
        if session.is_game_over() { " (game over)" } else { "" }
    );
    stats.clone()
}
