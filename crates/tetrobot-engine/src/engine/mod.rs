//! Game engine logic and state management.
//!
//! - [`BoardEngine`] - Board plus falling piece, movement, landing and line clears
//! - [`BoardStatistics`] - Board-quality features for heuristic evaluation
//! - [`GameSession`] - Live game with piece supply and score bookkeeping
//! - [`GameStats`] / [`RewardTable`] - Score, lines cleared, and point values
//! - [`PieceGenerator`] / [`PieceSeed`] - Seeded 7-bag piece generation
//!
//! # Game Flow
//!
//! 1. A piece spawns at the top center of the board
//! 2. The player or agent issues rotate / shift / drop commands
//! 3. A drop that is blocked lands the piece and clears full rows
//! 4. The session scores the clear and spawns the next piece
//! 5. Repeat until a spawn collides (game over)

pub use self::{
    board_engine::*, game_session::*, game_stats::*, piece_generator::*, statistics::*,
};

mod board_engine;
mod game_session;
mod game_stats;
mod piece_generator;
mod statistics;
