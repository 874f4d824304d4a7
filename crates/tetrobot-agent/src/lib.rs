//! Autonomous Tetris agent built on [`tetrobot_engine`].
//!
//! The agent is organized in layers, each using the one below:
//!
//! ```text
//! simulate_game      (play a whole game headlessly)
//!     ↓
//! AgentController    (plan once per piece, play one move per tick)
//!     ↓
//! SearchStrategy     (breadth-first or column-scan placement search)
//!     ↓
//! HeuristicEvaluator (score a landed board)
//! ```
//!
//! Searches always run on a fork of the live engine, so planning never
//! changes the game being played.

pub use self::{controller::*, heuristic::*, search::*, simulator::*};

pub mod controller;
pub mod heuristic;
pub mod search;
pub mod simulator;
