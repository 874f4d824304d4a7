//! Tetris simulation engine: pieces, board, collision rules, and game sessions.
//!
//! The engine is a passive state machine. It never decides moves on its own;
//! callers drive it through [`BoardEngine`] commands or a [`GameSession`].

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding when setting active piece")]
pub struct PieceCollisionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("board of {rows}x{cols} cells is outside the supported range 4..=255")]
pub struct BoardSizeError {
    pub rows: usize,
    pub cols: usize,
}
