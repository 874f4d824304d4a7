//! Board and piece primitives.

pub use self::{board::*, piece::*};

pub(crate) mod board;
pub(crate) mod piece;
