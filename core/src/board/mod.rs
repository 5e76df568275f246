//! A compact, computationally efficient bitboard representation of Connect 4 positions.

mod errors;
mod position;

pub use errors::{IllegalMoveError, PositionParsingError};
pub use position::{GameStatus, Position};
