//! A strong, exact solver for Connect Four.
//!
//! Given any legal position this library computes the game-theoretic score under optimal
//! play (or, in weak mode, just its sign), backed by a bitboard position representation,
//! an alpha-beta negamax search with transposition-table memoization, and an optional
//! opening book for instant lookups of early-game positions.

mod board;
mod engine;

pub use engine::{
    Solver,
    TranspositionTable,
    TranspositionTableError,
    MoveEntry,
    MoveSorter,
    OpeningBook,
    OpeningBookGenerator,
    BookIoError,
};
pub use board::{GameStatus, IllegalMoveError, Position, PositionParsingError};
