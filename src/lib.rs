//! Scacchiera: a time-bounded chess search core
//!
//! Magic-bitboard move generation, Zobrist hashing, a Polyglot opening book
//! and an iterative-deepening alpha-beta search with quiescence, a
//! transposition table and repetition detection.

pub mod board;
pub mod book;
pub mod engine;
pub mod error;
pub mod eval;
pub mod magic;
pub mod movegen;
pub mod search;
pub mod time;
pub mod utils;
pub mod zobrist;

pub use board::{Board, Color, Move, MoveKind, PieceKind};
pub use book::OpeningBook;
pub use engine::{Engine, EngineConfig, GameHandler, GameOutcome};
pub use error::{EngineError, Result};
pub use search::{Score, Search, SearchParams, SearchResult, TimeManagement};

/// Build the shared attack and hash tables up front instead of on first use
pub fn init() {
    magic::AttackTables::shared();
    zobrist::keys();
}
