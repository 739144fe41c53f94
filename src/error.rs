//! Error types for the engine core
//!
//! Malformed input is rejected at the boundary, a missing book is recovered
//! where it is loaded, and search faults are recovered by the engine facade.

use std::path::PathBuf;

use crate::board::PieceKind;

/// Errors that can occur in the engine core
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed position description (FEN)
    #[error("illegal position: {0}")]
    IllegalPosition(String),

    /// Move text that is malformed or not legal in the given position
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// Root position is checkmate or stalemate
    #[error("no legal moves in the root position")]
    NoLegalMoves,

    /// Opening book file could not be read
    #[error("failed to load opening book {path}: {source}")]
    BookLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Opening book contents are not a sequence of 16-byte records
    #[error("corrupt opening book: {0}")]
    CorruptBook(String),

    /// Magic multiplier maps two occupancies with different attacks to one slot
    #[error("magic collision for {piece:?} on square {square}")]
    MagicCollision { square: usize, piece: PieceKind },

    /// Internal search invariant violated
    #[error("search fault: {0}")]
    SearchFault(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
