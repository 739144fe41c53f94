//! Static evaluation: material plus piece-square tables (PSQT)
//!
//! The tables work like a heat map of the board: every square carries a
//! bonus or malus that nudges pieces toward useful posts (central pawns,
//! developed knights, a sheltered king). Tables are written from White's
//! point of view with a1 first; Black looks them up vertically flipped.

use crate::board::{Board, Color, PieceKind};
use crate::utils::iter_bits;

// ============================================================================
// MATERIAL VALUES (centipawns)
// ============================================================================
const PAWN_VALUE: i32 = 100;
const KNIGHT_VALUE: i32 = 320;
const BISHOP_VALUE: i32 = 330;
const ROOK_VALUE: i32 = 500;
const QUEEN_VALUE: i32 = 900;

/// Material value of a piece; the king is priced above everything for move ordering
#[inline]
pub fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => PAWN_VALUE,
        PieceKind::Knight => KNIGHT_VALUE,
        PieceKind::Bishop => BISHOP_VALUE,
        PieceKind::Rook => ROOK_VALUE,
        PieceKind::Queen => QUEEN_VALUE,
        PieceKind::King => 20_000,
    }
}

// ============================================================================
// PIECE-SQUARE TABLES
// ============================================================================

#[rustfmt::skip]
const PAWN_PSQT: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      5,   5,   5,   5,   5,   5,   5,   5,
      5,   5,  10,  15,  15,  10,   5,   5,
     10,  10,  20,  30,  30,  20,  10,  10,
     20,  20,  30,  40,  40,  30,  20,  20,
     40,  40,  50,  60,  60,  50,  40,  40,
     80,  80,  90, 100, 100,  90,  80,  80,
      0,   0,   0,   0,   0,   0,   0,   0,
];

// Rimmed knights are penalised
#[rustfmt::skip]
const KNIGHT_PSQT: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOP_PSQT: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

// Seventh rank bonus
#[rustfmt::skip]
const ROOK_PSQT: [i32; 64] = [
      0,   0,   0,   5,   5,   0,   0,   0,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      5,  10,  10,  10,  10,  10,  10,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const QUEEN_PSQT: [i32; 64] = [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -10,   5,   5,   5,   5,   5,   0, -10,
      0,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

// Castled king behind its pawns; stay out of the centre while queens are on
#[rustfmt::skip]
const KING_MIDDLEGAME_PSQT: [i32; 64] = [
     20,  30,  10,   0,   0,  10,  30,  20,
     20,  20,   0,   0,   0,   0,  20,  20,
    -10, -20, -20, -20, -20, -20, -20, -10,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
];

// Endgame king walks to the centre
#[rustfmt::skip]
const KING_ENDGAME_PSQT: [i32; 64] = [
    -50, -30, -30, -30, -30, -30, -30, -50,
    -30, -30,   0,   0,   0,   0, -30, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -20, -10,   0,   0, -10, -20, -30,
    -50, -40, -30, -20, -20, -30, -40, -50,
];

/// Coarse stage of the game, judged by how many non-king pieces remain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

pub fn game_phase(board: &Board) -> GamePhase {
    match board.non_king_piece_count() {
        n if n >= 20 => GamePhase::Opening,
        n if n >= 10 => GamePhase::Middlegame,
        _ => GamePhase::Endgame,
    }
}

fn psqt(kind: PieceKind, phase: GamePhase) -> &'static [i32; 64] {
    match kind {
        PieceKind::Pawn => &PAWN_PSQT,
        PieceKind::Knight => &KNIGHT_PSQT,
        PieceKind::Bishop => &BISHOP_PSQT,
        PieceKind::Rook => &ROOK_PSQT,
        PieceKind::Queen => &QUEEN_PSQT,
        PieceKind::King if phase == GamePhase::Endgame => &KING_ENDGAME_PSQT,
        PieceKind::King => &KING_MIDDLEGAME_PSQT,
    }
}

/// Material and piece-square score from White's point of view
fn white_relative(board: &Board) -> i32 {
    let phase = game_phase(board);
    let mut score = 0;
    for kind in PieceKind::ALL {
        let table = psqt(kind, phase);
        let value = if kind == PieceKind::King { 0 } else { piece_value(kind) };
        for sq in iter_bits(board.pieces(kind, Color::White)) {
            score += value + table[sq];
        }
        for sq in iter_bits(board.pieces(kind, Color::Black)) {
            score -= value + table[sq ^ 56];
        }
    }
    score
}

/// Centipawn score from the side to move's point of view (negamax convention)
pub fn evaluate(board: &Board) -> i32 {
    let score = white_relative(board);
    match board.side_to_move() {
        Color::White => score,
        Color::Black => -score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::START_FEN;

    #[test]
    fn test_start_position_is_balanced() {
        let board = Board::from_fen(START_FEN).unwrap();
        assert_eq!(evaluate(&board), 0);
        assert_eq!(game_phase(&board), GamePhase::Opening);
    }

    #[test]
    fn test_evaluation_is_side_relative() {
        let white = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let black = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
        assert!(evaluate(&white) > 800);
        assert_eq!(evaluate(&white), -evaluate(&black));
    }

    #[test]
    fn test_mirrored_positions_score_alike() {
        let white = Board::from_fen("4k3/8/8/8/8/2N5/8/4K3 w - - 0 1").unwrap();
        let black = Board::from_fen("4k3/8/2n5/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_eq!(evaluate(&white), evaluate(&black));
    }

    #[test]
    fn test_phase_thresholds() {
        let middlegame =
            Board::from_fen("r3k2r/ppp2ppp/8/8/8/8/PPP2PPP/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(game_phase(&middlegame), GamePhase::Middlegame);
        let endgame = Board::from_fen("4k3/pp6/8/8/8/8/PP6/4K3 w - - 0 1").unwrap();
        assert_eq!(game_phase(&endgame), GamePhase::Endgame);
    }
}
