//! Move generation
//!
//! Pseudo-legal moves are produced piece by piece from the attack tables, then
//! each candidate is played on a copy of the board and dropped if it leaves
//! the mover's king attacked. Output order is deterministic: pawns, knights,
//! bishops, rooks, queens, king, each in ascending origin square.

use crate::board::{
    Board, Color, Move, MoveKind, PieceKind, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ,
};
use crate::magic::AttackTables;
use crate::utils::{pop_lsb, square_bb, NOT_FILE_A, NOT_FILE_H, RANK_1, RANK_2, RANK_7, RANK_8};

// (right, king from, king to, squares that must be empty, squares the king stands on or crosses)
type CastleOption = (u8, usize, usize, u64, [usize; 3]);

const WHITE_CASTLES: [CastleOption; 2] = [
    (CASTLE_WK, 4, 6, 0x0000_0000_0000_0060, [4, 5, 6]),
    (CASTLE_WQ, 4, 2, 0x0000_0000_0000_000E, [4, 3, 2]),
];
const BLACK_CASTLES: [CastleOption; 2] = [
    (CASTLE_BK, 60, 62, 0x6000_0000_0000_0000, [60, 61, 62]),
    (CASTLE_BQ, 60, 58, 0x0E00_0000_0000_0000, [60, 59, 58]),
];

const PROMOTION_PIECES: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// Move generator bound to a set of attack tables
#[derive(Clone, Copy)]
pub struct MoveGen<'t> {
    tables: &'t AttackTables,
}

impl MoveGen<'static> {
    /// Generator over the process-wide tables
    pub fn new() -> Self {
        Self {
            tables: AttackTables::shared(),
        }
    }
}

impl Default for MoveGen<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t> MoveGen<'t> {
    pub fn with_tables(tables: &'t AttackTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &'t AttackTables {
        self.tables
    }

    /// Every legal move. Empty exactly when the side to move is checkmated or stalemated.
    pub fn legal_moves(&self, board: &Board) -> Vec<Move> {
        let mut pseudo = Vec::with_capacity(64);
        self.pseudo_legal_moves(board, &mut pseudo);
        pseudo.retain(|&mv| self.is_legal(board, mv));
        pseudo
    }

    /// Legal captures and promotions, the moves quiescence search looks at
    pub fn tactical_moves(&self, board: &Board) -> Vec<Move> {
        let mut pseudo = Vec::with_capacity(32);
        self.pseudo_legal_moves(board, &mut pseudo);
        pseudo.retain(|&mv| {
            (board.is_capture(mv) || mv.promotion().is_some()) && self.is_legal(board, mv)
        });
        pseudo
    }

    /// King-safety filter for a pseudo-legal move
    #[inline]
    pub fn is_legal(&self, board: &Board, mv: Move) -> bool {
        let us = board.side_to_move();
        let next = board.apply_move(mv);
        match next.king_sq(us) {
            Some(king) => !next.is_square_attacked(king, us.opposite(), self.tables),
            None => true,
        }
    }

    pub fn is_in_check(&self, board: &Board) -> bool {
        let us = board.side_to_move();
        match board.king_sq(us) {
            Some(king) => board.is_square_attacked(king, us.opposite(), self.tables),
            None => false,
        }
    }

    pub fn pseudo_legal_moves(&self, board: &Board, out: &mut Vec<Move>) {
        let side = board.side_to_move();
        self.generate_pawn_pseudos(board, side, out);
        self.generate_piece_pseudos(board, side, PieceKind::Knight, out);
        self.generate_piece_pseudos(board, side, PieceKind::Bishop, out);
        self.generate_piece_pseudos(board, side, PieceKind::Rook, out);
        self.generate_piece_pseudos(board, side, PieceKind::Queen, out);
        self.generate_piece_pseudos(board, side, PieceKind::King, out);
        self.generate_castling_pseudos(board, side, out);
    }

    fn generate_pawn_pseudos(&self, board: &Board, side: Color, out: &mut Vec<Move>) {
        let pawns = board.pieces(PieceKind::Pawn, side);
        let empty = !board.occupied();
        let enemy_occ = board.occupancy(side.opposite());
        let (prom_rank, start_rank) = match side {
            Color::White => (RANK_8, RANK_2),
            Color::Black => (RANK_1, RANK_7),
        };
        let forward = |bb: u64| match side {
            Color::White => bb << 8,
            Color::Black => bb >> 8,
        };
        let back = |sq: usize, n: usize| match side {
            Color::White => sq - n,
            Color::Black => sq + n,
        };

        // Single and double pushes
        let mut single = forward(pawns) & empty;
        let mut double = forward(forward(pawns & start_rank) & empty) & empty;
        while let Some(to) = pop_lsb(&mut single) {
            push_pawn_move(out, back(to, 8), to, prom_rank);
        }
        while let Some(to) = pop_lsb(&mut double) {
            out.push(Move::new(back(to, 16), to, MoveKind::Normal));
        }

        // Captures toward the H file, then toward the A file
        let (mut right, right_step, mut left, left_step) = match side {
            Color::White => (
                ((pawns & NOT_FILE_H) << 9) & enemy_occ,
                9,
                ((pawns & NOT_FILE_A) << 7) & enemy_occ,
                7,
            ),
            Color::Black => (
                ((pawns & NOT_FILE_H) >> 7) & enemy_occ,
                7,
                ((pawns & NOT_FILE_A) >> 9) & enemy_occ,
                9,
            ),
        };
        while let Some(to) = pop_lsb(&mut right) {
            push_pawn_move(out, back(to, right_step), to, prom_rank);
        }
        while let Some(to) = pop_lsb(&mut left) {
            push_pawn_move(out, back(to, left_step), to, prom_rank);
        }

        // En passant: our pawns that attack the target square
        if let Some(ep) = board.ep_square() {
            let mut attackers = self.tables.pawn(side.opposite(), ep) & pawns;
            while let Some(from) = pop_lsb(&mut attackers) {
                out.push(Move::new(from, ep, MoveKind::EnPassant));
            }
        }
    }

    fn generate_piece_pseudos(
        &self,
        board: &Board,
        side: Color,
        kind: PieceKind,
        out: &mut Vec<Move>,
    ) {
        let occ = board.occupied();
        let own = board.occupancy(side);
        let mut pieces = board.pieces(kind, side);
        while let Some(from) = pop_lsb(&mut pieces) {
            let attacks = match kind {
                PieceKind::Knight => self.tables.knight(from),
                PieceKind::Bishop => self.tables.bishop(from, occ),
                PieceKind::Rook => self.tables.rook(from, occ),
                PieceKind::Queen => self.tables.queen(from, occ),
                PieceKind::King => self.tables.king(from),
                PieceKind::Pawn => 0,
            };
            let mut targets = attacks & !own;
            while let Some(to) = pop_lsb(&mut targets) {
                out.push(Move::new(from, to, MoveKind::Normal));
            }
        }
    }

    /// Castling needs the right, empty squares between king and rook, and a
    /// king that is not in check and does not pass through or land on an
    /// attacked square
    fn generate_castling_pseudos(&self, board: &Board, side: Color, out: &mut Vec<Move>) {
        let rights = board.castling_rights();
        let them = side.opposite();
        let occ = board.occupied();
        let options = match side {
            Color::White => &WHITE_CASTLES,
            Color::Black => &BLACK_CASTLES,
        };
        for &(right, from, to, between, safe) in options {
            if rights & right == 0 || occ & between != 0 {
                continue;
            }
            if safe
                .iter()
                .any(|&sq| board.is_square_attacked(sq, them, self.tables))
            {
                continue;
            }
            out.push(Move::new(from, to, MoveKind::Castle));
        }
    }

    /// Leaf count of the legal move tree to `depth`
    pub fn perft(&self, board: &Board, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves(board);
        if depth == 1 {
            return moves.len() as u64;
        }
        moves
            .into_iter()
            .map(|mv| self.perft(&board.apply_move(mv), depth - 1))
            .sum()
    }

    /// Perft split by root move
    pub fn divide(&self, board: &Board, depth: u32) -> Vec<(Move, u64)> {
        self.legal_moves(board)
            .into_iter()
            .map(|mv| {
                let nodes = match depth {
                    0 | 1 => 1,
                    _ => self.perft(&board.apply_move(mv), depth - 1),
                };
                (mv, nodes)
            })
            .collect()
    }
}

#[inline]
fn push_pawn_move(out: &mut Vec<Move>, from: usize, to: usize, prom_rank: u64) {
    if square_bb(to) & prom_rank != 0 {
        for kind in PROMOTION_PIECES {
            out.push(Move::new(from, to, MoveKind::Promotion(kind)));
        }
    } else {
        out.push(Move::new(from, to, MoveKind::Normal));
    }
}
