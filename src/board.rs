// Square mapping: A1=0, B1=1, ..., H8=63
// The same mapping is used by every table and bitboard in the crate

use std::fmt;

use crate::error::{EngineError, Result};
use crate::magic::AttackTables;
use crate::movegen::MoveGen;
use crate::utils::{
    file_of, lsb_index, parse_square, rank_of, square_bb, square_name, DARK_SQUARES,
    E1, E8, LIGHT_SQUARES, NOT_FILE_A, NOT_FILE_H, RANK_1, RANK_8,
};
use crate::zobrist;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const KIWIPETE_FEN: &str =
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

// Castling right bits: white kingside, white queenside, black kingside, black queenside
pub const CASTLE_WK: u8 = 0b1000;
pub const CASTLE_WQ: u8 = 0b0100;
pub const CASTLE_BK: u8 = 0b0010;
pub const CASTLE_BQ: u8 = 0b0001;

// Rights that survive a move touching each square (as origin or destination)
const CASTLE_KEEP: [u8; 64] = {
    let mut keep = [0b1111u8; 64];
    keep[0] = 0b1111 & !CASTLE_WQ;
    keep[4] = 0b1111 & !(CASTLE_WK | CASTLE_WQ);
    keep[7] = 0b1111 & !CASTLE_WK;
    keep[56] = 0b1111 & !CASTLE_BQ;
    keep[60] = 0b1111 & !(CASTLE_BK | CASTLE_BQ);
    keep[63] = 0b1111 & !CASTLE_BK;
    keep
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    #[inline]
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    fn fen_char(self, color: Color) -> char {
        let ch = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match color {
            Color::White => ch.to_ascii_uppercase(),
            Color::Black => ch,
        }
    }

    fn from_fen_char(ch: char) -> Option<(PieceKind, Color)> {
        let kind = match ch.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some((kind, color))
    }
}

// Index into the piece_bb array: white piece = kind, black piece = 6 + kind
#[inline]
fn piece_index(kind: PieceKind, color: Color) -> usize {
    (color as usize) * 6 + (kind as usize)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal,
    Promotion(PieceKind),
    EnPassant,
    /// King's two-square move; the rook follows
    Castle,
}

/// A move in long-algebraic terms: origin, destination and what kind of move it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: u8,
    to: u8,
    kind: MoveKind,
}

impl Move {
    #[inline]
    pub fn new(from: usize, to: usize, kind: MoveKind) -> Self {
        Move {
            from: from as u8,
            to: to as u8,
            kind,
        }
    }

    #[inline]
    pub fn from_sq(self) -> usize {
        self.from as usize
    }

    #[inline]
    pub fn to_sq(self) -> usize {
        self.to as usize
    }

    #[inline]
    pub fn kind(self) -> MoveKind {
        self.kind
    }

    #[inline]
    pub fn promotion(self) -> Option<PieceKind> {
        match self.kind {
            MoveKind::Promotion(kind) => Some(kind),
            _ => None,
        }
    }

    /// Long algebraic notation ("e2e4", "e7e8q", castling as "e1g1")
    pub fn to_uci(self) -> String {
        let mut uci = format!("{}{}", square_name(self.from_sq()), square_name(self.to_sq()));
        if let Some(promo) = self.promotion() {
            uci.push(promo.fen_char(Color::Black));
        }
        uci
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// Complete game state. Boards are small plain values: `apply_move` returns a
/// new board and never mutates the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    // 12 bitboards: 0-5 = white p,n,b,r,q,k; 6-11 = black p,n,b,r,q,k
    piece_bb: [u64; 12],
    color_occ: [u64; 2],
    side: Color,
    castling: u8,
    ep: Option<u8>,
    halfmove: u16,
    fullmove: u16,
    zobrist: u64,
}

impl Default for Board {
    fn default() -> Self {
        Board::start_position()
    }
}

impl Board {
    fn empty() -> Self {
        Self {
            piece_bb: [0; 12],
            color_occ: [0; 2],
            side: Color::White,
            castling: 0,
            ep: None,
            halfmove: 0,
            fullmove: 1,
            zobrist: 0,
        }
    }

    pub fn start_position() -> Self {
        let mut board = Board::empty();
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, &kind) in back.iter().enumerate() {
            board.put(file, kind, Color::White);
            board.put(8 + file, PieceKind::Pawn, Color::White);
            board.put(48 + file, PieceKind::Pawn, Color::Black);
            board.put(56 + file, kind, Color::Black);
        }
        board.castling = CASTLE_WK | CASTLE_WQ | CASTLE_BK | CASTLE_BQ;
        board.zobrist = zobrist::hash(&board);
        board
    }

    #[inline]
    pub fn pieces(&self, kind: PieceKind, color: Color) -> u64 {
        self.piece_bb[piece_index(kind, color)]
    }

    /// Both colours' pieces of one kind
    #[inline]
    pub fn pieces_of_kind(&self, kind: PieceKind) -> u64 {
        self.pieces(kind, Color::White) | self.pieces(kind, Color::Black)
    }

    #[inline]
    pub fn occupancy(&self, color: Color) -> u64 {
        self.color_occ[color as usize]
    }

    #[inline]
    pub fn occupied(&self) -> u64 {
        self.color_occ[0] | self.color_occ[1]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side
    }

    /// Castling rights as a `K=8, Q=4, k=2, q=1` bit set
    #[inline]
    pub fn castling_rights(&self) -> u8 {
        self.castling
    }

    #[inline]
    pub fn ep_square(&self) -> Option<usize> {
        self.ep.map(|sq| sq as usize)
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove
    }

    /// Zobrist fingerprint, maintained incrementally by `apply_move`
    #[inline]
    pub fn hash(&self) -> u64 {
        self.zobrist
    }

    pub fn piece_on(&self, sq: usize) -> Option<(PieceKind, Color)> {
        let mask = square_bb(sq);
        let color = if self.color_occ[0] & mask != 0 {
            Color::White
        } else if self.color_occ[1] & mask != 0 {
            Color::Black
        } else {
            return None;
        };
        self.kind_at(sq, color).map(|kind| (kind, color))
    }

    #[inline]
    fn kind_at(&self, sq: usize, color: Color) -> Option<PieceKind> {
        let mask = square_bb(sq);
        PieceKind::ALL
            .into_iter()
            .find(|&kind| self.pieces(kind, color) & mask != 0)
    }

    #[inline]
    fn put(&mut self, sq: usize, kind: PieceKind, color: Color) {
        let bit = square_bb(sq);
        self.piece_bb[piece_index(kind, color)] |= bit;
        self.color_occ[color as usize] |= bit;
    }

    #[inline]
    fn remove(&mut self, sq: usize, kind: PieceKind, color: Color) {
        let bit = !square_bb(sq);
        self.piece_bb[piece_index(kind, color)] &= bit;
        self.color_occ[color as usize] &= bit;
    }

    #[inline]
    pub fn king_sq(&self, color: Color) -> Option<usize> {
        lsb_index(self.pieces(PieceKind::King, color))
    }

    /// Pieces of `by` attacking `sq` under the current occupancy
    pub fn attackers_to(&self, sq: usize, by: Color, tables: &AttackTables) -> u64 {
        let occ = self.occupied();
        let queens = self.pieces(PieceKind::Queen, by);
        // a pawn of `by` attacks sq iff a pawn of the other colour on sq would attack it back
        (tables.pawn(by.opposite(), sq) & self.pieces(PieceKind::Pawn, by))
            | (tables.knight(sq) & self.pieces(PieceKind::Knight, by))
            | (tables.king(sq) & self.pieces(PieceKind::King, by))
            | (tables.bishop(sq, occ) & (self.pieces(PieceKind::Bishop, by) | queens))
            | (tables.rook(sq, occ) & (self.pieces(PieceKind::Rook, by) | queens))
    }

    #[inline]
    pub fn is_square_attacked(&self, sq: usize, by: Color, tables: &AttackTables) -> bool {
        self.attackers_to(sq, by, tables) != 0
    }

    /// True when the move takes a piece (en passant included)
    #[inline]
    pub fn is_capture(&self, mv: Move) -> bool {
        mv.kind() == MoveKind::EnPassant
            || self.occupancy(self.side.opposite()) & square_bb(mv.to_sq()) != 0
    }

    /// Piece a move removes from the board, if any
    pub fn captured_piece(&self, mv: Move) -> Option<PieceKind> {
        match mv.kind() {
            MoveKind::EnPassant => Some(PieceKind::Pawn),
            _ => self.kind_at(mv.to_sq(), self.side.opposite()),
        }
    }

    #[inline]
    pub fn moving_piece(&self, mv: Move) -> Option<PieceKind> {
        self.kind_at(mv.from_sq(), self.side)
    }

    /// File of the en-passant square when the side to move has a pawn that
    /// could capture onto it. Only then does the square enter the fingerprint,
    /// so transpositions that differ in a dead en-passant square hash alike.
    ///
    /// Uses plain shifts rather than the attack tables, so hashing never
    /// depends on which tables a move generator was built with.
    pub(crate) fn ep_hash_file(&self) -> Option<usize> {
        let ep = self.ep? as usize;
        let capturers = pawn_capturers_of(ep, self.side) & self.pieces(PieceKind::Pawn, self.side);
        (capturers != 0).then(|| file_of(ep))
    }

    /// Play `mv` on a copy of the board. The move must be pseudo-legal here;
    /// anything else is a caller bug.
    pub fn apply_move(&self, mv: Move) -> Board {
        let keys = zobrist::keys();
        let mut next = *self;
        let us = self.side;
        let them = us.opposite();
        let from = mv.from_sq();
        let to = mv.to_sq();

        let Some(moving) = self.kind_at(from, us) else {
            debug_assert!(false, "no {us:?} piece on {} for {mv}", square_name(from));
            return next;
        };

        next.remove(from, moving, us);
        next.zobrist ^= keys.piece(moving, us, from);

        let captured = match mv.kind() {
            MoveKind::EnPassant => {
                let cap_sq = if us == Color::White { to - 8 } else { to + 8 };
                Some((PieceKind::Pawn, cap_sq))
            }
            _ => self.kind_at(to, them).map(|kind| (kind, to)),
        };
        if let Some((kind, sq)) = captured {
            next.remove(sq, kind, them);
            next.zobrist ^= keys.piece(kind, them, sq);
        }

        let placed = mv.promotion().unwrap_or(moving);
        next.put(to, placed, us);
        next.zobrist ^= keys.piece(placed, us, to);

        if mv.kind() == MoveKind::Castle {
            if let Some((rook_from, rook_to)) = castle_rook_squares(to) {
                next.remove(rook_from, PieceKind::Rook, us);
                next.put(rook_to, PieceKind::Rook, us);
                next.zobrist ^= keys.piece(PieceKind::Rook, us, rook_from);
                next.zobrist ^= keys.piece(PieceKind::Rook, us, rook_to);
            }
        }

        next.castling = self.castling & CASTLE_KEEP[from] & CASTLE_KEEP[to];
        next.zobrist ^= keys.castling_delta(self.castling ^ next.castling);

        if let Some(file) = self.ep_hash_file() {
            next.zobrist ^= keys.ep_file[file];
        }
        next.ep = if moving == PieceKind::Pawn && from.abs_diff(to) == 16 {
            Some(((from + to) / 2) as u8)
        } else {
            None
        };

        next.halfmove = if moving == PieceKind::Pawn || captured.is_some() {
            0
        } else {
            self.halfmove.saturating_add(1)
        };
        if us == Color::Black {
            next.fullmove = self.fullmove.saturating_add(1);
        }

        next.side = them;
        next.zobrist ^= keys.side;
        if let Some(file) = next.ep_hash_file() {
            next.zobrist ^= keys.ep_file[file];
        }
        next
    }

    /// Legal moves in generation order
    pub fn legal_moves(&self) -> Vec<Move> {
        MoveGen::new().legal_moves(self)
    }

    pub fn is_in_check(&self) -> bool {
        MoveGen::new().is_in_check(self)
    }

    /// Parse long algebraic notation and check it against the legal moves
    pub fn parse_move(&self, text: &str) -> Result<Move> {
        let bad = || EngineError::IllegalMove(text.to_string());
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(bad());
        }
        let from = parse_square(&text[0..2]).ok_or_else(bad)?;
        let to = parse_square(&text[2..4]).ok_or_else(bad)?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(ch) => match PieceKind::from_fen_char(ch) {
                Some((kind, _)) if !matches!(kind, PieceKind::Pawn | PieceKind::King) => {
                    Some(kind)
                }
                _ => return Err(bad()),
            },
        };
        self.legal_moves()
            .into_iter()
            .find(|mv| mv.from_sq() == from && mv.to_sq() == to && mv.promotion() == promotion)
            .ok_or_else(bad)
    }

    /// Pieces other than kings, both colours
    pub fn non_king_piece_count(&self) -> u32 {
        (self.occupied() & !self.pieces_of_kind(PieceKind::King)).count_ones()
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove >= 100
    }

    /// Neither side can possibly mate: bare kings, a single minor piece, or
    /// only bishops that all stand on one square colour
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = self.pieces_of_kind(PieceKind::Pawn)
            | self.pieces_of_kind(PieceKind::Rook)
            | self.pieces_of_kind(PieceKind::Queen);
        if heavy != 0 {
            return false;
        }
        let knights = self.pieces_of_kind(PieceKind::Knight);
        let bishops = self.pieces_of_kind(PieceKind::Bishop);
        if (knights | bishops).count_ones() <= 1 {
            return true;
        }
        knights == 0 && (bishops & LIGHT_SQUARES == 0 || bishops & DARK_SQUARES == 0)
    }
}

/// Rook origin and destination for a castling king landing on `king_to`
fn castle_rook_squares(king_to: usize) -> Option<(usize, usize)> {
    match king_to {
        6 => Some((7, 5)),
        2 => Some((0, 3)),
        62 => Some((63, 61)),
        58 => Some((56, 59)),
        _ => None,
    }
}

// FEN parsing and printing
impl Board {
    /// Parse a FEN record. The move counters may be omitted (they default to
    /// `0 1`); anything else malformed or inconsistent is rejected.
    pub fn from_fen(fen: &str) -> Result<Board> {
        let bad = |msg: String| EngineError::IllegalPosition(format!("{msg} in '{fen}'"));

        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 4 && fields.len() != 6 {
            return Err(bad(format!("expected 6 fields, found {}", fields.len())));
        }

        let mut board = Board::empty();

        // Pieces: rank 8 .. rank 1
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(bad(format!("expected 8 ranks, found {}", ranks.len())));
        }
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for ch in rank_text.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(bad(format!("invalid empty-square count '{ch}'")));
                    }
                    file += skip as usize;
                } else {
                    let (kind, color) = PieceKind::from_fen_char(ch)
                        .ok_or_else(|| bad(format!("invalid piece character '{ch}'")))?;
                    if file >= 8 {
                        return Err(bad(format!("rank {} is longer than 8 files", rank + 1)));
                    }
                    board.put(rank * 8 + file, kind, color);
                    file += 1;
                }
                if file > 8 {
                    return Err(bad(format!("rank {} is longer than 8 files", rank + 1)));
                }
            }
            if file != 8 {
                return Err(bad(format!("rank {} has {} files", rank + 1, file)));
            }
        }

        board.side = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(bad(format!("invalid side to move '{other}'"))),
        };

        if fields[2] != "-" {
            for ch in fields[2].chars() {
                let bit = match ch {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => return Err(bad(format!("invalid castling character '{ch}'"))),
                };
                if board.castling & bit != 0 {
                    return Err(bad(format!("repeated castling right '{ch}'")));
                }
                board.castling |= bit;
            }
        }

        board.ep = match fields[3] {
            "-" => None,
            s => {
                let sq = parse_square(s)
                    .ok_or_else(|| bad(format!("invalid en-passant square '{s}'")))?;
                Some(sq as u8)
            }
        };

        if fields.len() == 6 {
            board.halfmove = fields[4]
                .parse()
                .map_err(|_| bad(format!("invalid half-move clock '{}'", fields[4])))?;
            board.fullmove = fields[5]
                .parse()
                .map_err(|_| bad(format!("invalid full-move number '{}'", fields[5])))?;
            if board.fullmove == 0 {
                return Err(bad("full-move number must start at 1".to_string()));
            }
        }

        board.validate().map_err(bad)?;
        board.zobrist = zobrist::hash(&board);
        Ok(board)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        for color in [Color::White, Color::Black] {
            let kings = self.pieces(PieceKind::King, color).count_ones();
            if kings != 1 {
                return Err(format!("{color:?} has {kings} kings"));
            }
        }

        if self.pieces_of_kind(PieceKind::Pawn) & (RANK_1 | RANK_8) != 0 {
            return Err("pawn on the first or last rank".to_string());
        }

        let rights = [
            (CASTLE_WK, Color::White, E1, 7),
            (CASTLE_WQ, Color::White, E1, 0),
            (CASTLE_BK, Color::Black, E8, 63),
            (CASTLE_BQ, Color::Black, E8, 56),
        ];
        for (bit, color, king_home, rook_home) in rights {
            if self.castling & bit != 0
                && (self.kind_at(king_home, color) != Some(PieceKind::King)
                    || self.kind_at(rook_home, color) != Some(PieceKind::Rook))
            {
                return Err(format!(
                    "castling right without king on {} and rook on {}",
                    square_name(king_home),
                    square_name(rook_home)
                ));
            }
        }

        if let Some(ep) = self.ep_square() {
            // the pawn that just double-pushed stands in front of the target square
            let (target_rank, pushed, origin) = match self.side {
                Color::White => (5, ep.wrapping_sub(8), ep + 8),
                Color::Black => (2, ep + 8, ep.wrapping_sub(8)),
            };
            let them = self.side.opposite();
            if rank_of(ep) != target_rank
                || self.occupied() & (square_bb(ep) | square_bb(origin)) != 0
                || self.kind_at(pushed, them) != Some(PieceKind::Pawn)
            {
                return Err(format!(
                    "en-passant square {} does not follow a double pawn push",
                    square_name(ep)
                ));
            }
        }

        let tables = AttackTables::shared();
        let them = self.side.opposite();
        if let Some(king) = self.king_sq(them) {
            if self.is_square_attacked(king, self.side, tables) {
                return Err("side not to move is in check".to_string());
            }
        }
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty = 0u8;
            for file in 0..8 {
                match self.piece_on(rank * 8 + file) {
                    Some((kind, color)) => {
                        if empty > 0 {
                            placement.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        placement.push(kind.fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let side = match self.side {
            Color::White => 'w',
            Color::Black => 'b',
        };

        let mut castling = String::new();
        for (bit, ch) in [(CASTLE_WK, 'K'), (CASTLE_WQ, 'Q'), (CASTLE_BK, 'k'), (CASTLE_BQ, 'q')] {
            if self.castling & bit != 0 {
                castling.push(ch);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = self
            .ep_square()
            .map(square_name)
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{placement} {side} {castling} {ep} {} {}",
            self.halfmove, self.fullmove
        )
    }
}

// Diagram followed by the FEN line
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                match self.piece_on(rank * 8 + file) {
                    Some((kind, color)) => write!(f, "{} ", kind.fen_char(color))?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "{}", self.to_fen())
    }
}

/// Squares from which a `side` pawn would capture onto `sq`
fn pawn_capturers_of(sq: usize, side: Color) -> u64 {
    let bb = square_bb(sq);
    match side {
        Color::White => ((bb >> 7) & NOT_FILE_A) | ((bb >> 9) & NOT_FILE_H),
        Color::Black => ((bb << 9) & NOT_FILE_A) | ((bb << 7) & NOT_FILE_H),
    }
}
