//! Polyglot opening book
//!
//! A book file is a flat sequence of 16-byte big-endian records
//! `(key: u64, move: u16, weight: u16, learn: u32)` sorted by key. Keys are
//! the published Polyglot position hashes, which shakmaty computes for us.

use std::fs;
use std::path::Path;

use rand::Rng;
use shakmaty::fen::Fen;
use shakmaty::zobrist::Zobrist64;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position};

use crate::board::{Board, Move, PieceKind};
use crate::error::{EngineError, Result};
use crate::utils::{E1, E8};

const RECORD_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookEntry {
    pub key: u64,
    /// Packed move, see [`decode_move`]
    pub mv: u16,
    pub weight: u16,
    pub learn: u32,
}

impl BookEntry {
    fn from_record(record: &[u8]) -> Self {
        let mut key = [0u8; 8];
        key.copy_from_slice(&record[0..8]);
        let mut learn = [0u8; 4];
        learn.copy_from_slice(&record[12..16]);
        Self {
            key: u64::from_be_bytes(key),
            mv: u16::from_be_bytes([record[8], record[9]]),
            weight: u16::from_be_bytes([record[10], record[11]]),
            learn: u32::from_be_bytes(learn),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    entries: Vec<BookEntry>,
}

impl OpeningBook {
    /// A book without entries; every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % RECORD_SIZE != 0 {
            return Err(EngineError::CorruptBook(format!(
                "{} bytes is not a whole number of {RECORD_SIZE}-byte records",
                bytes.len()
            )));
        }
        let mut entries: Vec<BookEntry> =
            bytes.chunks_exact(RECORD_SIZE).map(BookEntry::from_record).collect();
        // hand-made books are not always sorted
        entries.sort_by_key(|e| e.key);
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| EngineError::BookLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Load the book at `path`, or run bookless if there is none or it cannot be read
    pub fn load_or_empty(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::empty();
        };
        match Self::load(path) {
            Ok(book) => {
                log::info!("loaded opening book {} ({} entries)", path.display(), book.len());
                book
            }
            Err(e) => {
                log::warn!("{e}; continuing without an opening book");
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All records stored under `key`
    pub fn entries_for(&self, key: u64) -> &[BookEntry] {
        let start = self.entries.partition_point(|e| e.key < key);
        let end = start + self.entries[start..].partition_point(|e| e.key == key);
        &self.entries[start..end]
    }

    pub fn lookup(&self, board: &Board) -> Option<Move> {
        self.lookup_with(board, &mut rand::thread_rng())
    }

    /// Pick a book move with probability proportional to its weight.
    ///
    /// Records whose move is not legal in `board` are skipped before the
    /// draw. If every remaining weight is zero the pick is uniform.
    pub fn lookup_with<R: Rng + ?Sized>(&self, board: &Board, rng: &mut R) -> Option<Move> {
        if self.is_empty() {
            return None;
        }
        let key = polyglot_key(board)?;
        let candidates: Vec<(Move, u64)> = self
            .entries_for(key)
            .iter()
            .filter_map(|e| decode_move(e.mv, board).map(|mv| (mv, u64::from(e.weight))))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let total_weight: u64 = candidates.iter().map(|&(_, w)| w).sum();
        if total_weight == 0 {
            return Some(candidates[rng.gen_range(0..candidates.len())].0);
        }

        let mut pick = rng.gen_range(0..total_weight);
        for &(mv, weight) in &candidates {
            if pick < weight {
                return Some(mv);
            }
            pick -= weight;
        }
        Some(candidates[0].0)
    }
}

/// Standard Polyglot hash of `board`
///
/// The en-passant file only counts when a capture there is possible, which is
/// what `EnPassantMode::Legal` selects.
pub fn polyglot_key(board: &Board) -> Option<u64> {
    let fen: Fen = board.to_fen().parse().ok()?;
    let pos: Chess = fen
        .into_position::<Chess>(CastlingMode::Standard)
        .or_else(|err| err.ignore_invalid_ep_square())
        .ok()?;
    let Zobrist64(key) = pos.zobrist_hash::<Zobrist64>(EnPassantMode::Legal);
    Some(key)
}

/// Decode a packed Polyglot move against `board`.
///
/// Bits 0-2 to-file, 3-5 to-rank, 6-8 from-file, 9-11 from-rank, 12-14
/// promotion (1 knight, 2 bishop, 3 rook, 4 queen). Castling is stored as
/// the king capturing its own rook and comes back as the king's two-square
/// move. Returns `None` unless the result is legal in `board`.
pub fn decode_move(raw: u16, board: &Board) -> Option<Move> {
    let raw = usize::from(raw);
    let to_file = raw & 7;
    let to_rank = (raw >> 3) & 7;
    let from_file = (raw >> 6) & 7;
    let from_rank = (raw >> 9) & 7;
    let promotion = match (raw >> 12) & 7 {
        0 => None,
        1 => Some(PieceKind::Knight),
        2 => Some(PieceKind::Bishop),
        3 => Some(PieceKind::Rook),
        4 => Some(PieceKind::Queen),
        _ => return None,
    };

    let from = from_rank * 8 + from_file;
    let mut to = to_rank * 8 + to_file;

    if (from == E1 || from == E8) && matches!(board.piece_on(from), Some((PieceKind::King, _))) {
        if to == from + 3 {
            to = from + 2;
        } else if to + 4 == from {
            to = from - 2;
        }
    }

    board
        .legal_moves()
        .into_iter()
        .find(|mv| mv.from_sq() == from && mv.to_sq() == to && mv.promotion() == promotion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const START_KEY: u64 = 0x463b_9618_1691_fc9c;

    fn packed(from: usize, to: usize, promo: usize) -> u16 {
        ((promo << 12) | ((from / 8) << 9) | ((from % 8) << 6) | ((to / 8) << 3) | (to % 8)) as u16
    }

    fn record(key: u64, mv: u16, weight: u16) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(RECORD_SIZE);
        bytes.extend_from_slice(&key.to_be_bytes());
        bytes.extend_from_slice(&mv.to_be_bytes());
        bytes.extend_from_slice(&weight.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes
    }

    #[test]
    fn test_start_position_key() {
        assert_eq!(polyglot_key(&Board::start_position()), Some(START_KEY));
    }

    #[test]
    fn test_key_ignores_uncapturable_ep_square() {
        let board = Board::start_position();
        let after_e4 = board.apply_move(board.parse_move("e2e4").unwrap());
        assert_eq!(after_e4.ep_square(), Some(20));
        assert_eq!(polyglot_key(&after_e4), Some(0x823c_9b50_fd11_4196));
    }

    #[test]
    fn test_e2e4_decodes() {
        let board = Board::start_position();
        let raw: u16 = (1 << 9) | (4 << 6) | (3 << 3) | 4;
        assert_eq!(packed(12, 28, 0), raw);
        let mv = decode_move(raw, &board).expect("e2e4 is legal");
        assert_eq!(mv.to_uci(), "e2e4");
    }

    #[test]
    fn test_castling_is_mapped_to_king_move() {
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(decode_move(packed(4, 7, 0), &board).unwrap().to_uci(), "e1g1");
        assert_eq!(decode_move(packed(4, 0, 0), &board).unwrap().to_uci(), "e1c1");

        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
        assert_eq!(decode_move(packed(60, 63, 0), &board).unwrap().to_uci(), "e8g8");
        assert_eq!(decode_move(packed(60, 56, 0), &board).unwrap().to_uci(), "e8c8");
    }

    #[test]
    fn test_promotion_decodes() {
        let board = Board::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mv = decode_move(packed(48, 56, 1), &board).unwrap();
        assert_eq!(mv.to_uci(), "a7a8n");
        assert!(decode_move(packed(48, 56, 7), &board).is_none());
    }

    #[test]
    fn test_weighted_selection() {
        let board = Board::start_position();
        let mut bytes = record(START_KEY, packed(12, 28, 0), 1);
        bytes.extend(record(START_KEY, packed(11, 27, 0), 3));
        let book = OpeningBook::from_bytes(&bytes).unwrap();
        assert_eq!(book.entries_for(START_KEY).len(), 2);

        let mut rng = StdRng::seed_from_u64(0x5eed);
        let trials = 10_000;
        let e4 = (0..trials)
            .filter(|_| book.lookup_with(&board, &mut rng).unwrap().to_uci() == "e2e4")
            .count();
        // expected 2500, binomial sd ~ 43
        assert!((2_250..=2_750).contains(&e4), "e2e4 picked {e4} times");
    }

    #[test]
    fn test_zero_weights_are_uniform() {
        let board = Board::start_position();
        let mut bytes = record(START_KEY, packed(12, 28, 0), 0);
        bytes.extend(record(START_KEY, packed(11, 27, 0), 0));
        let book = OpeningBook::from_bytes(&bytes).unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        let e4 = (0..2_000)
            .filter(|_| book.lookup_with(&board, &mut rng).unwrap().to_uci() == "e2e4")
            .count();
        assert!((800..=1_200).contains(&e4));
    }

    #[test]
    fn test_illegal_entries_are_ignored() {
        let board = Board::start_position();
        // e2e5 is not a legal pawn move
        let bytes = record(START_KEY, packed(12, 36, 0), 100);
        let book = OpeningBook::from_bytes(&bytes).unwrap();
        assert_eq!(book.len(), 1);
        assert!(book.lookup(&board).is_none());
    }

    #[test]
    fn test_unknown_position_misses() {
        let bytes = record(START_KEY, packed(12, 28, 0), 1);
        let book = OpeningBook::from_bytes(&bytes).unwrap();
        let board = Board::from_fen(crate::board::KIWIPETE_FEN).unwrap();
        assert!(book.lookup(&board).is_none());
    }

    #[test]
    fn test_corrupt_length_is_rejected() {
        let mut bytes = record(START_KEY, packed(12, 28, 0), 1);
        bytes.pop();
        assert!(matches!(OpeningBook::from_bytes(&bytes), Err(EngineError::CorruptBook(_))));
    }

    #[test]
    fn test_missing_file_gives_empty_book() {
        let path = std::env::temp_dir().join("scacchiera-no-such-book.bin");
        assert!(matches!(OpeningBook::load(&path), Err(EngineError::BookLoad { .. })));
        let book = OpeningBook::load_or_empty(Some(&path));
        assert!(book.is_empty());
        assert!(OpeningBook::load_or_empty(None).is_empty());
    }
}
