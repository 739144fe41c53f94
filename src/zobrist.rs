// Zobrist hashing with precomputed tables
use std::sync::OnceLock;

use crate::board::{Board, Color, PieceKind};
use crate::utils::iter_bits;

const SEED: u64 = 0x5343_4143_4348_4941;

/// Random keys combined by XOR into a position fingerprint
pub struct ZobristKeys {
    piece: [[u64; 64]; 12],
    pub side: u64,
    /// One key per castling right, indexed by bit position (q=0, k=1, Q=2, K=3)
    pub castling: [u64; 4],
    pub ep_file: [u64; 8],
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

fn split_mix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

impl ZobristKeys {
    fn generate() -> Self {
        let mut state = SEED;
        let mut next = || {
            state = state.wrapping_add(1);
            split_mix64(state)
        };

        let mut piece = [[0u64; 64]; 12];
        for row in piece.iter_mut() {
            for key in row.iter_mut() {
                *key = next();
            }
        }
        let side = next();
        let castling = [next(), next(), next(), next()];
        let mut ep_file = [0u64; 8];
        for key in ep_file.iter_mut() {
            *key = next();
        }

        Self {
            piece,
            side,
            castling,
            ep_file,
        }
    }

    #[inline]
    pub fn piece(&self, kind: PieceKind, color: Color, sq: usize) -> u64 {
        self.piece[(color as usize) * 6 + kind as usize][sq]
    }

    /// XOR of the keys for every castling right set in `changed`
    #[inline]
    pub fn castling_delta(&self, changed: u8) -> u64 {
        iter_bits(u64::from(changed & 0b1111)).fold(0, |h, bit| h ^ self.castling[bit])
    }
}

pub fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(ZobristKeys::generate)
}

/// Fingerprint computed from scratch; `Board::apply_move` keeps the same value incrementally
pub fn hash(board: &Board) -> u64 {
    let keys = keys();
    let mut h = 0u64;

    for color in [Color::White, Color::Black] {
        for kind in PieceKind::ALL {
            for sq in iter_bits(board.pieces(kind, color)) {
                h ^= keys.piece(kind, color, sq);
            }
        }
    }

    if board.side_to_move() == Color::Black {
        h ^= keys.side;
    }
    h ^= keys.castling_delta(board.castling_rights());
    if let Some(file) = board.ep_hash_file() {
        h ^= keys.ep_file[file];
    }
    h
}
