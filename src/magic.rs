//! Precomputed attack tables
//!
//! Knight, king and pawn attacks are plain per-square masks. Sliding pieces use
//! "magic bitboards": the occupancy bits relevant to a square are multiplied by
//! a fixed constant and shifted, giving a collision-free index into a table of
//! attack sets. All ray-casting happens once, at construction.

use std::sync::OnceLock;

use crate::board::{Color, PieceKind};
use crate::error::{EngineError, Result};

// ============================================================================
// MAGIC NUMBERS (from Chess Programming Wiki / Stockfish)
// ============================================================================

/// Rook magic numbers - one per square
/// These are carefully chosen constants that produce perfect hashing
const ROOK_MAGICS: [u64; 64] = [
    0x0080001020400080, 0x0040001000200040, 0x0080081000200080, 0x0080040800100080,
    0x0080020400080080, 0x0080010200040080, 0x0080008001000200, 0x0080002040800100,
    0x0000800020400080, 0x0000400020005000, 0x0000801000200080, 0x0000800800100080,
    0x0000800400080080, 0x0000800200040080, 0x0000800100020080, 0x0000800040800100,
    0x0000208000400080, 0x0000404000201000, 0x0000808010002000, 0x0000808008001000,
    0x0000808004000800, 0x0000808002000400, 0x0000010100020004, 0x0000020000408104,
    0x0000208080004000, 0x0000200040005000, 0x0000100080200080, 0x0000080080100080,
    0x0000040080080080, 0x0000020080040080, 0x0000010080800200, 0x0000800080004100,
    0x0000204000800080, 0x0000200040401000, 0x0000100080802000, 0x0000080080801000,
    0x0000040080800800, 0x0000020080800400, 0x0000020001010004, 0x0000800040800100,
    0x0000204000808000, 0x0000200040008080, 0x0000100020008080, 0x0000080010008080,
    0x0000040008008080, 0x0000020004008080, 0x0000010002008080, 0x0000004081020004,
    0x0000204000800080, 0x0000200040008080, 0x0000100020008080, 0x0000080010008080,
    0x0000040008008080, 0x0000020004008080, 0x0000800100020080, 0x0000800041000080,
    0x00FFFCDDFCED714A, 0x007FFCDDFCED714A, 0x003FFFCDFFD88096, 0x0000040810002101,
    0x0001000204080011, 0x0001000204000801, 0x0001000082000401, 0x0001FFFAABFAD1A2,
];

/// Bishop magic numbers - one per square
const BISHOP_MAGICS: [u64; 64] = [
    0x0002020202020200, 0x0002020202020000, 0x0004010202000000, 0x0004040080000000,
    0x0001104000000000, 0x0000821040000000, 0x0000410410400000, 0x0000104104104000,
    0x0000040404040400, 0x0000020202020200, 0x0000040102020000, 0x0000040400800000,
    0x0000011040000000, 0x0000008210400000, 0x0000004104104000, 0x0000002082082000,
    0x0004000808080800, 0x0002000404040400, 0x0001000202020200, 0x0000800802004000,
    0x0000800400A00000, 0x0000200100884000, 0x0000400082082000, 0x0000200041041000,
    0x0002080010101000, 0x0001040008080800, 0x0000208004010400, 0x0000404004010200,
    0x0000840000802000, 0x0000404002011000, 0x0000808001041000, 0x0000404000820800,
    0x0001041000202000, 0x0000820800101000, 0x0000104400080800, 0x0000020080080080,
    0x0000404040040100, 0x0000808100020100, 0x0001010100020800, 0x0000808080010400,
    0x0000820820004000, 0x0000410410002000, 0x0000082088001000, 0x0000002011000800,
    0x0000080100400400, 0x0001010101000200, 0x0002020202000400, 0x0001010101000200,
    0x0000410410400000, 0x0000208208200000, 0x0000002084100000, 0x0000000020880000,
    0x0000001002020000, 0x0000040408020000, 0x0004040404040000, 0x0002020202020000,
    0x0000104104104000, 0x0000002082082000, 0x0000000020841000, 0x0000000000208800,
    0x0000000010020200, 0x0000000404080200, 0x0000040404040400, 0x0002020202020200,
];

/// Rook shift amounts (64 - number of relevant bits)
const ROOK_SHIFTS: [u8; 64] = [
    52, 53, 53, 53, 53, 53, 53, 52,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    52, 53, 53, 53, 53, 53, 53, 52,
];

/// Bishop shift amounts
const BISHOP_SHIFTS: [u8; 64] = [
    58, 59, 59, 59, 59, 59, 59, 58,
    59, 59, 59, 59, 59, 59, 59, 59,
    59, 59, 57, 57, 57, 57, 59, 59,
    59, 59, 57, 55, 55, 57, 59, 59,
    59, 59, 57, 55, 55, 57, 59, 59,
    59, 59, 57, 57, 57, 57, 59, 59,
    59, 59, 59, 59, 59, 59, 59, 59,
    58, 59, 59, 59, 59, 59, 59, 58,
];

/// Total size needed for rook attack table entries
const ROOK_TABLE_SIZE: usize = 102400; // Sum of 2^(64-shift) for all squares

/// Total size needed for bishop attack table entries
const BISHOP_TABLE_SIZE: usize = 5248;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ROOK_DIRS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

/// Magic entry for a single square
#[derive(Clone, Copy, Default)]
struct MagicEntry {
    mask: u64,     // Relevant occupancy mask (excludes edges)
    magic: u64,    // Magic number
    shift: u8,     // Shift amount (64 - bits)
    offset: usize, // Offset into attack table
}

impl MagicEntry {
    #[inline]
    fn index(&self, occ: u64) -> usize {
        self.offset + ((occ & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

/// Immutable attack lookup tables for every piece type
pub struct AttackTables {
    knight: [u64; 64],
    king: [u64; 64],
    pawn: [[u64; 64]; 2],
    rook_entries: [MagicEntry; 64],
    bishop_entries: [MagicEntry; 64],
    rook_attacks: Vec<u64>,
    bishop_attacks: Vec<u64>,
}

static ATTACK_TABLES: OnceLock<AttackTables> = OnceLock::new();

// ============================================================================
// MASK GENERATION
// ============================================================================

/// Squares reachable by single steps from `sq`, dropping any that would wrap
/// around the A/H files or leave the board
fn step_attacks(sq: usize, offsets: &[(i8, i8)]) -> u64 {
    let file = (sq % 8) as i8;
    let rank = (sq / 8) as i8;
    let mut mask = 0u64;
    for &(df, dr) in offsets {
        let (f, r) = (file + df, rank + dr);
        if (0..8).contains(&f) && (0..8).contains(&r) {
            mask |= 1u64 << (r * 8 + f);
        }
    }
    mask
}

fn pawn_attacks(sq: usize, color: Color) -> u64 {
    match color {
        Color::White => step_attacks(sq, &[(-1, 1), (1, 1)]),
        Color::Black => step_attacks(sq, &[(-1, -1), (1, -1)]),
    }
}

/// Relevant blocker squares along `dirs`, excluding the final square of each
/// ray (a piece on the edge never changes the attack set)
fn relevant_mask(sq: usize, dirs: &[(i8, i8)]) -> u64 {
    let file = (sq % 8) as i8;
    let rank = (sq / 8) as i8;
    let mut mask = 0u64;
    for &(df, dr) in dirs {
        let (mut f, mut r) = (file + df, rank + dr);
        while (0..8).contains(&(f + df)) && (0..8).contains(&(r + dr)) {
            mask |= 1u64 << (r * 8 + f);
            f += df;
            r += dr;
        }
    }
    mask
}

/// Ray-cast attacks for a slider (slow, for table building)
fn slider_attacks_slow(sq: usize, occ: u64, dirs: &[(i8, i8)]) -> u64 {
    let file = (sq % 8) as i8;
    let rank = (sq / 8) as i8;
    let mut attacks = 0u64;
    for &(df, dr) in dirs {
        let (mut f, mut r) = (file + df, rank + dr);
        while (0..8).contains(&f) && (0..8).contains(&r) {
            let bit = 1u64 << (r * 8 + f);
            attacks |= bit;
            if occ & bit != 0 {
                break;
            }
            f += df;
            r += dr;
        }
    }
    attacks
}

// ============================================================================
// TABLE INITIALIZATION
// ============================================================================

/// Fill the hashed attack table for one slider type, failing on any slot that
/// two occupancies with different attack sets both hash to
fn build_slider_table(
    piece: PieceKind,
    dirs: &[(i8, i8)],
    magics: &[u64; 64],
    shifts: &[u8; 64],
    table_size: usize,
) -> Result<([MagicEntry; 64], Vec<u64>)> {
    let mut entries = [MagicEntry::default(); 64];
    let mut attacks = vec![0u64; table_size];
    let mut written = vec![false; table_size];
    let mut offset = 0usize;

    for sq in 0..64 {
        let entry = MagicEntry {
            mask: relevant_mask(sq, dirs),
            magic: magics[sq],
            shift: shifts[sq],
            offset,
        };
        let slots = 1usize << (64 - entry.shift);
        if offset + slots > table_size {
            return Err(EngineError::MagicCollision { square: sq, piece });
        }

        // Carry-rippler walk over every subset of the mask
        let mut occ = 0u64;
        loop {
            let attack = slider_attacks_slow(sq, occ, dirs);
            let index = entry.index(occ);
            if written[index] && attacks[index] != attack {
                return Err(EngineError::MagicCollision { square: sq, piece });
            }
            attacks[index] = attack;
            written[index] = true;

            occ = occ.wrapping_sub(entry.mask) & entry.mask;
            if occ == 0 {
                break;
            }
        }

        entries[sq] = entry;
        offset += slots;
    }

    Ok((entries, attacks))
}

impl AttackTables {
    /// Build and self-check all tables
    pub fn new() -> Result<Self> {
        let mut knight = [0u64; 64];
        let mut king = [0u64; 64];
        let mut pawn = [[0u64; 64]; 2];
        for sq in 0..64 {
            knight[sq] = step_attacks(sq, &KNIGHT_OFFSETS);
            king[sq] = step_attacks(sq, &KING_OFFSETS);
            pawn[Color::White as usize][sq] = pawn_attacks(sq, Color::White);
            pawn[Color::Black as usize][sq] = pawn_attacks(sq, Color::Black);
        }

        let (rook_entries, rook_attacks) = build_slider_table(
            PieceKind::Rook,
            &ROOK_DIRS,
            &ROOK_MAGICS,
            &ROOK_SHIFTS,
            ROOK_TABLE_SIZE,
        )?;
        let (bishop_entries, bishop_attacks) = build_slider_table(
            PieceKind::Bishop,
            &BISHOP_DIRS,
            &BISHOP_MAGICS,
            &BISHOP_SHIFTS,
            BISHOP_TABLE_SIZE,
        )?;

        Ok(Self {
            knight,
            king,
            pawn,
            rook_entries,
            bishop_entries,
            rook_attacks,
            bishop_attacks,
        })
    }

    /// Process-wide tables, built on first use.
    ///
    /// # Panics
    /// If the built-in magic constants fail the construction self-check. This
    /// cannot be recovered from: move generation has no table to fall back on.
    pub fn shared() -> &'static AttackTables {
        ATTACK_TABLES.get_or_init(|| match AttackTables::new() {
            Ok(tables) => tables,
            Err(e) => panic!("attack table construction failed: {e}"),
        })
    }

    #[inline]
    pub fn knight(&self, sq: usize) -> u64 {
        self.knight[sq]
    }

    #[inline]
    pub fn king(&self, sq: usize) -> u64 {
        self.king[sq]
    }

    /// Squares a pawn of `color` on `sq` attacks
    #[inline]
    pub fn pawn(&self, color: Color, sq: usize) -> u64 {
        self.pawn[color as usize][sq]
    }

    #[inline]
    pub fn rook(&self, sq: usize, occ: u64) -> u64 {
        self.rook_attacks[self.rook_entries[sq].index(occ)]
    }

    #[inline]
    pub fn bishop(&self, sq: usize, occ: u64) -> u64 {
        self.bishop_attacks[self.bishop_entries[sq].index(occ)]
    }

    #[inline]
    pub fn queen(&self, sq: usize, occ: u64) -> u64 {
        self.rook(sq, occ) | self.bishop(sq, occ)
    }
}

// ============================================================================
// TESTS
// ============================================================================
