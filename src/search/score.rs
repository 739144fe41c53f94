//! Mate-aware search scores
//!
//! A score is either a material estimate in centipawns or a forced mate
//! counted in full moves. `Mate(d)` with `d > 0` means the side to move mates
//! in `d` moves; `d < 0` means it gets mated in `|d|`. Every score is from the
//! point of view of the side to move at the node that produced it.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;

/// Packed magnitude for mate scores inside the transposition table
const TT_MATE: i32 = 1_000_000;
/// Packed values at or beyond this magnitude are mates
const TT_MATE_BOUND: i32 = TT_MATE - 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Score {
    Material(i32),
    Mate(i32),
}

impl Score {
    pub const DRAW: Score = Score::Material(0);
    /// Worst attainable score: mated right now
    pub const MIN: Score = Score::Mate(-1);
    /// Best attainable score: mate in one
    pub const MAX: Score = Score::Mate(1);

    /// Score of a checkmated side to move found `ply` half-moves below the root
    #[inline]
    pub fn mated_at_ply(ply: u32) -> Score {
        Score::Mate(-(moves_for_plies(ply) as i32))
    }

    #[inline]
    pub fn is_mate(self) -> bool {
        matches!(self, Score::Mate(_))
    }

    #[inline]
    pub fn is_winning_mate(self) -> bool {
        matches!(self, Score::Mate(d) if d > 0)
    }

    // Single numeric key realising the total order. Material sits strictly
    // between every losing and every winning mate.
    fn order_key(self) -> i64 {
        const MATE_KEY: i64 = 1 << 40;
        match self {
            Score::Material(cp) => cp as i64,
            Score::Mate(d) if d > 0 => MATE_KEY - d as i64,
            Score::Mate(d) => -MATE_KEY - d as i64,
        }
    }

    /// Pack for the transposition table: mates become distances from the
    /// node at `ply` rather than from the root
    pub fn to_tt(self, ply: u32) -> i32 {
        match self {
            Score::Material(cp) => cp.clamp(-TT_MATE_BOUND + 1, TT_MATE_BOUND - 1),
            Score::Mate(d) if d > 0 => {
                // the loser is to move at the mated ply, which has the opposite parity of `ply`
                let mated_ply = mated_ply_for(d, ply + 1);
                TT_MATE - mated_ply.saturating_sub(ply) as i32
            }
            Score::Mate(d) => {
                let mated_ply = mated_ply_for(-d, ply);
                -(TT_MATE - mated_ply.saturating_sub(ply) as i32)
            }
        }
    }

    /// Unpack a transposition-table value seen at `ply`
    pub fn from_tt(value: i32, ply: u32) -> Score {
        if value >= TT_MATE_BOUND {
            let mated_ply = ply + (TT_MATE - value) as u32;
            Score::Mate(moves_for_plies(mated_ply) as i32)
        } else if value <= -TT_MATE_BOUND {
            let mated_ply = ply + (TT_MATE + value) as u32;
            Score::Mate(-(moves_for_plies(mated_ply) as i32))
        } else {
            Score::Material(value)
        }
    }
}

/// Full moves from the root until the side checkmated at `ply` is to move
#[inline]
fn moves_for_plies(ply: u32) -> u32 {
    ply / 2 + 1
}

/// The ply of checkmate for a root distance of `moves`. Two plies share each
/// distance; the one with the parity of `parity_of` is chosen.
#[inline]
fn mated_ply_for(moves: i32, parity_of: u32) -> u32 {
    let moves = moves.max(1) as u32;
    2 * moves - 2 + parity_of % 2
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Neg for Score {
    type Output = Score;

    #[inline]
    fn neg(self) -> Score {
        match self {
            Score::Material(cp) => Score::Material(cp.saturating_neg()),
            Score::Mate(d) => Score::Mate(d.saturating_neg()),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Material(cp) => write!(f, "cp {cp}"),
            Score::Mate(d) => write!(f, "mate {d}"),
        }
    }
}
