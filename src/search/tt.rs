//! Direct-mapped transposition table
//!
//! One entry per slot, indexed by `key % size`. A store always overwrites the
//! slot; a probe only succeeds when the full 64-bit key matches.

use crate::board::Move;
use crate::search::score::Score;

/// How the stored score relates to the true value of the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Exact,
    /// Fail-high: the true score is at least the stored one
    LowerBound,
    /// Fail-low: the true score is at most the stored one
    UpperBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    pub key: u64,
    pub depth: u8,
    /// Score packed relative to the storing node (see `Score::to_tt`)
    value: i32,
    pub node_type: NodeType,
    pub best_move: Option<Move>,
}

impl TTEntry {
    /// Stored score as seen from a node `ply` half-moves below the root
    #[inline]
    pub fn score(&self, ply: u32) -> Score {
        Score::from_tt(self.value, ply)
    }
}

pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
}

impl TranspositionTable {
    /// Table with room for `size` entries (at least one)
    pub fn new(size: usize) -> Self {
        Self {
            entries: vec![None; size.max(1)],
        }
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key % self.entries.len() as u64) as usize
    }

    pub fn probe(&self, key: u64) -> Option<TTEntry> {
        self.entries[self.index(key)].filter(|entry| entry.key == key)
    }

    /// Store the result of a node searched at `ply`; the slot's previous occupant is discarded
    pub fn store(
        &mut self,
        key: u64,
        depth: u8,
        score: Score,
        ply: u32,
        node_type: NodeType,
        best_move: Option<Move>,
    ) {
        let index = self.index(key);
        self.entries[index] = Some(TTEntry {
            key,
            depth,
            value: score.to_tt(ply),
            node_type,
            best_move,
        });
    }

    pub fn fill_percentage(&self) -> f64 {
        let filled = self.entries.iter().filter(|e| e.is_some()).count();
        (filled as f64 / self.entries.len() as f64) * 100.0
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(1 << 20)
    }
}
