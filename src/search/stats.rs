//! Search statistics and performance metrics
//!
//! Tracks nodes searched, cutoffs, transposition table hits and timing.

use std::time::{Duration, Instant};

/// Search statistics
#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    /// Total nodes searched (main search and quiescence)
    pub nodes: u64,

    /// Quiescence nodes searched
    pub qsearch_nodes: u64,

    /// Deepest quiescence ply entered below the horizon
    pub qsearch_max_ply: u8,

    /// Transposition table probes that found the position
    pub tt_hits: u64,

    /// Transposition table stores
    pub tt_stores: u64,

    /// Alpha-beta cutoffs
    pub cutoffs: u64,

    /// Deepest iteration completed
    pub completed_depth: u8,

    /// Search start time
    pub start_time: Option<Instant>,

    /// Time spent searching
    pub search_time: Duration,

    /// Nodes per second rate
    pub nps: u64,
}

impl SearchStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing
    pub fn start_timing(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Update elapsed time and NPS
    pub fn update_timing(&mut self) {
        if let Some(start) = self.start_time {
            self.search_time = start.elapsed();
            let elapsed_ms = self.search_time.as_millis() as u64;
            if elapsed_ms > 0 {
                self.nps = (self.nodes * 1000) / elapsed_ms;
            }
        }
    }

    pub fn inc_node(&mut self) {
        self.nodes += 1;
    }

    pub fn inc_qsearch_node(&mut self) {
        self.nodes += 1;
        self.qsearch_nodes += 1;
    }

    pub fn inc_tt_hit(&mut self) {
        self.tt_hits += 1;
    }

    pub fn inc_tt_store(&mut self) {
        self.tt_stores += 1;
    }

    pub fn inc_cutoff(&mut self) {
        self.cutoffs += 1;
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Emit a one-line summary at debug level
    pub fn log_summary(&self) {
        log::debug!(
            "search: depth {} nodes {} (qsearch {}, max ply {}) tt hits {} stores {} cutoffs {} \
             time {} ms nps {}",
            self.completed_depth,
            self.nodes,
            self.qsearch_nodes,
            self.qsearch_max_ply,
            self.tt_hits,
            self.tt_stores,
            self.cutoffs,
            self.search_time.as_millis(),
            self.nps
        );
    }
}
