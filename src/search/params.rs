//! Search parameters and configuration
//!
//! Controls depth limits, the quiescence horizon, the transposition table
//! size and how the clock is budgeted.

/// Search parameters for the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Maximum iterative-deepening depth in plies
    pub max_depth: u8,

    /// Maximum extra plies of captures/promotions below the horizon
    pub qsearch_depth: u8,

    /// Transposition table size in entries
    pub tt_size: usize,

    /// The clock is consulted once every this many nodes (and at every root move)
    pub node_check_interval: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_depth: 64,
            qsearch_depth: 8,
            tt_size: 1 << 20,
            node_check_interval: 1024,
        }
    }
}

impl SearchParams {
    /// Create new search params with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum depth in plies
    pub fn max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Set quiescence search depth
    pub fn qsearch_depth(mut self, depth: u8) -> Self {
        self.qsearch_depth = depth;
        self
    }

    /// Set transposition table size in entries
    pub fn tt_size(mut self, entries: usize) -> Self {
        self.tt_size = entries.max(1);
        self
    }

    /// Set how many nodes pass between clock checks
    pub fn node_check_interval(mut self, nodes: u64) -> Self {
        self.node_check_interval = nodes.max(1);
        self
    }
}

/// Clock budgeting knobs used by `TimeManager`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeManagement {
    /// Smallest budget handed out while the clock allows it
    pub min_budget_ms: u64,
    /// Largest share of the remaining time one move may take, in percent
    pub max_fraction_pct: u64,
    /// Below this much remaining time the budget is cut back hard
    pub panic_threshold_ms: u64,
    /// Expected moves still to play in a middlegame position
    pub default_moves_left: u64,
}

impl Default for TimeManagement {
    fn default() -> Self {
        Self {
            min_budget_ms: 50,
            max_fraction_pct: 40,
            panic_threshold_ms: 10_000,
            default_moves_left: 30,
        }
    }
}

impl TimeManagement {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_clamps_degenerate_values() {
        let params = SearchParams::new()
            .max_depth(0)
            .tt_size(0)
            .node_check_interval(0)
            .qsearch_depth(0);
        assert_eq!(params.max_depth, 1);
        assert_eq!(params.tt_size, 1);
        assert_eq!(params.node_check_interval, 1);
        assert_eq!(params.qsearch_depth, 0);
    }
}
