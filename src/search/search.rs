//! Main search engine implementation
//!
//! Iterative deepening negamax alpha-beta with a transposition table,
//! TT-move-first plus MVV-LVA move ordering and a capped quiescence search.
//! The clock is soft: the search polls it at every root move and every
//! `node_check_interval` nodes, and an iteration cut short is thrown away.

use std::cmp::Reverse;
use std::time::{Duration, Instant};

use super::params::SearchParams;
use super::score::Score;
use super::stats::SearchStats;
use super::tt::{NodeType, TranspositionTable};
use crate::board::{Board, Move};
use crate::error::{EngineError, Result};
use crate::eval::{evaluate, piece_value};
use crate::movegen::MoveGen;

/// Outcome of a completed search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    /// Score of `best_move` from the root side's point of view
    pub score: Score,
    /// Deepest fully completed iteration
    pub depth: u8,
    pub nodes: u64,
}

/// Main search engine
pub struct Search {
    /// Transposition table for caching
    tt: TranspositionTable,

    /// Search parameters
    params: SearchParams,

    /// Search statistics
    stats: SearchStats,

    movegen: MoveGen<'static>,

    /// Fingerprints of the game positions that preceded the root
    history: Vec<u64>,

    /// Fingerprints of the positions between the root and the current node
    path: Vec<u64>,

    deadline: Option<Instant>,

    /// Clear during the first iteration so that one always completes
    abortable: bool,

    stopped: bool,
}

impl Search {
    /// Create new search engine
    pub fn new(params: SearchParams) -> Self {
        Self {
            tt: TranspositionTable::new(params.tt_size),
            params,
            stats: SearchStats::new(),
            movegen: MoveGen::new(),
            history: Vec::new(),
            path: Vec::new(),
            deadline: None,
            abortable: false,
            stopped: false,
        }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Get search statistics of the last search
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Positions already played in the game, oldest first, excluding the root.
    /// A node whose fingerprint appears twice among these and the positions
    /// above it in the tree scores as a draw.
    pub fn set_history(&mut self, history: &[u64]) {
        self.history.clear();
        self.history.extend_from_slice(history);
    }

    pub fn history(&self) -> &[u64] {
        &self.history
    }

    /// Forget the transposition table and game history
    pub fn clear(&mut self) {
        self.tt.clear();
        self.history.clear();
        self.path.clear();
    }

    /// Search `board` until `max_depth` is reached, a mate is proven or
    /// `time_limit` runs out. Fails with `NoLegalMoves` on checkmate or
    /// stalemate at the root.
    pub fn search(
        &mut self,
        board: &Board,
        time_limit: Option<Duration>,
    ) -> Result<SearchResult> {
        let mut root_moves = self.movegen.legal_moves(board);
        if root_moves.is_empty() {
            return Err(EngineError::NoLegalMoves);
        }

        self.stats.reset();
        self.stats.start_timing();
        self.deadline = time_limit.map(|limit| Instant::now() + limit);
        self.stopped = false;
        self.path.clear();

        let mut best: Option<SearchResult> = None;

        // Iterative deepening
        for depth in 1..=self.params.max_depth {
            self.abortable = depth > 1;

            let Some((best_move, score)) = self.search_root(board, &mut root_moves, depth) else {
                log::debug!(
                    "depth {} interrupted after {} nodes, keeping depth {}",
                    depth,
                    self.stats.nodes,
                    self.stats.completed_depth
                );
                break;
            };

            self.stats.completed_depth = depth;
            self.stats.update_timing();
            log::debug!(
                "depth {} score {} best {} nodes {} time {} ms",
                depth,
                score,
                best_move,
                self.stats.nodes,
                self.stats.search_time.as_millis()
            );
            best = Some(SearchResult {
                best_move,
                score,
                depth,
                nodes: self.stats.nodes,
            });

            // The first mate found by iterative deepening is the shortest
            if score.is_winning_mate() || self.out_of_time() {
                break;
            }
        }

        self.stats.update_timing();
        self.stats.log_summary();

        let mut result = best.ok_or_else(|| {
            EngineError::SearchFault("no search iteration completed".to_string())
        })?;
        result.nodes = self.stats.nodes;
        Ok(result)
    }

    /// One root iteration; `None` when the clock interrupted it
    fn search_root(
        &mut self,
        board: &Board,
        moves: &mut [Move],
        depth: u8,
    ) -> Option<(Move, Score)> {
        let key = board.hash();
        let tt_move = self.tt.probe(key).and_then(|entry| entry.best_move);
        order_moves(board, moves, tt_move);

        let mut alpha = Score::MIN;
        let beta = Score::MAX;
        let mut best: Option<(Move, Score)> = None;

        self.path.push(key);
        for &mv in moves.iter() {
            if self.abortable {
                self.check_clock();
            }
            if self.stopped {
                break;
            }

            let child = board.apply_move(mv);
            let score = -self.negamax(&child, depth - 1, -beta, -alpha, 1);
            if self.stopped {
                break;
            }

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }
        self.path.pop();

        if self.stopped {
            return None;
        }
        let (best_move, score) = best?;
        self.tt
            .store(key, depth, score, 0, NodeType::Exact, Some(best_move));
        self.stats.inc_tt_store();
        Some((best_move, score))
    }

    /// Negamax alpha-beta (fail-soft)
    fn negamax(
        &mut self,
        board: &Board,
        depth: u8,
        mut alpha: Score,
        beta: Score,
        ply: u32,
    ) -> Score {
        self.stats.inc_node();
        self.poll_clock();
        if self.stopped {
            return Score::DRAW;
        }

        let key = board.hash();
        if self.repetitions(key) >= 2 || board.is_insufficient_material() {
            return Score::DRAW;
        }

        // Check transposition table
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(key) {
            self.stats.inc_tt_hit();
            tt_move = entry.best_move;
            if entry.depth >= depth {
                let score = entry.score(ply);
                let usable = match entry.node_type {
                    NodeType::Exact => true,
                    NodeType::LowerBound => score >= beta,
                    NodeType::UpperBound => score <= alpha,
                };
                if usable {
                    return score;
                }
            }
        }

        let mut moves = self.movegen.legal_moves(board);
        if moves.is_empty() {
            return if self.movegen.is_in_check(board) {
                Score::mated_at_ply(ply)
            } else {
                Score::DRAW
            };
        }
        if board.is_fifty_move_draw() {
            return Score::DRAW;
        }

        if depth == 0 {
            return self.quiescence(board, alpha, beta, 0);
        }

        order_moves(board, &mut moves, tt_move);

        let original_alpha = alpha;
        let mut best_score = Score::MIN;
        let mut best_move = moves[0];

        self.path.push(key);
        for mv in moves {
            let child = board.apply_move(mv);
            let score = -self.negamax(&child, depth - 1, -beta, -alpha, ply + 1);
            if self.stopped {
                break;
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                self.stats.inc_cutoff();
                break;
            }
        }
        self.path.pop();

        if self.stopped {
            return Score::DRAW;
        }

        let node_type = if best_score <= original_alpha {
            NodeType::UpperBound
        } else if best_score >= beta {
            NodeType::LowerBound
        } else {
            NodeType::Exact
        };
        self.tt
            .store(key, depth, best_score, ply, node_type, Some(best_move));
        self.stats.inc_tt_store();

        best_score
    }

    /// Captures and promotions only, standing pat on the static evaluation
    fn quiescence(&mut self, board: &Board, mut alpha: Score, beta: Score, qply: u8) -> Score {
        self.stats.inc_qsearch_node();
        self.stats.qsearch_max_ply = self.stats.qsearch_max_ply.max(qply);
        self.poll_clock();
        if self.stopped {
            return Score::DRAW;
        }

        let stand_pat = Score::Material(evaluate(board));
        if qply >= self.params.qsearch_depth || stand_pat >= beta {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut moves = self.movegen.tactical_moves(board);
        order_moves(board, &mut moves, None);

        let mut best = stand_pat;
        for mv in moves {
            let child = board.apply_move(mv);
            let score = -self.quiescence(&child, -beta, -alpha, qply + 1);
            if self.stopped {
                return Score::DRAW;
            }

            if score > best {
                best = score;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                self.stats.inc_cutoff();
                break;
            }
        }
        best
    }

    /// Occurrences of `key` among the game history and the current search path
    fn repetitions(&self, key: u64) -> usize {
        self.history
            .iter()
            .chain(self.path.iter())
            .filter(|&&k| k == key)
            .count()
    }

    #[inline]
    fn poll_clock(&mut self) {
        if self.abortable && self.stats.nodes % self.params.node_check_interval.max(1) == 0 {
            self.check_clock();
        }
    }

    fn check_clock(&mut self) {
        if self.out_of_time() {
            self.stopped = true;
        }
    }

    fn out_of_time(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// TT move first, then captures by most valuable victim and least valuable
/// attacker, promotions by the piece gained, quiet moves last. Stable, so
/// generation order breaks ties.
fn order_moves(board: &Board, moves: &mut [Move], tt_move: Option<Move>) {
    moves.sort_by_key(|&mv| Reverse(move_order_key(board, mv, tt_move)));
}

fn move_order_key(board: &Board, mv: Move, tt_move: Option<Move>) -> i32 {
    if Some(mv) == tt_move {
        return i32::MAX;
    }
    let mut key = 0;
    if let Some(victim) = board.captured_piece(mv) {
        let attacker = board.moving_piece(mv).map_or(0, |kind| kind as i32);
        key += 1_000_000 + piece_value(victim) * 16 - attacker;
    }
    if let Some(promo) = mv.promotion() {
        key += piece_value(promo);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::START_FEN;

    fn search_with_depth(depth: u8) -> Search {
        Search::new(SearchParams::new().max_depth(depth).tt_size(1 << 16))
    }

    #[test]
    fn test_finds_back_rank_mate() {
        let board = Board::from_fen("6k1/5ppp/8/8/8/8/8/4R1K1 w - - 0 1").unwrap();
        let result = search_with_depth(4).search(&board, None).unwrap();
        assert_eq!(result.best_move.to_uci(), "e1e8");
        assert_eq!(result.score, Score::Mate(1));
        assert_eq!(result.depth, 1, "a proven mate ends the iteration loop");
    }

    #[test]
    fn test_no_legal_moves_is_an_error() {
        let mated = Board::from_fen("4R1k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        let err = search_with_depth(3).search(&mated, None).unwrap_err();
        assert!(matches!(err, EngineError::NoLegalMoves));
    }

    #[test]
    fn test_captures_hanging_queen() {
        let board = Board::from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
        let result = search_with_depth(3).search(&board, None).unwrap();
        assert_eq!(result.best_move.to_uci(), "d2d5");
        assert!(result.score > Score::Material(300));
    }

    #[test]
    fn test_tt_is_populated() {
        let board = Board::from_fen(START_FEN).unwrap();
        let mut search = search_with_depth(3);
        let result = search.search(&board, None).unwrap();
        assert_eq!(result.depth, 3);
        assert!(search.stats().tt_stores > 0);
        let root = search.tt().probe(board.hash()).expect("root entry");
        assert_eq!(root.best_move, Some(result.best_move));
    }

    #[test]
    fn test_repetition_scores_as_draw() {
        // White is a queen down; walking back to h1 repeats a position seen twice
        let board = Board::from_fen("k7/8/8/q7/8/8/8/6K1 w - - 0 1").unwrap();
        let seen = Board::from_fen("k7/8/8/q7/8/8/8/7K b - - 1 1").unwrap();
        let mut search = search_with_depth(3);
        search.set_history(&[seen.hash(), seen.hash()]);
        let result = search.search(&board, None).unwrap();
        assert_eq!(result.best_move.to_uci(), "g1h1");
        assert_eq!(result.score, Score::DRAW);
    }

    #[test]
    fn test_tiny_budget_still_returns_a_move() {
        let board = Board::from_fen(START_FEN).unwrap();
        let mut search = Search::new(SearchParams::new().tt_size(1 << 16));
        let result = search.search(&board, Some(Duration::from_millis(1))).unwrap();
        assert!(result.depth >= 1);
        assert!(board.legal_moves().contains(&result.best_move));
    }

    #[test]
    fn test_zero_qsearch_depth_stands_pat() {
        let board = Board::from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
        let mut search = Search::new(SearchParams::new().max_depth(1).qsearch_depth(0));
        search.search(&board, None).unwrap();
        // one static evaluation per root move, no capture followed
        assert_eq!(search.stats().qsearch_nodes, board.legal_moves().len() as u64);
        assert_eq!(search.stats().qsearch_max_ply, 0);
    }

    #[test]
    fn test_capture_chain_stops_at_qsearch_depth() {
        // four recaptures are available on d6 after Qxd6
        let board = Board::from_fen("3r3k/3r4/3q4/8/8/3Q4/3R4/3RK3 w - - 0 1").unwrap();
        let params = SearchParams::new().max_depth(1).tt_size(1 << 16);

        let mut capped = Search::new(params.clone().qsearch_depth(2));
        capped.search(&board, None).unwrap();
        assert_eq!(capped.stats().qsearch_max_ply, 2);

        let mut deep = Search::new(params.clone().qsearch_depth(8));
        deep.search(&board, None).unwrap();
        assert!(deep.stats().qsearch_max_ply >= 3);
        assert!(deep.stats().qsearch_nodes > capped.stats().qsearch_nodes);

        let mut flat = Search::new(params.qsearch_depth(0));
        flat.search(&board, None).unwrap();
        assert_eq!(flat.stats().qsearch_nodes, board.legal_moves().len() as u64);
    }

    #[test]
    fn test_interrupted_iteration_is_discarded() {
        let board = Board::from_fen(crate::board::KIWIPETE_FEN).unwrap();
        let mut timed = Search::new(SearchParams::new().tt_size(1 << 16));
        let result = timed.search(&board, Some(Duration::from_millis(20))).unwrap();
        assert_eq!(result.depth, timed.stats().completed_depth);
        assert!(result.depth < 64);

        // the reported move is exactly what a full search to that depth returns
        let mut fixed = search_with_depth(result.depth);
        let full = fixed.search(&board, None).unwrap();
        assert_eq!(full.depth, result.depth);
        assert_eq!(full.best_move, result.best_move);
        assert_eq!(full.score, result.score);
    }

    #[test]
    fn test_zero_node_check_interval_is_polled_every_node() {
        let board = Board::from_fen(START_FEN).unwrap();
        let params = SearchParams {
            node_check_interval: 0,
            ..SearchParams::new().tt_size(1 << 16)
        };
        let mut search = Search::new(params);
        let result = search.search(&board, Some(Duration::from_millis(30))).unwrap();
        assert!(result.depth >= 1);
        assert!(board.legal_moves().contains(&result.best_move));
    }

    #[test]
    fn test_mvv_lva_ordering() {
        // pawn and queen can both take the rook; the cheaper attacker goes first
        let board = Board::from_fen("4k3/8/8/2r1n3/1P6/8/8/2Q1K3 w - - 0 1").unwrap();
        let mut moves = board.legal_moves();
        order_moves(&board, &mut moves, None);
        let first: Vec<String> = moves.iter().take(2).map(|m| m.to_uci()).collect();
        assert_eq!(first, vec!["b4c5", "c1c5"]);
    }
}
