//! Engine facade: book first, then a time-budgeted search
//!
//! This is the surface the game transport talks to. It owns the opening
//! book, the search (and with it the transposition table) and the list of
//! positions already played, which feeds repetition detection.

use std::path::PathBuf;
use std::time::Duration;

use crate::board::{Board, Move};
use crate::book::OpeningBook;
use crate::error::{EngineError, Result};
use crate::eval::game_phase;
use crate::search::{Search, SearchParams, SearchResult, TimeManagement};
use crate::time::TimeManager;

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Polyglot book to consult before searching
    pub book_path: Option<PathBuf>,
    pub search: SearchParams,
    pub time: TimeManagement,
}

/// How a game ended, from the engine's side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Won,
    Lost,
    Drawn,
    Aborted,
}

/// Callbacks a game session delivers to a player
pub trait GameHandler {
    fn on_game_start(&mut self, increment_ms: u64);

    /// Choose a move in `board` with `remaining_ms` left on our clock
    fn on_move_request(&mut self, board: &Board, remaining_ms: u64) -> Result<Move>;

    fn on_game_over(&mut self, outcome: GameOutcome);

    fn on_error(&mut self, error: &EngineError);
}

pub struct Engine {
    config: EngineConfig,
    book: OpeningBook,
    search: Search,
    increment_ms: u64,
    /// Fingerprints of the positions seen in the current game, oldest first
    history: Vec<u64>,
    last_result: Option<SearchResult>,
}

impl Engine {
    /// Build an engine, loading the configured book if there is one
    pub fn new(config: EngineConfig) -> Self {
        let book = OpeningBook::load_or_empty(config.book_path.as_deref());
        Self::with_book(config, book)
    }

    pub fn with_book(config: EngineConfig, book: OpeningBook) -> Self {
        Self {
            search: Search::new(config.search.clone()),
            config,
            book,
            increment_ms: 0,
            history: Vec::new(),
            last_result: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Result of the most recent search, `None` after a book move or a fallback
    pub fn last_result(&self) -> Option<&SearchResult> {
        self.last_result.as_ref()
    }

    /// Start of a new game with `increment_ms` added per move
    pub fn notify_game_start(&mut self, increment_ms: u64) {
        self.increment_ms = increment_ms;
        self.reset_search_state();
    }

    /// Drop everything learned in the previous game
    pub fn reset_search_state(&mut self) {
        self.search.clear();
        self.history.clear();
        self.last_result = None;
    }

    /// Note a position reached in the game that did not pass through
    /// `compute_best_move`, e.g. after the opponent's move. Recording the
    /// position about to be searched is harmless: the root is never counted
    /// as its own history.
    pub fn record_position(&mut self, board: &Board) {
        self.history.push(board.hash());
    }

    /// Pick a move for the side to move in `board`.
    ///
    /// Book moves are played without searching. Otherwise the search gets
    /// a budget from the remaining clock; should it fail or return a move
    /// that is not legal here, the first legal move is played instead. Only
    /// a position without legal moves is an error.
    pub fn compute_best_move(&mut self, board: &Board, remaining_ms: u64) -> Result<Move> {
        let legal = board.legal_moves();
        let Some(&fallback) = legal.first() else {
            return Err(EngineError::NoLegalMoves);
        };
        self.last_result = None;

        // consecutive game positions always differ, so a matching last entry is this root
        if self.history.last() == Some(&board.hash()) {
            self.history.pop();
        }

        if let Some(mv) = self.book.lookup(board) {
            log::info!("book move {mv}");
            self.remember(board, mv);
            return Ok(mv);
        }

        let budget_ms = TimeManager::allocate_time(
            &self.config.time,
            remaining_ms,
            self.increment_ms,
            game_phase(board),
        );
        log::debug!("{remaining_ms} ms left, budget {budget_ms} ms");

        self.search.set_history(&self.history);
        let mv = match self.search.search(board, Some(Duration::from_millis(budget_ms))) {
            Ok(result) if legal.contains(&result.best_move) => {
                self.last_result = Some(result);
                result.best_move
            }
            Ok(result) => {
                log::error!(
                    "search chose illegal move {}; playing {fallback}",
                    result.best_move
                );
                fallback
            }
            Err(EngineError::NoLegalMoves) => return Err(EngineError::NoLegalMoves),
            Err(e) => {
                log::error!("{e}; playing {fallback}");
                fallback
            }
        };

        self.remember(board, mv);
        Ok(mv)
    }

    fn remember(&mut self, board: &Board, mv: Move) {
        self.history.push(board.hash());
        self.history.push(board.apply_move(mv).hash());
    }
}

impl GameHandler for Engine {
    fn on_game_start(&mut self, increment_ms: u64) {
        log::info!("game started, increment {increment_ms} ms");
        self.notify_game_start(increment_ms);
    }

    fn on_move_request(&mut self, board: &Board, remaining_ms: u64) -> Result<Move> {
        self.compute_best_move(board, remaining_ms)
    }

    fn on_game_over(&mut self, outcome: GameOutcome) {
        log::info!("game over: {outcome:?}");
        self.reset_search_state();
    }

    fn on_error(&mut self, error: &EngineError) {
        log::error!("game error: {error}");
    }
}
