//! Search engine: scores, transposition table, parameters and the
//! iterative-deepening alpha-beta core

pub mod params;
pub mod score;
pub mod search;
pub mod stats;
pub mod tt;

pub use self::params::{SearchParams, TimeManagement};
pub use self::score::Score;
pub use self::search::{Search, SearchResult};
pub use self::stats::SearchStats;
pub use self::tt::{NodeType, TranspositionTable};
