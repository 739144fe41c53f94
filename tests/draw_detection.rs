use scacchiera::board::Board;
use scacchiera::search::{Score, Search, SearchParams};
use scacchiera::{Engine, EngineConfig};

fn play(board: &Board, moves: &[&str]) -> Vec<Board> {
    let mut line = vec![*board];
    for text in moves {
        let last = line[line.len() - 1];
        let mv = last.parse_move(text).unwrap_or_else(|_| panic!("Move {text} not legal"));
        line.push(last.apply_move(mv));
    }
    line
}

#[test]
fn test_threefold_repetition_simple() {
    // 1. Nf3 Nf6 2. Ng1 Ng8 3. Nf3 Nf6 4. Ng1 Ng8 brings the start position back twice
    let start = Board::start_position();
    let line = play(
        &start,
        &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"],
    );
    let repeats = line.iter().filter(|b| b.hash() == start.hash()).count();
    assert_eq!(repeats, 3);
    // clocks differ, the fingerprint does not
    assert_ne!(line[8], start);
}

#[test]
fn test_engine_steers_into_repetition_when_lost() {
    // a queen down, white is happy to repeat
    let board = Board::from_fen("k7/8/8/q7/8/8/8/6K1 w - - 0 1").unwrap();
    let repeated = Board::from_fen("k7/8/8/q7/8/8/8/7K b - - 1 1").unwrap();

    let config = EngineConfig {
        search: SearchParams::new().max_depth(3).tt_size(1 << 14),
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(config);
    // game order, including the position about to be searched
    for position in [&repeated, &board, &repeated, &board] {
        engine.record_position(position);
    }

    let mv = engine.compute_best_move(&board, 60_000).unwrap();
    assert_eq!(mv.to_uci(), "g1h1");
    assert_eq!(engine.last_result().map(|r| r.score), Some(Score::DRAW));
}

#[test]
fn test_50_move_rule() {
    let fresh = Board::from_fen("8/8/8/8/8/8/1R6/k6K w - - 0 1").unwrap();
    let stale = Board::from_fen("8/8/8/8/8/8/1R6/k6K w - - 99 1").unwrap();
    assert!(!stale.is_fifty_move_draw(), "99 halfmoves is not yet draw");

    let after = stale.apply_move(stale.parse_move("b2b3").unwrap());
    assert!(after.is_fifty_move_draw(), "100 halfmoves should be draw (50 move rule)");

    let mut search = Search::new(SearchParams::new().max_depth(3).tt_size(1 << 14));
    assert!(search.search(&fresh, None).unwrap().score > Score::Material(300));

    let mut search = Search::new(SearchParams::new().max_depth(3).tt_size(1 << 14));
    assert_eq!(search.search(&stale, None).unwrap().score, Score::DRAW);
}

#[test]
fn test_insufficient_material() {
    let draws = [
        "8/8/8/8/8/8/8/k6K w - - 0 1",
        "8/8/8/8/8/8/5N2/k6K w - - 0 1",
        "8/8/8/8/8/8/5B2/k6K w - - 0 1",
        "8/8/8/8/8/4b3/5B2/k6K w - - 0 1",
    ];
    for fen in draws {
        let board = Board::from_fen(fen).unwrap();
        assert!(board.is_insufficient_material(), "{fen}");
    }

    let opposite = Board::from_fen("8/8/8/8/8/5b2/5B2/k6K w - - 0 1").unwrap();
    assert!(
        !opposite.is_insufficient_material(),
        "KB vs KB on opposite colours is not insufficient material"
    );

    // every reply keeps a lone knight, so the search sees nothing but draws
    let board = Board::from_fen("8/8/8/8/8/8/5N2/k6K w - - 0 1").unwrap();
    let mut search = Search::new(SearchParams::new().max_depth(3).tt_size(1 << 14));
    assert_eq!(search.search(&board, None).unwrap().score, Score::DRAW);
}
