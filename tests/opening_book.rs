use std::fs;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use scacchiera::board::Board;
use scacchiera::book::{polyglot_key, OpeningBook};
use scacchiera::{Engine, EngineConfig, SearchParams};

// Polyglot packing: to-file, to-rank, from-file, from-rank, promotion (3 bits each)
fn packed(from: &str, to: &str) -> u16 {
    let sq = |s: &str| {
        let b = s.as_bytes();
        (u16::from(b[0] - b'a'), u16::from(b[1] - b'1'))
    };
    let (ff, fr) = sq(from);
    let (tf, tr) = sq(to);
    (fr << 9) | (ff << 6) | (tr << 3) | tf
}

fn write_book(name: &str, records: &[(u64, u16, u16)]) -> PathBuf {
    let mut bytes = Vec::new();
    for &(key, mv, weight) in records {
        bytes.extend_from_slice(&key.to_be_bytes());
        bytes.extend_from_slice(&mv.to_be_bytes());
        bytes.extend_from_slice(&weight.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
    }
    let path = std::env::temp_dir().join(format!("scacchiera-{}-{name}.bin", std::process::id()));
    fs::write(&path, bytes).expect("write temp book");
    path
}

#[test]
fn engine_plays_from_book_file() {
    let start = Board::start_position();
    let key = polyglot_key(&start).unwrap();
    let path = write_book("single", &[(key, packed("d2", "d4"), 10)]);

    let mut engine = Engine::new(EngineConfig {
        book_path: Some(path.clone()),
        ..EngineConfig::default()
    });
    let mv = engine.compute_best_move(&start, 60_000).unwrap();
    assert_eq!(mv.to_uci(), "d2d4");
    fs::remove_file(path).ok();
}

#[test]
fn book_follows_a_line() {
    let start = Board::start_position();
    let after_e4 = start.apply_move(start.parse_move("e2e4").unwrap());
    let after_e5 = after_e4.apply_move(after_e4.parse_move("e7e5").unwrap());

    let path = write_book(
        "line",
        &[
            (polyglot_key(&after_e5).unwrap(), packed("g1", "f3"), 1),
            (polyglot_key(&start).unwrap(), packed("e2", "e4"), 1),
            (polyglot_key(&after_e4).unwrap(), packed("e7", "e5"), 1),
        ],
    );
    let book = OpeningBook::load(&path).unwrap();
    assert_eq!(book.len(), 3);
    assert_eq!(book.lookup(&start).unwrap().to_uci(), "e2e4");
    assert_eq!(book.lookup(&after_e4).unwrap().to_uci(), "e7e5");
    assert_eq!(book.lookup(&after_e5).unwrap().to_uci(), "g1f3");
    fs::remove_file(path).ok();
}

#[test]
fn book_weighting_one_to_three() {
    let start = Board::start_position();
    let key = polyglot_key(&start).unwrap();
    let path = write_book("weights", &[(key, packed("e2", "e4"), 1), (key, packed("d2", "d4"), 3)]);
    let book = OpeningBook::load(&path).unwrap();

    let mut rng = StdRng::seed_from_u64(2024);
    let d4 = (0..10_000)
        .filter(|_| book.lookup_with(&start, &mut rng).unwrap().to_uci() == "d2d4")
        .count();
    assert!((7_250..=7_750).contains(&d4), "d2d4 chosen {d4} times");
    fs::remove_file(path).ok();
}

#[test]
fn missing_book_means_searching() {
    let mut engine = Engine::new(EngineConfig {
        book_path: Some(PathBuf::from("/nonexistent/scacchiera/book.bin")),
        search: SearchParams::new().max_depth(2).tt_size(1 << 12),
        ..EngineConfig::default()
    });
    let start = Board::start_position();
    let mv = engine.compute_best_move(&start, 10_000).unwrap();
    assert!(start.legal_moves().contains(&mv));
    assert!(engine.last_result().is_some(), "the move came from a search");
}

#[test]
fn truncated_book_is_ignored() {
    let start = Board::start_position();
    let path = write_book("truncated", &[(polyglot_key(&start).unwrap(), packed("e2", "e4"), 1)]);
    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(10);
    fs::write(&path, bytes).unwrap();

    assert!(OpeningBook::load(&path).is_err());
    assert!(OpeningBook::load_or_empty(Some(&path)).is_empty());
    fs::remove_file(path).ok();
}
