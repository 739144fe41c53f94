use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scacchiera::board::{Board, KIWIPETE_FEN, START_FEN};
use scacchiera::zobrist;

const FENS: &[&str] = &[
    START_FEN,
    KIWIPETE_FEN,
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
    "8/8/8/8/8/8/8/k6K b - - 57 90",
];

#[test]
fn fixed_positions_round_trip() {
    for fen in FENS {
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(&board.to_fen(), fen);
        assert_eq!(Board::from_fen(&board.to_fen()).unwrap(), board);
    }
}

#[test]
fn random_games_round_trip() {
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::start_position();
        for _ in 0..80 {
            let reparsed = Board::from_fen(&board.to_fen()).unwrap();
            assert_eq!(reparsed, board, "round trip failed for {}", board.to_fen());
            assert_eq!(board.hash(), zobrist::hash(&board), "stale hash in {}", board.to_fen());

            let moves = board.legal_moves();
            if moves.is_empty() {
                break;
            }
            board = board.apply_move(moves[rng.gen_range(0..moves.len())]);
        }
    }
}

#[test]
fn move_text_round_trips() {
    let board = Board::from_fen(KIWIPETE_FEN).unwrap();
    for mv in board.legal_moves() {
        assert_eq!(board.parse_move(&mv.to_uci()).unwrap(), mv);
    }
    assert!(board.parse_move("e1e3").is_err());
    assert!(board.parse_move("zz").is_err());
}
