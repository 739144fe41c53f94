use scacchiera::board::{Board, START_FEN};
use scacchiera::eval::{game_phase, GamePhase};
use scacchiera::search::params::TimeManagement;
use scacchiera::time::TimeManager;

const PHASES: [GamePhase; 3] = [GamePhase::Opening, GamePhase::Middlegame, GamePhase::Endgame];

#[test]
fn test_allocate_normal() {
    let tm = TimeManagement::new();
    // 60s left, no increment, middlegame
    let time = TimeManager::allocate_time(&tm, 60_000, 0, GamePhase::Middlegame);
    assert!(time > 1000 && time < 5000, "Allocated {} ms for 60s remaining", time);
}

#[test]
fn test_allocate_increment() {
    let tm = TimeManagement::new();
    let without = TimeManager::allocate_time(&tm, 30_000, 0, GamePhase::Middlegame);
    let with = TimeManager::allocate_time(&tm, 30_000, 1_000, GamePhase::Middlegame);
    assert!(with > without, "increment should buy time: {with} vs {without}");
}

#[test]
fn test_budget_never_exceeds_share_of_clock() {
    let tm = TimeManagement::new();
    for remaining in [0, 1, 7, 49, 50, 51, 999, 9_999, 10_000, 60_000, 3_600_000] {
        for inc in [0, 100, 2_000, 60_000] {
            for phase in PHASES {
                let time = TimeManager::allocate_time(&tm, remaining, inc, phase);
                assert!(time >= 1, "zero budget at {remaining} ms");
                assert!(
                    time <= (remaining * 40 / 100).max(1),
                    "{time} ms is more than 40% of {remaining} ms ({phase:?}, +{inc})"
                );
            }
        }
    }
}

#[test]
fn test_more_clock_never_means_less_time() {
    let tm = TimeManagement::new();
    for phase in PHASES {
        let mut previous = 0;
        for remaining in (10_000..=600_000).step_by(10_000) {
            let time = TimeManager::allocate_time(&tm, remaining, 0, phase);
            assert!(time >= previous, "{phase:?}: {remaining} ms gives {time} < {previous}");
            previous = time;
        }
    }
}

#[test]
fn test_middlegame_gets_the_most() {
    let tm = TimeManagement::new();
    let opening = TimeManager::allocate_time(&tm, 120_000, 0, GamePhase::Opening);
    let middlegame = TimeManager::allocate_time(&tm, 120_000, 0, GamePhase::Middlegame);
    assert!(middlegame > opening);
}

#[test]
fn test_custom_knobs() {
    let tm = TimeManagement {
        default_moves_left: 10,
        ..TimeManagement::new()
    };
    // 60000 / 10 = 6000, x1.2 = 7200
    assert_eq!(TimeManager::allocate_time(&tm, 60_000, 0, GamePhase::Middlegame), 7_200);
}

#[test]
fn test_phase_follows_material() {
    assert_eq!(game_phase(&Board::from_fen(START_FEN).unwrap()), GamePhase::Opening);
    let middlegame = Board::from_fen("r2q1rk1/pp3ppp/8/8/8/8/PP3PPP/R2Q1RK1 w - - 0 1").unwrap();
    assert_eq!(game_phase(&middlegame), GamePhase::Middlegame);
    let endgame = Board::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
    assert_eq!(game_phase(&endgame), GamePhase::Endgame);
}
