//! Time management: turning the remaining clock into a per-move budget

use crate::eval::GamePhase;
use crate::search::params::TimeManagement as TM;

pub struct TimeManager;

impl TimeManager {
    /// Milliseconds to spend on the next move.
    ///
    /// `remaining / moves_left + increment`, kept between the minimum budget
    /// and the maximum share of the clock, scaled by game phase, and cut back
    /// hard once the clock runs low. Never more than `max_fraction_pct` of
    /// what remains and never less than 1 ms.
    pub fn allocate_time(
        time_mgmt: &TM,
        remaining_ms: u64,
        increment_ms: u64,
        phase: GamePhase,
    ) -> u64 {
        let cap = (remaining_ms.saturating_mul(time_mgmt.max_fraction_pct) / 100).max(1);
        if remaining_ms < time_mgmt.min_budget_ms {
            return cap;
        }

        let moves_left = expected_moves_left(time_mgmt.default_moves_left, phase);
        let base = (remaining_ms / moves_left).saturating_add(increment_ms);
        let mut budget = base.clamp(time_mgmt.min_budget_ms.min(cap), cap);

        budget = budget.saturating_mul(phase_multiplier_pct(phase)) / 100;

        if remaining_ms < time_mgmt.panic_threshold_ms {
            budget = (budget / 2).min(remaining_ms / 10);
        }

        budget.clamp(1, cap)
    }
}

fn expected_moves_left(default_moves_left: u64, phase: GamePhase) -> u64 {
    let moves = match phase {
        GamePhase::Opening => default_moves_left + 10,
        GamePhase::Middlegame => default_moves_left,
        GamePhase::Endgame => default_moves_left * 2 / 3,
    };
    moves.max(1)
}

// Percent: spend less on book-like openings, most on the middlegame
fn phase_multiplier_pct(phase: GamePhase) -> u64 {
    match phase {
        GamePhase::Opening => 80,
        GamePhase::Middlegame => 120,
        GamePhase::Endgame => 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(remaining: u64, inc: u64, phase: GamePhase) -> u64 {
        TimeManager::allocate_time(&TM::default(), remaining, inc, phase)
    }

    #[test]
    fn test_phase_scaling() {
        assert_eq!(budget(60_000, 0, GamePhase::Opening), 1_200);
        assert_eq!(budget(60_000, 0, GamePhase::Middlegame), 2_400);
        assert_eq!(budget(60_000, 0, GamePhase::Endgame), 3_000);
    }

    #[test]
    fn test_increment_is_added() {
        assert_eq!(budget(60_000, 1_000, GamePhase::Endgame), 4_000);
    }

    #[test]
    fn test_low_clock_is_cut_back() {
        // 5000/30 = 166, x1.2 = 199, halved = 99 (under the 10% cap of 500)
        assert_eq!(budget(5_000, 0, GamePhase::Middlegame), 99);
        // a huge increment cannot break the 10% cap
        assert_eq!(budget(1_000, 5_000, GamePhase::Middlegame), 100);
    }

    #[test]
    fn test_almost_flagged() {
        assert_eq!(budget(30, 0, GamePhase::Middlegame), 12);
        assert_eq!(budget(1, 0, GamePhase::Endgame), 1);
        assert_eq!(budget(0, 0, GamePhase::Opening), 1);
    }
}
