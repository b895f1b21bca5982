use fixed::types::U64F64;
use serde::Serialize;
use uuid::Uuid;

use super::{GameError, GameKind, GameStateSnapshot, Percent, Price, Screen, StatsLedger, Tier};
use crate::game::settings::{CustomSettings, Settings};

/// Misses beyond this many percent are "way" off.
pub const FAR_OFF_PERCENT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    TooHigh,
    TooLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hint {
    pub direction: Direction,
    pub far: bool,
}

impl Hint {
    /// `guess_cents` is the unrounded guess in cents.
    pub fn for_guess(guess_cents: U64F64, true_total: Price, percent_diff: Percent) -> Self {
        Self {
            direction: if guess_cents > U64F64::from_num(true_total.cents()) {
                Direction::TooHigh
            } else {
                Direction::TooLow
            },
            far: percent_diff > Percent::from_num(FAR_OFF_PERCENT),
        }
    }

    pub fn message(&self) -> &'static str {
        match (self.direction, self.far) {
            (Direction::TooHigh, true) => "Way too high! Try a much lower price.",
            (Direction::TooHigh, false) => "Too high! Lower your guess.",
            (Direction::TooLow, true) => "Way too low! Try a much higher price.",
            (Direction::TooLow, false) => "Too low! Raise your guess.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GuessOutcome {
    Hint {
        hint: Hint,
        attempts_remaining: u32,
    },
    Won {
        attempts_used: u32,
        true_total: Price,
    },
    Lost {
        true_total: Price,
    },
}

/// Matching all pairs in under this many seconds is a perfect run.
pub const PERFECT_PAIR_SECS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairResult {
    pub elapsed_secs: u64,
    /// Cosmetic only; it changes nothing but the celebration.
    pub is_perfect: bool,
}

/// What a click on an item or price card did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PairInput {
    /// The card was already matched for good.
    Ignored,
    /// One side is selected, waiting for the other.
    Pending,
    Matched {
        item: usize,
        matches_confirmed: usize,
    },
    Rejected {
        item: usize,
        price: usize,
    },
    Completed(PairResult),
    /// Blind mode: the pair was recorded without revealing correctness.
    Paired {
        item: usize,
        price: usize,
        mapped: usize,
        total: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CheckReport {
    pub correct: usize,
    pub wrong: usize,
    pub unmatched: usize,
}

impl CheckReport {
    pub fn mapped(&self) -> usize {
        self.correct + self.wrong
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlindResult {
    pub report: CheckReport,
    pub final_score: u32,
    pub perfect: bool,
    pub timed_out: bool,
    pub elapsed_secs: u64,
    pub remaining_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlindCheck {
    /// Some pairs are wrong; the round goes on and the player may revise.
    Revise(CheckReport),
    Cleared(BlindResult),
    /// The deadline had already passed when the check arrived.
    TimedOut(BlindResult),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameOutcome {
    BundleWon {
        session_id: Uuid,
        attempts_used: u32,
        true_total: Price,
    },
    BundleLost {
        session_id: Uuid,
        true_total: Price,
    },
    PairWon {
        session_id: Uuid,
        result: PairResult,
    },
    Blind {
        session_id: Uuid,
        result: BlindResult,
    },
}

impl GameOutcome {
    pub fn is_win(&self) -> bool {
        match self {
            GameOutcome::BundleWon { .. } | GameOutcome::PairWon { .. } => true,
            GameOutcome::BundleLost { .. } => false,
            GameOutcome::Blind { result, .. } => result.perfect,
        }
    }
}

#[derive(Debug, Clone)]
pub enum GameEngineEvent {
    ScreenChanged(Screen),
    GameStarted {
        kind: GameKind,
        tier: Tier,
        session_id: Uuid,
    },
    SessionUpdated(GameStateSnapshot),
    SessionCleared,
    GuessScored(GuessOutcome),
    PairInputHandled(PairInput),
    BlindChecked(CheckReport),
    TimerTicked {
        elapsed_secs: u64,
        remaining_secs: Option<u64>,
    },
    GameCompleted(GameOutcome),
    StatsChanged(StatsLedger),
    SettingsChanged(Settings),
    CustomSettingsChanged(CustomSettings),
    ActionRejected(GameError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_boundaries() {
        let total = Price::from_cents(1000);
        let exactly_twenty = Price::from_cents(1200);
        let hint = Hint::for_guess(
            U64F64::from_num(exactly_twenty.cents()),
            total,
            exactly_twenty.percent_diff(total),
        );
        assert_eq!(hint.direction, Direction::TooHigh);
        assert!(!hint.far);

        let just_over = Price::from_cents(799);
        let hint = Hint::for_guess(
            U64F64::from_num(just_over.cents()),
            total,
            just_over.percent_diff(total),
        );
        assert_eq!(hint.direction, Direction::TooLow);
        assert!(hint.far);
        assert_eq!(hint.message(), "Way too low! Try a much higher price.");
    }
}
