use std::time::{Duration, SystemTime};

use serde_with::serde_as;
use serde_with::TimestampSeconds;

/// Wall-clock bookkeeping for a timed session. Pure: every query takes `now`,
/// so redraw cadence stays a presentation concern.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimerState {
    #[serde_as(as = "TimestampSeconds")]
    pub started_timestamp: SystemTime,
    #[serde_as(as = "Option<TimestampSeconds>")]
    pub ended_timestamp: Option<SystemTime>,
}

impl TimerState {
    pub fn started(now: SystemTime) -> Self {
        Self {
            started_timestamp: now,
            ended_timestamp: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.ended_timestamp.is_none()
    }

    pub fn elapsed(&self, now: SystemTime) -> Duration {
        let until_time = self.ended_timestamp.unwrap_or(now);
        until_time
            .duration_since(self.started_timestamp)
            .unwrap_or(Duration::default())
    }

    /// Whole seconds, truncated.
    pub fn elapsed_secs(&self, now: SystemTime) -> u64 {
        self.elapsed(now).as_secs()
    }

    /// Stopping twice keeps the first end time.
    pub fn ended(&self, now: SystemTime) -> TimerState {
        let mut new_state = self.clone();
        if new_state.ended_timestamp.is_none() {
            new_state.ended_timestamp = Some(now);
        }
        new_state
    }
}

/// A timer with a deadline, used by blind matching.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Countdown {
    pub timer: TimerState,
    pub limit_secs: u64,
}

impl Countdown {
    pub fn started(now: SystemTime, limit_secs: u64) -> Self {
        Self {
            timer: TimerState::started(now),
            limit_secs,
        }
    }

    pub fn remaining_secs(&self, now: SystemTime) -> u64 {
        self.limit_secs
            .saturating_sub(self.timer.elapsed_secs(now))
    }

    pub fn deadline(&self) -> SystemTime {
        self.timer.started_timestamp + Duration::from_secs(self.limit_secs)
    }

    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.timer.elapsed_secs(now) >= self.limit_secs
    }

    pub fn ended(&self, now: SystemTime) -> Countdown {
        Countdown {
            timer: self.timer.ended(now),
            limit_secs: self.limit_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_running() {
        let now = SystemTime::now();
        let timer = TimerState::started(now - Duration::from_secs(5));
        assert_eq!(timer.elapsed_secs(now), 5);
        assert!(timer.is_running());
    }

    #[test]
    fn test_elapsed_with_end() {
        let now = SystemTime::now();
        let timer = TimerState::started(now).ended(now + Duration::from_secs(10));

        assert_eq!(timer.elapsed(now + Duration::from_secs(60)), Duration::from_secs(10));
        assert!(!timer.is_running());
    }

    #[test]
    fn test_ended_keeps_first_end() {
        let now = SystemTime::now();
        let timer = TimerState::started(now)
            .ended(now + Duration::from_secs(3))
            .ended(now + Duration::from_secs(9));
        assert_eq!(timer.elapsed_secs(now + Duration::from_secs(20)), 3);
    }

    #[test]
    fn test_elapsed_before_start_is_zero() {
        let now = SystemTime::now();
        let timer = TimerState::started(now);
        assert_eq!(timer.elapsed(now - Duration::from_secs(4)), Duration::ZERO);
    }

    #[test]
    fn test_countdown_truncates_partial_seconds() {
        let now = SystemTime::now();
        let countdown = Countdown::started(now, 120);
        assert_eq!(countdown.remaining_secs(now + Duration::from_millis(100_900)), 20);
        assert!(!countdown.is_expired(now + Duration::from_millis(119_999)));
        assert!(countdown.is_expired(now + Duration::from_secs(120)));
        assert_eq!(countdown.remaining_secs(now + Duration::from_secs(500)), 0);
        assert_eq!(countdown.deadline(), now + Duration::from_secs(120));
    }
}
