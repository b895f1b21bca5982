use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GameMode;

/// Aggregates for one game mode. `best` is the fewest guesses for the bundle
/// game and the fastest time in seconds for the pair game; `total` is the
/// matching running sum (guesses or seconds).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeStats {
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub best: Option<u64>,
    #[serde(default)]
    pub total: u64,
}

impl ModeStats {
    /// `metric` is `None` for wins that carry no comparable measurement
    /// (a blind round that ran out the clock with every pair right).
    pub fn record_win(&mut self, metric: Option<u64>) {
        self.games_played += 1;
        self.wins += 1;
        self.current_streak += 1;
        self.best_streak = self.best_streak.max(self.current_streak);
        if let Some(metric) = metric {
            self.total += metric;
            if self.best.map_or(true, |best| metric < best) {
                self.best = Some(metric);
            }
        }
    }

    pub fn record_loss(&mut self, accumulated: u64) {
        self.games_played += 1;
        self.losses += 1;
        self.current_streak = 0;
        self.total += accumulated;
    }

    /// Rounded percentage of games won, `None` before the first game.
    pub fn win_rate(&self) -> Option<u32> {
        if self.games_played == 0 {
            return None;
        }
        Some(((self.wins as f64 / self.games_played as f64) * 100.0).round() as u32)
    }

    /// Rounded mean of `total` over the games it was accumulated from.
    pub fn average(&self, over: u32) -> Option<u64> {
        if over == 0 || self.total == 0 {
            return None;
        }
        Some(((self.total as f64) / over as f64).round() as u64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsLedger {
    #[serde(default)]
    pub bundle: ModeStats,
    #[serde(default)]
    pub pair: ModeStats,
    #[serde(default)]
    pub overall_games: u32,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
}

impl StatsLedger {
    pub fn mode(&self, mode: GameMode) -> &ModeStats {
        match mode {
            GameMode::Bundle => &self.bundle,
            GameMode::Pair => &self.pair,
        }
    }

    fn mode_mut(&mut self, mode: GameMode) -> &mut ModeStats {
        match mode {
            GameMode::Bundle => &mut self.bundle,
            GameMode::Pair => &mut self.pair,
        }
    }

    pub fn record_win(&mut self, mode: GameMode, metric: Option<u64>, at: DateTime<Utc>) {
        self.mode_mut(mode).record_win(metric);
        self.overall_games += 1;
        self.last_played = Some(at);
    }

    pub fn record_loss(&mut self, mode: GameMode, accumulated: u64, at: DateTime<Utc>) {
        self.mode_mut(mode).record_loss(accumulated);
        self.overall_games += 1;
        self.last_played = Some(at);
    }

    /// Mean seconds per pair-game win.
    pub fn average_pair_time(&self) -> Option<u64> {
        self.pair.average(self.pair.wins)
    }

    /// Mean guesses per bundle game, losses included.
    pub fn average_bundle_guesses(&self) -> Option<u64> {
        self.bundle.average(self.bundle.games_played)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_wins_then_a_loss() {
        let now = Utc::now();
        let mut ledger = StatsLedger::default();
        ledger.record_win(GameMode::Bundle, Some(2), now);
        ledger.record_win(GameMode::Bundle, Some(1), now);
        ledger.record_win(GameMode::Bundle, Some(3), now);
        ledger.record_loss(GameMode::Bundle, 3, now);

        let bundle = ledger.mode(GameMode::Bundle);
        assert_eq!(bundle.current_streak, 0);
        assert_eq!(bundle.best_streak, 3);
        assert_eq!(bundle.wins, 3);
        assert_eq!(bundle.losses, 1);
        assert_eq!(bundle.games_played, 4);
        assert_eq!(bundle.best, Some(1));
        assert_eq!(bundle.total, 9);
        assert_eq!(ledger.overall_games, 4);
        assert_eq!(ledger.last_played, Some(now));
        assert_eq!(ledger.pair, ModeStats::default());
    }

    #[test]
    fn test_best_only_improves_strictly() {
        let mut stats = ModeStats::default();
        stats.record_win(Some(40));
        stats.record_win(Some(40));
        stats.record_win(Some(55));
        assert_eq!(stats.best, Some(40));
        stats.record_win(Some(39));
        assert_eq!(stats.best, Some(39));
    }

    #[test]
    fn test_win_without_metric_keeps_totals() {
        let mut stats = ModeStats::default();
        stats.record_win(None);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.best, None);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn test_rates_and_averages() {
        let now = Utc::now();
        let mut ledger = StatsLedger::default();
        assert_eq!(ledger.pair.win_rate(), None);
        assert_eq!(ledger.average_pair_time(), None);

        ledger.record_win(GameMode::Pair, Some(30), now);
        ledger.record_win(GameMode::Pair, Some(45), now);
        ledger.record_loss(GameMode::Pair, 0, now);
        assert_eq!(ledger.pair.win_rate(), Some(67));
        assert_eq!(ledger.average_pair_time(), Some(38));
    }

    #[test]
    fn test_missing_fields_default_when_deserializing() {
        let ledger: StatsLedger =
            serde_json::from_str(r#"{"bundle": {"wins": 2, "games_played": 2}}"#).unwrap();
        assert_eq!(ledger.bundle.wins, 2);
        assert_eq!(ledger.pair, ModeStats::default());
        assert_eq!(ledger.last_played, None);
    }
}
