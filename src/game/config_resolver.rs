use crate::game::settings::CustomSettings;
use crate::model::{BundleProfile, DifficultyProfile, GameMode, PairProfile, Percent, Tier};

/// Maps (mode, tier) to the parameters a session starts from. Fixed tiers
/// come from the static tables; `Custom` is built from the player's settings.
#[derive(Debug, Clone, Copy)]
pub struct ConfigResolver {
    custom: CustomSettings,
}

impl ConfigResolver {
    pub fn new(custom: CustomSettings) -> Self {
        Self { custom }
    }

    pub fn resolve(&self, mode: GameMode, tier: Tier) -> DifficultyProfile {
        match mode {
            GameMode::Bundle => DifficultyProfile::Bundle(self.bundle_profile(tier)),
            GameMode::Pair => DifficultyProfile::Pair(self.pair_profile(tier)),
        }
    }

    pub fn bundle_profile(&self, tier: Tier) -> BundleProfile {
        match tier {
            Tier::Custom => BundleProfile {
                tier,
                attempts_allowed: self.custom.attempts,
                tolerance_percent: Percent::from_num(self.custom.tolerance_percent),
                min_items: self.custom.item_count,
                max_items: self.custom.item_count,
            },
            _ => BundleProfile::for_tier(tier),
        }
    }

    pub fn pair_profile(&self, tier: Tier) -> PairProfile {
        match tier {
            Tier::Custom => PairProfile {
                tier,
                pair_count: self.custom.pair_count,
            },
            _ => PairProfile::for_tier(tier),
        }
    }

    /// Countdown length for a blind round.
    pub fn blind_time_limit_secs(&self, tier: Tier, pair_count: usize) -> u64 {
        match tier {
            Tier::Custom => self.custom.blind_timer_secs,
            _ => tier.blind_seconds_per_pair() * pair_count as u64,
        }
    }
}
