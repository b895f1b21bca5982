use log::warn;
use serde::{Deserialize, Serialize};

use super::Percent;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Easy,
    #[default]
    Medium,
    Hard,
    Custom,
}

impl Tier {
    pub fn all() -> Vec<Tier> {
        vec![Tier::Easy, Tier::Medium, Tier::Hard, Tier::Custom]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tier::Easy => "easy",
            Tier::Medium => "medium",
            Tier::Hard => "hard",
            Tier::Custom => "custom",
        }
    }

    /// Unknown names resolve to `Medium`.
    pub fn from_name(name: &str) -> Tier {
        let name = name.trim();
        match Tier::all()
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(name))
        {
            Some(tier) => tier,
            None => {
                warn!(target: "difficulty", "Unknown tier {:?}, falling back to medium", name);
                Tier::Medium
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Easy => "Easy",
            Tier::Medium => "Medium",
            Tier::Hard => "Hard",
            Tier::Custom => "Custom",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Tier::Easy => "#4CAF50",
            Tier::Medium => "#FF9800",
            Tier::Hard => "#F44336",
            Tier::Custom => "#9C27B0",
        }
    }

    /// Blind-mode seconds granted per pair. Custom timers come from the
    /// player's settings instead; the medium rate is used if asked anyway.
    pub fn blind_seconds_per_pair(&self) -> u64 {
        match self {
            Tier::Easy => 60,
            Tier::Medium | Tier::Custom => 40,
            Tier::Hard => 30,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The two games. Statistics and difficulty tables are keyed by this.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Bundle,
    Pair,
}

impl GameMode {
    pub fn title(&self) -> &'static str {
        match self {
            GameMode::Bundle => "It's in the Bag",
            GameMode::Pair => "Pick a Pair",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PairVariant {
    #[default]
    Standard,
    Blind,
}

/// A concrete game a session can be running.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GameKind {
    Bundle,
    Pair(PairVariant),
}

impl GameKind {
    pub fn mode(&self) -> GameMode {
        match self {
            GameKind::Bundle => GameMode::Bundle,
            GameKind::Pair(_) => GameMode::Pair,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleProfile {
    pub tier: Tier,
    pub attempts_allowed: u32,
    pub tolerance_percent: Percent,
    pub min_items: usize,
    pub max_items: usize,
}

impl BundleProfile {
    pub fn for_tier(tier: Tier) -> BundleProfile {
        let (attempts_allowed, tolerance, min_items, max_items) = match tier {
            Tier::Easy => (5, 10, 3, 4),
            Tier::Medium | Tier::Custom => (3, 5, 4, 6),
            Tier::Hard => (2, 3, 6, 8),
        };
        BundleProfile {
            tier,
            attempts_allowed,
            tolerance_percent: Percent::from_num(tolerance),
            min_items,
            max_items,
        }
    }

    pub fn label(&self) -> &'static str {
        self.tier.label()
    }

    pub fn color(&self) -> &'static str {
        self.tier.color()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairProfile {
    pub tier: Tier,
    pub pair_count: usize,
}

impl PairProfile {
    pub fn for_tier(tier: Tier) -> PairProfile {
        let pair_count = match tier {
            Tier::Easy => 3,
            Tier::Medium | Tier::Custom => 5,
            Tier::Hard => 7,
        };
        PairProfile { tier, pair_count }
    }

    pub fn label(&self) -> &'static str {
        self.tier.label()
    }

    pub fn color(&self) -> &'static str {
        self.tier.color()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyProfile {
    Bundle(BundleProfile),
    Pair(PairProfile),
}

impl DifficultyProfile {
    pub fn tier(&self) -> Tier {
        match self {
            DifficultyProfile::Bundle(profile) => profile.tier,
            DifficultyProfile::Pair(profile) => profile.tier,
        }
    }
}
