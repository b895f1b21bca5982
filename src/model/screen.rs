use serde::{Deserialize, Serialize};

use super::{GameKind, GameMode, Tier};

/// Where the player is in the menu → difficulty → (custom) → play → result
/// loop. Exactly one screen is current; only `Playing` owns a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Screen {
    #[default]
    Menu,
    DifficultySelect(GameMode),
    CustomConfig(GameMode),
    PairVariantSelect(Tier),
    Playing(GameKind, Tier),
    Finished(GameKind, Tier),
    Stats,
}

impl Screen {
    pub fn is_playing(&self) -> bool {
        matches!(self, Screen::Playing(..))
    }

    /// The game on screen, live or just finished.
    pub fn game(&self) -> Option<(GameKind, Tier)> {
        match self {
            Screen::Playing(kind, tier) | Screen::Finished(kind, tier) => Some((*kind, *tier)),
            _ => None,
        }
    }
}
