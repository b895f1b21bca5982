use super::{CatalogSet, Currency, GameKind, GameMode, PairVariant, Theme, Tier};
use crate::game::settings::CustomSettings;

/// A partial settings update; `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsChange {
    pub theme: Option<Theme>,
    pub catalog_set: Option<CatalogSet>,
    pub currency: Option<Currency>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEngineCommand {
    InitDisplay,
    ChooseGame(GameMode),
    ChooseTier(Tier),
    OpenCustomConfig,
    ApplyCustomSettings(CustomSettings),
    ResetCustomSettings,
    ChoosePairVariant(PairVariant),
    /// Skips the menus and starts a session directly.
    StartGame(GameKind, Tier),
    /// Amount in canonical dollars.
    SubmitGuess(f64),
    SelectItem(usize),
    SelectPrice(usize),
    CheckBlindMatches,
    /// Periodic timer tick from the presentation layer.
    Tick,
    Replay,
    BackToMenu,
    ShowStats,
    ResetStats { confirmed: bool },
    ChangeSettings(SettingsChange),
}
