mod catalog;
mod difficulty;
mod error;
mod game_engine_command;
mod game_engine_event;
pub mod game_state_snapshot;
mod game_stats;
mod item;
mod preferences;
mod price;
mod screen;
mod settings_projection;
mod timer_state;

pub use catalog::{Catalog, CatalogSet};
pub use difficulty::{
    BundleProfile, DifficultyProfile, GameKind, GameMode, PairProfile, PairVariant, Tier,
};
pub use error::{ErrorKind, GameError};
pub use game_engine_command::{GameEngineCommand, SettingsChange};
pub use game_engine_event::{
    BlindCheck, BlindResult, CheckReport, Direction, GameEngineEvent, GameOutcome, GuessOutcome,
    Hint, PairInput, PairResult, FAR_OFF_PERCENT, PERFECT_PAIR_SECS,
};
pub use game_state_snapshot::{
    BlindSnapshot, BlindState, BundleSnapshot, BundleState, GameStateSnapshot, PairSnapshot,
    PairState,
};
pub use game_stats::{ModeStats, StatsLedger};
pub use item::{Item, ItemCard, PriceTag};
pub use preferences::{Currency, Theme, USD_TO_COP_RATE};
pub use price::{exact_cents, Percent, Price};
pub use screen::Screen;
pub use settings_projection::SettingsProjection;
pub use timer_state::{Countdown, TimerState};
