mod blind_game;
mod bundle_game;
mod clock;
mod config_resolver;
pub mod game_engine;
mod pair_game;
mod pair_input;
pub mod settings;
mod stats_manager;

pub use blind_game::BlindGame;
pub use bundle_game::BundleGame;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config_resolver::ConfigResolver;
pub use game_engine::GameEngine;
pub use pair_game::PairGame;
pub use pair_input::PairInputHandler;
pub use stats_manager::StatsManager;
