use crate::events::EventHandler;
use crate::game::settings::{CustomSettings, Settings};
use crate::model::{GameEngineEvent, GameStateSnapshot, Screen};

/// What the input side needs to know about engine state to read player
/// input: the currency prices are typed in, the custom tier being edited,
/// and which price sits at which on-screen position.
#[derive(Debug, Clone, Default)]
pub struct SettingsProjection {
    settings: Settings,
    custom_settings: CustomSettings,
    screen: Screen,
    price_positions: Vec<usize>,
}

impl SettingsProjection {
    pub fn new(initial: &Settings) -> Self {
        Self {
            settings: initial.clone(),
            ..Default::default()
        }
    }

    pub fn current_settings(&self) -> &Settings {
        &self.settings
    }

    pub fn custom_settings(&self) -> CustomSettings {
        self.custom_settings
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Maps a 0-based on-screen price position to the price's pair index.
    pub fn price_at(&self, position: usize) -> Option<usize> {
        self.price_positions.get(position).copied()
    }
}

impl EventHandler<GameEngineEvent> for SettingsProjection {
    fn handle_event(&mut self, event: &GameEngineEvent) {
        match event {
            GameEngineEvent::SettingsChanged(settings) => self.settings = settings.clone(),
            GameEngineEvent::CustomSettingsChanged(custom) => self.custom_settings = *custom,
            GameEngineEvent::ScreenChanged(screen) => self.screen = *screen,
            GameEngineEvent::SessionUpdated(snapshot) => {
                self.price_positions = match snapshot {
                    GameStateSnapshot::Pair(pair) => {
                        pair.price_order.iter().map(|tag| tag.original_index).collect()
                    }
                    GameStateSnapshot::Blind(blind) => {
                        blind.price_order.iter().map(|tag| tag.original_index).collect()
                    }
                    GameStateSnapshot::Bundle(_) => Vec::new(),
                }
            }
            GameEngineEvent::SessionCleared => self.price_positions.clear(),
            _ => (),
        }
    }
}
