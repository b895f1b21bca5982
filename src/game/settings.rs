use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::model::{CatalogSet, Currency, GameError, GameMode, SettingsChange, Theme};
use crate::storage::{
    load_json, save_json, KeyValueStore, StorageError, CUSTOM_SETTINGS_KEY, SETTINGS_KEY,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default)]
    pub theme: Theme,

    #[serde(default)]
    pub catalog_set: CatalogSet,

    #[serde(default)]
    pub currency: Currency,
}

// Helper functions for default values
fn default_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: 1,
            theme: Theme::default(),
            catalog_set: CatalogSet::default(),
            currency: Currency::default(),
        }
    }
}

impl Settings {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<Settings>(store, SETTINGS_KEY) {
            Some(mut settings) => {
                settings.migrate();
                settings
            }
            None => Settings::default(),
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        trace!(target: "settings", "Saving settings {:?}", self);
        save_json(store, SETTINGS_KEY, self)
    }

    fn migrate(&mut self) {
        match self.version {
            0 => {
                self.version = 1;
            }
            _ => (),
        }
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        let value = std::env::var("SEED").ok()?;
        match value.parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                warn!(target: "settings", "Ignoring non-numeric SEED={:?}", value);
                None
            }
        }
    }

    pub fn apply(&mut self, change: &SettingsChange) {
        if let Some(theme) = change.theme {
            self.theme = theme;
        }
        if let Some(catalog_set) = change.catalog_set {
            self.catalog_set = catalog_set;
        }
        if let Some(currency) = change.currency {
            self.currency = currency;
        }
    }
}

/// The player-tuned "custom" tier, persisted separately from statistics.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CustomSettings {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_tolerance")]
    pub tolerance_percent: u32,
    #[serde(default = "default_item_count")]
    pub item_count: usize,
    #[serde(default = "default_pair_count")]
    pub pair_count: usize,
    #[serde(default = "default_blind_timer")]
    pub blind_timer_secs: u64,
}

fn default_attempts() -> u32 {
    3
}
fn default_tolerance() -> u32 {
    5
}
fn default_item_count() -> usize {
    5
}
fn default_pair_count() -> usize {
    5
}
fn default_blind_timer() -> u64 {
    180
}

impl Default for CustomSettings {
    fn default() -> Self {
        CustomSettings {
            attempts: default_attempts(),
            tolerance_percent: default_tolerance(),
            item_count: default_item_count(),
            pair_count: default_pair_count(),
            blind_timer_secs: default_blind_timer(),
        }
    }
}

impl CustomSettings {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        load_json::<CustomSettings>(store, CUSTOM_SETTINGS_KEY)
            .and_then(|settings| settings.validated().ok())
            .unwrap_or_default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        trace!(target: "settings", "Saving custom settings {:?}", self);
        save_json(store, CUSTOM_SETTINGS_KEY, self)
    }

    /// Rejects zero values and clamps item and pair counts to what the
    /// catalogs can supply.
    pub fn validated(mut self) -> Result<Self, GameError> {
        let zero_field = [
            ("attempts", self.attempts as u64),
            ("tolerance", self.tolerance_percent as u64),
            ("item count", self.item_count as u64),
            ("pair count", self.pair_count as u64),
            ("blind timer", self.blind_timer_secs),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);
        if let Some((name, _)) = zero_field {
            return Err(GameError::InvalidCustomSettings(format!(
                "{} must be greater than zero",
                name
            )));
        }
        self.item_count = self.item_count.min(max_items(GameMode::Bundle));
        self.pair_count = self.pair_count.min(max_items(GameMode::Pair));
        Ok(self)
    }
}

/// The smallest catalog size across sets for a mode.
fn max_items(mode: GameMode) -> usize {
    CatalogSet::all()
        .into_iter()
        .map(|set| crate::model::Catalog::for_mode(set, mode).len())
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serial_test::serial;

    #[test]
    fn test_settings_defaults_when_missing() {
        let store = MemoryStore::default();
        let settings = Settings::load(&store);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.theme, Theme::Party);
        assert_eq!(settings.catalog_set, CatalogSet::Standard);
        assert_eq!(settings.currency, Currency::Usd);
    }

    #[test]
    fn test_settings_round_trip_and_partial_records() {
        let mut store = MemoryStore::default();
        let mut settings = Settings::default();
        settings.apply(&SettingsChange {
            theme: Some(Theme::Dark),
            currency: Some(Currency::Cop),
            ..Default::default()
        });
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);

        store.set(SETTINGS_KEY, r#"{"theme":"light"}"#).unwrap();
        let partial = Settings::load(&store);
        assert_eq!(partial.theme, Theme::Light);
        assert_eq!(partial.currency, Currency::Usd);
    }

    #[test]
    fn test_custom_settings_backfill_blind_timer() {
        let mut store = MemoryStore::default();
        store
            .set(
                CUSTOM_SETTINGS_KEY,
                r#"{"attempts":4,"tolerance_percent":8,"item_count":6,"pair_count":4}"#,
            )
            .unwrap();
        let custom = CustomSettings::load(&store);
        assert_eq!(custom.attempts, 4);
        assert_eq!(custom.pair_count, 4);
        assert_eq!(custom.blind_timer_secs, 180);
    }

    #[test]
    fn test_custom_settings_validation() {
        let zero = CustomSettings {
            attempts: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero.validated(),
            Err(GameError::InvalidCustomSettings(_))
        ));

        let oversized = CustomSettings {
            item_count: 40,
            pair_count: 12,
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(oversized.item_count, 10);
        assert_eq!(oversized.pair_count, 8);
    }

    #[test]
    #[serial]
    fn test_seed_from_env() {
        std::env::set_var("SEED", "42");
        assert_eq!(Settings::seed_from_env(), Some(42));
        std::env::set_var("SEED", "forty-two");
        assert_eq!(Settings::seed_from_env(), None);
        std::env::remove_var("SEED");
        assert_eq!(Settings::seed_from_env(), None);
    }
}
