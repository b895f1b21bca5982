use chrono::{DateTime, Utc};
use log::{error, info};

use crate::model::{GameError, GameMode, StatsLedger};
use crate::storage::{load_json, save_json, SharedStore, STATS_KEY};

/// Owns the statistics ledger and keeps it in the store. The record is read
/// on first use; every mutation writes it straight back.
pub struct StatsManager {
    store: SharedStore,
    ledger: Option<StatsLedger>,
}

impl std::fmt::Debug for StatsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsManager")
            .field("ledger", &self.ledger)
            .finish()
    }
}

impl StatsManager {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            ledger: None,
        }
    }

    pub fn ledger(&mut self) -> &StatsLedger {
        self.loaded()
    }

    fn loaded(&mut self) -> &mut StatsLedger {
        if self.ledger.is_none() {
            let ledger: StatsLedger =
                load_json(&*self.store.borrow(), STATS_KEY).unwrap_or_default();
            self.ledger = Some(ledger);
        }
        self.ledger.get_or_insert_with(StatsLedger::default)
    }

    fn persist(&mut self) {
        let Some(ledger) = self.ledger.as_ref() else {
            return;
        };
        if let Err(e) = save_json(&mut *self.store.borrow_mut(), STATS_KEY, ledger) {
            error!(target: "stats", "Failed to save statistics: {}", e);
        }
    }

    pub fn record_win(
        &mut self,
        mode: GameMode,
        metric: Option<u64>,
        at: DateTime<Utc>,
    ) -> &StatsLedger {
        info!(target: "stats", "Recording {:?} win ({:?})", mode, metric);
        self.loaded().record_win(mode, metric, at);
        self.persist();
        self.loaded()
    }

    pub fn record_loss(
        &mut self,
        mode: GameMode,
        accumulated: u64,
        at: DateTime<Utc>,
    ) -> &StatsLedger {
        info!(target: "stats", "Recording {:?} loss", mode);
        self.loaded().record_loss(mode, accumulated, at);
        self.persist();
        self.loaded()
    }

    /// Wipes every statistic. Refused unless the player confirmed.
    pub fn reset(&mut self, confirmed: bool) -> Result<&StatsLedger, GameError> {
        if !confirmed {
            return Err(GameError::ConfirmationRequired);
        }
        info!(target: "stats", "Resetting statistics");
        self.ledger = Some(StatsLedger::default());
        if let Err(e) = self.store.borrow_mut().remove(STATS_KEY) {
            error!(target: "stats", "Failed to clear statistics: {}", e);
        }
        Ok(self.loaded())
    }
}
