use serde::Serialize;
use uuid::Uuid;

use super::{
    BundleProfile, CheckReport, Countdown, Item, ItemCard, PairProfile, Price, PriceTag,
    TimerState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BundleState {
    InProgress,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PairState {
    InProgress,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlindState {
    Active,
    /// Every pair right on a player-triggered check.
    Cleared,
    /// The countdown ended the round, perfect or not.
    TimedOut,
}

/// Read-only views of the live session, handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleSnapshot {
    pub session_id: Uuid,
    pub profile: BundleProfile,
    pub items: Vec<ItemCard>,
    pub attempts_remaining: u32,
    pub state: BundleState,
    pub true_total: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairSnapshot {
    pub session_id: Uuid,
    pub profile: PairProfile,
    pub items: Vec<Item>,
    pub price_order: Vec<PriceTag>,
    pub matched: Vec<bool>,
    pub selected_item: Option<usize>,
    pub selected_price: Option<usize>,
    pub matches_confirmed: usize,
    pub state: PairState,
    pub timer: TimerState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlindSnapshot {
    pub session_id: Uuid,
    pub profile: PairProfile,
    pub items: Vec<Item>,
    pub price_order: Vec<PriceTag>,
    /// (item index, price index), ordered by item.
    pub matches: Vec<(usize, usize)>,
    pub selected_item: Option<usize>,
    pub selected_price: Option<usize>,
    pub countdown: Countdown,
    pub state: BlindState,
    pub final_score: Option<u32>,
    pub last_report: Option<CheckReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum GameStateSnapshot {
    Bundle(BundleSnapshot),
    Pair(PairSnapshot),
    Blind(BlindSnapshot),
}

impl GameStateSnapshot {
    pub fn session_id(&self) -> Uuid {
        match self {
            GameStateSnapshot::Bundle(snapshot) => snapshot.session_id,
            GameStateSnapshot::Pair(snapshot) => snapshot.session_id,
            GameStateSnapshot::Blind(snapshot) => snapshot.session_id,
        }
    }
}
