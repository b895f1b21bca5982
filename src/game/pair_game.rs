use std::time::SystemTime;

use log::{info, trace};
use rand::Rng;
use uuid::Uuid;

use crate::helpers::shuffled;
use crate::model::{
    Catalog, GameError, Item, PairInput, PairProfile, PairResult, PairSnapshot, PairState,
    PriceTag, TimerState, PERFECT_PAIR_SECS,
};

/// Deals `pair_count` items and an independently shuffled row of their
/// prices. Price tags keep the index of the item they belong to, so a pair
/// is correct exactly when both indices agree.
pub(crate) fn deal_pairs<R: Rng + ?Sized>(
    pair_count: usize,
    catalog: &Catalog,
    rng: &mut R,
) -> (Vec<Item>, Vec<PriceTag>) {
    let items: Vec<Item> = shuffled(catalog.items(), rng)
        .into_iter()
        .take(pair_count)
        .collect();
    let tags: Vec<PriceTag> = items
        .iter()
        .enumerate()
        .map(|(original_index, item)| PriceTag {
            price: item.price,
            original_index,
        })
        .collect();
    let price_order = shuffled(&tags, rng);
    (items, price_order)
}

pub(crate) fn check_index(what: &'static str, index: usize, len: usize) -> Result<(), GameError> {
    if index < len {
        Ok(())
    } else {
        Err(GameError::IndexOutOfRange { what, index, len })
    }
}

/// "Pick a Pair": click an item, click a price; right pairs lock in, wrong
/// ones are rejected on the spot.
#[derive(Debug, Clone)]
pub struct PairGame {
    session_id: Uuid,
    profile: PairProfile,
    items: Vec<Item>,
    price_order: Vec<PriceTag>,
    matched: Vec<bool>,
    selected_item: Option<usize>,
    selected_price: Option<usize>,
    matches_confirmed: usize,
    state: PairState,
    timer: TimerState,
}

impl PairGame {
    pub fn start<R: Rng + ?Sized>(
        profile: PairProfile,
        catalog: &Catalog,
        rng: &mut R,
        now: SystemTime,
    ) -> Self {
        let (items, price_order) = deal_pairs(profile.pair_count, catalog, rng);
        let game = Self {
            session_id: Uuid::new_v4(),
            profile,
            matched: vec![false; items.len()],
            items,
            price_order,
            selected_item: None,
            selected_price: None,
            matches_confirmed: 0,
            state: PairState::InProgress,
            timer: TimerState::started(now),
        };
        info!(
            target: "pair_game",
            "Started pair session {} ({}, {} pairs)",
            game.session_id,
            profile.label(),
            game.pair_count()
        );
        game
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Pairs actually dealt; smaller than the profile asks for only when the
    /// catalog runs short.
    pub fn pair_count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn price_order(&self) -> &[PriceTag] {
        &self.price_order
    }

    pub fn matches_confirmed(&self) -> usize {
        self.matches_confirmed
    }

    pub fn selected_item(&self) -> Option<usize> {
        self.selected_item
    }

    pub fn selected_price(&self) -> Option<usize> {
        self.selected_price
    }

    pub fn state(&self) -> PairState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state != PairState::InProgress
    }

    pub fn is_matched(&self, index: usize) -> bool {
        self.matched.get(index).copied().unwrap_or(false)
    }

    pub fn timer(&self) -> &TimerState {
        &self.timer
    }

    pub fn elapsed_secs(&self, now: SystemTime) -> u64 {
        self.timer.elapsed_secs(now)
    }

    fn ensure_selectable(&self, what: &'static str, index: usize) -> Result<bool, GameError> {
        if self.is_over() {
            return Err(GameError::SessionOver);
        }
        check_index(what, index, self.pair_count())?;
        Ok(!self.matched[index])
    }

    pub fn select_item(&mut self, index: usize, now: SystemTime) -> Result<PairInput, GameError> {
        if !self.ensure_selectable("item", index)? {
            return Ok(PairInput::Ignored);
        }
        self.selected_item = Some(index);
        match self.selected_price {
            Some(price) => self.resolve_pair(index, price, now),
            None => Ok(PairInput::Pending),
        }
    }

    /// `index` is the price's original index, as carried by its `PriceTag`.
    pub fn select_price(&mut self, index: usize, now: SystemTime) -> Result<PairInput, GameError> {
        if !self.ensure_selectable("price", index)? {
            return Ok(PairInput::Ignored);
        }
        self.selected_price = Some(index);
        match self.selected_item {
            Some(item) => self.resolve_pair(item, index, now),
            None => Ok(PairInput::Pending),
        }
    }

    /// Settles a pending pair. Both selections are cleared either way; the
    /// rejection is final even if the view keeps it on screen for a moment.
    pub fn resolve_pair(
        &mut self,
        item: usize,
        price: usize,
        now: SystemTime,
    ) -> Result<PairInput, GameError> {
        if !self.ensure_selectable("item", item)? || !self.ensure_selectable("price", price)? {
            return Ok(PairInput::Ignored);
        }
        self.selected_item = None;
        self.selected_price = None;

        if item != price {
            trace!(target: "pair_game", "Rejected item {} with price {}", item, price);
            return Ok(PairInput::Rejected { item, price });
        }

        self.matched[item] = true;
        self.matches_confirmed += 1;
        trace!(
            target: "pair_game",
            "Matched item {} ({}/{})",
            item,
            self.matches_confirmed,
            self.pair_count()
        );

        if self.matches_confirmed < self.pair_count() {
            return Ok(PairInput::Matched {
                item,
                matches_confirmed: self.matches_confirmed,
            });
        }

        self.state = PairState::Won;
        self.timer = self.timer.ended(now);
        let elapsed_secs = self.timer.elapsed_secs(now);
        info!(
            target: "pair_game",
            "Session {} won in {}s",
            self.session_id,
            elapsed_secs
        );
        Ok(PairInput::Completed(PairResult {
            elapsed_secs,
            is_perfect: elapsed_secs < PERFECT_PAIR_SECS,
        }))
    }

    /// Stops the clock without finishing the round, for teardown.
    pub fn stop_timer(&mut self, now: SystemTime) {
        self.timer = self.timer.ended(now);
    }

    pub fn snapshot(&self) -> PairSnapshot {
        PairSnapshot {
            session_id: self.session_id,
            profile: self.profile,
            items: self.items.clone(),
            price_order: self.price_order.clone(),
            matched: self.matched.clone(),
            selected_item: self.selected_item,
            selected_price: self.selected_price,
            matches_confirmed: self.matches_confirmed,
            state: self.state,
            timer: self.timer.clone(),
        }
    }
}
