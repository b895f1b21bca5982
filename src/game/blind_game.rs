use std::collections::BTreeMap;
use std::time::SystemTime;

use log::{debug, info, trace};
use rand::Rng;
use uuid::Uuid;

use super::pair_game::{check_index, deal_pairs};
use crate::model::{
    BlindCheck, BlindResult, BlindSnapshot, BlindState, Catalog, CheckReport, Countdown,
    GameError, Item, PairInput, PairProfile, PriceTag,
};

pub const PERFECT_BASE_SCORE: u32 = 100;
pub const MAX_TIME_BONUS: u32 = 50;

/// `n / d` rounded half up, in integers.
fn round_div(n: u64, d: u64) -> u64 {
    if d == 0 {
        return 0;
    }
    (2 * n + d) / (2 * d)
}

/// Pair matching with the verdict withheld: pairs are only scored on an
/// explicit check or when the countdown runs out.
#[derive(Debug, Clone)]
pub struct BlindGame {
    session_id: Uuid,
    profile: PairProfile,
    items: Vec<Item>,
    price_order: Vec<PriceTag>,
    /// item index -> price index; at most one entry per price.
    matches: BTreeMap<usize, usize>,
    selected_item: Option<usize>,
    selected_price: Option<usize>,
    countdown: Countdown,
    state: BlindState,
    final_score: Option<u32>,
    last_report: Option<CheckReport>,
}

impl BlindGame {
    pub fn start<R: Rng + ?Sized>(
        profile: PairProfile,
        time_limit_secs: u64,
        catalog: &Catalog,
        rng: &mut R,
        now: SystemTime,
    ) -> Self {
        let (items, price_order) = deal_pairs(profile.pair_count, catalog, rng);
        let game = Self {
            session_id: Uuid::new_v4(),
            profile,
            items,
            price_order,
            matches: BTreeMap::new(),
            selected_item: None,
            selected_price: None,
            countdown: Countdown::started(now, time_limit_secs),
            state: BlindState::Active,
            final_score: None,
            last_report: None,
        };
        info!(
            target: "blind_game",
            "Started blind session {} ({}, {} pairs, {}s)",
            game.session_id,
            profile.label(),
            game.pair_count(),
            time_limit_secs
        );
        game
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn pair_count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn price_order(&self) -> &[PriceTag] {
        &self.price_order
    }

    pub fn matches(&self) -> &BTreeMap<usize, usize> {
        &self.matches
    }

    pub fn mapped_count(&self) -> usize {
        self.matches.len()
    }

    pub fn selected_item(&self) -> Option<usize> {
        self.selected_item
    }

    pub fn selected_price(&self) -> Option<usize> {
        self.selected_price
    }

    pub fn time_limit_secs(&self) -> u64 {
        self.countdown.limit_secs
    }

    pub fn remaining_secs(&self, now: SystemTime) -> u64 {
        self.countdown.remaining_secs(now)
    }

    pub fn elapsed_secs(&self, now: SystemTime) -> u64 {
        self.countdown.timer.elapsed_secs(now)
    }

    pub fn state(&self) -> BlindState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == BlindState::Active
    }

    pub fn final_score(&self) -> Option<u32> {
        self.final_score
    }

    /// Records `item -> price`, evicting any mapping that already used either
    /// side. Returns how many pairs are mapped afterwards.
    pub fn make_match(&mut self, item: usize, price: usize) -> Result<usize, GameError> {
        if !self.is_active() {
            return Err(GameError::SessionOver);
        }
        check_index("item", item, self.pair_count())?;
        check_index("price", price, self.pair_count())?;

        self.matches.retain(|_, mapped_price| *mapped_price != price);
        if let Some(previous) = self.matches.insert(item, price) {
            trace!(
                target: "blind_game",
                "Item {} moved from price {} to {}",
                item,
                previous,
                price
            );
        }
        Ok(self.matches.len())
    }

    fn ensure_selectable(&self, what: &'static str, index: usize) -> Result<(), GameError> {
        if !self.is_active() {
            return Err(GameError::SessionOver);
        }
        check_index(what, index, self.pair_count())
    }

    pub fn select_item(&mut self, index: usize) -> Result<PairInput, GameError> {
        self.ensure_selectable("item", index)?;
        self.selected_item = Some(index);
        self.pair_selection()
    }

    pub fn select_price(&mut self, index: usize) -> Result<PairInput, GameError> {
        self.ensure_selectable("price", index)?;
        self.selected_price = Some(index);
        self.pair_selection()
    }

    fn pair_selection(&mut self) -> Result<PairInput, GameError> {
        let (Some(item), Some(price)) = (self.selected_item, self.selected_price) else {
            return Ok(PairInput::Pending);
        };
        let mapped = self.make_match(item, price)?;
        self.selected_item = None;
        self.selected_price = None;
        Ok(PairInput::Paired {
            item,
            price,
            mapped,
            total: self.pair_count(),
        })
    }

    /// Current standing of the mappings; correctness is not shown to the
    /// player until a check.
    pub fn report(&self) -> CheckReport {
        let correct = self
            .matches
            .iter()
            .filter(|(item, price)| item == price)
            .count();
        let mapped = self.matches.len();
        CheckReport {
            correct,
            wrong: mapped - correct,
            unmatched: self.pair_count() - mapped,
        }
    }

    /// Player-triggered scoring. A check that arrives after the deadline is
    /// handled as the timeout.
    pub fn check(&mut self, now: SystemTime) -> Result<BlindCheck, GameError> {
        if !self.is_active() {
            return Err(GameError::SessionOver);
        }
        if self.countdown.is_expired(now) {
            if let Some(result) = self.on_time_expired(now) {
                return Ok(BlindCheck::TimedOut(result));
            }
        }

        let total = self.pair_count();
        let report = self.report();
        match report.mapped() {
            0 => return Err(GameError::NoMatchesYet { total }),
            mapped if mapped < total => {
                return Err(GameError::IncompleteMatches {
                    unmatched: total - mapped,
                    total,
                })
            }
            _ => {}
        }
        self.last_report = Some(report);

        if report.correct < total {
            debug!(
                target: "blind_game",
                "Check on {}: {} of {} right",
                self.session_id,
                report.correct,
                total
            );
            return Ok(BlindCheck::Revise(report));
        }

        let remaining_secs = self.countdown.remaining_secs(now);
        let bonus = round_div(
            MAX_TIME_BONUS as u64 * remaining_secs,
            self.countdown.limit_secs,
        );
        let final_score = PERFECT_BASE_SCORE + bonus as u32;
        self.countdown = self.countdown.ended(now);
        self.state = BlindState::Cleared;
        self.final_score = Some(final_score);
        info!(
            target: "blind_game",
            "Session {} cleared with {}s left, score {}",
            self.session_id,
            remaining_secs,
            final_score
        );
        Ok(BlindCheck::Cleared(BlindResult {
            report,
            final_score,
            perfect: true,
            timed_out: false,
            elapsed_secs: self.countdown.timer.elapsed_secs(now),
            remaining_secs,
        }))
    }

    /// Terminal scoring when the countdown reaches zero. Returns `None` once
    /// the session has already ended, so it fires at most once.
    pub fn on_time_expired(&mut self, now: SystemTime) -> Option<BlindResult> {
        if !self.is_active() {
            return None;
        }
        let report = self.report();
        let total = self.pair_count() as u64;
        let final_score = round_div(100 * report.correct as u64, total) as u32;
        // Noticed late or not, the round ended at the deadline.
        self.countdown = self.countdown.ended(now.min(self.countdown.deadline()));
        self.state = BlindState::TimedOut;
        self.final_score = Some(final_score);
        self.last_report = Some(report);
        self.selected_item = None;
        self.selected_price = None;
        info!(
            target: "blind_game",
            "Session {} timed out with {}/{} right, score {}",
            self.session_id,
            report.correct,
            total,
            final_score
        );
        Some(BlindResult {
            report,
            final_score,
            perfect: report.correct == self.pair_count(),
            timed_out: true,
            elapsed_secs: self.countdown.timer.elapsed_secs(now),
            remaining_secs: 0,
        })
    }

    /// Called from the periodic tick; fires the timeout when due.
    pub fn tick(&mut self, now: SystemTime) -> Option<BlindResult> {
        if self.is_active() && self.countdown.is_expired(now) {
            self.on_time_expired(now)
        } else {
            None
        }
    }

    /// Stops the countdown without scoring, for teardown.
    pub fn stop_timer(&mut self, now: SystemTime) {
        self.countdown = self.countdown.ended(now);
    }

    pub fn snapshot(&self) -> BlindSnapshot {
        BlindSnapshot {
            session_id: self.session_id,
            profile: self.profile,
            items: self.items.clone(),
            price_order: self.price_order.clone(),
            matches: self.matches.iter().map(|(&i, &p)| (i, p)).collect(),
            selected_item: self.selected_item,
            selected_price: self.selected_price,
            countdown: self.countdown.clone(),
            state: self.state,
            final_score: self.final_score,
            last_report: self.last_report,
        }
    }
}
