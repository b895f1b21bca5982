use log::{info, trace, warn};
use rand::Rng;
use uuid::Uuid;

use crate::helpers::shuffled;
use crate::model::{
    exact_cents, BundleProfile, BundleSnapshot, BundleState, Catalog, GameError, GuessOutcome,
    Hint, Item, ItemCard, Price,
};

/// "It's in the Bag": guess the total of a random handful of groceries within
/// a tolerance band before the attempts run out.
#[derive(Debug, Clone)]
pub struct BundleGame {
    session_id: Uuid,
    profile: BundleProfile,
    items: Vec<Item>,
    true_total: Price,
    attempts_remaining: u32,
    state: BundleState,
}

impl BundleGame {
    /// Draws an item count uniformly from the profile's range (capped by the
    /// catalog size) and takes that many items from a shuffled catalog.
    pub fn start<R: Rng + ?Sized>(profile: BundleProfile, catalog: &Catalog, rng: &mut R) -> Self {
        let max_items = profile.max_items.min(catalog.len()).max(1);
        let min_items = profile.min_items.clamp(1, max_items);
        let count = rng.random_range(min_items..=max_items);
        let items = shuffled(catalog.items(), rng)
            .into_iter()
            .take(count)
            .collect();
        Self::from_items(profile, items)
    }

    pub fn from_items(profile: BundleProfile, items: Vec<Item>) -> Self {
        let true_total = items.iter().map(|item| item.price).sum();
        let game = Self {
            session_id: Uuid::new_v4(),
            profile,
            items,
            true_total,
            attempts_remaining: profile.attempts_allowed,
            state: BundleState::InProgress,
        };
        info!(
            target: "bundle_game",
            "Started bundle session {} ({}, {} items, {} attempts)",
            game.session_id,
            profile.label(),
            game.items.len(),
            profile.attempts_allowed
        );
        game
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn profile(&self) -> &BundleProfile {
        &self.profile
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn true_total(&self) -> Price {
        self.true_total
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    pub fn state(&self) -> BundleState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state != BundleState::InProgress
    }

    /// Guesses made so far.
    pub fn attempts_used(&self) -> u32 {
        self.profile.attempts_allowed - self.attempts_remaining
    }

    /// Guesses a loss adds to the running total: every attempt the tier
    /// allowed.
    pub fn guesses_charged_for_loss(&self) -> u64 {
        self.profile.attempts_allowed as u64
    }

    /// Scores a guess in canonical dollars. Invalid input and guesses after
    /// the round ended are refused without touching the attempt count.
    pub fn submit_guess(&mut self, value: f64) -> Result<GuessOutcome, GameError> {
        if self.is_over() {
            warn!(target: "bundle_game", "Guess {} after session {} ended", value, self.session_id);
            return Err(GameError::SessionOver);
        }
        let Some(guess_cents) = exact_cents(value) else {
            warn!(target: "bundle_game", "Rejected guess {:?}", value);
            return Err(GameError::InvalidGuess);
        };

        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
        let percent_diff = self.true_total.deviation_of(guess_cents);
        trace!(
            target: "bundle_game",
            "Guess {} scored, {} attempts left",
            value,
            self.attempts_remaining
        );

        if percent_diff <= self.profile.tolerance_percent {
            self.state = BundleState::Won;
            info!(
                target: "bundle_game",
                "Session {} won in {} guesses",
                self.session_id,
                self.attempts_used()
            );
            Ok(GuessOutcome::Won {
                attempts_used: self.attempts_used(),
                true_total: self.true_total,
            })
        } else if self.attempts_remaining > 0 {
            Ok(GuessOutcome::Hint {
                hint: Hint::for_guess(guess_cents, self.true_total, percent_diff),
                attempts_remaining: self.attempts_remaining,
            })
        } else {
            self.state = BundleState::Lost;
            info!(target: "bundle_game", "Session {} lost", self.session_id);
            Ok(GuessOutcome::Lost {
                true_total: self.true_total,
            })
        }
    }

    pub fn snapshot(&self) -> BundleSnapshot {
        let reveal = self.is_over();
        BundleSnapshot {
            session_id: self.session_id,
            profile: self.profile,
            items: self
                .items
                .iter()
                .map(|item| ItemCard::from_item(item, reveal))
                .collect(),
            attempts_remaining: self.attempts_remaining,
            state: self.state,
            true_total: reveal.then_some(self.true_total),
        }
    }
}
