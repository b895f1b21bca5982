use serde::{Deserialize, Serialize};

use super::Price;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub icon: String,
    pub price: Price,
}

impl Item {
    pub fn new(name: &str, icon: &str, cents: u64) -> Self {
        Self {
            name: name.to_string(),
            icon: icon.to_string(),
            price: Price::from_cents(cents),
        }
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.icon, self.name)
    }
}

/// A price card on the pair board. Cards are displayed in their own shuffled
/// order; `original_index` points back at the item the price belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTag {
    pub price: Price,
    pub original_index: usize,
}

/// What the bundle board shows for an item: the price stays hidden until the
/// round is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCard {
    pub name: String,
    pub icon: String,
    pub price: Option<Price>,
}

impl ItemCard {
    pub fn from_item(item: &Item, reveal_price: bool) -> Self {
        Self {
            name: item.name.clone(),
            icon: item.icon.clone(),
            price: reveal_price.then_some(item.price),
        }
    }
}
