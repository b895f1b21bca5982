use serde::{Deserialize, Serialize};

use super::{GameMode, Item};

/// The two product themes a player can switch between.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSet {
    #[default]
    Standard,
    Colombian,
}

impl CatalogSet {
    pub fn all() -> Vec<CatalogSet> {
        vec![CatalogSet::Standard, CatalogSet::Colombian]
    }

    pub fn name(&self) -> &'static str {
        match self {
            CatalogSet::Standard => "standard",
            CatalogSet::Colombian => "colombian",
        }
    }

    pub fn from_name(name: &str) -> Option<CatalogSet> {
        CatalogSet::all()
            .into_iter()
            .find(|set| set.name().eq_ignore_ascii_case(name.trim()))
    }
}

type CatalogEntry = (&'static str, &'static str, u64);

const STANDARD_BUNDLE: &[CatalogEntry] = &[
    ("Milk", "🥛", 399),
    ("Bread", "🍞", 249),
    ("Eggs", "🥚", 429),
    ("Butter", "🧈", 599),
    ("Cheese", "🧀", 649),
    ("Apples", "🍎", 499),
    ("Bananas", "🍌", 199),
    ("Coffee", "☕", 899),
    ("Cereal", "🥣", 479),
    ("Orange Juice", "🧃", 549),
];

const STANDARD_PAIR: &[CatalogEntry] = &[
    ("Television", "📺", 59999),
    ("Laptop", "💻", 89999),
    ("Smartphone", "📱", 69999),
    ("Headphones", "🎧", 14999),
    ("Camera", "📷", 44999),
    ("Blender", "🍹", 7999),
    ("Microwave", "📟", 12999),
    ("Vacuum", "🧹", 19999),
];

const COLOMBIAN_BUNDLE: &[CatalogEntry] = &[
    ("Café Juan Valdez", "☕", 1299),
    ("Arepa Mix", "🫓", 499),
    ("Panela (Cane Sugar)", "🍯", 349),
    ("Aguardiente", "🍾", 1899),
    ("Bocadillo (Guava Paste)", "🍬", 549),
    ("Arequipe (Dulce de Leche)", "🍯", 699),
    ("Postobón Soda", "🥤", 249),
    ("Colombina Candy", "🍭", 199),
    ("Papa Criolla", "🥔", 429),
    ("Ramo Ponqué", "🍰", 379),
];

const COLOMBIAN_PAIR: &[CatalogEntry] = &[
    ("Coffee Maker", "☕", 7999),
    ("Colombian Flag", "🇨🇴", 1599),
    ("Ruana (Poncho)", "🧥", 4599),
    ("Sombrero Vueltiao", "🎩", 3599),
    ("Mochilas Wayuu", "👜", 8999),
    ("Colombian Emerald", "💎", 29999),
    ("Coffee Grinder", "⚙️", 4999),
    ("Tejo Game Set", "🎯", 12999),
];

/// An ordered, immutable list of items for one game mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub set: CatalogSet,
    pub mode: GameMode,
    items: Vec<Item>,
}

impl Catalog {
    pub fn new(set: CatalogSet, mode: GameMode, items: Vec<Item>) -> Self {
        Self { set, mode, items }
    }

    pub fn for_mode(set: CatalogSet, mode: GameMode) -> Self {
        let entries = match (set, mode) {
            (CatalogSet::Standard, GameMode::Bundle) => STANDARD_BUNDLE,
            (CatalogSet::Standard, GameMode::Pair) => STANDARD_PAIR,
            (CatalogSet::Colombian, GameMode::Bundle) => COLOMBIAN_BUNDLE,
            (CatalogSet::Colombian, GameMode::Pair) => COLOMBIAN_PAIR,
        };
        let items = entries
            .iter()
            .map(|(name, icon, cents)| Item::new(name, icon, *cents))
            .collect();
        Self::new(set, mode, items)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
