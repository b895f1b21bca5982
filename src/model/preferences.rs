use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::Price;

/// Pesos per US dollar. Illustrative, not a live rate.
pub const USD_TO_COP_RATE: u64 = 4000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Party,
    Light,
    Dark,
}

impl Theme {
    pub fn all() -> Vec<Theme> {
        vec![Theme::Party, Theme::Light, Theme::Dark]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Party => "party",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_name(name: &str) -> Option<Theme> {
        Theme::all()
            .into_iter()
            .find(|theme| theme.name().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Cop,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Cop => "COP",
        }
    }

    pub fn from_code(code: &str) -> Option<Currency> {
        [Currency::Usd, Currency::Cop]
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(code.trim()))
    }

    /// Formats a canonical price in this currency: `$3.99` for dollars,
    /// `$15.960` (whole pesos, dot-grouped) for pesos.
    pub fn format(&self, price: Price) -> String {
        match self {
            Currency::Usd => format!("${}", price),
            Currency::Cop => {
                // cents * 4000 / 100
                let pesos = price.cents() * (USD_TO_COP_RATE / 100);
                format!("${}", group_thousands(pesos))
            }
        }
    }

    /// Maps an amount typed in this currency back to dollars, the unit every
    /// engine scores in.
    pub fn to_canonical(&self, amount: f64) -> f64 {
        match self {
            Currency::Usd => amount,
            Currency::Cop => amount / USD_TO_COP_RATE as f64,
        }
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let groups = digits
        .chars()
        .rev()
        .chunks(3)
        .into_iter()
        .map(|chunk| chunk.collect::<String>())
        .collect::<Vec<_>>();
    groups.join(".").chars().rev().collect()
}
