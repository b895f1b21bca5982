use fixed::types::U64F64;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::Add;

/// Percentages (tolerances, guess deviations) are kept in fixed point so that
/// a 10.5% miss never rounds into a 10% tolerance band.
pub type Percent = U64F64;

/// A price in canonical USD, stored as whole cents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    cents: u64,
}

impl Price {
    pub const ZERO: Price = Price { cents: 0 };

    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    pub fn cents(&self) -> u64 {
        self.cents
    }

    pub fn as_f64(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// `|self - reference| / reference * 100`, exact to the fixed-point
    /// resolution. A zero reference yields `Percent::MAX`.
    pub fn percent_diff(&self, reference: Price) -> Percent {
        reference.deviation_of(U64F64::from_num(self.cents))
    }

    /// How far an unrounded amount in cents is from this price, in percent
    /// of this price.
    pub fn deviation_of(&self, cents: U64F64) -> Percent {
        if self.cents == 0 {
            return Percent::MAX;
        }
        let reference = U64F64::from_num(self.cents);
        let diff = if cents > reference {
            cents - reference
        } else {
            reference - cents
        };
        diff.saturating_mul_int(100) / reference
    }
}

/// A typed amount (e.g. `21.90`) in fixed-point cents, not rounded to the
/// cent. `None` for anything that is not a positive, finite amount.
pub fn exact_cents(amount: f64) -> Option<U64F64> {
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    U64F64::checked_from_num(amount * 100.0).filter(|cents| *cents > U64F64::ZERO)
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, |acc, price| acc + price)
    }
}

impl<'a> Sum<&'a Price> for Price {
    fn sum<I: Iterator<Item = &'a Price>>(iter: I) -> Price {
        iter.copied().sum()
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl std::fmt::Debug for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self)
    }
}
