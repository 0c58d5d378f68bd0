//! Requested-quantity reconciliation for a single flower.
//!
//! The selector keeps `1 <= quantity <= available` whenever the flower has
//! stock at all, and derives the running total from the unit price. A flower
//! with zero stock yields a selector that starts at 0 and reports itself as
//! not orderable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::flower::Flower;

/// User-visible outcome of a quantity adjustment that could not be applied
/// verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityWarning {
    BelowMinimum,
    ExceedsAvailable,
    NotAWholeNumber,
}

impl QuantityWarning {
    pub fn user_message(self) -> &'static str {
        match self {
            Self::BelowMinimum => "Quantity must be greater than 0",
            Self::ExceedsAvailable => "Quantity must be less than available",
            Self::NotAWholeNumber => "Quantity must be a whole number",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetOutcome {
    pub applied: u32,
    pub warning: Option<QuantityWarning>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantitySelector {
    available: u32,
    unit_price: Decimal,
    quantity: u32,
}

impl QuantitySelector {
    pub fn new(available: u32, unit_price: Decimal) -> Self {
        let quantity = if available == 0 { 0 } else { 1 };
        Self { available, unit_price, quantity }
    }

    pub fn for_flower(flower: &Flower) -> Self {
        Self::new(flower.available, flower.price)
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    pub fn is_orderable(&self) -> bool {
        self.available >= 1
    }

    /// Accepts free-form input from a quantity field. Whole numbers inside
    /// `1..=available` are taken verbatim; out-of-range values clamp to the
    /// nearest bound with a warning. Fractional or non-numeric input is
    /// refused outright and leaves the selector untouched.
    pub fn set(&mut self, raw: &str) -> SetOutcome {
        let parsed: i64 = match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                return SetOutcome {
                    applied: self.quantity,
                    warning: Some(QuantityWarning::NotAWholeNumber),
                }
            }
        };

        let mut warning = None;
        let mut value = parsed;
        if value < 1 {
            value = 1;
            warning = Some(QuantityWarning::BelowMinimum);
        }
        if value > i64::from(self.available) {
            value = i64::from(self.available);
            warning = Some(QuantityWarning::ExceedsAvailable);
        }

        self.quantity = value as u32;
        SetOutcome { applied: self.quantity, warning }
    }

    pub fn increment(&mut self) -> Result<u32, QuantityWarning> {
        if self.quantity >= self.available {
            return Err(QuantityWarning::ExceedsAvailable);
        }
        self.quantity += 1;
        Ok(self.quantity)
    }

    pub fn decrement(&mut self) -> Result<u32, QuantityWarning> {
        if self.quantity <= 1 {
            return Err(QuantityWarning::BelowMinimum);
        }
        self.quantity -= 1;
        Ok(self.quantity)
    }

    /// Derived total for the current selection. Cheap, so recomputed on
    /// every read rather than cached.
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{QuantitySelector, QuantityWarning};

    fn selector(available: u32, unit_price: i64) -> QuantitySelector {
        QuantitySelector::new(available, Decimal::from(unit_price))
    }

    #[test]
    fn defaults_to_one_when_stock_exists() {
        let picked = selector(3, 600);
        assert_eq!(picked.quantity(), 1);
        assert_eq!(picked.total(), Decimal::from(600));
        assert!(picked.is_orderable());
    }

    #[test]
    fn zero_stock_starts_at_zero_and_is_not_orderable() {
        let empty = selector(0, 600);
        assert_eq!(empty.quantity(), 0);
        assert_eq!(empty.total(), Decimal::ZERO);
        assert!(!empty.is_orderable());
    }

    #[test]
    fn increment_never_exceeds_available() {
        let mut picked = selector(3, 600);
        picked.increment().expect("1 -> 2");
        picked.increment().expect("2 -> 3");
        assert_eq!(picked.quantity(), 3);
        assert_eq!(picked.total(), Decimal::from(1800));

        let rejected = picked.increment().expect_err("third increment must reject");
        assert_eq!(rejected, QuantityWarning::ExceedsAvailable);
        assert_eq!(picked.quantity(), 3);
    }

    #[test]
    fn increment_always_rejects_at_zero_stock() {
        let mut empty = selector(0, 600);
        let rejected = empty.increment().expect_err("no stock, no increment");
        assert_eq!(rejected, QuantityWarning::ExceedsAvailable);
        assert_eq!(empty.quantity(), 0);
    }

    #[test]
    fn decrement_never_drops_below_one() {
        let mut picked = selector(3, 600);
        let rejected = picked.decrement().expect_err("already at minimum");
        assert_eq!(rejected, QuantityWarning::BelowMinimum);
        assert_eq!(picked.quantity(), 1);

        picked.increment().expect("1 -> 2");
        picked.decrement().expect("2 -> 1");
        assert_eq!(picked.quantity(), 1);
    }

    #[test]
    fn set_accepts_in_range_values_verbatim() {
        let mut picked = selector(5, 250);
        let outcome = picked.set("4");
        assert_eq!(outcome.applied, 4);
        assert_eq!(outcome.warning, None);
        assert_eq!(picked.total(), Decimal::from(1000));
    }

    #[test]
    fn set_clamps_below_minimum() {
        let mut picked = selector(5, 250);
        let outcome = picked.set("0");
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.warning, Some(QuantityWarning::BelowMinimum));

        let negative = picked.set("-3");
        assert_eq!(negative.applied, 1);
        assert_eq!(negative.warning, Some(QuantityWarning::BelowMinimum));
    }

    #[test]
    fn set_clamps_above_available() {
        let mut picked = selector(5, 250);
        let outcome = picked.set("12");
        assert_eq!(outcome.applied, 5);
        assert_eq!(outcome.warning, Some(QuantityWarning::ExceedsAvailable));
    }

    #[test]
    fn set_refuses_fractional_and_junk_input() {
        let mut picked = selector(5, 250);
        picked.set("3");

        for raw in ["2.5", "two", ""] {
            let outcome = picked.set(raw);
            assert_eq!(outcome.applied, 3, "input {raw:?} must leave quantity alone");
            assert_eq!(outcome.warning, Some(QuantityWarning::NotAWholeNumber));
        }
    }

    #[test]
    fn total_tracks_every_mutation() {
        let mut picked = selector(10, 75);
        picked.set("6");
        assert_eq!(picked.total(), Decimal::from(450));
        picked.decrement().expect("6 -> 5");
        assert_eq!(picked.total(), Decimal::from(375));
    }
}
