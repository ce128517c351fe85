use crate::error::{FeeError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative monetary amount.
///
/// Wraps `rust_decimal::Decimal` so fee arithmetic stays exact and a negative
/// fee can never be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(FeeError::ValidationError(format!(
                "Amount must not be negative, got {}",
                value
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn times(&self, quantity: u32) -> Result<Self> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Self)
            .ok_or_else(overflow)
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0.checked_add(rhs.0).map(Self).ok_or_else(overflow)
    }

    /// Adds up `amounts`, failing instead of wrapping or panicking on overflow.
    pub fn sum<I: IntoIterator<Item = Self>>(amounts: I) -> Result<Self> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |total, amount| total.checked_add(amount))
    }
}

fn overflow() -> FeeError {
    FeeError::ValidationError("fee total overflows".to_string())
}

impl TryFrom<Decimal> for Money {
    type Error = FeeError;

    fn try_from(value: Decimal) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One billed fee type on an entry, e.g. "Maintenance" for two months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub unit_amount: Money,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(description: impl Into<String>, unit_amount: Money, quantity: u32) -> Self {
        Self {
            description: description.into(),
            unit_amount,
            quantity,
        }
    }

    pub fn subtotal(&self) -> Result<Money> {
        self.unit_amount.times(self.quantity)
    }
}

/// Sum of `unit_amount * quantity` over every item.
pub fn total_of(items: &[LineItem]) -> Result<Money> {
    items
        .iter()
        .try_fold(Money::ZERO, |total, item| total.checked_add(item.subtotal()?))
}
