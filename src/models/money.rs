use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Default currency for the platform. Every monetary column defaults to this
/// unless `AppConfig.currency` overrides it at service construction time.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Number of fraction digits shown when formatting an amount.
const DISPLAY_SCALE: u32 = 2;

/// An exact monetary value: a `Decimal` amount tagged with an ISO currency
/// code. Amounts keep full precision internally; rounding to two fraction
/// digits happens only at presentation (`Display`/`format`).
///
/// Arithmetic between two `Money` values requires matching currencies and
/// fails with `ServiceError::CurrencyMismatch` otherwise. Scaling by a bare
/// `Decimal` (a quantity) is always allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// The additive identity for the given currency.
    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn add(&self, other: &Money) -> Result<Money, ServiceError> {
        self.ensure_same_currency(other)?;
        Ok(Money::new(self.amount + other.amount, self.currency.clone()))
    }

    pub fn subtract(&self, other: &Money) -> Result<Money, ServiceError> {
        self.ensure_same_currency(other)?;
        Ok(Money::new(self.amount - other.amount, self.currency.clone()))
    }

    /// Scales the amount by a quantity. Quantities are validated non-negative
    /// at the edges; the multiplication itself keeps full precision.
    pub fn mul_decimal(&self, quantity: Decimal) -> Money {
        Money::new(self.amount * quantity, self.currency.clone())
    }

    /// Ordering within one currency; mixed currencies are not comparable.
    pub fn compare(&self, other: &Money) -> Result<Ordering, ServiceError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    /// Two-fraction-digit presentation, e.g. `USD 12.34`.
    pub fn format(&self) -> String {
        format!("{} {}", self.currency, self.amount.round_dp(DISPLAY_SCALE))
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), ServiceError> {
        if self.currency != other.currency {
            return Err(ServiceError::CurrencyMismatch {
                expected: self.currency.clone(),
                found: other.currency.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}
