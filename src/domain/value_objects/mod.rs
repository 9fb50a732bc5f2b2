//! Value objects shared across the storefront domain.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money value object. The marketplace trades in MYR only, but the currency
/// tag travels with the amount so mixed-currency bugs surface as errors
/// instead of silent additions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn myr(amount: Decimal) -> Self { Self::new(amount, "MYR") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn is_zero(&self) -> bool { self.amount.is_zero() }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
    /// Scales the amount by an arbitrary factor (tax rates, percentages).
    pub fn scale(&self, factor: Decimal) -> Money { Money::new(self.amount * factor, &self.currency) }
    /// Rounds half-up to two decimal places, the way prices are displayed.
    pub fn round_2dp(&self) -> Money {
        Money::new(self.amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero), &self.currency)
    }
}

impl Default for Money { fn default() -> Self { Self::zero("MYR") } }

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = if self.currency == "MYR" { "RM" } else { self.currency.as_str() };
        write!(f, "{} {:.2}", symbol, self.amount)
    }
}

#[derive(Debug, Clone)] pub enum MoneyError { CurrencyMismatch }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Currency mismatch") }
}

/// Display language for localized catalog fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ms,
    Zh,
}

impl Language {
    /// Unrecognized tags fall back to English rather than erroring.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "ms" => Self::Ms,
            "zh" => Self::Zh,
            _ => Self::En,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_add() {
        let a = Money::myr(Decimal::new(100, 0));
        let b = Money::myr(Decimal::new(50, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
    }

    #[test]
    fn test_money_mismatch() {
        let a = Money::myr(Decimal::ONE);
        let b = Money::new(Decimal::ONE, "USD");
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::myr(Decimal::new(3050, 2)).to_string(), "RM 30.50");
        assert_eq!(Money::myr(Decimal::new(204, 0)).to_string(), "RM 204.00");
    }

    #[test]
    fn test_round_half_up() {
        let m = Money::myr(Decimal::new(10125, 3)); // 10.125
        assert_eq!(m.round_2dp().amount(), Decimal::new(1013, 2));
    }

    #[test]
    fn test_language_fallback() {
        assert_eq!(Language::from_tag("ms"), Language::Ms);
        assert_eq!(Language::from_tag("ZH"), Language::Zh);
        assert_eq!(Language::from_tag("fr"), Language::En);
    }
}
