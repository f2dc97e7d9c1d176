//! Pricing
//!
//! Money helpers shared by the basket and the catalog providers. Intermediate
//! amounts are carried as exact [`Decimal`] values in major units and only
//! rounded back into [`Money`] at the end of a calculation.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::items::Item;

/// Rounding applied whenever an amount is settled to the currency's minor unit.
///
/// Midpoints round away from zero, so `54.375` becomes `54.38`.
pub const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// No items were provided, so currency could not be determined.
    #[error("no items provided; cannot determine currency")]
    NoItems,

    /// An amount does not fit into the minor-unit range.
    #[error("amount {0} is out of range")]
    OutOfRange(Decimal),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates the total price of a list of items
///
/// # Errors
///
/// - [`TotalPriceError::NoItems`]: No items were provided, so currency could not be determined.
/// - [`TotalPriceError::Money`]: Wrapped money arithmetic or currency mismatch error.
pub fn total_price(items: &[Item]) -> Result<Money<'static, Currency>, TotalPriceError> {
    let first = items.first().ok_or(TotalPriceError::NoItems)?;

    let total = items.iter().try_fold(
        Money::from_minor(0, first.price().currency()),
        |acc, item| acc.add(*item.price()),
    )?;

    Ok(total)
}

/// Exact decimal value of an amount of money, in major units.
pub fn to_decimal(money: &Money<'_, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), money.currency().exponent)
}

/// Settle a decimal amount to the currency's minor unit using [`ROUNDING`].
///
/// # Errors
///
/// Returns [`TotalPriceError::OutOfRange`] if the rounded amount does not fit
/// into `i64` minor units.
pub fn round_to_minor(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, TotalPriceError> {
    let mut rounded = amount.round_dp_with_strategy(currency.exponent, ROUNDING);

    rounded.rescale(currency.exponent);

    let minor = i64::try_from(rounded.mantissa())
        .map_err(|_err| TotalPriceError::OutOfRange(amount))?;

    Ok(Money::from_minor(minor, currency))
}

/// Number of minor units in one major unit of the currency (100 for GBP).
///
/// # Errors
///
/// Returns [`TotalPriceError::OutOfRange`] for an exponent too large to represent.
pub fn minor_units_per_major(currency: &Currency) -> Result<Decimal, TotalPriceError> {
    10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .ok_or(TotalPriceError::OutOfRange(Decimal::from(currency.exponent)))
}
