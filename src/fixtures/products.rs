//! Product Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, JPY, USD},
};
use serde::Deserialize;

use crate::{fixtures::FixtureError, pricing::minor_units_per_major, products::Product};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product code -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product price (e.g., "32.95 GBP")
    pub price: String,
}

impl ProductFixture {
    /// Convert into a [`Product`] with the given code.
    ///
    /// # Errors
    ///
    /// Returns an error if the price cannot be parsed.
    pub fn into_product(self, code: String) -> Result<Product, FixtureError> {
        let price = parse_price(&self.price)?;

        Ok(Product::new(code, self.name, price))
    }
}

/// Parse price string (e.g., "32.95 GBP") into money
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal with at most the currency's minor-unit
/// precision, or if the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        "JPY" => JPY,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let scale = minor_units_per_major(currency)
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor = amount
        .checked_mul(scale)
        .filter(|value| value.fract().is_zero())
        .and_then(|value| value.to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok(Money::from_minor(minor, currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_reads_major_units() -> Result<(), FixtureError> {
        let price = parse_price("32.95 GBP")?;

        assert_eq!(price.to_minor_units(), 3295);
        assert_eq!(price.currency(), GBP);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99GBP");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_rejects_sub_minor_precision() {
        let result = parse_price("2.995 GBP");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_respects_currency_exponent() -> Result<(), FixtureError> {
        let yen = parse_price("500 JPY")?;
        let dollars = parse_price("1.00 USD")?;

        assert_eq!(yen.to_minor_units(), 500);
        assert_eq!(dollars.to_minor_units(), 100);

        Ok(())
    }

    #[test]
    fn product_fixture_converts_to_product() -> Result<(), FixtureError> {
        let fixture: ProductFixture =
            serde_norway::from_str("name: Red Widget\nprice: 32.95 GBP\n")?;

        let product = fixture.into_product("R01".to_string())?;

        assert_eq!(product.code.as_str(), "R01");
        assert_eq!(product.name, "Red Widget");
        assert_eq!(product.price.to_minor_units(), 3295);

        Ok(())
    }
}
