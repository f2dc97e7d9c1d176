//! Products

use std::{borrow::Borrow, fmt};

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Catalog code identifying a product (e.g. `R01`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductCode(String);

impl ProductCode {
    /// Create a product code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for ProductCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl Borrow<str> for ProductCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProductCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product code
    pub code: ProductCode,

    /// Product name
    pub name: String,

    /// Product price
    pub price: Money<'static, Currency>,
}

impl Product {
    /// Create a new product.
    pub fn new(
        code: impl Into<ProductCode>,
        name: impl Into<String>,
        price: Money<'static, Currency>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            price,
        }
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashMap;
    use rusty_money::iso::GBP;

    use super::*;

    #[test]
    fn product_code_displays_as_raw_code() {
        let code = ProductCode::from("R01");

        assert_eq!(code.to_string(), "R01");
        assert_eq!(code.as_str(), "R01");
    }

    #[test]
    fn product_code_map_lookup_by_str() {
        let mut map = FxHashMap::default();

        map.insert(ProductCode::from("G01"), 1);

        assert_eq!(map.get("G01"), Some(&1));
        assert_eq!(map.get("B01"), None);
    }

    #[test]
    fn new_product_keeps_fields() {
        let product = Product::new("B01", "Blue Widget", Money::from_minor(795, GBP));

        assert_eq!(product.code, ProductCode::from("B01"));
        assert_eq!(product.name, "Blue Widget");
        assert_eq!(product.price.to_minor_units(), 795);
    }
}
