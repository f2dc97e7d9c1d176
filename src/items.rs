//! Items

use rusty_money::{Money, iso::Currency};

use crate::products::{Product, ProductCode};

/// A single basket unit: the product code and the price it was added at.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    product: ProductCode,
    price: Money<'static, Currency>,
}

impl Item {
    /// Creates a new item with the given product code and price.
    pub fn new(product: impl Into<ProductCode>, price: Money<'static, Currency>) -> Self {
        Self {
            product: product.into(),
            price,
        }
    }

    /// Snapshot the current code and price of a catalog product.
    pub fn from_product(product: &Product) -> Self {
        Self {
            product: product.code.clone(),
            price: product.price,
        }
    }

    /// Returns the product code of the item
    pub fn product(&self) -> &ProductCode {
        &self.product
    }

    /// Returns the price of the item
    pub fn price(&self) -> &Money<'static, Currency> {
        &self.price
    }
}

/// Returns the cheapest item in a list of items
pub fn cheapest_item<'a, I>(items: I) -> Option<&'a Item>
where
    I: IntoIterator<Item = &'a Item>,
{
    items
        .into_iter()
        .min_by_key(|item| item.price().to_minor_units())
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;

    use super::*;

    #[test]
    fn test_cheapest_item() {
        let items = [
            Item::new("R01", Money::from_minor(3295, GBP)),
            Item::new("B01", Money::from_minor(795, GBP)),
            Item::new("G01", Money::from_minor(2495, GBP)),
        ];

        let cheapest = cheapest_item(&items).map(Item::product);

        assert_eq!(cheapest, Some(&ProductCode::from("B01")));
    }

    #[test]
    fn cheapest_item_of_nothing_is_none() {
        let items: [Item; 0] = [];

        assert!(cheapest_item(&items).is_none());
    }

    #[test]
    fn from_product_snapshots_price() {
        let mut product = Product::new("R01", "Red Widget", Money::from_minor(3295, GBP));
        let item = Item::from_product(&product);

        product.price = Money::from_minor(100, GBP);

        assert_eq!(item.product(), &ProductCode::from("R01"));
        assert_eq!(item.price(), &Money::from_minor(3295, GBP));
    }
}
