//! Basket
//!
//! A basket collects line items for one checkout and prices them against a
//! [`Catalog`]:
//!
//! 1. subtotal: the sum of every item price, kept exact;
//! 2. discount: items are grouped by product and each product's offers are
//!    evaluated through the [`OfferRegistry`]; the largest qualifying discount
//!    per product wins;
//! 3. delivery: the catalog's tier for `subtotal - discount`, settled to the
//!    currency's minor unit;
//! 4. total: `subtotal - discount + delivery`, settled half away from zero.
//!
//! Item prices are snapshotted when added; offers and delivery tiers are read
//! from the catalog each time the basket is priced.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError},
    items::{Item, cheapest_item},
    offers::{OfferError, OfferKind, OfferRegistry},
    pricing::{TotalPriceError, round_to_minor, to_decimal, total_price},
    products::ProductCode,
    receipt::{DiscountLine, Receipt, ReceiptLine},
};

/// Errors related to basket construction or totals.
#[derive(Debug, Error)]
pub enum BasketError {
    /// Quantity must be a positive integer.
    #[error("Quantity must be greater than zero")]
    InvalidQuantity,

    /// The product code is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A product carries an offer whose kind has no registered strategy.
    #[error("No discount strategy registered for offer kind {0}")]
    UnsupportedOfferKind(OfferKind),

    /// Catalog lookup failure, including a missing delivery tier.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Discount evaluation failure.
    #[error(transparent)]
    Offer(#[from] OfferError),

    /// Money arithmetic failure.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),
}

/// Basket
#[derive(Debug)]
pub struct Basket<'c, C: Catalog + ?Sized> {
    catalog: &'c C,
    registry: OfferRegistry,
    items: Vec<Item>,
}

/// Every item of one product in the basket.
struct ProductGroup<'b> {
    items: SmallVec<[&'b Item; 4]>,
}

impl ProductGroup<'_> {
    fn quantity(&self) -> u64 {
        self.items.len() as u64
    }

    fn cheapest(&self) -> Option<&Item> {
        cheapest_item(self.items.iter().copied())
    }

    fn line_total(&self) -> Decimal {
        self.items.iter().map(|item| to_decimal(item.price())).sum()
    }
}

impl<'c, C: Catalog + ?Sized> Basket<'c, C> {
    /// Create an empty basket using the default offer strategies.
    pub fn new(catalog: &'c C) -> Self {
        Self::with_registry(catalog, OfferRegistry::default())
    }

    /// Create an empty basket with a custom set of offer strategies.
    pub fn with_registry(catalog: &'c C, registry: OfferRegistry) -> Self {
        Basket {
            catalog,
            registry,
            items: Vec::new(),
        }
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// See [`Basket::add_quantity`].
    pub fn add(&mut self, code: &str) -> Result<(), BasketError> {
        self.add_quantity(code, 1)
    }

    /// Add `quantity` units of a product at its current catalog price.
    ///
    /// The basket is left unchanged when this fails.
    ///
    /// # Errors
    ///
    /// - [`BasketError::InvalidQuantity`]: `quantity` is zero.
    /// - [`BasketError::ProductNotFound`]: the code is not in the catalog.
    /// - [`BasketError::Catalog`]: the catalog lookup failed.
    #[tracing::instrument(name = "basket.add", skip(self), err)]
    pub fn add_quantity(&mut self, code: &str, quantity: u32) -> Result<(), BasketError> {
        if quantity == 0 {
            return Err(BasketError::InvalidQuantity);
        }

        let product = self
            .catalog
            .find_product(code)?
            .ok_or_else(|| BasketError::ProductNotFound(code.to_string()))?;

        let item = Item::from_product(&product);

        self.items.extend((0..quantity).map(|_unit| item.clone()));

        debug!(price = %product.price, items = self.items.len(), "added to basket");

        Ok(())
    }

    /// Total payable, rounded to the currency's minor unit.
    ///
    /// # Errors
    ///
    /// See [`Basket::receipt`].
    pub fn total(&self) -> Result<Money<'static, Currency>, BasketError> {
        Ok(self.receipt()?.total())
    }

    /// Price the basket and return the full breakdown.
    ///
    /// An empty basket prices to zero without consulting the catalog.
    ///
    /// # Errors
    ///
    /// - [`BasketError::Catalog`]: a lookup failed or no delivery tier matched.
    /// - [`BasketError::UnsupportedOfferKind`]: an offer has no registered strategy.
    /// - [`BasketError::Offer`]: discount arithmetic overflowed.
    /// - [`BasketError::TotalPrice`]: money arithmetic failed.
    #[tracing::instrument(name = "basket.total", skip(self), fields(items = self.items.len()), err)]
    pub fn receipt(&self) -> Result<Receipt, BasketError> {
        let currency = self.catalog.currency();

        if self.is_empty() {
            return Ok(Receipt::empty(currency));
        }

        let subtotal = to_decimal(&total_price(&self.items)?);
        let groups = self.groups();

        let lines = groups
            .iter()
            .map(|(code, group)| {
                let unit_price = group
                    .cheapest()
                    .map(|item| *item.price())
                    .ok_or(TotalPriceError::NoItems)?;

                Ok(ReceiptLine {
                    product: (*code).clone(),
                    quantity: group.quantity(),
                    unit_price,
                    line_total: group.line_total(),
                })
            })
            .collect::<Result<SmallVec<[ReceiptLine; 4]>, BasketError>>()?;

        let discounts = self.discounts(&lines)?;
        let discount: Decimal = discounts.iter().map(|line| line.amount).sum();

        let discounted = subtotal - discount;
        let tier_amount = to_decimal(&round_to_minor(discounted, currency)?);
        let delivery = *self.catalog.find_delivery_rule(tier_amount)?.cost();

        let total = round_to_minor(discounted + to_decimal(&delivery), currency)?;

        debug!(
            %subtotal,
            %discount,
            delivery = %delivery,
            total = %total,
            "priced basket"
        );

        Ok(Receipt::new(lines, discounts, subtotal, delivery, total, currency))
    }

    /// Best discount per product. Offers are fetched fresh from the catalog.
    fn discounts(&self, lines: &[ReceiptLine]) -> Result<SmallVec<[DiscountLine; 4]>, BasketError> {
        let mut discounts = SmallVec::new();

        for line in lines {
            let mut best: Option<DiscountLine> = None;

            for offer in self.catalog.find_offers(line.product.as_str())? {
                let terms = offer.terms(to_decimal(&line.unit_price), line.quantity);

                if !terms.qualifies() {
                    continue;
                }

                let strategy = self
                    .registry
                    .get(offer.kind())
                    .ok_or(BasketError::UnsupportedOfferKind(offer.kind()))?;

                let amount = strategy.discount(&terms)?;

                if best.as_ref().is_none_or(|current| amount > current.amount) {
                    best = Some(DiscountLine {
                        product: line.product.clone(),
                        kind: offer.kind(),
                        quantity: line.quantity,
                        amount,
                    });
                }
            }

            if let Some(discount) = best.filter(|discount| !discount.amount.is_zero()) {
                discounts.push(discount);
            }
        }

        Ok(discounts)
    }

    fn groups(&self) -> BTreeMap<&ProductCode, ProductGroup<'_>> {
        let mut groups: BTreeMap<&ProductCode, ProductGroup<'_>> = BTreeMap::new();

        for item in &self.items {
            groups
                .entry(item.product())
                .or_insert_with(|| ProductGroup {
                    items: SmallVec::new(),
                })
                .items
                .push(item);
        }

        groups
    }

    /// Iterate over the items in the basket.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Get the number of items in the basket.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the basket is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
