//! In-memory catalog

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError},
    delivery::{DeliveryRule, DeliveryRules},
    offers::SpecialOffer,
    products::{Product, ProductCode, ProductKey},
};

/// Catalog held entirely in memory.
#[derive(Debug)]
pub struct MemoryCatalog {
    currency: &'static Currency,

    /// Products by generated key, plus code -> key lookup
    products: SlotMap<ProductKey, Product>,
    product_keys: FxHashMap<ProductCode, ProductKey>,

    /// Offers per product, in insertion order
    offers: FxHashMap<ProductKey, SmallVec<[SpecialOffer; 1]>>,

    delivery_rules: DeliveryRules,
}

impl MemoryCatalog {
    /// Create an empty catalog priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            products: SlotMap::with_key(),
            product_keys: FxHashMap::default(),
            offers: FxHashMap::default(),
            delivery_rules: DeliveryRules::default(),
        }
    }

    /// Builder form of [`MemoryCatalog::insert_product`].
    ///
    /// # Errors
    ///
    /// See [`MemoryCatalog::insert_product`].
    pub fn with_product(mut self, product: Product) -> Result<Self, CatalogError> {
        self.insert_product(product)?;

        Ok(self)
    }

    /// Builder form of [`MemoryCatalog::insert_offer`].
    ///
    /// # Errors
    ///
    /// See [`MemoryCatalog::insert_offer`].
    pub fn with_offer(mut self, offer: SpecialOffer) -> Result<Self, CatalogError> {
        self.insert_offer(offer)?;

        Ok(self)
    }

    /// Builder form of [`MemoryCatalog::insert_delivery_rule`].
    ///
    /// # Errors
    ///
    /// See [`MemoryCatalog::insert_delivery_rule`].
    pub fn with_delivery_rule(mut self, rule: DeliveryRule) -> Result<Self, CatalogError> {
        self.insert_delivery_rule(rule)?;

        Ok(self)
    }

    /// Add a product.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::CurrencyMismatch`]: the price is in another currency.
    /// - [`CatalogError::DuplicateProduct`]: the code is already present.
    pub fn insert_product(&mut self, product: Product) -> Result<ProductKey, CatalogError> {
        self.check_currency(&product.price)?;

        if self.product_keys.contains_key(&product.code) {
            return Err(CatalogError::DuplicateProduct(product.code));
        }

        let code = product.code.clone();
        let key = self.products.insert(product);

        self.product_keys.insert(code, key);

        Ok(key)
    }

    /// Attach an offer to an existing product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownProduct`] if the offer's product is not in the catalog.
    pub fn insert_offer(&mut self, offer: SpecialOffer) -> Result<(), CatalogError> {
        let key = self
            .product_keys
            .get(offer.product())
            .copied()
            .ok_or_else(|| CatalogError::UnknownProduct(offer.product().clone()))?;

        self.offers.entry(key).or_default().push(offer);

        Ok(())
    }

    /// Add a delivery tier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CurrencyMismatch`] if the rule is in another currency.
    pub fn insert_delivery_rule(&mut self, rule: DeliveryRule) -> Result<(), CatalogError> {
        self.check_currency(rule.min_amount())?;
        self.delivery_rules.insert(rule);

        Ok(())
    }

    /// Change the price of an existing product.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::UnknownProduct`]: no product has this code.
    /// - [`CatalogError::CurrencyMismatch`]: the price is in another currency.
    pub fn set_price(
        &mut self,
        code: &str,
        price: Money<'static, Currency>,
    ) -> Result<(), CatalogError> {
        self.check_currency(&price)?;

        let product = self
            .product_keys
            .get(code)
            .and_then(|key| self.products.get_mut(*key))
            .ok_or_else(|| CatalogError::UnknownProduct(ProductCode::from(code)))?;

        product.price = price;

        Ok(())
    }

    /// Check the delivery tiers cover every non-negative amount exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Delivery`] describing the first problem found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        Ok(self.delivery_rules.validate()?)
    }

    /// Products in insertion order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Offers grouped by product, products in insertion order.
    pub fn offers(&self) -> impl Iterator<Item = &SpecialOffer> {
        self.products
            .keys()
            .filter_map(|key| self.offers.get(&key))
            .flatten()
    }

    /// Delivery tiers.
    pub fn delivery_rules(&self) -> &DeliveryRules {
        &self.delivery_rules
    }

    fn check_currency(&self, money: &Money<'static, Currency>) -> Result<(), CatalogError> {
        if money.currency() == self.currency {
            Ok(())
        } else {
            Err(CatalogError::CurrencyMismatch(
                self.currency.iso_alpha_code,
                money.currency().iso_alpha_code,
            ))
        }
    }
}

impl Catalog for MemoryCatalog {
    fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn find_product(&self, code: &str) -> Result<Option<Product>, CatalogError> {
        Ok(self
            .product_keys
            .get(code)
            .and_then(|key| self.products.get(*key))
            .cloned())
    }

    fn find_offers(&self, code: &str) -> Result<Vec<SpecialOffer>, CatalogError> {
        Ok(self
            .product_keys
            .get(code)
            .and_then(|key| self.offers.get(key))
            .map(|offers| offers.to_vec())
            .unwrap_or_default())
    }

    fn find_delivery_rule(&self, amount: Decimal) -> Result<DeliveryRule, CatalogError> {
        let rule = self
            .delivery_rules
            .resolve(amount)
            .copied()
            .ok_or(CatalogError::NoDeliveryRule(amount))?;

        debug!(%amount, cost = %rule.cost(), "resolved delivery tier");

        Ok(rule)
    }
}
