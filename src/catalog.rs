//! Catalog
//!
//! Read-only source of products, special offers and delivery tiers. A
//! [`Basket`](crate::basket::Basket) prices itself against any [`Catalog`];
//! the crate ships an in-memory provider and a `SQLite` one.

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    delivery::{DeliveryError, DeliveryRule},
    offers::{OfferError, SpecialOffer},
    products::{Product, ProductCode},
};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No delivery rule covers the amount; the tier configuration is broken.
    #[error("no delivery rule matches amount {0}")]
    NoDeliveryRule(Decimal),

    /// Product code already present.
    #[error("product already exists: {0}")]
    DuplicateProduct(ProductCode),

    /// Record references a product that is not in the catalog.
    #[error("Product not found: {0}")]
    UnknownProduct(ProductCode),

    /// Record priced in a currency other than the catalog's.
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// A stored row could not be turned into a domain value.
    #[error("invalid {table} record: {reason}")]
    InvalidRecord {
        /// Table the row came from
        table: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Invalid delivery rule data.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Invalid offer data.
    #[error(transparent)]
    Offer(#[from] OfferError),

    /// Storage failure.
    #[error("storage error")]
    Sqlite(#[from] rusqlite::Error),
}

/// Catalog provider consumed by baskets.
///
/// Lookups are synchronous and never mutate the catalog, so one catalog can
/// back any number of baskets.
pub trait Catalog {
    /// Currency every price in the catalog is expressed in.
    fn currency(&self) -> &'static Currency;

    /// Look up a product by exact code.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the lookup itself fails.
    fn find_product(&self, code: &str) -> Result<Option<Product>, CatalogError>;

    /// All offers stored for a product, in storage order.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the lookup fails or a stored offer is invalid.
    fn find_offers(&self, code: &str) -> Result<Vec<SpecialOffer>, CatalogError>;

    /// The first offer stored for a product, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the lookup fails or a stored offer is invalid.
    fn find_offer(&self, code: &str) -> Result<Option<SpecialOffer>, CatalogError> {
        Ok(self.find_offers(code)?.into_iter().next())
    }

    /// The delivery rule for an amount: the greatest `min_amount <= amount`
    /// whose upper bound (if any) is `>= amount`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NoDeliveryRule`] when no rule matches.
    fn find_delivery_rule(&self, amount: Decimal) -> Result<DeliveryRule, CatalogError>;
}
