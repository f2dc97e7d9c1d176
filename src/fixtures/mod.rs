//! Fixtures
//!
//! YAML seed data laid out as `<base>/<category>/<set>.yml`, where category is
//! one of `products`, `offers` or `delivery`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rusty_money::{Money, iso::Currency};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    catalog::{CatalogError, MemoryCatalog},
    delivery::{DeliveryError, DeliveryRule},
    fixtures::{delivery::DeliveryFixture, offers::OffersFixture, products::ProductsFixture},
    offers::{OfferError, SpecialOffer},
    products::Product,
};

pub mod delivery;
pub mod offers;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between records
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Invalid offer data
    #[error(transparent)]
    Offer(#[from] OfferError),

    /// Invalid delivery tier data
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Catalog could not be assembled
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Currency shared by every loaded record
    currency: Option<&'static Currency>,

    products: Vec<Product>,
    offers: Vec<SpecialOffer>,
    delivery_rules: Vec<DeliveryRule>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            currency: None,
            products: Vec::new(),
            offers: Vec::new(),
            delivery_rules: Vec::new(),
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// Products are kept ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = self.read("products", name)?;

        let mut products = fixture
            .products
            .into_iter()
            .map(|(code, product)| product.into_product(code))
            .collect::<Result<Vec<_>, _>>()?;

        products.sort_by(|a, b| a.code.cmp(&b.code));

        for product in products {
            self.check_currency(&product.price)?;
            self.products.push(product);
        }

        Ok(self)
    }

    /// Load special offers from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, if an offer is
    /// invalid, or if it references a product that has not been loaded.
    pub fn load_offers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: OffersFixture = self.read("offers", name)?;

        for offer_fixture in fixture.offers {
            if self.product(&offer_fixture.product).is_none() {
                return Err(FixtureError::ProductNotFound(offer_fixture.product));
            }

            self.offers.push(SpecialOffer::try_from(offer_fixture)?);
        }

        Ok(self)
    }

    /// Load delivery tiers from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, if a tier is
    /// invalid, or if there are currency mismatches.
    pub fn load_delivery(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: DeliveryFixture = self.read("delivery", name)?;

        for rule_fixture in fixture.delivery {
            let rule = DeliveryRule::try_from(rule_fixture)?;

            self.check_currency(rule.min_amount())?;
            self.delivery_rules.push(rule);
        }

        Ok(self)
    }

    /// Load a complete fixture set (products, offers, and delivery tiers with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture
            .load_products(name)?
            .load_offers(name)?
            .load_delivery(name)?;

        Ok(fixture)
    }

    /// Build a validated in-memory catalog from everything loaded
    ///
    /// # Errors
    ///
    /// - [`FixtureError::NoCurrency`]: nothing has been loaded.
    /// - [`FixtureError::Catalog`]: duplicate products, or delivery tiers that
    ///   leave gaps, overlap, or do not cover every amount.
    pub fn catalog(&self) -> Result<MemoryCatalog, FixtureError> {
        let mut catalog = MemoryCatalog::new(self.currency()?);

        for product in &self.products {
            catalog.insert_product(product.clone())?;
        }

        for offer in &self.offers {
            catalog.insert_offer(offer.clone())?;
        }

        for rule in &self.delivery_rules {
            catalog.insert_delivery_rule(*rule)?;
        }

        catalog.validate()?;

        Ok(catalog)
    }

    /// Get a loaded product by code
    pub fn product(&self, code: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|product| product.code.as_str() == code)
    }

    /// Get all products, ordered by code
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Get all offers, in file order
    pub fn offers(&self) -> &[SpecialOffer] {
        &self.offers
    }

    /// Get all delivery tiers, in file order
    pub fn delivery_rules(&self) -> &[DeliveryRule] {
        &self.delivery_rules
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products or delivery tiers have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Base path fixture files are read from
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn read<T: DeserializeOwned>(&self, category: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    fn check_currency(&mut self, money: &Money<'static, Currency>) -> Result<(), FixtureError> {
        let currency = money.currency();

        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            Some(_) => Ok(()),
            None => {
                self.currency = Some(currency);

                Ok(())
            }
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
