//! `SQLite` catalog
//!
//! Money columns hold integer minor units; `discount_value` holds the decimal
//! factor as text so seeded values stay exact.

use std::path::Path;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusqlite::{Connection, OptionalExtension, params};
use rusty_money::{Money, iso::Currency};
use tracing::{debug, info};

use crate::{
    catalog::{Catalog, CatalogError, MemoryCatalog},
    delivery::DeliveryRule,
    offers::{OfferKind, SpecialOffer, parse_discount_factor},
    pricing::minor_units_per_major,
    products::Product,
};

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS products (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    price INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS delivery_rules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    min_amount INTEGER NOT NULL,
    max_amount INTEGER NULL,
    delivery_cost INTEGER NOT NULL,
    UNIQUE (min_amount)
);

CREATE TABLE IF NOT EXISTS special_offers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_code TEXT NOT NULL,
    offer_type TEXT NOT NULL,
    discount_value TEXT NOT NULL,
    min_quantity INTEGER NOT NULL,
    FOREIGN KEY (product_code) REFERENCES products(code),
    UNIQUE (product_code, offer_type, discount_value, min_quantity)
);
";

const GET_PRODUCT_SQL: &str = "SELECT code, name, price FROM products WHERE code = ?1";

const LIST_OFFERS_SQL: &str = "
SELECT offer_type, discount_value, min_quantity
FROM special_offers
WHERE product_code = ?1
ORDER BY id
";

const FIND_DELIVERY_RULE_SQL: &str = "
SELECT min_amount, max_amount, delivery_cost
FROM delivery_rules
WHERE min_amount <= ?1
AND (max_amount IS NULL OR max_amount >= ?1)
ORDER BY min_amount DESC
LIMIT 1
";

const INSERT_PRODUCT_SQL: &str =
    "INSERT OR IGNORE INTO products (code, name, price) VALUES (?1, ?2, ?3)";

const INSERT_DELIVERY_RULE_SQL: &str = "
INSERT OR IGNORE INTO delivery_rules (min_amount, max_amount, delivery_cost)
VALUES (?1, ?2, ?3)
";

const INSERT_OFFER_SQL: &str = "
INSERT OR IGNORE INTO special_offers (product_code, offer_type, discount_value, min_quantity)
VALUES (?1, ?2, ?3, ?4)
";

/// Row counts written by [`SqliteCatalog::seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Product rows inserted
    pub products: usize,
    /// Offer rows inserted
    pub offers: usize,
    /// Delivery rule rows inserted
    pub delivery_rules: usize,
}

/// Catalog backed by a `SQLite` database.
#[derive(Debug)]
pub struct SqliteCatalog {
    conn: Connection,
    currency: &'static Currency,
}

impl SqliteCatalog {
    /// Open (or create) a database file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Sqlite`] if the database cannot be opened.
    pub fn open(path: impl AsRef<Path>, currency: &'static Currency) -> Result<Self, CatalogError> {
        Self::from_connection(Connection::open(path)?, currency)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Sqlite`] if the database cannot be opened.
    pub fn open_in_memory(currency: &'static Currency) -> Result<Self, CatalogError> {
        Self::from_connection(Connection::open_in_memory()?, currency)
    }

    /// Wrap an existing connection. Enables foreign key enforcement.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Sqlite`] if the connection cannot be configured.
    pub fn from_connection(
        conn: Connection,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn, currency })
    }

    /// Create the catalog tables if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Sqlite`] if the schema cannot be created.
    pub fn initialize(&self) -> Result<(), CatalogError> {
        self.conn.execute_batch(SCHEMA_SQL)?;

        debug!("catalog schema ready");

        Ok(())
    }

    /// Copy every product, offer and delivery tier of `source` into the
    /// database in a single transaction. Existing rows with the same primary
    /// key are left alone. Nothing is written if any insert fails.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::CurrencyMismatch`]: `source` is priced in another currency.
    /// - [`CatalogError::Sqlite`]: an insert failed; the transaction is rolled back.
    #[tracing::instrument(name = "catalog.sqlite.seed", skip_all, err)]
    pub fn seed(&mut self, source: &MemoryCatalog) -> Result<SeedSummary, CatalogError> {
        if source.currency() != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                self.currency.iso_alpha_code,
                source.currency().iso_alpha_code,
            ));
        }

        let tx = self.conn.transaction()?;
        let mut summary = SeedSummary::default();

        {
            let mut insert_product = tx.prepare(INSERT_PRODUCT_SQL)?;

            for product in source.products() {
                summary.products += insert_product.execute(params![
                    product.code.as_str(),
                    product.name,
                    product.price.to_minor_units()
                ])?;
            }

            let mut insert_rule = tx.prepare(INSERT_DELIVERY_RULE_SQL)?;

            for rule in source.delivery_rules().iter() {
                summary.delivery_rules += insert_rule.execute(params![
                    rule.min_amount().to_minor_units(),
                    rule.max_amount().map(Money::to_minor_units),
                    rule.cost().to_minor_units()
                ])?;
            }

            let mut insert_offer = tx.prepare(INSERT_OFFER_SQL)?;

            for offer in source.offers() {
                summary.offers += insert_offer.execute(params![
                    offer.product().as_str(),
                    offer.kind().as_str(),
                    offer.factor().to_string(),
                    offer.min_quantity()
                ])?;
            }
        }

        tx.commit()?;

        info!(
            products = summary.products,
            offers = summary.offers,
            delivery_rules = summary.delivery_rules,
            "seeded catalog"
        );

        Ok(summary)
    }

    fn money(&self, minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, self.currency)
    }
}

impl Catalog for SqliteCatalog {
    fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn find_product(&self, code: &str) -> Result<Option<Product>, CatalogError> {
        let row = self
            .conn
            .query_row(GET_PRODUCT_SQL, [code], |row| {
                Ok((
                    row.get::<_, String>("code")?,
                    row.get::<_, String>("name")?,
                    row.get::<_, i64>("price")?,
                ))
            })
            .optional()?;

        Ok(row.map(|(code, name, price)| Product::new(code, name, self.money(price))))
    }

    fn find_offers(&self, code: &str) -> Result<Vec<SpecialOffer>, CatalogError> {
        let mut stmt = self.conn.prepare_cached(LIST_OFFERS_SQL)?;

        let rows = stmt
            .query_map([code], |row| {
                Ok((
                    row.get::<_, String>("offer_type")?,
                    row.get::<_, String>("discount_value")?,
                    row.get::<_, i64>("min_quantity")?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(offer_type, discount_value, min_quantity)| -> Result<_, CatalogError> {
                let kind: OfferKind = offer_type.parse()?;
                let factor = parse_discount_factor(&discount_value)?;
                let min_quantity =
                    u32::try_from(min_quantity).map_err(|err| CatalogError::InvalidRecord {
                        table: "special_offers",
                        reason: format!("min_quantity {min_quantity}: {err}"),
                    })?;

                Ok(SpecialOffer::new(code, kind, factor, min_quantity)?)
            })
            .collect()
    }

    fn find_delivery_rule(&self, amount: Decimal) -> Result<DeliveryRule, CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidRecord {
            table: "delivery_rules",
            reason,
        };

        let scale = minor_units_per_major(self.currency)
            .map_err(|err| invalid(err.to_string()))?;

        // Bound as REAL: amounts can carry fractions of a minor unit.
        let minor_amount = amount
            .checked_mul(scale)
            .and_then(|minor| minor.to_f64())
            .ok_or_else(|| invalid(format!("amount {amount} out of range")))?;

        let row = self
            .conn
            .query_row(FIND_DELIVERY_RULE_SQL, [minor_amount], |row| {
                Ok((
                    row.get::<_, i64>("min_amount")?,
                    row.get::<_, Option<i64>>("max_amount")?,
                    row.get::<_, i64>("delivery_cost")?,
                ))
            })
            .optional()?;

        let (min, max, cost) = row.ok_or(CatalogError::NoDeliveryRule(amount))?;

        let rule = DeliveryRule::new(
            self.money(min),
            max.map(|max| self.money(max)),
            self.money(cost),
        )?;

        debug!(%amount, cost = %rule.cost(), "resolved delivery tier");

        Ok(rule)
    }
}
