//! Acme Basket prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    basket::{Basket, BasketError},
    catalog::{Catalog, CatalogError, MemoryCatalog, SqliteCatalog, sqlite::SeedSummary},
    delivery::{DeliveryError, DeliveryRule, DeliveryRules},
    fixtures::{Fixture, FixtureError},
    items::Item,
    offers::{
        HalfPriceSecond, OfferError, OfferKind, OfferRegistry, OfferStrategy, OfferTerms,
        SpecialOffer,
    },
    pricing::{ROUNDING, TotalPriceError},
    products::{Product, ProductCode, ProductKey},
    receipt::{DiscountLine, Receipt, ReceiptError, ReceiptLine},
};
