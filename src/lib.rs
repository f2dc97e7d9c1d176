//! Acme Basket
//!
//! Shopping basket pricing for the Acme Widget Co catalogue: line items are
//! priced at the time they are added, quantity offers are applied per product,
//! and a delivery charge is chosen from tiers on the discounted amount.
//!
//! ```no_run
//! use acme_basket::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Fixture::from_set("acme")?.catalog()?;
//! let mut basket = Basket::new(&catalog);
//!
//! basket.add("B01")?;
//! basket.add("G01")?;
//!
//! assert_eq!(basket.total()?.to_string(), "£37.85");
//! # Ok(())
//! # }
//! ```

pub mod basket;
pub mod catalog;
pub mod delivery;
pub mod fixtures;
pub mod items;
pub mod offers;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
