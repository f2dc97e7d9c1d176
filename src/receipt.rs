//! Receipt

use std::io;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    offers::OfferKind,
    pricing::{TotalPriceError, round_to_minor},
    products::ProductCode,
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error settling an amount to minor units.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// All units of one product in the basket.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    /// Product code
    pub product: ProductCode,

    /// Units in the basket
    pub quantity: u64,

    /// Lowest price any unit was added at
    pub unit_price: Money<'static, Currency>,

    /// Sum of the unit prices of every line item for this product
    pub line_total: Decimal,
}

/// Discount granted on one product.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountLine {
    /// Product code
    pub product: ProductCode,

    /// Offer that produced the discount
    pub kind: OfferKind,

    /// Units the offer was evaluated against
    pub quantity: u64,

    /// Unrounded discount amount
    pub amount: Decimal,
}

/// Priced breakdown of a basket.
///
/// Subtotal and discount are exact; delivery and total are settled money.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    lines: SmallVec<[ReceiptLine; 4]>,
    discounts: SmallVec<[DiscountLine; 4]>,
    subtotal: Decimal,
    discount: Decimal,
    delivery: Money<'static, Currency>,
    total: Money<'static, Currency>,
    currency: &'static Currency,
}

impl Receipt {
    /// Create a new receipt with the given details.
    pub fn new(
        lines: SmallVec<[ReceiptLine; 4]>,
        discounts: SmallVec<[DiscountLine; 4]>,
        subtotal: Decimal,
        delivery: Money<'static, Currency>,
        total: Money<'static, Currency>,
        currency: &'static Currency,
    ) -> Self {
        let discount = discounts.iter().map(|line| line.amount).sum();

        Self {
            lines,
            discounts,
            subtotal,
            discount,
            delivery,
            total,
            currency,
        }
    }

    /// Receipt for a basket with nothing in it.
    pub fn empty(currency: &'static Currency) -> Self {
        let zero = Money::from_minor(0, currency);

        Self::new(
            SmallVec::new(),
            SmallVec::new(),
            Decimal::ZERO,
            zero,
            zero,
            currency,
        )
    }

    /// Per-product lines, ordered by product code.
    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Discounts granted, ordered by product code.
    pub fn discounts(&self) -> &[DiscountLine] {
        &self.discounts
    }

    /// Sum of every item price.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Total discount granted.
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    /// Subtotal less discount; the amount delivery is charged on.
    pub fn discounted_subtotal(&self) -> Decimal {
        self.subtotal - self.discount
    }

    /// Delivery charge
    pub fn delivery(&self) -> Money<'static, Currency> {
        self.delivery
    }

    /// Amount payable, rounded to the currency's minor unit.
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Currency of the receipt.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Write a table of lines, discounts and totals.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if an amount cannot be formatted or writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Product", "Qty", "Unit Price", "Amount"]);

        for line in &self.lines {
            builder.push_record([
                line.product.to_string(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                self.format(line.line_total)?,
            ]);
        }

        for discount in &self.discounts {
            builder.push_record([
                format!("{} ({})", discount.product, discount.kind),
                discount.quantity.to_string(),
                String::new(),
                format!("-{}", self.format(discount.amount)?),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| ReceiptError::IO)?;

        for (label, value) in [
            ("Subtotal", self.format(self.subtotal)?),
            ("Discount", self.format(self.discount)?),
            ("Delivery", self.delivery.to_string()),
            ("Total", self.total.to_string()),
        ] {
            writeln!(out, " {label:<9} {value:>12}").map_err(|_err| ReceiptError::IO)?;
        }

        Ok(())
    }

    fn format(&self, amount: Decimal) -> Result<String, ReceiptError> {
        Ok(round_to_minor(amount, self.currency)?.to_string())
    }
}
