//! Special Offers
//!
//! Quantity-based offers attached to a single product. The offer record only
//! describes *which* formula applies ([`OfferKind`]) and its parameters; the
//! formula itself is an [`OfferStrategy`] looked up in an [`OfferRegistry`].

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::products::ProductCode;

pub mod half_price_second;
pub mod registry;

pub use half_price_second::HalfPriceSecond;
pub use registry::OfferRegistry;

/// Errors raised while building or evaluating offers.
#[derive(Debug, Error, PartialEq)]
pub enum OfferError {
    /// The offer kind is not known.
    #[error("Unknown offer kind: {0}")]
    UnknownKind(String),

    /// Discount factor outside of `[0, 1]`.
    #[error("Discount factor must be between 0 and 1, got {0}")]
    InvalidDiscountFactor(Decimal),

    /// Minimum quantity below one.
    #[error("Minimum quantity must be at least 1, got {0}")]
    InvalidMinQuantity(u32),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Discount arithmetic overflowed.
    #[error("discount calculation overflowed")]
    Overflow,
}

/// Discriminator selecting the discount formula of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum OfferKind {
    /// Every second unit is discounted by the offer's factor.
    HalfPriceSecond,
}

impl OfferKind {
    /// Storage identifier of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            OfferKind::HalfPriceSecond => "HALF_PRICE_SECOND",
        }
    }
}

impl fmt::Display for OfferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferKind {
    type Err = OfferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HALF_PRICE_SECOND" => Ok(OfferKind::HalfPriceSecond),
            other => Err(OfferError::UnknownKind(other.to_string())),
        }
    }
}

/// Inputs handed to an [`OfferStrategy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfferTerms {
    /// Price of one unit of the product, in major units.
    pub unit_price: Decimal,

    /// Units of the product in the basket.
    pub quantity: u64,

    /// Fraction of the unit price taken off each discounted unit.
    pub discount_factor: Decimal,

    /// Units required before the offer applies.
    pub min_quantity: u32,
}

impl OfferTerms {
    /// Whether the quantity reaches the offer's minimum.
    pub fn qualifies(&self) -> bool {
        self.quantity >= u64::from(self.min_quantity)
    }
}

/// A discount formula for one [`OfferKind`].
pub trait OfferStrategy: fmt::Debug + Send + Sync {
    /// Discount, in major units, for the given terms. Must be zero when the
    /// terms do not qualify and never exceed `unit_price * quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::Overflow`] if the arithmetic overflows.
    fn discount(&self, terms: &OfferTerms) -> Result<Decimal, OfferError>;
}

/// Special offer record for a product
#[derive(Debug, Clone)]
pub struct SpecialOffer {
    product: ProductCode,
    kind: OfferKind,
    discount_factor: Percentage,
    min_quantity: u32,
}

impl SpecialOffer {
    /// Create a new offer.
    ///
    /// # Errors
    ///
    /// - [`OfferError::InvalidDiscountFactor`]: the factor is outside `[0, 1]`.
    /// - [`OfferError::InvalidMinQuantity`]: `min_quantity` is zero.
    pub fn new(
        product: impl Into<ProductCode>,
        kind: OfferKind,
        discount_factor: Percentage,
        min_quantity: u32,
    ) -> Result<Self, OfferError> {
        let factor = discount_factor * Decimal::ONE;

        if factor < Decimal::ZERO || factor > Decimal::ONE {
            return Err(OfferError::InvalidDiscountFactor(factor));
        }

        if min_quantity == 0 {
            return Err(OfferError::InvalidMinQuantity(min_quantity));
        }

        Ok(Self {
            product: product.into(),
            kind,
            discount_factor,
            min_quantity,
        })
    }

    /// Product the offer applies to.
    pub fn product(&self) -> &ProductCode {
        &self.product
    }

    /// Offer kind.
    pub fn kind(&self) -> OfferKind {
        self.kind
    }

    /// Discount factor as a plain decimal fraction (`0.5` for half price).
    pub fn factor(&self) -> Decimal {
        self.discount_factor * Decimal::ONE
    }

    /// Minimum qualifying quantity.
    pub fn min_quantity(&self) -> u32 {
        self.min_quantity
    }

    /// Terms for evaluating this offer against a basket quantity.
    pub fn terms(&self, unit_price: Decimal, quantity: u64) -> OfferTerms {
        OfferTerms {
            unit_price,
            quantity,
            discount_factor: self.factor(),
            min_quantity: self.min_quantity,
        }
    }
}

/// Parse a discount factor (e.g. `"50%"` or `"0.5"`) into a `Percentage`
///
/// # Errors
///
/// Returns [`OfferError::InvalidPercentage`] if the string cannot be parsed
/// or is not a finite number.
pub fn parse_discount_factor(s: &str) -> Result<Percentage, OfferError> {
    let trimmed = s.trim();

    let value = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<f64>()
            .map(|value| value / 100.0)
            .map_err(|_err| OfferError::InvalidPercentage(s.to_string()))?
    } else {
        trimmed
            .parse::<f64>()
            .map_err(|_err| OfferError::InvalidPercentage(s.to_string()))?
    };

    if !value.is_finite() {
        return Err(OfferError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(value))
}
