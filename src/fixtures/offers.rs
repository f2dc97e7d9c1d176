//! Offer Fixtures

use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    offers::{OfferKind, SpecialOffer, parse_discount_factor},
};

/// Wrapper for offers in YAML
#[derive(Debug, Deserialize)]
pub struct OffersFixture {
    /// Offers, in storage order
    pub offers: Vec<OfferFixture>,
}

/// Offer fixture from YAML
#[derive(Debug, Deserialize)]
pub struct OfferFixture {
    /// Product code the offer applies to
    pub product: String,

    /// Offer kind identifier (e.g., `HALF_PRICE_SECOND`)
    #[serde(rename = "type")]
    pub kind: String,

    /// Discount factor (e.g., "0.5" or "50%")
    pub discount: String,

    /// Units required before the offer applies
    pub min_quantity: u32,
}

impl TryFrom<OfferFixture> for SpecialOffer {
    type Error = FixtureError;

    fn try_from(fixture: OfferFixture) -> Result<Self, Self::Error> {
        let kind: OfferKind = fixture.kind.parse()?;
        let factor = parse_discount_factor(&fixture.discount)?;

        Ok(SpecialOffer::new(fixture.product, kind, factor, fixture.min_quantity)?)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::offers::OfferError;

    use super::*;

    fn fixture(kind: &str, discount: &str, min_quantity: u32) -> OfferFixture {
        OfferFixture {
            product: "R01".to_string(),
            kind: kind.to_string(),
            discount: discount.to_string(),
            min_quantity,
        }
    }

    #[test]
    fn offer_fixture_parses_yaml() -> Result<(), FixtureError> {
        let yaml = "
offers:
  - product: R01
    type: HALF_PRICE_SECOND
    discount: \"50%\"
    min_quantity: 2
";

        let parsed: OffersFixture = serde_norway::from_str(yaml)?;
        let offers = parsed
            .offers
            .into_iter()
            .map(SpecialOffer::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        assert_eq!(offers.len(), 1);
        assert!(offers.iter().all(|offer| offer.factor() == Decimal::new(5, 1)));

        Ok(())
    }

    #[test]
    fn offer_fixture_rejects_unknown_kind() {
        let result = SpecialOffer::try_from(fixture("THREE_FOR_TWO", "0.5", 2));

        assert!(matches!(
            result,
            Err(FixtureError::Offer(OfferError::UnknownKind(kind))) if kind == "THREE_FOR_TWO"
        ));
    }

    #[test]
    fn offer_fixture_rejects_bad_discount() {
        let result = SpecialOffer::try_from(fixture("HALF_PRICE_SECOND", "half", 2));

        assert!(matches!(
            result,
            Err(FixtureError::Offer(OfferError::InvalidPercentage(_)))
        ));
    }

    #[test]
    fn offer_fixture_rejects_zero_min_quantity() {
        let result = SpecialOffer::try_from(fixture("HALF_PRICE_SECOND", "0.5", 0));

        assert!(matches!(
            result,
            Err(FixtureError::Offer(OfferError::InvalidMinQuantity(0)))
        ));
    }
}
