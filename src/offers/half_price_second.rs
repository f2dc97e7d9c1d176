//! Half Price Second
//!
//! Every second unit of a product is discounted: for `n` units at price `p`
//! and factor `f`, the discount is `floor(n / 2) * p * f`.

use rust_decimal::Decimal;

use crate::offers::{OfferError, OfferStrategy, OfferTerms};

/// Second-unit discount strategy (`HALF_PRICE_SECOND`).
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfPriceSecond;

impl OfferStrategy for HalfPriceSecond {
    fn discount(&self, terms: &OfferTerms) -> Result<Decimal, OfferError> {
        if !terms.qualifies() {
            return Ok(Decimal::ZERO);
        }

        let discounted_units = Decimal::from(terms.quantity / 2);

        terms
            .unit_price
            .checked_mul(terms.discount_factor)
            .and_then(|per_unit| per_unit.checked_mul(discounted_units))
            .ok_or(OfferError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn terms(quantity: u64) -> OfferTerms {
        OfferTerms {
            unit_price: Decimal::new(3295, 2),
            quantity,
            discount_factor: Decimal::new(5, 1),
            min_quantity: 2,
        }
    }

    #[test]
    fn below_min_quantity_has_no_discount() -> TestResult {
        assert_eq!(HalfPriceSecond.discount(&terms(0))?, Decimal::ZERO);
        assert_eq!(HalfPriceSecond.discount(&terms(1))?, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn pair_discounts_one_unit() -> TestResult {
        assert_eq!(
            HalfPriceSecond.discount(&terms(2))?,
            Decimal::new(16_475, 3)
        );

        Ok(())
    }

    #[test]
    fn odd_quantity_rounds_discounted_units_down() -> TestResult {
        assert_eq!(
            HalfPriceSecond.discount(&terms(3))?,
            Decimal::new(16_475, 3)
        );
        assert_eq!(
            HalfPriceSecond.discount(&terms(5))?,
            Decimal::new(32_950, 3)
        );

        Ok(())
    }

    #[test]
    fn discount_matches_floor_formula() -> TestResult {
        for quantity in 2..=12_u64 {
            let expected = Decimal::from(quantity / 2) * Decimal::new(3295, 2) * Decimal::new(5, 1);

            assert_eq!(
                HalfPriceSecond.discount(&terms(quantity))?,
                expected,
                "quantity {quantity}"
            );
        }

        Ok(())
    }

    #[test]
    fn higher_minimum_holds_back_discount() -> TestResult {
        let terms = OfferTerms {
            min_quantity: 4,
            ..terms(3)
        };

        assert_eq!(HalfPriceSecond.discount(&terms)?, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn full_factor_makes_second_unit_free() -> TestResult {
        let terms = OfferTerms {
            discount_factor: Decimal::ONE,
            ..terms(2)
        };

        assert_eq!(HalfPriceSecond.discount(&terms)?, Decimal::new(3295, 2));

        Ok(())
    }

    #[test]
    fn overflow_is_reported() {
        let terms = OfferTerms {
            unit_price: Decimal::MAX,
            discount_factor: Decimal::ONE,
            ..terms(u64::MAX)
        };

        assert_eq!(HalfPriceSecond.discount(&terms), Err(OfferError::Overflow));
    }
}
