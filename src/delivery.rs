//! Delivery
//!
//! Tiered delivery charges. Each [`DeliveryRule`] covers an inclusive amount
//! range; a [`DeliveryRules`] table resolves an amount to the rule with the
//! greatest qualifying lower bound.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::pricing::to_decimal;

/// Errors in delivery rule configuration.
#[derive(Debug, Error, PartialEq)]
pub enum DeliveryError {
    /// A bound or cost is negative.
    #[error("delivery amounts must not be negative, got {0}")]
    NegativeAmount(Decimal),

    /// Upper bound below lower bound.
    #[error("delivery rule maximum {max} is below its minimum {min}")]
    InvertedRange {
        /// Lower bound
        min: Decimal,
        /// Upper bound
        max: Decimal,
    },

    /// Rule amounts use different currencies.
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// No rules configured.
    #[error("no delivery rules configured")]
    Empty,

    /// The lowest tier does not start at zero.
    #[error("lowest delivery tier starts at {0}, not 0")]
    DoesNotStartAtZero(Decimal),

    /// Amounts between two tiers are not covered.
    #[error("delivery tiers leave a gap between {after} and {before}")]
    Gap {
        /// Upper bound of the lower tier
        after: Decimal,
        /// Lower bound of the next tier
        before: Decimal,
    },

    /// Two tiers cover the same amounts.
    #[error("delivery tiers overlap at {0}")]
    Overlap(Decimal),

    /// The highest tier has an upper bound.
    #[error("highest delivery tier is capped at {0}")]
    NotOpenEnded(Decimal),
}

/// A delivery tier: an amount range mapped to a fixed cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryRule {
    min_amount: Money<'static, Currency>,
    max_amount: Option<Money<'static, Currency>>,
    cost: Money<'static, Currency>,
}

impl DeliveryRule {
    /// Create a new delivery rule. `max_amount` of `None` leaves the tier unbounded.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::NegativeAmount`]: a bound or the cost is negative.
    /// - [`DeliveryError::InvertedRange`]: `max_amount` is below `min_amount`.
    /// - [`DeliveryError::CurrencyMismatch`]: amounts use different currencies.
    pub fn new(
        min_amount: Money<'static, Currency>,
        max_amount: Option<Money<'static, Currency>>,
        cost: Money<'static, Currency>,
    ) -> Result<Self, DeliveryError> {
        let currency = min_amount.currency();

        for amount in [Some(&cost), max_amount.as_ref()].into_iter().flatten() {
            if amount.currency() != currency {
                return Err(DeliveryError::CurrencyMismatch(
                    currency.iso_alpha_code,
                    amount.currency().iso_alpha_code,
                ));
            }
        }

        for amount in [Some(&min_amount), max_amount.as_ref(), Some(&cost)]
            .into_iter()
            .flatten()
        {
            let value = to_decimal(amount);

            if value < Decimal::ZERO {
                return Err(DeliveryError::NegativeAmount(value));
            }
        }

        if let Some(max) = max_amount
            && max.to_minor_units() < min_amount.to_minor_units()
        {
            return Err(DeliveryError::InvertedRange {
                min: to_decimal(&min_amount),
                max: to_decimal(&max),
            });
        }

        Ok(Self {
            min_amount,
            max_amount,
            cost,
        })
    }

    /// Inclusive lower bound.
    pub fn min_amount(&self) -> &Money<'static, Currency> {
        &self.min_amount
    }

    /// Inclusive upper bound, `None` when unbounded.
    pub fn max_amount(&self) -> Option<&Money<'static, Currency>> {
        self.max_amount.as_ref()
    }

    /// Delivery cost for amounts in this tier.
    pub fn cost(&self) -> &Money<'static, Currency> {
        &self.cost
    }

    /// Currency of the rule.
    pub fn currency(&self) -> &'static Currency {
        self.min_amount.currency()
    }

    /// Whether `min_amount <= amount` and (`max_amount` is unbounded or `amount <= max_amount`).
    pub fn contains(&self, amount: Decimal) -> bool {
        to_decimal(&self.min_amount) <= amount
            && self
                .max_amount
                .as_ref()
                .is_none_or(|max| amount <= to_decimal(max))
    }
}

/// Delivery tier table, kept ordered by lower bound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryRules {
    rules: SmallVec<[DeliveryRule; 4]>,
}

impl DeliveryRules {
    /// Build a table from rules in any order.
    pub fn new(rules: impl IntoIterator<Item = DeliveryRule>) -> Self {
        let mut table = Self::default();

        for rule in rules {
            table.insert(rule);
        }

        table
    }

    /// Insert a rule, keeping the table ordered by lower bound.
    pub fn insert(&mut self, rule: DeliveryRule) {
        let min = rule.min_amount.to_minor_units();
        let index = self
            .rules
            .partition_point(|existing| existing.min_amount.to_minor_units() <= min);

        self.rules.insert(index, rule);
    }

    /// Resolve the rule for an amount: the greatest `min_amount` whose range
    /// contains the amount.
    pub fn resolve(&self, amount: Decimal) -> Option<&DeliveryRule> {
        self.rules.iter().rev().find(|rule| rule.contains(amount))
    }

    /// Check the tiers partition every non-negative amount with no gaps or
    /// overlaps, at the granularity of the currency's minor unit.
    ///
    /// # Errors
    ///
    /// Returns the first [`DeliveryError`] found.
    pub fn validate(&self) -> Result<(), DeliveryError> {
        let first = self.rules.first().ok_or(DeliveryError::Empty)?;

        let currency = first.currency();

        if let Some(rule) = self.rules.iter().find(|rule| rule.currency() != currency) {
            return Err(DeliveryError::CurrencyMismatch(
                currency.iso_alpha_code,
                rule.currency().iso_alpha_code,
            ));
        }

        if first.min_amount.to_minor_units() != 0 {
            return Err(DeliveryError::DoesNotStartAtZero(to_decimal(&first.min_amount)));
        }

        for (lower, upper) in self.rules.iter().zip(self.rules.iter().skip(1)) {
            let Some(lower_max) = lower.max_amount else {
                return Err(DeliveryError::Overlap(to_decimal(&upper.min_amount)));
            };

            let next_expected = lower_max.to_minor_units().saturating_add(1);
            let upper_min = upper.min_amount.to_minor_units();

            if upper_min < next_expected {
                return Err(DeliveryError::Overlap(to_decimal(&upper.min_amount)));
            }

            if upper_min > next_expected {
                return Err(DeliveryError::Gap {
                    after: to_decimal(&lower_max),
                    before: to_decimal(&upper.min_amount),
                });
            }
        }

        match self.rules.last().and_then(|rule| rule.max_amount) {
            Some(max) => Err(DeliveryError::NotOpenEnded(to_decimal(&max))),
            None => Ok(()),
        }
    }

    /// Iterate over the rules in ascending order of lower bound.
    pub fn iter(&self) -> impl Iterator<Item = &DeliveryRule> {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn gbp(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, GBP)
    }

    fn rule(min: i64, max: Option<i64>, cost: i64) -> Result<DeliveryRule, DeliveryError> {
        DeliveryRule::new(gbp(min), max.map(gbp), gbp(cost))
    }

    fn seed_rules() -> Result<DeliveryRules, DeliveryError> {
        Ok(DeliveryRules::new([
            rule(9000, None, 0)?,
            rule(0, Some(4999), 495)?,
            rule(5000, Some(8999), 295)?,
        ]))
    }

    fn cost_for(rules: &DeliveryRules, amount: Decimal) -> Option<i64> {
        rules
            .resolve(amount)
            .map(|rule| rule.cost().to_minor_units())
    }

    #[test]
    fn rules_are_ordered_by_min_amount() -> TestResult {
        let rules = seed_rules()?;

        let mins: Vec<i64> = rules
            .iter()
            .map(|rule| rule.min_amount().to_minor_units())
            .collect();

        assert_eq!(mins, vec![0, 5000, 9000]);

        Ok(())
    }

    #[test]
    fn seed_rules_validate() -> TestResult {
        seed_rules()?.validate()?;

        Ok(())
    }

    #[test]
    fn resolve_picks_tier_by_amount() -> TestResult {
        let rules = seed_rules()?;

        assert_eq!(cost_for(&rules, Decimal::ZERO), Some(495));
        assert_eq!(cost_for(&rules, Decimal::new(3290, 2)), Some(495));
        assert_eq!(cost_for(&rules, Decimal::new(4999, 2)), Some(495));
        assert_eq!(cost_for(&rules, Decimal::new(5000, 2)), Some(295));
        assert_eq!(cost_for(&rules, Decimal::new(5790, 2)), Some(295));
        assert_eq!(cost_for(&rules, Decimal::new(8999, 2)), Some(295));
        assert_eq!(cost_for(&rules, Decimal::new(9000, 2)), Some(0));
        assert_eq!(cost_for(&rules, Decimal::new(1_000_000, 2)), Some(0));

        Ok(())
    }

    #[test]
    fn cost_never_increases_with_amount() -> TestResult {
        let rules = seed_rules()?;

        let mut previous = i64::MAX;

        for pence in (0..12_000).step_by(7) {
            let cost = cost_for(&rules, Decimal::new(pence, 2)).ok_or("no tier")?;

            assert!(cost <= previous, "cost rose at {pence}p");

            previous = cost;
        }

        Ok(())
    }

    #[test]
    fn every_minor_unit_matches_exactly_one_rule() -> TestResult {
        let rules = seed_rules()?;

        for pence in 0..10_000 {
            let amount = Decimal::new(pence, 2);
            let matches = rules.iter().filter(|rule| rule.contains(amount)).count();

            assert_eq!(matches, 1, "amount {amount}");
        }

        Ok(())
    }

    #[test]
    fn resolve_prefers_greatest_min_amount_on_overlap() -> TestResult {
        let rules = DeliveryRules::new([rule(0, None, 495)?, rule(5000, None, 295)?]);

        assert_eq!(cost_for(&rules, Decimal::new(6000, 2)), Some(295));
        assert_eq!(cost_for(&rules, Decimal::new(4000, 2)), Some(495));

        Ok(())
    }

    #[test]
    fn resolve_misses_sub_minor_gap() -> TestResult {
        let rules = seed_rules()?;

        assert_eq!(cost_for(&rules, Decimal::new(49_995, 3)), None);

        Ok(())
    }

    #[test]
    fn new_rejects_inverted_range() {
        assert!(matches!(
            rule(5000, Some(4000), 0),
            Err(DeliveryError::InvertedRange { .. })
        ));
    }

    #[test]
    fn new_rejects_negative_cost() {
        assert!(matches!(rule(0, None, -1), Err(DeliveryError::NegativeAmount(_))));
    }

    #[test]
    fn new_rejects_mixed_currency() {
        let result = DeliveryRule::new(gbp(0), None, Money::from_minor(0, USD));

        assert!(matches!(result, Err(DeliveryError::CurrencyMismatch("GBP", "USD"))));
    }

    #[test]
    fn validate_rejects_empty_table() {
        assert_eq!(
            DeliveryRules::default().validate(),
            Err(DeliveryError::Empty)
        );
    }

    #[test]
    fn validate_rejects_gap() -> TestResult {
        let rules = DeliveryRules::new([rule(0, Some(4999), 495)?, rule(5100, None, 0)?]);

        assert!(matches!(rules.validate(), Err(DeliveryError::Gap { .. })));

        Ok(())
    }

    #[test]
    fn validate_rejects_overlap() -> TestResult {
        let rules = DeliveryRules::new([rule(0, Some(5000), 495)?, rule(5000, None, 0)?]);

        assert!(matches!(rules.validate(), Err(DeliveryError::Overlap(_))));

        Ok(())
    }

    #[test]
    fn validate_rejects_unbounded_middle_tier() -> TestResult {
        let rules = DeliveryRules::new([rule(0, None, 495)?, rule(5000, None, 0)?]);

        assert!(matches!(rules.validate(), Err(DeliveryError::Overlap(_))));

        Ok(())
    }

    #[test]
    fn validate_rejects_missing_zero_tier() -> TestResult {
        let rules = DeliveryRules::new([rule(100, None, 0)?]);

        assert!(matches!(rules.validate(), Err(DeliveryError::DoesNotStartAtZero(_))));

        Ok(())
    }

    #[test]
    fn validate_rejects_capped_top_tier() -> TestResult {
        let rules = DeliveryRules::new([rule(0, Some(4999), 495)?]);

        assert!(matches!(rules.validate(), Err(DeliveryError::NotOpenEnded(_))));

        Ok(())
    }
}
