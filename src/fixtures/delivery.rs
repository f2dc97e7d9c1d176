//! Delivery Fixtures

use serde::Deserialize;

use crate::{
    delivery::DeliveryRule,
    fixtures::{FixtureError, products::parse_price},
};

/// Wrapper for delivery tiers in YAML
#[derive(Debug, Deserialize)]
pub struct DeliveryFixture {
    /// Delivery tiers
    pub delivery: Vec<DeliveryRuleFixture>,
}

/// Delivery tier fixture from YAML
#[derive(Debug, Deserialize)]
pub struct DeliveryRuleFixture {
    /// Inclusive lower bound (e.g., "50.00 GBP")
    pub min: String,

    /// Inclusive upper bound; omitted for the open-ended top tier
    #[serde(default)]
    pub max: Option<String>,

    /// Delivery cost
    pub cost: String,
}

impl TryFrom<DeliveryRuleFixture> for DeliveryRule {
    type Error = FixtureError;

    fn try_from(fixture: DeliveryRuleFixture) -> Result<Self, Self::Error> {
        let min = parse_price(&fixture.min)?;
        let max = fixture.max.as_deref().map(parse_price).transpose()?;
        let cost = parse_price(&fixture.cost)?;

        Ok(DeliveryRule::new(min, max, cost)?)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};

    use crate::delivery::DeliveryError;

    use super::*;

    #[test]
    fn delivery_fixture_parses_open_ended_tier() -> Result<(), FixtureError> {
        let yaml = "
delivery:
  - min: 0.00 GBP
    max: 49.99 GBP
    cost: 4.95 GBP
  - min: 50.00 GBP
    cost: 0.00 GBP
";

        let parsed: DeliveryFixture = serde_norway::from_str(yaml)?;
        let rules = parsed
            .delivery
            .into_iter()
            .map(DeliveryRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let max: Vec<Option<i64>> = rules
            .iter()
            .map(|rule| rule.max_amount().map(Money::to_minor_units))
            .collect();

        assert_eq!(max, vec![Some(4999), None]);
        assert!(rules.iter().all(|rule| rule.currency() == GBP));

        Ok(())
    }

    #[test]
    fn delivery_fixture_rejects_inverted_range() {
        let result = DeliveryRule::try_from(DeliveryRuleFixture {
            min: "10.00 GBP".to_string(),
            max: Some("5.00 GBP".to_string()),
            cost: "1.00 GBP".to_string(),
        });

        assert!(matches!(
            result,
            Err(FixtureError::Delivery(DeliveryError::InvertedRange { .. }))
        ));
    }

    #[test]
    fn delivery_fixture_rejects_bad_money() {
        let result = DeliveryRule::try_from(DeliveryRuleFixture {
            min: "ten GBP".to_string(),
            max: None,
            cost: "1.00 GBP".to_string(),
        });

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }
}
