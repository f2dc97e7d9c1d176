//! Offer Registry
//!
//! Maps an [`OfferKind`] to the [`OfferStrategy`] that computes its discount.

use rustc_hash::FxHashMap;

use crate::offers::{HalfPriceSecond, OfferKind, OfferStrategy};

/// Offer kind -> discount strategy dispatch table.
#[derive(Debug)]
pub struct OfferRegistry {
    strategies: FxHashMap<OfferKind, Box<dyn OfferStrategy>>,
}

impl OfferRegistry {
    /// A registry with no strategies.
    pub fn empty() -> Self {
        Self {
            strategies: FxHashMap::default(),
        }
    }

    /// Register (or replace) the strategy for a kind.
    pub fn register(
        &mut self,
        kind: OfferKind,
        strategy: impl OfferStrategy + 'static,
    ) -> &mut Self {
        self.strategies.insert(kind, Box::new(strategy));

        self
    }

    /// Builder form of [`OfferRegistry::register`].
    #[must_use]
    pub fn with(mut self, kind: OfferKind, strategy: impl OfferStrategy + 'static) -> Self {
        self.register(kind, strategy);

        self
    }

    /// Strategy registered for a kind.
    pub fn get(&self, kind: OfferKind) -> Option<&dyn OfferStrategy> {
        self.strategies.get(&kind).map(AsRef::as_ref)
    }

    /// Whether a strategy is registered for the kind.
    pub fn contains(&self, kind: OfferKind) -> bool {
        self.strategies.contains_key(&kind)
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether no kinds are registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for OfferRegistry {
    fn default() -> Self {
        Self::empty().with(OfferKind::HalfPriceSecond, HalfPriceSecond)
    }
}
