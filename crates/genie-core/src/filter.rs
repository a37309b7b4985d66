use std::collections::HashSet;

use crate::{Platform, Product};

/// Default lower bound of the price range filter.
pub const DEFAULT_MIN_PRICE: i64 = 0;
/// Default upper bound of the price range filter.
pub const DEFAULT_MAX_PRICE: i64 = 100_000;

/// Live filter parameters for a catalog listing.
///
/// Created with defaults at screen mount, mutated by user interaction, and
/// discarded on navigation away. Never persisted. The pair `min_price <=
/// max_price` is a caller obligation; [`ProductFilter::reset`] restores a
/// known-good default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    /// Free-text query. Empty matches everything.
    pub query: String,
    /// Inclusive lower bound in whole currency units.
    pub min_price: i64,
    /// Inclusive upper bound in whole currency units.
    pub max_price: i64,
    /// Platforms whose quotes participate in the price match.
    pub platforms: HashSet<Platform>,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            min_price: DEFAULT_MIN_PRICE,
            max_price: DEFAULT_MAX_PRICE,
            platforms: Platform::ALL.into_iter().collect(),
        }
    }
}

impl ProductFilter {
    /// Restores the default query, price range, and platform set.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Flips a platform in or out of the enabled set.
    pub fn toggle_platform(&mut self, platform: Platform) {
        if !self.platforms.remove(&platform) {
            self.platforms.insert(platform);
        }
    }

    /// Returns the subset of `catalog` matching all filter criteria.
    ///
    /// A product is included iff the text criterion matches (empty query, or
    /// the name or category contains the query case-insensitively) AND at
    /// least one of its in-stock quotes on an enabled platform prices within
    /// `[min_price, max_price]` inclusive.
    ///
    /// Pure and stable: output preserves catalog order and is always a
    /// subsequence of the input. An empty platform set yields an empty
    /// result, since no quote can survive the platform restriction.
    #[must_use]
    pub fn apply<'a>(&self, catalog: &'a [Product]) -> Vec<&'a Product> {
        let query = self.query.to_lowercase();

        catalog
            .iter()
            .filter(|product| self.matches_text(product, &query) && self.matches_price(product))
            .collect()
    }

    fn matches_text(&self, product: &Product, query_lower: &str) -> bool {
        if self.query.is_empty() {
            return true;
        }
        product.name.to_lowercase().contains(query_lower)
            || product.category.to_lowercase().contains(query_lower)
    }

    fn matches_price(&self, product: &Product) -> bool {
        product
            .quotes
            .iter()
            .filter(|q| q.in_stock && self.platforms.contains(&q.platform))
            .any(|q| q.price >= self.min_price && q.price <= self.max_price)
    }
}
