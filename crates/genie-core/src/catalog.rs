use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Platform};

/// A single per-platform price quote for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub platform: Platform,
    /// Price in whole currency units. Meaningless for min/max computation
    /// when `in_stock` is false.
    pub price: i64,
    /// Destination link on the platform's storefront.
    pub url: String,
    pub in_stock: bool,
}

/// A catalog entry with one quote per platform.
///
/// Immutable from the filter/derivation perspective; owned by the catalog
/// source. Platforms are not required to be unique across quotes but are
/// treated as unique in practice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub category: String,
    pub quotes: Vec<PriceQuote>,
}

impl Product {
    /// Returns `true` if at least one quote is currently in stock.
    #[must_use]
    pub fn has_in_stock_quotes(&self) -> bool {
        self.quotes.iter().any(|q| q.in_stock)
    }

    /// Returns the quote for a given platform, if present.
    #[must_use]
    pub fn quote_for(&self, platform: Platform) -> Option<&PriceQuote> {
        self.quotes.iter().find(|q| q.platform == platform)
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<Product>,
}

/// Load and validate the product catalog from a YAML file.
///
/// The order of products in the file is the canonical catalog order that
/// the filter preserves.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    validate_catalog(&catalog)?;

    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for product in &catalog.products {
        if product.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product id must be non-empty".to_string(),
            ));
        }

        if product.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "product '{}' has an empty name",
                product.id
            )));
        }

        if !seen_ids.insert(product.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product id: '{}'",
                product.id
            )));
        }

        if product.quotes.is_empty() {
            return Err(ConfigError::Validation(format!(
                "product '{}' has no price quotes",
                product.id
            )));
        }

        for quote in &product.quotes {
            if quote.price < 0 {
                return Err(ConfigError::Validation(format!(
                    "product '{}' has a negative price on {}",
                    product.id, quote.platform
                )));
            }
        }
    }

    Ok(())
}
