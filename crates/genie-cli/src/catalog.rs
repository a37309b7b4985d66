//! Catalog inspection commands.
//!
//! Loads the YAML catalog the server ships with and either validates it
//! or lists products through the same filter and price derivation the
//! API uses.

use std::path::PathBuf;

use clap::Subcommand;

use genie_core::{load_catalog, PriceBreakdown, Product, ProductFilter};

#[derive(Debug, Subcommand)]
pub enum CatalogCommands {
    /// Load the catalog file and report what it contains
    Validate {
        /// Path to the catalog YAML file
        #[arg(long, default_value = "config/catalog.yaml")]
        path: PathBuf,
    },
    /// List catalog products with their derived price breakdowns
    List {
        /// Path to the catalog YAML file
        #[arg(long, default_value = "config/catalog.yaml")]
        path: PathBuf,
        /// Case-insensitive substring match on name and category
        #[arg(long)]
        query: Option<String>,
        /// Inclusive lower price bound
        #[arg(long)]
        min_price: Option<i64>,
        /// Inclusive upper price bound
        #[arg(long)]
        max_price: Option<i64>,
        /// Comma-separated platform names (defaults to all)
        #[arg(long)]
        platforms: Option<String>,
    },
}

pub fn run(command: CatalogCommands) -> anyhow::Result<()> {
    match command {
        CatalogCommands::Validate { path } => validate(&path),
        CatalogCommands::List {
            path,
            query,
            min_price,
            max_price,
            platforms,
        } => {
            let filter = build_filter(query, min_price, max_price, platforms.as_deref())?;
            list(&path, &filter)
        }
    }
}

fn validate(path: &std::path::Path) -> anyhow::Result<()> {
    let catalog = load_catalog(path)?;
    let quotes: usize = catalog.products.iter().map(|p| p.quotes.len()).sum();
    println!(
        "catalog ok: {} products, {} quotes ({})",
        catalog.products.len(),
        quotes,
        path.display()
    );
    Ok(())
}

fn list(path: &std::path::Path, filter: &ProductFilter) -> anyhow::Result<()> {
    let catalog = load_catalog(path)?;
    let matched = filter.apply(&catalog.products);

    for &product in &matched {
        print_product(product);
    }
    println!("{} of {} products matched", matched.len(), catalog.products.len());
    Ok(())
}

fn print_product(product: &Product) {
    let Some(breakdown) = PriceBreakdown::derive(&product.quotes) else {
        // Unreachable through the filter, which drops fully out-of-stock
        // products, but harmless when called directly.
        println!("{} [{}] - no in-stock quotes", product.name, product.id);
        return;
    };

    println!(
        "{} [{}] {} - lowest {} / highest {} (save {}, {}%)",
        product.name,
        product.id,
        product.category,
        breakdown.lowest,
        breakdown.highest,
        breakdown.savings,
        breakdown.savings_percent,
    );
    for quote in &breakdown.in_stock {
        let marker = if breakdown.is_best(quote) { " *best*" } else { "" };
        println!(
            "    {:<10} {}{}",
            quote.platform.display_name(),
            quote.price,
            marker
        );
    }
}

fn build_filter(
    query: Option<String>,
    min_price: Option<i64>,
    max_price: Option<i64>,
    platforms: Option<&str>,
) -> anyhow::Result<ProductFilter> {
    let mut filter = ProductFilter::default();
    if let Some(query) = query {
        filter.query = query;
    }
    if let Some(min) = min_price {
        filter.min_price = min;
    }
    if let Some(max) = max_price {
        filter.max_price = max;
    }
    anyhow::ensure!(
        filter.min_price <= filter.max_price,
        "min-price must not exceed max-price"
    );

    if let Some(platforms) = platforms {
        filter.platforms.clear();
        for name in platforms.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let platform = name
                .parse::<genie_core::Platform>()
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            filter.platforms.insert(platform);
        }
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use genie_core::{Platform, DEFAULT_MAX_PRICE, DEFAULT_MIN_PRICE};

    #[test]
    fn build_filter_defaults_match_reset_state() {
        let filter = build_filter(None, None, None, None).expect("filter");
        assert_eq!(filter.query, "");
        assert_eq!(filter.min_price, DEFAULT_MIN_PRICE);
        assert_eq!(filter.max_price, DEFAULT_MAX_PRICE);
        assert_eq!(filter.platforms.len(), Platform::ALL.len());
    }

    #[test]
    fn build_filter_parses_platform_list() {
        let filter =
            build_filter(None, None, None, Some("amazon, myntra")).expect("filter");
        assert_eq!(filter.platforms.len(), 2);
        assert!(filter.platforms.contains(&Platform::Amazon));
        assert!(filter.platforms.contains(&Platform::Myntra));
    }

    #[test]
    fn build_filter_rejects_unknown_platform() {
        assert!(build_filter(None, None, None, Some("ebay")).is_err());
    }

    #[test]
    fn build_filter_rejects_inverted_range() {
        assert!(build_filter(None, Some(500), Some(100), None).is_err());
    }
}
