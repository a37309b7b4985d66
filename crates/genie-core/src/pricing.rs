use crate::PriceQuote;

/// Derived price metrics for a single product's quote list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    /// In-stock quotes sorted ascending by price, lowest first. Ties keep
    /// their input order.
    pub in_stock: Vec<PriceQuote>,
    /// Minimum in-stock price.
    pub lowest: i64,
    /// Maximum in-stock price.
    pub highest: i64,
    /// `highest - lowest`, always >= 0.
    pub savings: i64,
    /// `savings / highest * 100` rounded to the nearest whole percent,
    /// or 0 when `highest` is 0.
    pub savings_percent: i64,
}

impl PriceBreakdown {
    /// Derives the breakdown from a product's quotes.
    ///
    /// Returns `None` when no quote is in stock; such a product has no
    /// defined price metrics and callers skip price-dependent rendering.
    /// With a single in-stock quote, `lowest == highest` and savings are 0.
    #[must_use]
    pub fn derive(quotes: &[PriceQuote]) -> Option<Self> {
        let mut in_stock: Vec<PriceQuote> =
            quotes.iter().filter(|q| q.in_stock).cloned().collect();
        if in_stock.is_empty() {
            return None;
        }

        in_stock.sort_by_key(|q| q.price);

        let lowest = in_stock.first().map(|q| q.price)?;
        let highest = in_stock.last().map(|q| q.price)?;
        let savings = highest - lowest;
        // Integer round-half-up; guards the degenerate zero-price entry.
        let savings_percent = if highest > 0 {
            (savings * 100 + highest / 2) / highest
        } else {
            0
        };

        Some(Self {
            in_stock,
            lowest,
            highest,
            savings,
            savings_percent,
        })
    }

    /// Returns `true` iff `quote` is in stock and priced at the minimum.
    /// Every quote tied at the lowest price qualifies; there is no
    /// single-winner tie-break.
    #[must_use]
    pub fn is_best(&self, quote: &PriceQuote) -> bool {
        quote.in_stock && quote.price == self.lowest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Platform;

    fn quote(platform: Platform, price: i64, in_stock: bool) -> PriceQuote {
        PriceQuote {
            platform,
            price,
            url: format!("https://{platform}.example.com"),
            in_stock,
        }
    }

    #[test]
    fn derive_returns_none_without_in_stock_quotes() {
        let quotes = [
            quote(Platform::Amazon, 29_990, false),
            quote(Platform::Tira, 31_500, false),
        ];
        assert!(PriceBreakdown::derive(&quotes).is_none());
    }

    #[test]
    fn derive_returns_none_for_empty_quotes() {
        assert!(PriceBreakdown::derive(&[]).is_none());
    }

    #[test]
    fn derive_computes_the_headphones_example() {
        let quotes = [
            quote(Platform::Amazon, 29_990, true),
            quote(Platform::Flipkart, 28_999, true),
            quote(Platform::Tira, 31_500, false),
        ];
        let breakdown = PriceBreakdown::derive(&quotes).expect("in-stock quotes exist");

        let platforms: Vec<Platform> = breakdown.in_stock.iter().map(|q| q.platform).collect();
        assert_eq!(platforms, vec![Platform::Flipkart, Platform::Amazon]);
        assert_eq!(breakdown.lowest, 28_999);
        assert_eq!(breakdown.highest, 29_990);
        assert_eq!(breakdown.savings, 991);
        assert_eq!(breakdown.savings_percent, 3);

        assert!(breakdown.is_best(&quotes[1]));
        assert!(!breakdown.is_best(&quotes[0]));
        assert!(!breakdown.is_best(&quotes[2]));
    }

    #[test]
    fn single_in_stock_quote_has_zero_savings() {
        let quotes = [quote(Platform::Tira, 799, true)];
        let breakdown = PriceBreakdown::derive(&quotes).expect("in stock");
        assert_eq!(breakdown.lowest, breakdown.highest);
        assert_eq!(breakdown.savings, 0);
        assert_eq!(breakdown.savings_percent, 0);
        assert!(breakdown.is_best(&quotes[0]));
    }

    #[test]
    fn ties_at_the_lowest_price_are_all_best() {
        let quotes = [
            quote(Platform::Amazon, 500, true),
            quote(Platform::Flipkart, 500, true),
        ];
        let breakdown = PriceBreakdown::derive(&quotes).expect("in stock");
        assert_eq!(breakdown.savings, 0);
        assert_eq!(breakdown.savings_percent, 0);
        assert!(breakdown.is_best(&quotes[0]));
        assert!(breakdown.is_best(&quotes[1]));
    }

    #[test]
    fn zero_priced_highest_yields_zero_percent() {
        let quotes = [quote(Platform::Amazon, 0, true)];
        let breakdown = PriceBreakdown::derive(&quotes).expect("in stock");
        assert_eq!(breakdown.highest, 0);
        assert_eq!(breakdown.savings_percent, 0);
    }

    #[test]
    fn savings_percent_rounds_to_nearest() {
        // 1 / 200 = 0.5% rounds up to 1.
        let quotes = [
            quote(Platform::Amazon, 199, true),
            quote(Platform::Flipkart, 200, true),
        ];
        let breakdown = PriceBreakdown::derive(&quotes).expect("in stock");
        assert_eq!(breakdown.savings_percent, 1);
    }

    #[test]
    fn out_of_stock_quote_at_lowest_price_is_not_best() {
        let quotes = [
            quote(Platform::Amazon, 400, false),
            quote(Platform::Flipkart, 500, true),
        ];
        let breakdown = PriceBreakdown::derive(&quotes).expect("in stock");
        assert_eq!(breakdown.lowest, 500);
        assert!(!breakdown.is_best(&quotes[0]));
        assert!(breakdown.is_best(&quotes[1]));
    }
}
