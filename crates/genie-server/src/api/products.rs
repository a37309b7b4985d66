use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use genie_core::{PriceBreakdown, Product, ProductFilter};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// One in-stock quote in ascending-price order.
#[derive(Debug, Serialize)]
pub(super) struct QuoteItem {
    pub platform: String,
    pub platform_name: &'static str,
    pub price: i64,
    pub url: String,
    /// True for every quote tied at the lowest in-stock price.
    pub best: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ProductItem {
    pub product_id: String,
    pub name: String,
    pub image_url: String,
    pub category: String,
    pub quotes: Vec<QuoteItem>,
    pub lowest_price: i64,
    pub highest_price: i64,
    pub savings: i64,
    pub savings_percent: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct ProductListData {
    pub count: usize,
    pub items: Vec<ProductItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductsQuery {
    pub q: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    /// Comma-separated platform identifiers; absent means all platforms.
    pub platforms: Option<String>,
}

/// Builds a [`ProductFilter`] from query params, defaulting absent ones.
fn build_filter(query: &ProductsQuery, request_id: &str) -> Result<ProductFilter, ApiError> {
    let mut filter = ProductFilter::default();

    if let Some(q) = &query.q {
        filter.query = q.clone();
    }
    if let Some(min) = query.min_price {
        filter.min_price = min;
    }
    if let Some(max) = query.max_price {
        filter.max_price = max;
    }

    if filter.min_price > filter.max_price {
        return Err(ApiError::new(
            request_id.to_string(),
            "validation_error",
            "min_price must not exceed max_price",
        ));
    }

    if let Some(raw) = &query.platforms {
        filter.platforms = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<genie_core::Platform>().map_err(|e| {
                    ApiError::new(request_id.to_string(), "validation_error", e.to_string())
                })
            })
            .collect::<Result<_, _>>()?;
    }

    Ok(filter)
}

fn to_item(product: &Product) -> Option<ProductItem> {
    let breakdown = PriceBreakdown::derive(&product.quotes)?;

    let quotes = breakdown
        .in_stock
        .iter()
        .map(|q| QuoteItem {
            platform: q.platform.to_string(),
            platform_name: q.platform.display_name(),
            price: q.price,
            url: q.url.clone(),
            best: breakdown.is_best(q),
        })
        .collect();

    Some(ProductItem {
        product_id: product.id.clone(),
        name: product.name.clone(),
        image_url: product.image_url.clone(),
        category: product.category.clone(),
        quotes,
        lowest_price: breakdown.lowest,
        highest_price: breakdown.highest,
        savings: breakdown.savings,
        savings_percent: breakdown.savings_percent,
    })
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<ApiResponse<ProductListData>>, ApiError> {
    let filter = build_filter(&query, &req_id.0)?;

    // Filtered products always have an in-stock quote, so `to_item` cannot
    // drop them; `filter_map` still guards a fully out-of-stock entry if the
    // filter is ever bypassed.
    let items: Vec<ProductItem> = filter
        .apply(&state.catalog)
        .into_iter()
        .filter_map(to_item)
        .collect();

    Ok(Json(ApiResponse {
        data: ProductListData {
            count: items.len(),
            items,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
