use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use genie_db::{CartItemRow, NewCartItem};

use crate::middleware::{RequestId, UserId};
use crate::notify::CartEvent;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AddCartItemBody {
    pub product_id: String,
    pub platform: String,
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatedData {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct CartCountData {
    pub count: i64,
}

pub(super) async fn list_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<ApiResponse<Vec<CartItemRow>>>, ApiError> {
    let items = genie_db::list_cart_items(&state.pool, user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Adds a product's quote to the user's cart.
///
/// The price is resolved from the live catalog quote, never taken from the
/// request; an unknown product or platform quote is a validation error and
/// an out-of-stock quote is a conflict.
pub(super) async fn add_cart_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(body): Json<AddCartItemBody>,
) -> Result<Json<ApiResponse<CreatedData>>, ApiError> {
    let platform = body.platform.parse::<genie_core::Platform>().map_err(|e| {
        ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
    })?;

    let product = state
        .catalog
        .iter()
        .find(|p| p.id == body.product_id)
        .ok_or_else(|| {
            ApiError::new(req_id.0.clone(), "validation_error", "unknown product id")
        })?;

    let quote = product.quote_for(platform).ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            "product has no quote on that platform",
        )
    })?;

    if !quote.in_stock {
        return Err(ApiError::new(
            req_id.0.clone(),
            "conflict",
            "quote is out of stock",
        ));
    }

    let item = NewCartItem {
        product_id: &product.id,
        product_name: &product.name,
        product_image: &product.image_url,
        platform,
        price: quote.price,
        quantity: body.quantity.unwrap_or(1).max(1),
    };

    let id = genie_db::insert_cart_item(&state.pool, user_id, &item)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    publish_cart_count(&state, user_id).await;

    Ok(Json(ApiResponse {
        data: CreatedData { id },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn remove_cart_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    genie_db::delete_cart_item(&state.pool, id, user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    publish_cart_count(&state, user_id).await;

    Ok(Json(ApiResponse {
        data: (),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn cart_count(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<ApiResponse<CartCountData>>, ApiError> {
    let count = genie_db::count_cart_items(&state.pool, user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: CartCountData { count },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// SSE stream of the caller's cart-count changes.
///
/// Subscribes to the in-process cart feed and forwards only events for the
/// caller's identity. Lagged subscribers skip missed events and keep
/// receiving; the next event carries the current count anyway.
pub(super) async fn cart_events(
    State(state): State<AppState>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.cart_feed.subscribe();

    let stream = futures::stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.user_id == user_id => {
                    let sse_event = Event::default().event("cart_count").json_data(&event).ok()?;
                    return Some((Ok::<_, Infallible>(sse_event), rx));
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Best-effort publish of the user's post-change cart count.
pub(super) async fn publish_cart_count(state: &AppState, user_id: Uuid) {
    match genie_db::count_cart_items(&state.pool, user_id).await {
        Ok(count) => state.cart_feed.publish(CartEvent { user_id, count }),
        Err(e) => {
            tracing::warn!(error = %e, %user_id, "failed to count cart for change feed");
        }
    }
}
