use axum::{extract::State, Extension, Json};

use genie_db::OrderRow;

use crate::middleware::{RequestId, UserId};

use super::{map_db_error, ApiResponse, AppState, ResponseMeta};

/// Places an order from the caller's cart and clears it.
///
/// `not_found` when the cart is empty, matching the storefront's rule that
/// an order always snapshots at least one item.
pub(super) async fn place_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<ApiResponse<OrderRow>>, super::ApiError> {
    let order = genie_db::place_order(&state.pool, user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    // The cart was emptied inside the order transaction.
    super::cart::publish_cart_count(&state, user_id).await;

    Ok(Json(ApiResponse {
        data: order,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<ApiResponse<Vec<OrderRow>>>, super::ApiError> {
    let orders = genie_db::list_orders(&state.pool, user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: orders,
        meta: ResponseMeta::new(req_id.0),
    }))
}
